//! Expression evaluation.

use kava_ir::Ast;

use crate::class::{self, SPECIALIZATION_SEP};
use crate::errors::{self, Fatal};
use crate::exec::{operators, try_outcome, Exec, Outcome};
use crate::value::{ObjRef, Value};

impl Exec<'_> {
    /// Evaluate an expression in the context of the instance `obj` is
    /// currently running a method on.
    pub(crate) fn eval_expr(&mut self, obj: &ObjRef, expr: &Ast) -> Fatal<Outcome> {
        let line = expr.line();
        match expr {
            Ast::Int { .. } | Ast::Str { .. } | Ast::Sym { .. } => {
                Ok(Outcome::Value(self.resolve_token(obj, expr)?))
            }
            Ast::List { items, .. } => {
                let head = expr
                    .head_sym()
                    .ok_or_else(|| errors::not_an_expression(line))?;
                match head {
                    "call" => self.eval_call(obj, expr),
                    "new" => {
                        let value = self.eval_new(items, line)?;
                        Ok(Outcome::Value(value))
                    }
                    op if operators::is_operator(op) => {
                        match items.len() {
                            2 => {
                                let a = try_outcome!(self, obj, &items[1]);
                                let value = operators::apply_unary(op, a, line)?;
                                Ok(Outcome::Value(value))
                            }
                            3 => {
                                let a = try_outcome!(self, obj, &items[1]);
                                let b = try_outcome!(self, obj, &items[2]);
                                let value = operators::apply_binary(
                                    op,
                                    a,
                                    b,
                                    &self.session.types,
                                    line,
                                )?;
                                Ok(Outcome::Value(value))
                            }
                            _ => Err(errors::not_an_expression(line)),
                        }
                    }
                    _ => Err(errors::not_an_expression(line)),
                }
            }
        }
    }

    /// Resolve an atom: the pending exception, `me`, a visible variable,
    /// or a literal - in that order.
    pub(crate) fn resolve_token(&mut self, obj: &ObjRef, atom: &Ast) -> Fatal<Value> {
        let line = atom.line();
        if let Some(name) = atom.as_sym() {
            match name {
                "exception" => {
                    return obj
                        .borrow()
                        .exception
                        .clone()
                        .ok_or_else(|| errors::undefined_exception(line));
                }
                "me" => {
                    let me = current_me(obj);
                    let class = me.borrow().class_name.clone();
                    return Ok(Value::object(me, &class));
                }
                _ => {
                    if let Some(value) = obj.borrow().lookup(name) {
                        return Ok(value.clone());
                    }
                }
            }
        }
        Value::from_literal(atom).ok_or_else(|| {
            let name = atom.as_sym().unwrap_or_default();
            errors::undefined_variable(name, line)
        })
    }

    /// `(new ClassName)` - instantiate a class or a template specialization.
    fn eval_new(&mut self, items: &[Ast], line: u32) -> Fatal<Value> {
        let name = items
            .get(1)
            .and_then(Ast::as_sym)
            .filter(|_| items.len() == 2)
            .ok_or_else(|| errors::not_an_expression(line))?;

        let def = if let Some(def) = self.session.classes.get(name) {
            def.clone()
        } else if name.contains(SPECIALIZATION_SEP)
            && self
                .session
                .templates
                .contains_key(class::template_head(name))
        {
            class::specialize(self.session, name, line)?
        } else {
            return Err(errors::undefined_class(name, line));
        };

        let instance = class::instantiate(self.session, &def)?;
        Ok(Value::object(instance, name))
    }
}

/// The dispatch receiver of the innermost activation on `obj`.
pub(crate) fn current_me(obj: &ObjRef) -> ObjRef {
    obj.borrow()
        .frame()
        .map(|f| f.me.clone())
        .unwrap_or_else(|| obj.clone())
}
