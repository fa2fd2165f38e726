//! Statement execution.

use rustc_hash::FxHashMap;

use kava_ir::Ast;

use crate::class;
use crate::errors::{self, Fatal};
use crate::exec::{try_value, Exec, Outcome, Signal};
use crate::types::TypeRegistry;
use crate::value::{ObjRef, Value};

impl Exec<'_> {
    /// Run one statement on `obj`, the instance whose method body contains
    /// it. The returned signal is `Normal` unless a `return` or `throw` is
    /// unwinding through this statement.
    pub(crate) fn run_statement(&mut self, obj: &ObjRef, stmt: &Ast) -> Fatal<Signal> {
        let line = stmt.line();
        let items = stmt
            .items()
            .ok_or_else(|| errors::malformed_statement(line))?;
        let head = stmt
            .head_sym()
            .ok_or_else(|| errors::malformed_statement(line))?;
        match head {
            "print" => self.run_print(obj, items),
            "inputi" | "inputs" => self.run_input(obj, head, items, line),
            "set" => self.run_set(obj, items, line),
            "call" => {
                // The return value of a call statement is discarded; only a
                // raised exception keeps propagating.
                match self.eval_call(obj, stmt)? {
                    Outcome::Raised(payload) => Ok(Signal::Raised(payload)),
                    Outcome::Value(_) => Ok(Signal::Normal),
                }
            }
            "while" => self.run_while(obj, items, line),
            "if" => self.run_if(obj, items, line),
            "return" => match items {
                [_] => Ok(Signal::Returning(Value::Void)),
                [_, expr] => {
                    let value = try_value!(self, obj, expr);
                    Ok(Signal::Returning(value))
                }
                _ => Err(errors::malformed_statement(line)),
            },
            "let" => self.run_let(obj, items, line),
            "begin" => self.run_block(obj, &items[1..]),
            "throw" => match items {
                [_, expr] => {
                    let payload = try_value!(self, obj, expr);
                    if !matches!(payload, Value::Str(_)) {
                        return Err(errors::throw_requires_string(line));
                    }
                    Ok(Signal::Raised(payload))
                }
                _ => Err(errors::malformed_statement(line)),
            },
            "try" => self.run_try(obj, items, line),
            _ => Err(errors::malformed_statement(line)),
        }
    }

    /// Run statements in order until one signals.
    pub(crate) fn run_block(&mut self, obj: &ObjRef, stmts: &[Ast]) -> Fatal<Signal> {
        for stmt in stmts {
            match self.run_statement(obj, stmt)? {
                Signal::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Signal::Normal)
    }

    fn run_print(&mut self, obj: &ObjRef, items: &[Ast]) -> Fatal<Signal> {
        let mut out = String::new();
        for arg in &items[1..] {
            let value = try_value!(self, obj, arg);
            out.push_str(&value.display());
        }
        self.session.output.println(&out);
        Ok(Signal::Normal)
    }

    fn run_input(&mut self, obj: &ObjRef, head: &str, items: &[Ast], line: u32) -> Fatal<Signal> {
        let [_, target] = items else {
            return Err(errors::malformed_statement(line));
        };
        let name = target
            .as_sym()
            .ok_or_else(|| errors::malformed_statement(line))?;
        let input = self
            .session
            .input
            .read_line()
            .ok_or_else(|| errors::input_exhausted(line))?;
        let value = if head == "inputi" {
            let n = input
                .trim()
                .parse::<i64>()
                .map_err(|_| errors::invalid_input_value("int", line))?;
            Value::Int(n)
        } else {
            Value::Str(input)
        };
        self.assign_variable(obj, name, value, line)?;
        Ok(Signal::Normal)
    }

    fn run_set(&mut self, obj: &ObjRef, items: &[Ast], line: u32) -> Fatal<Signal> {
        let [_, target, expr] = items else {
            return Err(errors::malformed_statement(line));
        };
        let name = target
            .as_sym()
            .ok_or_else(|| errors::malformed_statement(line))?;
        let value = try_value!(self, obj, expr);

        if name == "exception" {
            // Only meaningful inside a catch block, and the slot keeps its
            // string type.
            if obj.borrow().exception.is_none() {
                return Err(errors::undefined_exception(line));
            }
            if !matches!(value, Value::Str(_)) {
                return Err(errors::incompatible_assignment(line));
            }
            obj.borrow_mut().exception = Some(value);
            return Ok(Signal::Normal);
        }

        self.assign_variable(obj, name, value, line)?;
        Ok(Signal::Normal)
    }

    /// Overwrite the innermost visible binding of `name`, checking
    /// assignment compatibility against its declared type.
    fn assign_variable(&mut self, obj: &ObjRef, name: &str, value: Value, line: u32) -> Fatal<()> {
        let current = obj
            .borrow()
            .lookup(name)
            .cloned()
            .ok_or_else(|| errors::undefined_variable(name, line))?;
        let coerced = coerce_assign(&self.session.types, &current, value, line)?;
        obj.borrow_mut().assign(name, coerced);
        Ok(())
    }

    fn run_while(&mut self, obj: &ObjRef, items: &[Ast], line: u32) -> Fatal<Signal> {
        let [_, cond, body] = items else {
            return Err(errors::malformed_statement(line));
        };
        loop {
            let Value::Bool(keep_going) = try_value!(self, obj, cond) else {
                return Err(errors::condition_not_boolean("while", cond.line()));
            };
            if !keep_going {
                return Ok(Signal::Normal);
            }
            match self.run_statement(obj, body)? {
                Signal::Normal => {}
                other => return Ok(other),
            }
        }
    }

    fn run_if(&mut self, obj: &ObjRef, items: &[Ast], line: u32) -> Fatal<Signal> {
        let (cond, then_stmt, else_stmt) = match items {
            [_, cond, then_stmt] => (cond, then_stmt, None),
            [_, cond, then_stmt, else_stmt] => (cond, then_stmt, Some(else_stmt)),
            _ => return Err(errors::malformed_statement(line)),
        };
        let Value::Bool(truth) = try_value!(self, obj, cond) else {
            return Err(errors::condition_not_boolean("if", cond.line()));
        };
        if truth {
            self.run_statement(obj, then_stmt)
        } else if let Some(else_stmt) = else_stmt {
            self.run_statement(obj, else_stmt)
        } else {
            Ok(Signal::Normal)
        }
    }

    fn run_let(&mut self, obj: &ObjRef, items: &[Ast], line: u32) -> Fatal<Signal> {
        let decls = items
            .get(1)
            .and_then(Ast::items)
            .ok_or_else(|| errors::malformed_statement(line))?;

        let mut scope = FxHashMap::default();
        for decl in decls {
            let decl_line = decl.line();
            let parts = decl
                .items()
                .ok_or_else(|| errors::malformed_statement(decl_line))?;
            if parts.len() < 2 || parts.len() > 3 {
                return Err(errors::malformed_statement(decl_line));
            }
            let (Some(type_name), Some(name)) =
                (parts[0].as_sym(), parts[1].as_sym())
            else {
                return Err(errors::malformed_statement(decl_line));
            };
            let tag = class::ensure_type(self.session, type_name, decl_line)?;
            let value = match parts.get(2) {
                Some(init) => {
                    let value = Value::from_literal(init)
                        .ok_or_else(|| errors::invalid_local_init(name, decl_line))?;
                    if value.tag() != tag {
                        return Err(errors::invalid_local_init(name, decl_line));
                    }
                    match value {
                        Value::Pointer { .. } => Value::null(Some(type_name)),
                        other => other,
                    }
                }
                None => self
                    .session
                    .types
                    .zero_value(type_name)
                    .ok_or_else(|| errors::unknown_type(type_name, decl_line))?,
            };
            if scope.insert(name.to_string(), value).is_some() {
                return Err(errors::duplicate_local(name, decl_line));
            }
        }

        obj.borrow_mut().scopes.push(scope);
        let result = self.run_block(obj, &items[2..]);
        obj.borrow_mut().scopes.pop();
        result
    }

    fn run_try(&mut self, obj: &ObjRef, items: &[Ast], line: u32) -> Fatal<Signal> {
        let [_, body, handler] = items else {
            return Err(errors::malformed_statement(line));
        };
        match self.run_statement(obj, body)? {
            Signal::Raised(payload) => {
                // Save any outer pending exception so nested try blocks
                // restore it when the handler finishes.
                let saved = obj.borrow_mut().exception.replace(payload);
                let result = self.run_statement(obj, handler);
                obj.borrow_mut().exception = saved;
                result
            }
            other => Ok(other),
        }
    }
}

/// Check assignment compatibility and produce the value to store: the
/// source value carrying the target's declared class.
fn coerce_assign(
    types: &TypeRegistry,
    target: &Value,
    value: Value,
    line: u32,
) -> Fatal<Value> {
    if target.tag() != value.tag() {
        return Err(errors::incompatible_assignment(line));
    }
    if let (
        Value::Pointer {
            declared: target_declared,
            ..
        },
        Value::Pointer { obj, runtime, .. },
    ) = (target, &value)
    {
        if let Some(base) = target_declared.as_deref() {
            if !types.is_subtype(base, runtime.as_deref()) {
                return Err(errors::incompatible_assignment(line));
            }
        }
        return Ok(Value::Pointer {
            obj: obj.clone(),
            declared: target_declared.clone(),
            runtime: runtime.clone(),
        });
    }
    Ok(value)
}
