//! Method calls: receiver resolution, overload dispatch, parameter binding,
//! and return coercion.

use rustc_hash::FxHashMap;

use kava_ir::Ast;

use crate::errors::{self, Fatal};
use crate::exec::expr::current_me;
use crate::exec::{try_outcome, Exec, Outcome, Signal};
use crate::method::{ArgSig, ArgTag};
use crate::object::resolve_method;
use crate::types::TypeTag;
use crate::value::{ObjRef, Value};

impl Exec<'_> {
    /// `(call receiver method args...)`.
    ///
    /// Arguments are evaluated left to right in the caller's context before
    /// the callee frame exists. Dispatch starts at the receiver and walks
    /// its superclass chain; for `super` it starts one level above the
    /// instance running the current method, while `me` stays the original
    /// receiver so re-dispatch from base-class code remains polymorphic.
    pub(crate) fn eval_call(&mut self, obj: &ObjRef, form: &Ast) -> Fatal<Outcome> {
        let line = form.line();
        let items = form
            .items()
            .ok_or_else(|| errors::malformed_statement(line))?;
        if items.len() < 3 {
            return Err(errors::malformed_statement(line));
        }
        let method_name = items[2]
            .as_sym()
            .ok_or_else(|| errors::malformed_statement(line))?;

        let (start, next_me) = match items[1].as_sym() {
            Some("me") => {
                let me = current_me(obj);
                (me.clone(), me)
            }
            Some("super") => {
                let sup = obj
                    .borrow()
                    .super_instance
                    .clone()
                    .ok_or_else(|| errors::illegal_receiver(line))?;
                (sup, current_me(obj))
            }
            _ => {
                let receiver = try_outcome!(self, obj, &items[1]);
                match receiver {
                    Value::Pointer { obj: Some(target), .. } => (target.clone(), target),
                    Value::Pointer { obj: None, .. } => {
                        return Err(errors::null_reference(line));
                    }
                    _ => return Err(errors::illegal_receiver(line)),
                }
            }
        };

        let mut values = Vec::with_capacity(items.len() - 3);
        let mut sig = ArgSig::new();
        for arg in &items[3..] {
            let value = try_outcome!(self, obj, arg);
            sig.push(arg_tag(&value));
            values.push(value);
        }

        let (owner, method) = resolve_method(&start, method_name, &sig, &self.session.types, line)?;

        let mut params = FxHashMap::default();
        for (param, value) in method.params.iter().zip(values) {
            let bound = match value {
                Value::Pointer { obj, runtime, .. } => {
                    if !self
                        .session
                        .types
                        .is_subtype(&param.type_name, runtime.as_deref())
                    {
                        return Err(errors::passing_invalid_class(&param.name, line));
                    }
                    // The binding site's declared class is the formal's.
                    Value::Pointer {
                        obj,
                        declared: Some(param.type_name.clone()),
                        runtime,
                    }
                }
                other => other,
            };
            params.insert(param.name.clone(), bound);
        }

        owner.borrow_mut().push_frame(params, next_me);
        let signal = self.run_statement(&owner, &method.body);
        owner.borrow_mut().pop_frame();

        match signal? {
            Signal::Raised(payload) => Ok(Outcome::Raised(payload)),
            Signal::Normal | Signal::Returning(Value::Void)
                if method.return_tag != TypeTag::Void =>
            {
                // Falling off the end (or a bare return) yields the return
                // type's zero value.
                let zero = self
                    .session
                    .types
                    .zero_value(&method.return_type)
                    .ok_or_else(|| errors::unknown_type(&method.return_type, method.line))?;
                Ok(Outcome::Value(zero))
            }
            Signal::Normal | Signal::Returning(Value::Void) => Ok(Outcome::Value(Value::Void)),
            Signal::Returning(value) => {
                if value.tag() != method.return_tag {
                    return Err(errors::invalid_return_type(line));
                }
                if let Value::Pointer { obj, runtime, .. } = value {
                    if !self
                        .session
                        .types
                        .is_subtype(&method.return_type, runtime.as_deref())
                    {
                        return Err(errors::returning_invalid_class(line));
                    }
                    return Ok(Outcome::Value(Value::Pointer {
                        obj,
                        declared: Some(method.return_type.clone()),
                        runtime,
                    }));
                }
                Ok(Outcome::Value(value))
            }
        }
    }
}

fn arg_tag(value: &Value) -> ArgTag {
    match value {
        Value::Int(_) => ArgTag::Int,
        Value::Bool(_) => ArgTag::Bool,
        Value::Str(_) => ArgTag::Str,
        Value::Void => ArgTag::Void,
        Value::Pointer { declared, runtime, .. } => ArgTag::Pointer {
            declared: declared.clone(),
            runtime: runtime.clone(),
        },
    }
}
