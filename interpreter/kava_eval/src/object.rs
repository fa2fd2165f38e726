//! Object instances, call frames, and method dispatch.
//!
//! Each instance owns its own copy of its class's fields and methods plus a
//! separately instantiated superclass object. Execution state (let scopes,
//! call frames, the pending exception slot) also lives on the instance, since
//! a method always runs on the instance whose class level declares it.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::{self, Fatal};
use crate::method::{ArgSig, Method};
use crate::types::TypeRegistry;
use crate::value::{ObjRef, Value};

/// One activation of a method on an instance.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Formal parameter bindings for this activation.
    pub params: FxHashMap<String, Value>,
    /// Index into `scopes` below which this activation must not look.
    /// Keeps a recursive call from reading the caller's let variables.
    pub scope_base: usize,
    /// The dispatch receiver: `me` inside this activation. For calls
    /// forwarded through `super` this stays the original derived object, so
    /// re-dispatch from base-class code remains polymorphic.
    pub me: ObjRef,
}

/// A live object: field storage, method table, superclass part, and the
/// execution state of any activations currently running on it.
#[derive(Debug)]
pub struct ObjectInstance {
    pub class_name: String,
    pub fields: FxHashMap<String, Value>,
    pub methods: FxHashMap<String, Rc<Method>>,
    pub super_instance: Option<ObjRef>,
    /// Let-scope stack, shared by all activations on this instance;
    /// `CallFrame::scope_base` partitions it per activation.
    pub scopes: Vec<FxHashMap<String, Value>>,
    pub frames: Vec<CallFrame>,
    /// Pending exception while unwinding toward a `try` on this instance.
    pub exception: Option<Value>,
}

impl ObjectInstance {
    /// The innermost activation. Only valid while a method body is running.
    pub fn frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// Read a name visible to the innermost activation: let scopes from the
    /// top down to the frame's base, then formal parameters, then fields.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let base = self.frames.last().map_or(0, |f| f.scope_base);
        for scope in self.scopes[base..].iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value);
            }
        }
        if let Some(frame) = self.frames.last() {
            if let Some(value) = frame.params.get(name) {
                return Some(value);
            }
        }
        self.fields.get(name)
    }

    /// Overwrite an existing binding, innermost visibility first. Returns
    /// the previous value, or `None` if the name is not visible.
    pub fn assign(&mut self, name: &str, value: Value) -> Option<Value> {
        let base = self.frames.last().map_or(0, |f| f.scope_base);
        for scope in self.scopes[base..].iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                return Some(std::mem::replace(slot, value));
            }
        }
        if let Some(frame) = self.frames.last_mut() {
            if let Some(slot) = frame.params.get_mut(name) {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.fields
            .get_mut(name)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn push_frame(&mut self, params: FxHashMap<String, Value>, me: ObjRef) {
        let scope_base = self.scopes.len();
        self.frames.push(CallFrame {
            params,
            scope_base,
            me,
        });
    }

    /// Pop the innermost activation, discarding any let scopes it left
    /// behind (an early `return` or a raised exception skips the normal
    /// scope pops).
    pub fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.scopes.truncate(frame.scope_base);
        }
    }
}

/// Find the method to run for `name(args)` starting at `start` and walking
/// the superclass chain.
///
/// At each level an exact signature match wins outright, then a covariant
/// one; otherwise the search ascends. The instance that owns the winning
/// method is returned alongside it - the body runs on that instance, so base
/// methods see base fields.
///
/// If the name exists somewhere on the chain but no signature fits, the
/// fault is a type error; if the name exists nowhere, a name error.
pub fn resolve_method(
    start: &ObjRef,
    name: &str,
    args: &ArgSig,
    types: &TypeRegistry,
    line: u32,
) -> Fatal<(ObjRef, Rc<Method>)> {
    let mut name_seen = false;
    let mut current = Some(start.clone());
    while let Some(obj) = current {
        let next = {
            let inner = obj.borrow();
            if let Some(method) = inner.methods.get(name) {
                name_seen = true;
                if method.matches_exact(args) || method.matches_covariant(args, types) {
                    let method = method.clone();
                    drop(inner);
                    return Ok((obj.clone(), method));
                }
            }
            inner.super_instance.clone()
        };
        current = next;
    }
    if name_seen {
        Err(errors::no_matching_overload(name, line))
    } else {
        Err(errors::method_undefined(name, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{ArgTag, ParamTag, TypeSig};
    use crate::types::TypeTag;
    use kava_ir::Ast;
    use smallvec::smallvec;
    use std::cell::RefCell;

    fn bare_instance(class: &str) -> ObjRef {
        Rc::new(RefCell::new(ObjectInstance {
            class_name: class.to_string(),
            fields: FxHashMap::default(),
            methods: FxHashMap::default(),
            super_instance: None,
            scopes: Vec::new(),
            frames: Vec::new(),
            exception: None,
        }))
    }

    fn method_named(name: &str, signature: TypeSig) -> Rc<Method> {
        Rc::new(Method {
            name: name.to_string(),
            return_type: "void".into(),
            return_tag: TypeTag::Void,
            params: Vec::new(),
            signature,
            body: Ast::list(vec![], 1),
            line: 1,
        })
    }

    #[test]
    fn lookup_prefers_locals_over_params_over_fields() {
        let me = bare_instance("c");
        let obj = bare_instance("c");
        {
            let mut inner = obj.borrow_mut();
            inner.fields.insert("x".into(), Value::Int(1));
            let mut params = FxHashMap::default();
            params.insert("x".into(), Value::Int(2));
            inner.push_frame(params, me.clone());
            assert_eq!(inner.lookup("x"), Some(&Value::Int(2)));

            let mut scope = FxHashMap::default();
            scope.insert("x".into(), Value::Int(3));
            inner.scopes.push(scope);
            assert_eq!(inner.lookup("x"), Some(&Value::Int(3)));
        }
    }

    #[test]
    fn frame_base_hides_callers_locals() {
        let me = bare_instance("c");
        let obj = bare_instance("c");
        let mut inner = obj.borrow_mut();
        inner.push_frame(FxHashMap::default(), me.clone());
        let mut scope = FxHashMap::default();
        scope.insert("hidden".into(), Value::Int(9));
        inner.scopes.push(scope);

        // A second activation on the same instance must not see `hidden`.
        inner.push_frame(FxHashMap::default(), me.clone());
        assert_eq!(inner.lookup("hidden"), None);
        inner.pop_frame();
        assert_eq!(inner.lookup("hidden"), Some(&Value::Int(9)));
    }

    #[test]
    fn pop_frame_discards_leftover_scopes() {
        let me = bare_instance("c");
        let obj = bare_instance("c");
        let mut inner = obj.borrow_mut();
        inner.push_frame(FxHashMap::default(), me);
        inner.scopes.push(FxHashMap::default());
        inner.scopes.push(FxHashMap::default());
        inner.pop_frame();
        assert!(inner.scopes.is_empty());
    }

    #[test]
    fn dispatch_walks_to_super_and_reports_owner() {
        let types = TypeRegistry::new();
        let base = bare_instance("base");
        base.borrow_mut()
            .methods
            .insert("m".into(), method_named("m", smallvec![ParamTag::Int]));
        let derived = bare_instance("derived");
        derived.borrow_mut().super_instance = Some(base.clone());

        let args: ArgSig = smallvec![ArgTag::Int];
        let (owner, method) = resolve_method(&derived, "m", &args, &types, 1).unwrap();
        assert!(Rc::ptr_eq(&owner, &base));
        assert_eq!(method.name, "m");
    }

    #[test]
    fn absent_name_is_a_name_error_bad_signature_a_type_error() {
        let types = TypeRegistry::new();
        let obj = bare_instance("c");
        obj.borrow_mut()
            .methods
            .insert("m".into(), method_named("m", smallvec![ParamTag::Int]));

        let none: ArgSig = smallvec![];
        let err = resolve_method(&obj, "missing", &none, &types, 1).unwrap_err();
        assert_eq!(err.kind, crate::errors::FaultKind::Name);

        let wrong: ArgSig = smallvec![ArgTag::Str];
        let err = resolve_method(&obj, "m", &wrong, &types, 1).unwrap_err();
        assert_eq!(err.kind, crate::errors::FaultKind::Type);
    }
}
