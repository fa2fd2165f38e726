//! Tagged runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use kava_ir::Ast;

use crate::object::ObjectInstance;
use crate::types::TypeTag;

/// Shared handle to an object instance.
///
/// Ownership is shared among every field, local, and parameter that holds a
/// reference; lifetime is the longest-surviving holder. Single-threaded by
/// design, hence `Rc` and not `Arc`.
pub type ObjRef = Rc<RefCell<ObjectInstance>>;

/// A runtime value. Exactly one tag per value.
///
/// Pointers carry the *declared* (static) class of the binding site when one
/// is known, and the *runtime* (dynamic) class of the referenced object -
/// `None` iff the pointer is null. Assignment compatibility and covariant
/// dispatch read these two fields; nothing else distinguishes pointers.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Pointer {
        obj: Option<ObjRef>,
        declared: Option<String>,
        runtime: Option<String>,
    },
    /// Absence-of-return marker produced by a bare `return` or a void method.
    Void,
}

impl Value {
    /// A null pointer, optionally tagged with a declared class.
    pub fn null(declared: Option<&str>) -> Value {
        Value::Pointer {
            obj: None,
            declared: declared.map(str::to_string),
            runtime: None,
        }
    }

    /// A pointer to `obj`, with declared and runtime class both `class`.
    pub fn object(obj: ObjRef, class: &str) -> Value {
        Value::Pointer {
            obj: Some(obj),
            declared: Some(class.to_string()),
            runtime: Some(class.to_string()),
        }
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Bool(_) => TypeTag::Bool,
            Value::Str(_) => TypeTag::Str,
            Value::Pointer { .. } => TypeTag::Pointer,
            Value::Void => TypeTag::Void,
        }
    }

    pub fn is_null_pointer(&self) -> bool {
        matches!(self, Value::Pointer { obj: None, .. })
    }

    /// Decode a literal atom: integer, string, `true`, `false`, `null`.
    ///
    /// Returns `None` for anything else - the caller decides whether an
    /// unresolvable token is a name error or an undefined class.
    pub fn from_literal(ast: &Ast) -> Option<Value> {
        match ast {
            Ast::Int { value, .. } => Some(Value::Int(*value)),
            Ast::Str { text, .. } => Some(Value::Str(text.clone())),
            Ast::Sym { text, .. } => match text.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                "null" => Some(Value::null(None)),
                _ => None,
            },
            Ast::List { .. } => None,
        }
    }

    /// Rendering used by `print`: booleans as `true`/`false`, strings
    /// unquoted, `Void` as `None`, null pointers as `null`, objects by
    /// class name.
    pub fn display(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Str(s) => s.clone(),
            Value::Void => "None".to_string(),
            Value::Pointer { obj: None, .. } => "null".to_string(),
            Value::Pointer { obj: Some(obj), .. } => {
                format!("<object {}>", obj.borrow().class_name)
            }
        }
    }
}

/// Equality: primitives by value, pointers by identity (two nulls are equal).
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::Pointer { obj: a, .. }, Value::Pointer { obj: b, .. }) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_decoding() {
        assert_eq!(
            Value::from_literal(&Ast::Int { value: 7, line: 1 }),
            Some(Value::Int(7))
        );
        assert_eq!(
            Value::from_literal(&Ast::sym("true", 1)),
            Some(Value::Bool(true))
        );
        assert_eq!(
            Value::from_literal(&Ast::sym("null", 1)),
            Some(Value::null(None))
        );
        assert_eq!(Value::from_literal(&Ast::sym("x", 1)), None);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(Value::Int(-3).display(), "-3");
        assert_eq!(Value::Bool(true).display(), "true");
        assert_eq!(Value::Bool(false).display(), "false");
        assert_eq!(Value::Str("hi".into()).display(), "hi");
        assert_eq!(Value::Void.display(), "None");
        assert_eq!(Value::null(Some("Person")).display(), "null");
    }

    #[test]
    fn null_pointers_are_equal_regardless_of_declared_class() {
        assert_eq!(Value::null(Some("Person")), Value::null(Some("Student")));
    }
}
