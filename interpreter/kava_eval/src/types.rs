//! Type tags, the name-to-type registry, and the inheritance graph.
//!
//! `is_subtype` is the single source of truth for assignability and for
//! covariant overload matching; nothing else walks the parent links.

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Semantic tag of a runtime value or declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Bool,
    Str,
    Void,
    Pointer,
}

impl TypeTag {
    /// Human-readable name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::Str => "string",
            TypeTag::Void => "void",
            TypeTag::Pointer => "object",
        }
    }
}

/// Maps type name tokens to tags and holds the class parent graph.
///
/// Primitive keywords are registered at construction; class names (including
/// specialized template names) are added as the program is discovered and as
/// specializations are expanded. Init-once, read-many: nothing is ever
/// removed or re-registered.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    tags: FxHashMap<String, TypeTag>,
    parent: FxHashMap<String, Option<String>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut tags = FxHashMap::default();
        tags.insert("int".to_string(), TypeTag::Int);
        tags.insert("string".to_string(), TypeTag::Str);
        tags.insert("bool".to_string(), TypeTag::Bool);
        tags.insert("void".to_string(), TypeTag::Void);
        TypeRegistry {
            tags,
            parent: FxHashMap::default(),
        }
    }

    /// Register a class (or template specialization) name.
    pub fn register_class(&mut self, name: &str, parent: Option<&str>) {
        self.tags.insert(name.to_string(), TypeTag::Pointer);
        self.parent
            .insert(name.to_string(), parent.map(str::to_string));
    }

    /// Tag for a type name token, if registered.
    pub fn tag_of(&self, name: &str) -> Option<TypeTag> {
        self.tags.get(name).copied()
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.tag_of(name) == Some(TypeTag::Pointer)
    }

    /// True if `derived` may stand where `base` is declared.
    ///
    /// `derived == None` is the null sentinel, compatible with any base. An
    /// unregistered or parentless `derived` that is not `base` itself is
    /// incompatible. Terminates because the class graph is acyclic (a class
    /// cannot declare itself as its own ancestor - assumed precondition).
    pub fn is_subtype(&self, base: &str, derived: Option<&str>) -> bool {
        let Some(derived) = derived else {
            return true;
        };
        if derived == base {
            return true;
        }
        match self.parent.get(derived) {
            Some(Some(p)) => self.is_subtype(base, Some(p)),
            _ => false,
        }
    }

    /// The zero value of a declared type: `0`, `false`, `""`, null, `Void`.
    ///
    /// Pointer zeros are tagged with the declared class. `None` for
    /// unregistered names.
    pub fn zero_value(&self, type_name: &str) -> Option<Value> {
        Some(match self.tag_of(type_name)? {
            TypeTag::Int => Value::Int(0),
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Str => Value::Str(String::new()),
            TypeTag::Void => Value::Void,
            TypeTag::Pointer => Value::null(Some(type_name)),
        })
    }
}
