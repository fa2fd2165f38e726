//! Callable method descriptions and type signatures.

use smallvec::SmallVec;

use kava_ir::Ast;

use crate::types::{TypeRegistry, TypeTag};

/// One component of a method's declared signature.
///
/// Class-typed parameters carry their class name so overload resolution can
/// match exactly (by name) or covariantly (via `is_subtype`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamTag {
    Int,
    Bool,
    Str,
    Pointer { class: String },
}

/// One component of an actual argument signature.
///
/// Pointers keep both the static class of the argument's binding site and
/// the runtime class of the referenced object (`None` for null). Exact
/// matching uses the static class; covariant matching uses the runtime one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgTag {
    Int,
    Bool,
    Str,
    /// A void value can never satisfy any parameter.
    Void,
    Pointer {
        declared: Option<String>,
        runtime: Option<String>,
    },
}

pub type TypeSig = SmallVec<[ParamTag; 4]>;
pub type ArgSig = SmallVec<[ArgTag; 4]>;

/// A formal parameter: declared type token and name.
#[derive(Clone, Debug)]
pub struct Param {
    pub type_name: String,
    pub name: String,
}

/// A callable unit copied into object instances at instantiation time.
/// Immutable after construction.
#[derive(Clone, Debug)]
pub struct Method {
    pub name: String,
    /// Declared return type token (`int`, a class name, `void`, ...).
    pub return_type: String,
    pub return_tag: TypeTag,
    pub params: Vec<Param>,
    /// Precomputed from the parameter list at definition time.
    pub signature: TypeSig,
    pub body: Ast,
    pub line: u32,
}

impl Method {
    /// Component-wise exact signature match: primitive tags equal, pointer
    /// components equal by static class name.
    pub fn matches_exact(&self, args: &ArgSig) -> bool {
        if self.signature.len() != args.len() {
            return false;
        }
        self.signature.iter().zip(args.iter()).all(|(p, a)| match (p, a) {
            (ParamTag::Int, ArgTag::Int)
            | (ParamTag::Bool, ArgTag::Bool)
            | (ParamTag::Str, ArgTag::Str) => true,
            (ParamTag::Pointer { class }, ArgTag::Pointer { declared, .. }) => {
                declared.as_deref() == Some(class.as_str())
            }
            _ => false,
        })
    }

    /// Arity-equal covariant match: primitives exact, each declared pointer
    /// class a supertype-or-equal of the argument's runtime class (null
    /// arguments are compatible with anything).
    pub fn matches_covariant(&self, args: &ArgSig, types: &TypeRegistry) -> bool {
        if self.signature.len() != args.len() {
            return false;
        }
        self.signature.iter().zip(args.iter()).all(|(p, a)| match (p, a) {
            (ParamTag::Int, ArgTag::Int)
            | (ParamTag::Bool, ArgTag::Bool)
            | (ParamTag::Str, ArgTag::Str) => true,
            (ParamTag::Pointer { class }, ArgTag::Pointer { runtime, .. }) => {
                types.is_subtype(class, runtime.as_deref())
            }
            _ => false,
        })
    }
}
