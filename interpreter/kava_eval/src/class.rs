//! Static class descriptions, template expansion, and instantiation.
//!
//! A `ClassDef` is built once per distinct class name when the program is
//! discovered (or once per template specialization on first use) and is
//! immutable behind `Rc` thereafter. Instantiation copies field and method
//! declarations into a fresh `ObjectInstance`, recursively instantiating the
//! superclass chain - inheritance is composition: a derived instance owns a
//! wholly separate base instance.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use kava_ir::Ast;

use crate::errors::{self, Fatal};
use crate::method::{Method, Param, ParamTag, TypeSig};
use crate::object::ObjectInstance;
use crate::session::Session;
use crate::types::TypeTag;
use crate::value::{ObjRef, Value};

/// Separator in specialized template names (`node@int`, `Pair@string@bool`).
pub const SPECIALIZATION_SEP: char = '@';

/// An ordered field declaration.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub type_name: String,
    pub name: String,
    /// Literal initializer form, if present.
    pub init: Option<Ast>,
    pub line: u32,
}

/// An ordered method declaration (unresolved; types are checked when the
/// class is instantiated, by which time every class in the program is known).
#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub return_type: String,
    pub name: String,
    pub params: Vec<(String, String)>,
    pub body: Ast,
    pub line: u32,
}

/// Static description of one class.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: String,
    pub super_class: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub line: u32,
}

/// An unexpanded template class: formal type parameter names plus the raw
/// member forms, deep-copied and substituted per specialization.
#[derive(Clone, Debug)]
pub struct TemplateDef {
    pub name: String,
    pub formals: Vec<String>,
    pub members: Vec<Ast>,
    pub line: u32,
}

impl ClassDef {
    /// Parse `(class Name [inherits Parent] members...)`.
    pub fn from_form(form: &Ast) -> Fatal<ClassDef> {
        let line = form.line();
        let items = form.items().ok_or_else(|| errors::malformed_class(line))?;
        let name = items
            .get(1)
            .and_then(Ast::as_sym)
            .ok_or_else(|| errors::malformed_class(line))?;
        ClassDef::from_members(name, &items[2..], line)
    }

    /// Parse the member forms of a class body, shared with template
    /// specialization (which synthesizes the member list itself).
    pub fn from_members(name: &str, mut members: &[Ast], line: u32) -> Fatal<ClassDef> {
        let mut super_class = None;
        if members.first().and_then(Ast::as_sym) == Some("inherits") {
            let parent = members
                .get(1)
                .and_then(Ast::as_sym)
                .ok_or_else(|| errors::malformed_class(line))?;
            super_class = Some(parent.to_string());
            members = &members[2..];
        }

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for member in members {
            let member_line = member.line();
            let items = member
                .items()
                .ok_or_else(|| errors::malformed_class(member_line))?;
            match member.head_sym() {
                Some("field") => {
                    // (field Type name [init])
                    if items.len() < 3 || items.len() > 4 {
                        return Err(errors::malformed_class(member_line));
                    }
                    let type_name = items[1]
                        .as_sym()
                        .ok_or_else(|| errors::malformed_class(member_line))?;
                    let field_name = items[2]
                        .as_sym()
                        .ok_or_else(|| errors::malformed_class(member_line))?;
                    fields.push(FieldDecl {
                        type_name: type_name.to_string(),
                        name: field_name.to_string(),
                        init: items.get(3).cloned(),
                        line: member_line,
                    });
                }
                Some("method") => {
                    // (method RetType name ((Type name)...) body)
                    if items.len() != 5 {
                        return Err(errors::malformed_class(member_line));
                    }
                    let return_type = items[1]
                        .as_sym()
                        .ok_or_else(|| errors::malformed_class(member_line))?;
                    let method_name = items[2]
                        .as_sym()
                        .ok_or_else(|| errors::malformed_class(member_line))?;
                    let param_forms = items[3]
                        .items()
                        .ok_or_else(|| errors::malformed_class(member_line))?;
                    let mut params = Vec::new();
                    for pair in param_forms {
                        let pair_items = pair
                            .items()
                            .ok_or_else(|| errors::malformed_class(member_line))?;
                        let (Some(ty), Some(pname)) = (
                            pair_items.first().and_then(Ast::as_sym),
                            pair_items.get(1).and_then(Ast::as_sym),
                        ) else {
                            return Err(errors::malformed_class(member_line));
                        };
                        params.push((ty.to_string(), pname.to_string()));
                    }
                    methods.push(MethodDecl {
                        return_type: return_type.to_string(),
                        name: method_name.to_string(),
                        params,
                        body: items[4].clone(),
                        line: member_line,
                    });
                }
                _ => return Err(errors::malformed_class(member_line)),
            }
        }

        // Field and method names share one namespace within a class body.
        let mut seen: FxHashMap<String, ()> = FxHashMap::default();
        for field in &fields {
            if seen.insert(field.name.clone(), ()).is_some() {
                return Err(errors::duplicate_member(name, &field.name, field.line));
            }
        }
        for method in &methods {
            if seen.insert(method.name.clone(), ()).is_some() {
                return Err(errors::duplicate_member(name, &method.name, method.line));
            }
        }

        Ok(ClassDef {
            name: name.to_string(),
            super_class,
            fields,
            methods,
            line,
        })
    }
}

impl TemplateDef {
    /// Parse `(tclass Name (TypeParam...) members...)`.
    pub fn from_form(form: &Ast) -> Fatal<TemplateDef> {
        let line = form.line();
        let items = form.items().ok_or_else(|| errors::malformed_class(line))?;
        let name = items
            .get(1)
            .and_then(Ast::as_sym)
            .ok_or_else(|| errors::malformed_class(line))?;
        let formal_forms = items
            .get(2)
            .and_then(Ast::items)
            .ok_or_else(|| errors::malformed_class(line))?;
        let mut formals = Vec::new();
        for formal in formal_forms {
            let text = formal
                .as_sym()
                .ok_or_else(|| errors::malformed_class(line))?;
            formals.push(text.to_string());
        }
        Ok(TemplateDef {
            name: name.to_string(),
            formals,
            members: items[3..].to_vec(),
            line,
        })
    }
}

/// The template name of a specialization token (`node@int` -> `node`), or
/// the token itself when it has no arguments.
pub fn template_head(token: &str) -> &str {
    token.split(SPECIALIZATION_SEP).next().unwrap_or(token)
}

/// Resolve a declared type token to its tag, expanding and registering a
/// template specialization on first use. Unknown tokens are a type fault.
pub fn ensure_type(session: &mut Session, token: &str, line: u32) -> Fatal<TypeTag> {
    if let Some(tag) = session.types.tag_of(token) {
        return Ok(tag);
    }
    if token.contains(SPECIALIZATION_SEP)
        && session.templates.contains_key(template_head(token))
    {
        specialize(session, token, line)?;
        return Ok(TypeTag::Pointer);
    }
    Err(errors::unknown_type(token, line))
}

/// Expand `Template@Arg...` into an ordinary registered `ClassDef`.
///
/// Memoized: repeated use of the same specialization token returns the same
/// `Rc<ClassDef>`. This is syntactic monomorphization - each specialization
/// is a fully independent class with its own field and method identity.
pub fn specialize(session: &mut Session, full_name: &str, line: u32) -> Fatal<Rc<ClassDef>> {
    if let Some(existing) = session.classes.get(full_name) {
        return Ok(existing.clone());
    }

    let mut parts = full_name.split(SPECIALIZATION_SEP);
    let head = parts.next().unwrap_or(full_name);
    let actuals: Vec<String> = parts.map(str::to_string).collect();

    let Some(template) = session.templates.get(head).cloned() else {
        return Err(errors::unknown_type(full_name, line));
    };
    if actuals.is_empty() || actuals.len() != template.formals.len() {
        return Err(errors::template_arity(head, line));
    }
    for actual in &actuals {
        if session.types.tag_of(actual).is_none() {
            return Err(errors::template_arg_unknown(actual, line));
        }
    }

    debug!(template = head, specialization = full_name, "expanding template");

    let mut members = template.members.clone();
    for member in &mut members {
        substitute(member, &template.formals, &actuals, session);
    }
    let def = Rc::new(ClassDef::from_members(full_name, &members, template.line)?);

    session
        .types
        .register_class(full_name, def.super_class.as_deref());
    session.classes.insert(full_name.to_string(), def.clone());
    Ok(def)
}

/// Textually substitute formal type parameters through a deep-copied member
/// AST. Whole symbols are replaced outright; compound type tokens whose head
/// is a template name (`List@T`) are rewritten segment-wise
/// (`List@T -> List@int`).
fn substitute(ast: &mut Ast, formals: &[String], actuals: &[String], session: &Session) {
    match ast {
        Ast::List { items, .. } => {
            for item in items {
                substitute(item, formals, actuals, session);
            }
        }
        Ast::Sym { text, .. } => {
            for (formal, actual) in formals.iter().zip(actuals.iter()) {
                if *text == *formal {
                    *text = actual.clone();
                } else if text.contains(SPECIALIZATION_SEP)
                    && session.templates.contains_key(template_head(text))
                {
                    let rewritten: Vec<&str> = text
                        .split(SPECIALIZATION_SEP)
                        .map(|seg| if seg == formal { actual.as_str() } else { seg })
                        .collect();
                    *text = rewritten.join("@");
                }
            }
        }
        Ast::Str { .. } | Ast::Int { .. } => {}
    }
}

/// Create an object instance from a class definition.
///
/// Recursively instantiates the superclass, then copies field declarations
/// (evaluating literal initializers or supplying the type's zero value) and
/// method declarations into the fresh instance. Registry mutation after this
/// point cannot affect the instance.
pub fn instantiate(session: &mut Session, def: &Rc<ClassDef>) -> Fatal<ObjRef> {
    debug!(class = %def.name, "instantiating");

    let super_instance = match &def.super_class {
        Some(parent) => {
            let parent_def = session
                .classes
                .get(parent)
                .cloned()
                .ok_or_else(|| errors::base_class_missing(parent, def.line))?;
            Some(instantiate(session, &parent_def)?)
        }
        None => None,
    };

    let mut fields = FxHashMap::default();
    for field in &def.fields {
        let tag = ensure_type(session, &field.type_name, field.line)?;
        let value = match &field.init {
            Some(init) => {
                let value = Value::from_literal(init)
                    .ok_or_else(|| errors::invalid_field_init(&field.name, field.line))?;
                if value.tag() != tag {
                    return Err(errors::invalid_field_init(&field.name, field.line));
                }
                match value {
                    // The only pointer literal is null; tag it with the
                    // declared class.
                    Value::Pointer { .. } => Value::null(Some(&field.type_name)),
                    other => other,
                }
            }
            None => session
                .types
                .zero_value(&field.type_name)
                .ok_or_else(|| errors::unknown_type(&field.type_name, field.line))?,
        };
        fields.insert(field.name.clone(), value);
    }

    let mut methods = FxHashMap::default();
    for decl in &def.methods {
        let method = resolve_method_decl(session, decl)?;
        methods.insert(decl.name.clone(), Rc::new(method));
    }

    Ok(Rc::new(RefCell::new(ObjectInstance {
        class_name: def.name.clone(),
        fields,
        methods,
        super_instance,
        scopes: Vec::new(),
        frames: Vec::new(),
        exception: None,
    })))
}

/// Resolve a method declaration's types and precompute its signature.
fn resolve_method_decl(session: &mut Session, decl: &MethodDecl) -> Fatal<Method> {
    let return_tag = ensure_type(session, &decl.return_type, decl.line)?;

    let mut params = Vec::new();
    let mut signature = TypeSig::new();
    for (type_name, name) in &decl.params {
        let tag = ensure_type(session, type_name, decl.line)?;
        let param_tag = match tag {
            TypeTag::Int => ParamTag::Int,
            TypeTag::Bool => ParamTag::Bool,
            TypeTag::Str => ParamTag::Str,
            TypeTag::Pointer => ParamTag::Pointer {
                class: type_name.clone(),
            },
            // `void` is not a parameter type.
            TypeTag::Void => return Err(errors::unknown_type(type_name, decl.line)),
        };
        if params.iter().any(|p: &Param| &p.name == name) {
            return Err(errors::duplicate_formal(name, decl.line));
        }
        signature.push(param_tag);
        params.push(Param {
            type_name: type_name.clone(),
            name: name.clone(),
        });
    }

    Ok(Method {
        name: decl.name.clone(),
        return_type: decl.return_type.clone(),
        return_tag,
        params,
        signature,
        body: decl.body.clone(),
        line: decl.line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kava_parse::parse_program;

    fn first_form(src: &str) -> Ast {
        parse_program(src).unwrap().remove(0)
    }

    #[test]
    fn parses_class_with_inheritance() {
        let def = ClassDef::from_form(&first_form(
            "(class Student inherits Person (field int year 1) (method void greet () (print \"hi\")))",
        ))
        .unwrap();
        assert_eq!(def.name, "Student");
        assert_eq!(def.super_class.as_deref(), Some("Person"));
        assert_eq!(def.fields.len(), 1);
        assert_eq!(def.methods.len(), 1);
        assert_eq!(def.methods[0].name, "greet");
    }

    #[test]
    fn duplicate_member_names_are_rejected() {
        let err = ClassDef::from_form(&first_form(
            "(class c (field int x) (method void x () (print 1)))",
        ))
        .unwrap_err();
        assert_eq!(err.kind, crate::errors::FaultKind::Name);
    }

    #[test]
    fn parses_template_formals() {
        let def = TemplateDef::from_form(&first_form(
            "(tclass pair (a_type b_type) (field a_type first) (field b_type second))",
        ))
        .unwrap();
        assert_eq!(def.formals, vec!["a_type", "b_type"]);
        assert_eq!(def.members.len(), 2);
    }

    #[test]
    fn template_head_splits_specialization_tokens() {
        assert_eq!(template_head("node@int"), "node");
        assert_eq!(template_head("pair@string@bool"), "pair");
        assert_eq!(template_head("plain"), "plain");
    }
}
