//! AST nodes for parsed S-expression programs.

use std::fmt;

/// One node of a parsed program.
///
/// Integer and string literals are classified by the lexer; every other atom
/// stays a [`Ast::Sym`] and is interpreted in context by the evaluator
/// (`true`, `null`, class names, variable names, operators). Template
/// expansion deep-clones and rewrites `Sym` nodes only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ast {
    /// A bare symbol: identifier, keyword, operator, or type token.
    Sym { text: String, line: u32 },
    /// A double-quoted string literal (quotes already stripped).
    Str { text: String, line: u32 },
    /// An integer literal.
    Int { value: i64, line: u32 },
    /// A parenthesized list of nodes.
    List { items: Vec<Ast>, line: u32 },
}

impl Ast {
    /// Source line this node starts on (1-based).
    pub fn line(&self) -> u32 {
        match self {
            Ast::Sym { line, .. }
            | Ast::Str { line, .. }
            | Ast::Int { line, .. }
            | Ast::List { line, .. } => *line,
        }
    }

    /// Symbol text, if this node is a symbol.
    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Ast::Sym { text, .. } => Some(text),
            _ => None,
        }
    }

    /// List items, if this node is a list.
    pub fn items(&self) -> Option<&[Ast]> {
        match self {
            Ast::List { items, .. } => Some(items),
            _ => None,
        }
    }

    /// The leading symbol of a list, used for statement dispatch.
    pub fn head_sym(&self) -> Option<&str> {
        self.items()?.first()?.as_sym()
    }

    /// True if this node is a list whose head is the given symbol.
    pub fn is_form(&self, head: &str) -> bool {
        self.head_sym() == Some(head)
    }

    /// Convenience constructor for a symbol node.
    pub fn sym(text: impl Into<String>, line: u32) -> Self {
        Ast::Sym {
            text: text.into(),
            line,
        }
    }

    /// Convenience constructor for a list node.
    pub fn list(items: Vec<Ast>, line: u32) -> Self {
        Ast::List { items, line }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Sym { text, .. } => write!(f, "{text}"),
            Ast::Str { text, .. } => write!(f, "\"{text}\""),
            Ast::Int { value, .. } => write!(f, "{value}"),
            Ast::List { items, .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}
