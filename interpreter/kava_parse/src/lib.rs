//! Kava parser - source text to S-expression AST.
//!
//! The reader is deliberately small: a logos lexer over parentheses, atoms,
//! string literals and `#` line comments, and a recursive reader that builds
//! [`kava_ir::Ast`] lists. The evaluator consumes the tree and nothing else;
//! all semantic classification of symbols (keywords, class names, variables)
//! happens there.

mod lexer;
mod reader;

pub use reader::{parse_program, ParseError};

/// Maximum list nesting the reader will accept.
///
/// Deeply nested input otherwise recurses without bound; real programs stay
/// far below this.
pub const MAX_NESTING_DEPTH: usize = 64;
