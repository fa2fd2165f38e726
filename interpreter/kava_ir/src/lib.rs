//! Kava IR - the parsed program representation.
//!
//! A Kava program is a sequence of parenthesized forms. The parser produces
//! nested [`Ast`] lists and the evaluator consumes nothing else; there is no
//! later lowering pass. Atoms keep their 1-based source line for error
//! messages.

mod ast;

pub use ast::Ast;
