//! Logos lexer for Kava source text.

use logos::Logos;

/// Raw token from logos.
///
/// Newlines are real tokens (not skipped) so the reader can keep a running
/// line counter; `#` comments run to end of line and never consume the
/// newline itself.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub(crate) enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("\n")]
    Newline,

    #[regex(r"#[^\n]*")]
    Comment,

    /// Double-quoted string literal; no escape sequences, single line.
    #[regex(r#""[^"\n]*""#)]
    Str,

    /// Integer literal with optional leading minus.
    #[regex(r"-?[0-9]+", priority = 3)]
    Int,

    /// Any other atom: identifiers, keywords, operators, type tokens
    /// (including `Name@Arg` specializations).
    #[regex(r##"[^ \t\r\n()#"]+"##)]
    Sym,
}
