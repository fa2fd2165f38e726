//! Recursive reader building [`Ast`] forms from the token stream.

use logos::Logos;
use thiserror::Error;

use crate::lexer::RawToken;
use crate::MAX_NESTING_DEPTH;
use kava_ir::Ast;

/// Failure to read a program into S-expression forms.
///
/// The evaluator's driver maps any of these to its `Syntax` fault category;
/// the variants exist so the CLI and tests can point at the offending line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unexpected `)`")]
    UnexpectedClose { line: u32 },
    #[error("line {line}: unclosed `(`")]
    UnclosedList { line: u32 },
    #[error("line {line}: unreadable token (unterminated string?)")]
    BadToken { line: u32 },
    #[error("line {line}: integer literal out of range")]
    IntOutOfRange { line: u32 },
    #[error("line {line}: forms nested deeper than {max}")]
    TooDeep { line: u32, max: usize },
    #[error("top-level atom `{text}` outside any form at line {line}")]
    StrayAtom { text: String, line: u32 },
}

/// A lexed atom or bracket with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open(u32),
    Close(u32),
    Atom(Ast),
}

/// Parse a whole program: a sequence of top-level `(class ...)` /
/// `(tclass ...)` forms.
///
/// The reader itself does not know about class syntax; it only insists that
/// the top level contains lists, since a bare atom at top level can never be
/// a valid form.
pub fn parse_program(source: &str) -> Result<Vec<Ast>, ParseError> {
    let tokens = tokenize(source)?;
    let mut forms = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        match &tokens[pos] {
            Token::Open(_) => {
                let (form, next) = read_list(&tokens, pos, 0)?;
                forms.push(form);
                pos = next;
            }
            Token::Close(line) => return Err(ParseError::UnexpectedClose { line: *line }),
            Token::Atom(ast) => {
                return Err(ParseError::StrayAtom {
                    text: ast.to_string(),
                    line: ast.line(),
                })
            }
        }
    }
    Ok(forms)
}

/// Lex the source, attaching line numbers and decoding literal atoms.
fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lex = RawToken::lexer(source);
    let mut line: u32 = 1;
    let mut tokens = Vec::new();
    while let Some(raw) = lex.next() {
        let raw = raw.map_err(|()| ParseError::BadToken { line })?;
        match raw {
            RawToken::Newline => line += 1,
            RawToken::Comment => {}
            RawToken::LParen => tokens.push(Token::Open(line)),
            RawToken::RParen => tokens.push(Token::Close(line)),
            RawToken::Str => {
                let text = lex.slice();
                // Strip the surrounding quotes kept by the lexer regex.
                let inner = &text[1..text.len() - 1];
                tokens.push(Token::Atom(Ast::Str {
                    text: inner.to_string(),
                    line,
                }));
            }
            RawToken::Int => {
                let value: i64 = lex
                    .slice()
                    .parse()
                    .map_err(|_| ParseError::IntOutOfRange { line })?;
                tokens.push(Token::Atom(Ast::Int { value, line }));
            }
            RawToken::Sym => tokens.push(Token::Atom(Ast::sym(lex.slice(), line))),
        }
    }
    Ok(tokens)
}

/// Read one list starting at `pos` (which must be `Token::Open`).
///
/// Returns the list and the index just past its closing paren.
fn read_list(tokens: &[Token], pos: usize, depth: usize) -> Result<(Ast, usize), ParseError> {
    let Token::Open(open_line) = tokens[pos] else {
        unreachable!("read_list called off an opening paren");
    };
    if depth >= MAX_NESTING_DEPTH {
        return Err(ParseError::TooDeep {
            line: open_line,
            max: MAX_NESTING_DEPTH,
        });
    }
    let mut items = Vec::new();
    let mut cursor = pos + 1;
    while cursor < tokens.len() {
        match &tokens[cursor] {
            Token::Close(_) => {
                return Ok((Ast::list(items, open_line), cursor + 1));
            }
            Token::Open(_) => {
                let (inner, next) = read_list(tokens, cursor, depth + 1)?;
                items.push(inner);
                cursor = next;
            }
            Token::Atom(ast) => {
                items.push(ast.clone());
                cursor += 1;
            }
        }
    }
    Err(ParseError::UnclosedList { line: open_line })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_small_class() {
        let src = "(class main\n  (method void main () (print \"hi\"))\n)";
        let forms = parse_program(src).unwrap();
        assert_eq!(forms.len(), 1);
        assert!(forms[0].is_form("class"));
        let items = forms[0].items().unwrap();
        assert_eq!(items[1].as_sym(), Some("main"));
    }

    #[test]
    fn tracks_line_numbers_across_comments() {
        let src = "# header\n(class main\n  (field int x 0)\n)";
        let forms = parse_program(src).unwrap();
        assert_eq!(forms[0].line(), 2);
        let field = &forms[0].items().unwrap()[2];
        assert_eq!(field.line(), 3);
    }

    #[test]
    fn unbalanced_open_is_reported_at_its_line() {
        let err = parse_program("(class main\n  (method void main ()\n").unwrap_err();
        assert_eq!(err, ParseError::UnclosedList { line: 2 });
    }

    #[test]
    fn stray_close_is_an_error() {
        assert_eq!(
            parse_program(")").unwrap_err(),
            ParseError::UnexpectedClose { line: 1 }
        );
    }

    #[test]
    fn top_level_atom_is_an_error() {
        assert!(matches!(
            parse_program("class").unwrap_err(),
            ParseError::StrayAtom { .. }
        ));
    }

    #[test]
    fn negative_ints_and_strings_decode() {
        let forms = parse_program("(f -12 \"a b\")").unwrap();
        let items = forms[0].items().unwrap();
        assert_eq!(items[1], Ast::Int { value: -12, line: 1 });
        assert_eq!(
            items[2],
            Ast::Str {
                text: "a b".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut src = String::new();
        for _ in 0..(MAX_NESTING_DEPTH + 2) {
            src.push('(');
        }
        src.push('x');
        for _ in 0..(MAX_NESTING_DEPTH + 2) {
            src.push(')');
        }
        assert!(matches!(
            parse_program(&src).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
    }

    #[test]
    fn multiple_top_level_forms() {
        let forms = parse_program("(class a)\n(class b)").unwrap();
        assert_eq!(forms.len(), 2);
    }
}
