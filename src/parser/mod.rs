//! Recursive-descent statement parser with a precedence-climbing
//! expression parser.
//!
//! The parser pulls tokens from a [`Lexer`] on demand and keeps a small
//! lookahead buffer; three tokens are enough to tell `name = function`
//! definitions from assignment expressions. Parsing stops at the first
//! error.

mod expr;
mod stmt;

use std::collections::VecDeque;
use std::fmt;

use crate::Error;
use crate::ast::Program;
use crate::lexer::Lexer;
use crate::token::{Keyword, Span, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token (or end of input, `found: None`) that cannot appear
    /// here.
    UnexpectedToken {
        found: Option<String>,
        expected: Vec<&'static str>,
    },
    /// Left side of `=` or a compound assignment is not an
    /// identifier, member access, or subscript.
    InvalidAssignmentTarget { target: &'static str },
    /// Operand of `delete` is not an identifier, member access, or
    /// subscript.
    InvalidDeleteTarget { target: &'static str },
    /// Nesting exceeded [`ParseOptions::max_depth`].
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                match found {
                    Some(t) => write!(f, "unexpected '{t}'")?,
                    None => write!(f, "unexpected end of input")?,
                }
                match expected.as_slice() {
                    [] => Ok(()),
                    [one] => write!(f, ", expected {one}"),
                    many => write!(f, ", expected one of: {}", many.join(", ")),
                }
            }
            Self::InvalidAssignmentTarget { target } => {
                write!(f, "invalid assignment target: {target}")
            }
            Self::InvalidDeleteTarget { target } => {
                write!(f, "invalid delete target: {target}")
            }
            Self::NestingTooDeep { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Nesting budget. It bounds the height of the resulting tree, so a
    /// long flat chain like `a + b + ...` or `a.b.c...` counts one level
    /// per operator. Descending into a block or subexpression costs
    /// two units, so the default admits 64 levels of parentheses.
    pub max_depth: usize,
}

impl ParseOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a microScript source string into a `Program`.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse(input: &str) -> Result<Program, Error> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse with explicit options.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Program, Error> {
    Parser::new(input, options).parse_program()
}

type PResult<T> = Result<T, Error>;

/// Depth units charged for each recursive descent of the parser.
const RECURSION_COST: usize = 2;

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,
    /// Span of the most recently consumed token.
    prev: Span,
    depth: usize,
    /// Height of the node most recently parsed, in tree levels.
    height: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, options: &ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(input),
            lookahead: VecDeque::with_capacity(3),
            prev: Span::default(),
            depth: 0,
            height: 0,
            max_depth: options.max_depth,
        }
    }

    fn parse_program(mut self) -> PResult<Program> {
        let mut statements = Vec::new();
        while self.peek_kind()?.is_some() {
            let stmt = self.parse_statement()?;
            log::trace!(
                "{} at line {}",
                stmt.kind.node_name(),
                stmt.span.line
            );
            statements.push(stmt);
        }

        let end = self.lexer.position();
        log::debug!(
            "parsed {} top-level statements ({} bytes)",
            statements.len(),
            end.end
        );

        Ok(Program {
            statements,
            span: Span {
                start: 0,
                end: end.end,
                line: 1,
                column: 1,
            },
        })
    }

    fn fill(&mut self, n: usize) -> PResult<()> {
        while self.lookahead.len() < n {
            match self.lexer.next_token()? {
                Some(token) => self.lookahead.push_back(token),
                None => break,
            }
        }
        Ok(())
    }

    fn peek_nth_kind(&mut self, n: usize) -> PResult<Option<TokenKind>> {
        self.fill(n + 1)?;
        Ok(self.lookahead.get(n).map(|t| t.kind))
    }

    fn peek_kind(&mut self) -> PResult<Option<TokenKind>> {
        self.peek_nth_kind(0)
    }

    fn at(&mut self, kind: TokenKind) -> PResult<bool> {
        Ok(self.peek_kind()? == Some(kind))
    }

    fn at_keyword(&mut self, keyword: Keyword) -> PResult<bool> {
        self.at(TokenKind::Keyword(keyword))
    }

    /// Span of the next token, or an empty span at end of input.
    fn peek_span(&mut self) -> PResult<Span> {
        self.fill(1)?;
        Ok(self
            .lookahead
            .front()
            .map_or_else(|| self.lexer.position(), |t| t.span))
    }

    fn bump(&mut self) -> PResult<Token> {
        self.fill(1)?;
        match self.lookahead.pop_front() {
            Some(token) => {
                self.prev = token.span;
                Ok(token)
            }
            None => Err(self.unexpected(&[])),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> PResult<Option<Token>> {
        if self.at(kind)? {
            self.bump().map(Some)
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind)? {
            self.bump()
        } else {
            Err(self.unexpected(&[kind.describe()]))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> PResult<Token> {
        self.expect(TokenKind::Keyword(keyword))
    }

    /// Error for the upcoming token. A lex error hit while looking
    /// ahead takes precedence.
    fn unexpected(&mut self, expected: &[&'static str]) -> Error {
        if let Err(err) = self.fill(1) {
            return err;
        }
        let (found, span) = match self.lookahead.front() {
            Some(t) => (Some(t.text.clone()), t.span),
            None => (None, self.lexer.position()),
        };
        ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                found,
                expected: expected.to_vec(),
            },
            span,
        }
        .into()
    }

    /// Run `f` one nesting level deeper, failing cleanly past the
    /// configured limit.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth + RECURSION_COST > self.max_depth {
            let span = self.peek_span()?;
            return Err(self.too_deep(span));
        }
        self.depth += RECURSION_COST;
        let result = f(self);
        self.depth -= RECURSION_COST;
        result
    }

    /// Record a node one level above children of height `children`.
    fn grow(&mut self, children: usize) -> PResult<()> {
        let height = children + 1;
        if height > self.max_depth {
            return Err(self.too_deep(self.prev));
        }
        self.height = height;
        Ok(())
    }

    fn too_deep(&self, span: Span) -> Error {
        ParseError {
            kind: ParseErrorKind::NestingTooDeep {
                limit: self.max_depth,
            },
            span,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, StmtKind};

    fn parse_err(input: &str) -> ParseError {
        match parse(input) {
            Err(Error::Parse(e)) => e,
            other => panic!("expected parse error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn empty_program() {
        let program = parse("  // nothing\n").expect("parse failed");
        assert!(program.statements.is_empty());
        assert_eq!(program.span.end, 13);
    }

    #[test]
    fn statements_need_no_separators() {
        let program = parse("a = 1 b = 2 print(a)").expect("parse failed");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn statement_spans() {
        let program = parse("local x = 1\nwhile x\n  x -= 1\nend").expect("parse failed");
        assert_eq!(program.statements[0].span.start, 0);
        assert_eq!(program.statements[0].span.end, 11);
        let while_span = program.statements[1].span;
        assert_eq!(while_span.line, 2);
        assert_eq!(while_span.end, 32);
    }

    #[test]
    fn call_spans_cover_parens() {
        let program = parse("f(1, 2)").expect("parse failed");
        let StmtKind::Expression(expr) = &program.statements[0].kind else {
            panic!("expected expression statement");
        };
        assert!(matches!(expr.kind, ExprKind::Call { .. }));
        assert_eq!((expr.span.start, expr.span.end), (0, 7));
    }

    #[test]
    fn missing_end() {
        let err = parse_err("while x\n  y()\n");
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedToken {
                found: None,
                expected: vec!["end"],
            }
        );
    }

    #[test]
    fn local_without_name() {
        let err = parse_err("local = 5");
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedToken { found: Some(ref t), .. } if t == "="
        ));
        assert_eq!(err.span.start, 6);
        assert_eq!(err.span.column, 7);
    }

    #[test]
    fn lex_error_surfaces_through_parser() {
        let err = parse("x = \"open").unwrap_err();
        assert!(matches!(err, Error::Lex(_)));
    }

    #[test]
    fn nesting_limit() {
        let options = ParseOptions::new().max_depth(8);
        let input = format!("x = {}1{}", "(".repeat(20), ")".repeat(20));
        let err = parse_with_options(&input, &options).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError {
                kind: ParseErrorKind::NestingTooDeep { limit: 8 },
                ..
            })
        ));
    }

    #[test]
    fn flat_chains_count_tree_height() {
        let options = ParseOptions::new().max_depth(10);
        assert!(parse_with_options("x = a + b + c", &options).is_ok());
        for input in ["x = a + b + c + d + e + f + g + h + i + j", "a.b.c.d.e.f.g.h.i.j"] {
            let err = parse_with_options(input, &options).unwrap_err();
            assert!(matches!(
                err,
                Error::Parse(ParseError {
                    kind: ParseErrorKind::NestingTooDeep { limit: 10 },
                    ..
                })
            ));
        }
    }

    #[test]
    fn display_lists_expected_tokens() {
        let err = parse_err("for i x end");
        assert_eq!(
            err.to_string(),
            "unexpected 'x', expected one of: =, in at line 1, column 7"
        );
    }
}
