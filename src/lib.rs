//! microScript lexer, parser, AST, and formatter.
//!
//! A typed AST for the microScript scripting language with tools to
//! parse source text, build programs programmatically, format them
//! back to canonical source, and export a generic syntax tree.
//!
//! # Quick start
//!
//! ## Parse and re-format a program
//!
//! ```
//! use microscript_syntax::{format, parse};
//!
//! let input = "local total = 0\nfor i = 1 to 10\n\ttotal += i\nend\n";
//! let program = parse(input).unwrap();
//! assert_eq!(format(&program), input);
//! ```
//!
//! ## Inspect the tree
//!
//! ```
//! use microscript_syntax::{parse, tree::SyntaxNode};
//!
//! let program = parse("x = 1 + 2 * 3").unwrap();
//! let tree = SyntaxNode::from(&program);
//! assert_eq!(
//!     tree.to_sexp(),
//!     "(source_file (expression_statement (assignment_expression (identifier) \
//!      (binary_expression (number) (binary_expression (number) (number))))))"
//! );
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod tree;

pub use ast::{
    AssignOp, BinaryOp, ClassDef, Conditional, ElseClause, ElsifClause, Expr, ExprKind,
    FunctionDef, FunctionLit, Ident, Member, MemberExpr, MemberKind, Name, NameOrigin, NumberLit,
    ObjectDef, Param, Program, Schedule, Stmt, StmtKind, StringLit, SubscriptExpr, Target,
    TimeUnit, UnaryOp,
};
pub use formatter::format;
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use parser::{ParseError, ParseErrorKind, ParseOptions, parse, parse_with_options};
pub use token::{Keyword, Literal, QuoteStyle, Span, Token, TokenCategory, TokenKind};

/// Unified syntax error covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Lex(e) => e.span,
            Self::Parse(e) => e.span,
        }
    }

    /// Description without the location suffix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Lex(e) => e.kind.to_string(),
            Self::Parse(e) => e.kind.to_string(),
        }
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.span().line
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.span().column
    }

    /// Byte offset of the error in the source.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.span().start
    }
}
