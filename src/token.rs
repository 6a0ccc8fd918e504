use std::fmt;

use serde::Serialize;

/// Source location for error reporting.
///
/// `start` and `end` are byte offsets (end exclusive); `line` and
/// `column` are 1-based and point at `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Span covering `self` through the end of `other`.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Reserved words. `true` and `false` are not here: they lex as
/// [`TokenKind::Boolean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Local,
    Function,
    End,
    Class,
    Object,
    While,
    For,
    To,
    By,
    In,
    Return,
    Break,
    Continue,
    Delete,
    Do,
    After,
    Every,
    Sleep,
    If,
    Then,
    Elsif,
    Else,
    Extends,
    Constructor,
    New,
    This,
    Super,
    Not,
    And,
    Or,
    Second,
    Seconds,
    Millisecond,
    Milliseconds,
}

impl Keyword {
    /// Look up a word matched by the identifier rule.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "local" => Self::Local,
            "function" => Self::Function,
            "end" => Self::End,
            "class" => Self::Class,
            "object" => Self::Object,
            "while" => Self::While,
            "for" => Self::For,
            "to" => Self::To,
            "by" => Self::By,
            "in" => Self::In,
            "return" => Self::Return,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "delete" => Self::Delete,
            "do" => Self::Do,
            "after" => Self::After,
            "every" => Self::Every,
            "sleep" => Self::Sleep,
            "if" => Self::If,
            "then" => Self::Then,
            "elsif" => Self::Elsif,
            "else" => Self::Else,
            "extends" => Self::Extends,
            "constructor" => Self::Constructor,
            "new" => Self::New,
            "this" => Self::This,
            "super" => Self::Super,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "second" => Self::Second,
            "seconds" => Self::Seconds,
            "millisecond" => Self::Millisecond,
            "milliseconds" => Self::Milliseconds,
            _ => return None,
        };
        Some(kw)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Function => "function",
            Self::End => "end",
            Self::Class => "class",
            Self::Object => "object",
            Self::While => "while",
            Self::For => "for",
            Self::To => "to",
            Self::By => "by",
            Self::In => "in",
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Delete => "delete",
            Self::Do => "do",
            Self::After => "after",
            Self::Every => "every",
            Self::Sleep => "sleep",
            Self::If => "if",
            Self::Then => "then",
            Self::Elsif => "elsif",
            Self::Else => "else",
            Self::Extends => "extends",
            Self::Constructor => "constructor",
            Self::New => "new",
            Self::This => "this",
            Self::Super => "super",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Second => "second",
            Self::Seconds => "seconds",
            Self::Millisecond => "millisecond",
            Self::Milliseconds => "milliseconds",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quoting style of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `"..."`
    Double,
    /// `'...'`
    Single,
    /// `"""..."""`, raw and multi-line.
    Triple,
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword(Keyword),
    Number,
    String(QuoteStyle),
    /// `true` or `false`.
    Boolean,
    /// Only produced when the lexer keeps comments.
    Comment,

    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Arithmetic and bitwise
    Pipe,
    Amp,
    Shl,
    Shr,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

/// Coarse classification of a token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Number,
    String,
    Operator,
    Punctuation,
    Boolean,
    Comment,
}

impl TokenKind {
    #[must_use]
    pub const fn category(self) -> TokenCategory {
        match self {
            Self::Identifier => TokenCategory::Identifier,
            Self::Keyword(_) => TokenCategory::Keyword,
            Self::Number => TokenCategory::Number,
            Self::String(_) => TokenCategory::String,
            Self::Boolean => TokenCategory::Boolean,
            Self::Comment => TokenCategory::Comment,
            Self::LParen
            | Self::RParen
            | Self::LBracket
            | Self::RBracket
            | Self::Comma
            | Self::Dot => TokenCategory::Punctuation,
            _ => TokenCategory::Operator,
        }
    }

    /// Short description used in "expected ..." diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Keyword(kw) => kw.as_str(),
            Self::Number => "number",
            Self::String(_) => "string",
            Self::Boolean => "boolean",
            Self::Comment => "comment",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
            Self::AmpAssign => "&=",
            Self::PipeAssign => "|=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Pipe => "|",
            Self::Amp => "&",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Dot => ".",
        }
    }
}

/// Decoded value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Boolean(bool),
}

/// A single token with its kind, source text, decoded value, and
/// location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source lexeme, quotes included for strings.
    pub text: String,
    pub value: Option<Literal>,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}
