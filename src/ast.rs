//! Typed syntax tree for microScript programs.
//!
//! Every node owns its children and carries the [`Span`] of the
//! source text it was parsed from. Nodes built by hand (see
//! [`crate::builder`]) use `Span::default()`.

use std::fmt;

use crate::token::{QuoteStyle, Span};

/// Root node: the ordered top-level statements of one source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A statement with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `local name [= value]`
    Local { name: Ident, value: Option<Expr> },
    /// `name = function(params) ... end`
    Function(FunctionDef),
    /// `name = class [extends parent] ... end`
    Class(ClassDef),
    /// `name = object ... end`
    Object(ObjectDef),
    /// `while condition ... end`
    While { condition: Expr, body: Vec<Stmt> },
    /// `for var = start to end [by step] ... end`
    For {
        variable: Ident,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    /// `for var in iterable ... end`
    ForIn {
        variable: Ident,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    /// `delete target`
    Delete(Target),
    /// `do ... end`
    Do(Vec<Stmt>),
    /// `after delay [unit] do ... end`
    After(Schedule),
    /// `every interval [unit] do ... end`
    Every(Schedule),
    /// `sleep duration [unit]`
    Sleep {
        duration: Expr,
        unit: Option<TimeUnit>,
    },
    Expression(Expr),
}

/// Shared shape of `after` and `every` blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub delay: Expr,
    pub unit: Option<TimeUnit>,
    pub body: Vec<Stmt>,
}

impl Schedule {
    /// Unit the delay is measured in, applying the default.
    #[must_use]
    pub fn effective_unit(&self) -> TimeUnit {
        self.unit.unwrap_or(TimeUnit::DEFAULT)
    }
}

/// Time unit keyword following `after`, `every`, or `sleep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Second,
    Seconds,
    Millisecond,
    Milliseconds,
}

impl TimeUnit {
    /// Unit assumed when the source omits one.
    pub const DEFAULT: Self = Self::Milliseconds;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Seconds => "seconds",
            Self::Millisecond => "millisecond",
            Self::Milliseconds => "milliseconds",
        }
    }

    /// Number of milliseconds in one unit.
    #[must_use]
    pub const fn millis(self) -> u32 {
        match self {
            Self::Second | Self::Seconds => 1000,
            Self::Millisecond | Self::Milliseconds => 1,
        }
    }
}

/// An identifier with its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Class or object member name: a bare identifier or a quoted
/// string such as `"+"` for operator overloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub text: String,
    pub origin: NameOrigin,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrigin {
    Identifier,
    Quoted(QuoteStyle),
}

/// Function parameter: `name [= default]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Named function definition statement.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: Ident,
    pub parent: Option<Ident>,
    pub members: Vec<Member>,
}

impl ClassDef {
    /// Constructor members in source order. The grammar does not
    /// limit how many a class declares.
    pub fn constructors(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| matches!(m.kind, MemberKind::Constructor { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDef {
    pub name: Ident,
    pub members: Vec<Member>,
}

/// Entry of a class or object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// `constructor = function(params) ... end`
    Constructor { params: Vec<Param>, body: Vec<Stmt> },
    /// `name = function(params) ... end`
    Method {
        name: Name,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    /// `name = value`
    Property { name: Name, value: Expr },
}

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    Number(NumberLit),
    Str(StringLit),
    Boolean(bool),
    This,
    Super,
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `( inner )`
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        target: Target,
        op: AssignOp,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member(MemberExpr),
    Subscript(SubscriptExpr),
    /// `new Class [(args)]`; `args` is `None` without parentheses.
    New {
        class: Ident,
        args: Option<Vec<Expr>>,
    },
    Function(FunctionLit),
    Conditional(Conditional),
}

/// Number literal, keeping the source spelling for re-emission.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLit {
    pub value: f64,
    pub raw: String,
}

/// Decoded string literal and the quotes it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    pub value: String,
    pub style: QuoteStyle,
}

/// `object.property`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: Ident,
}

/// `object[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
}

/// Anonymous `function(params) ... end` value.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// `if c then ... {elsif c then ...} [else ...] end` used as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Box<Expr>,
    pub consequence: Vec<Stmt>,
    pub elsif_clauses: Vec<ElsifClause>,
    pub else_clause: Option<ElseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElsifClause {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Left-hand side of an assignment or operand of `delete`. Member and
/// subscript targets keep the span of the expression they were parsed
/// from, closing `]` included.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Identifier(Ident),
    Member(MemberExpr, Span),
    Subscript(SubscriptExpr, Span),
}

impl Target {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Identifier(Ident { span, .. })
            | Self::Member(_, span)
            | Self::Subscript(_, span) => *span,
        }
    }
}

impl TryFrom<Expr> for Target {
    type Error = Expr;

    /// Convert an expression into an assignable target, handing the
    /// expression back when it is not identifier, member, or
    /// subscript access.
    fn try_from(expr: Expr) -> Result<Self, Self::Error> {
        match expr.kind {
            ExprKind::Identifier(name) => Ok(Self::Identifier(Ident {
                name,
                span: expr.span,
            })),
            ExprKind::Member(m) => Ok(Self::Member(m, expr.span)),
            ExprKind::Subscript(s) => Ok(Self::Subscript(s, expr.span)),
            kind => Err(Expr {
                kind,
                span: expr.span,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    BitOr,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Binding power of unary `not` and `-`.
pub const UNARY_PRECEDENCE: u8 = 9;

impl BinaryOp {
    /// Precedence level, 1 (`or`) through 8 (`^`).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq => 3,
            Self::BitOr | Self::BitAnd => 4,
            Self::Shl | Self::Shr => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Rem => 7,
            Self::Pow => 8,
        }
    }

    #[must_use]
    pub const fn is_right_assoc(self) -> bool {
        matches!(self, Self::Pow)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::BitOr => "|",
            Self::BitAnd => "&",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
}

impl AssignOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Rem => "%=",
            Self::BitAnd => "&=",
            Self::BitOr => "|=",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExprKind {
    /// Node name used in diagnostics and the generic syntax tree.
    #[must_use]
    pub const fn node_name(&self) -> &'static str {
        match self {
            Self::Identifier(_) => "identifier",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::This => "this",
            Self::Super => "super",
            Self::List(_) => "list_literal",
            Self::Paren(_) => "parenthesized_expression",
            Self::Unary { .. } => "unary_expression",
            Self::Binary { .. } => "binary_expression",
            Self::Assign { .. } => "assignment_expression",
            Self::Call { .. } => "call_expression",
            Self::Member(_) => "member_expression",
            Self::Subscript(_) => "subscript_expression",
            Self::New { .. } => "new_expression",
            Self::Function(_) => "anonymous_function",
            Self::Conditional(_) => "conditional_expression",
        }
    }
}

impl StmtKind {
    #[must_use]
    pub const fn node_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "variable_declaration",
            Self::Function(_) => "function_definition",
            Self::Class(_) => "class_definition",
            Self::Object(_) => "object_definition",
            Self::While { .. } => "while_statement",
            Self::For { .. } => "for_statement",
            Self::ForIn { .. } => "for_in_statement",
            Self::Return(_) => "return_statement",
            Self::Break => "break_statement",
            Self::Continue => "continue_statement",
            Self::Delete(_) => "delete_statement",
            Self::Do(_) => "do_block",
            Self::After(_) => "after_block",
            Self::Every(_) => "every_block",
            Self::Sleep { .. } => "sleep_statement",
            Self::Expression(_) => "expression_statement",
        }
    }
}
