use crate::ast::{
    AssignOp, BinaryOp, ClassDef, Expr, ExprKind, FunctionDef, FunctionLit, Ident, Member,
    MemberExpr, MemberKind, Name, NameOrigin, NumberLit, ObjectDef, Param, Program, Schedule,
    Stmt, StmtKind, StringLit, SubscriptExpr, Target, TimeUnit, UnaryOp,
};
use crate::token::{Keyword, QuoteStyle, Span};

impl Program {
    /// Create a new empty program.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
            span: Span {
                start: 0,
                end: 0,
                line: 1,
                column: 1,
            },
        }
    }

    /// Append a top-level statement.
    #[must_use]
    pub fn statement(mut self, stmt: Stmt) -> Self {
        self.statements.push(stmt);
        self
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Ident {
    /// The name is printed verbatim. One that fails [`Ident::is_valid`],
    /// such as the reserved word `by`, formats to source that does not
    /// parse back.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            span: Span::default(),
        }
    }

    /// Whether `name` lexes as a single identifier: ASCII letters,
    /// digits and `_`, not starting with a digit, and neither a keyword
    /// nor a boolean literal.
    #[must_use]
    pub fn is_valid(name: &str) -> bool {
        let mut bytes = name.bytes();
        let starts_word = bytes
            .next()
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_');
        starts_word
            && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
            && !matches!(name, "true" | "false")
            && Keyword::from_word(name).is_none()
    }
}

impl Name {
    /// A member name written as a bare identifier.
    #[must_use]
    pub fn ident(text: &str) -> Self {
        Self {
            text: text.to_string(),
            origin: NameOrigin::Identifier,
            span: Span::default(),
        }
    }

    /// A member name written as a double-quoted string, e.g. `"+"`.
    #[must_use]
    pub fn quoted(text: &str) -> Self {
        Self {
            text: text.to_string(),
            origin: NameOrigin::Quoted(QuoteStyle::Double),
            span: Span::default(),
        }
    }
}

impl Param {
    /// Parameter without a default. `name` is taken as is, see
    /// [`Ident::new`].
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::new(name),
            default: None,
            span: Span::default(),
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn default_value(mut self, value: Expr) -> Self {
        self.default = Some(value);
        self
    }
}

impl Stmt {
    const fn of(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span {
                start: 0,
                end: 0,
                line: 0,
                column: 0,
            },
        }
    }

    /// `local name [= value]`
    #[must_use]
    pub fn local(name: &str, value: Option<Expr>) -> Self {
        Self::of(StmtKind::Local {
            name: Ident::new(name),
            value,
        })
    }

    /// An expression used as a statement.
    #[must_use]
    pub const fn expr(expr: Expr) -> Self {
        Self::of(StmtKind::Expression(expr))
    }

    #[must_use]
    pub const fn while_loop(condition: Expr, body: Vec<Self>) -> Self {
        Self::of(StmtKind::While { condition, body })
    }

    /// `for variable = start to end ... end`
    #[must_use]
    pub fn for_range(variable: &str, start: Expr, end: Expr, body: Vec<Self>) -> Self {
        Self::of(StmtKind::For {
            variable: Ident::new(variable),
            start,
            end,
            step: None,
            body,
        })
    }

    #[must_use]
    pub fn for_in(variable: &str, iterable: Expr, body: Vec<Self>) -> Self {
        Self::of(StmtKind::ForIn {
            variable: Ident::new(variable),
            iterable,
            body,
        })
    }

    #[must_use]
    pub const fn return_value(value: Option<Expr>) -> Self {
        Self::of(StmtKind::Return(value))
    }

    #[must_use]
    pub const fn break_loop() -> Self {
        Self::of(StmtKind::Break)
    }

    #[must_use]
    pub const fn continue_loop() -> Self {
        Self::of(StmtKind::Continue)
    }

    #[must_use]
    pub const fn delete(target: Target) -> Self {
        Self::of(StmtKind::Delete(target))
    }

    #[must_use]
    pub const fn do_block(body: Vec<Self>) -> Self {
        Self::of(StmtKind::Do(body))
    }

    /// `after delay [unit] do ... end`
    #[must_use]
    pub const fn after(delay: Expr, unit: Option<TimeUnit>, body: Vec<Self>) -> Self {
        Self::of(StmtKind::After(Schedule { delay, unit, body }))
    }

    /// `every interval [unit] do ... end`
    #[must_use]
    pub const fn every(interval: Expr, unit: Option<TimeUnit>, body: Vec<Self>) -> Self {
        Self::of(StmtKind::Every(Schedule {
            delay: interval,
            unit,
            body,
        }))
    }

    #[must_use]
    pub const fn sleep(duration: Expr, unit: Option<TimeUnit>) -> Self {
        Self::of(StmtKind::Sleep { duration, unit })
    }
}

impl From<FunctionDef> for Stmt {
    fn from(def: FunctionDef) -> Self {
        Self::of(StmtKind::Function(def))
    }
}

impl From<ClassDef> for Stmt {
    fn from(def: ClassDef) -> Self {
        Self::of(StmtKind::Class(def))
    }
}

impl From<ObjectDef> for Stmt {
    fn from(def: ObjectDef) -> Self {
        Self::of(StmtKind::Object(def))
    }
}

impl FunctionDef {
    /// Create a function definition with no parameters and an empty
    /// body.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::new(name),
            params: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Append a body statement.
    #[must_use]
    pub fn statement(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }
}

impl ClassDef {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::new(name),
            parent: None,
            members: Vec::new(),
        }
    }

    /// Set the parent class.
    #[must_use]
    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(Ident::new(parent));
        self
    }

    #[must_use]
    pub fn constructor(mut self, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        self.members
            .push(member(MemberKind::Constructor { params, body }));
        self
    }

    #[must_use]
    pub fn method(mut self, name: Name, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        self.members
            .push(member(MemberKind::Method { name, params, body }));
        self
    }

    #[must_use]
    pub fn property(mut self, name: &str, value: Expr) -> Self {
        self.members.push(member(MemberKind::Property {
            name: Name::ident(name),
            value,
        }));
        self
    }
}

impl ObjectDef {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::new(name),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, name: Name, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        self.members
            .push(member(MemberKind::Method { name, params, body }));
        self
    }

    #[must_use]
    pub fn property(mut self, name: &str, value: Expr) -> Self {
        self.members.push(member(MemberKind::Property {
            name: Name::ident(name),
            value,
        }));
        self
    }
}

fn member(kind: MemberKind) -> Member {
    Member {
        kind,
        span: Span::default(),
    }
}

impl Target {
    /// A plain variable target.
    #[must_use]
    pub fn ident(name: &str) -> Self {
        Self::Identifier(Ident::new(name))
    }

    /// `object.property`
    #[must_use]
    pub fn member(object: Expr, property: &str) -> Self {
        Self::Member(
            MemberExpr {
                object: Box::new(object),
                property: Ident::new(property),
            },
            Span::default(),
        )
    }

    /// `object[index]`
    #[must_use]
    pub fn subscript(object: Expr, index: Expr) -> Self {
        Self::Subscript(
            SubscriptExpr {
                object: Box::new(object),
                index: Box::new(index),
            },
            Span::default(),
        )
    }
}

impl Expr {
    const fn of(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span {
                start: 0,
                end: 0,
                line: 0,
                column: 0,
            },
        }
    }

    #[must_use]
    pub fn ident(name: &str) -> Self {
        Self::of(ExprKind::Identifier(name.to_string()))
    }

    /// A non-negative number literal; negate with [`Expr::unary`].
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::of(ExprKind::Number(NumberLit {
            value,
            raw: value.to_string(),
        }))
    }

    /// A double-quoted string literal.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Self::of(ExprKind::Str(StringLit {
            value: value.to_string(),
            style: QuoteStyle::Double,
        }))
    }

    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::of(ExprKind::Boolean(value))
    }

    #[must_use]
    pub const fn list(items: Vec<Self>) -> Self {
        Self::of(ExprKind::List(items))
    }

    #[must_use]
    pub fn paren(inner: Self) -> Self {
        Self::of(ExprKind::Paren(Box::new(inner)))
    }

    #[must_use]
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::of(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    #[must_use]
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::of(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `target op value`
    #[must_use]
    pub fn assign(target: Target, op: AssignOp, value: Self) -> Self {
        Self::of(ExprKind::Assign {
            target,
            op,
            value: Box::new(value),
        })
    }

    #[must_use]
    pub fn call(callee: Self, args: Vec<Self>) -> Self {
        Self::of(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// `object.property`
    #[must_use]
    pub fn member(object: Self, property: &str) -> Self {
        Self::of(ExprKind::Member(MemberExpr {
            object: Box::new(object),
            property: Ident::new(property),
        }))
    }

    /// `object[index]`
    #[must_use]
    pub fn subscript(object: Self, index: Self) -> Self {
        Self::of(ExprKind::Subscript(SubscriptExpr {
            object: Box::new(object),
            index: Box::new(index),
        }))
    }

    /// `new class(args)`
    #[must_use]
    pub fn new_instance(class: &str, args: Vec<Self>) -> Self {
        Self::of(ExprKind::New {
            class: Ident::new(class),
            args: Some(args),
        })
    }

    /// Anonymous `function(params) ... end`.
    #[must_use]
    pub const fn function(params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Self::of(ExprKind::Function(FunctionLit { params, body }))
    }
}
