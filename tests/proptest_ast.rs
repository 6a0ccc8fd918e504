//! Property-based tests with proptest.
//!
//! Generate random ASTs, format them, parse them back, and verify the
//! round-trip produces a stable (idempotent) output with the same tree
//! shape.
//!
//! Shapes are compared with grouping parentheses removed: the
//! formatter inserts `( )` where precedence requires it, and those
//! come back from the parser as parenthesized expressions.

mod common;

use common::without_parens;
use microscript_syntax::tree::SyntaxNode;
use microscript_syntax::{
    AssignOp, BinaryOp, ClassDef, Expr, ExprKind, FunctionDef, Keyword, Name, ObjectDef, Param,
    Program, QuoteStyle, Stmt, StmtKind, StringLit, Target, TimeUnit, UnaryOp, format, parse,
    tokenize,
};
use proptest::prelude::*;

// -- Leaf strategies --

/// Identifier that is not a reserved word.
fn ident() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,7}".prop_filter("reserved word", |s| {
        Keyword::from_word(s).is_none() && s != "true" && s != "false"
    })
}

fn quote_style() -> impl Strategy<Value = QuoteStyle> {
    prop_oneof![
        Just(QuoteStyle::Double),
        Just(QuoteStyle::Single),
        Just(QuoteStyle::Triple),
    ]
}

/// String literal with quotes, backslashes, and control characters
/// mixed in.
fn string_lit() -> impl Strategy<Value = Expr> {
    ("[a-z0-9 .,'\"\\\\\n\t\u{1}-]{0,12}", quote_style()).prop_map(|(value, style)| Expr {
        kind: ExprKind::Str(StringLit { value, style }),
        span: Default::default(),
    })
}

fn leaf_expr() -> impl Strategy<Value = Expr> {
    prop_oneof![
        3 => ident().prop_map(|n| Expr::ident(&n)),
        3 => (0u32..100_000).prop_map(|n| Expr::number(f64::from(n))),
        2 => string_lit(),
        1 => any::<bool>().prop_map(Expr::boolean),
        1 => Just(Expr {
            kind: ExprKind::This,
            span: Default::default(),
        }),
    ]
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop::sample::select(vec![
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::LtEq,
        BinaryOp::GtEq,
        BinaryOp::BitOr,
        BinaryOp::BitAnd,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::Pow,
    ])
}

fn assign_op() -> impl Strategy<Value = AssignOp> {
    prop::sample::select(vec![
        AssignOp::Assign,
        AssignOp::Add,
        AssignOp::Sub,
        AssignOp::Mul,
        AssignOp::Div,
        AssignOp::Rem,
        AssignOp::BitAnd,
        AssignOp::BitOr,
    ])
}

fn time_unit() -> impl Strategy<Value = Option<TimeUnit>> {
    prop_oneof![
        2 => Just(None),
        1 => prop::sample::select(vec![
            TimeUnit::Second,
            TimeUnit::Seconds,
            TimeUnit::Millisecond,
            TimeUnit::Milliseconds,
        ])
        .prop_map(Some),
    ]
}

/// Expression at a given depth (limits recursion)
fn expr(depth: u32) -> BoxedStrategy<Expr> {
    if depth == 0 {
        return leaf_expr().boxed();
    }
    let sub = || expr(depth - 1);
    prop_oneof![
        4 => leaf_expr(),
        3 => (binary_op(), sub(), sub()).prop_map(|(op, l, r)| Expr::binary(op, l, r)),
        1 => (prop_oneof![Just(UnaryOp::Not), Just(UnaryOp::Neg)], sub())
            .prop_map(|(op, e)| Expr::unary(op, e)),
        1 => (sub(), prop::collection::vec(sub(), 0..=3))
            .prop_map(|(callee, args)| Expr::call(callee, args)),
        1 => (sub(), ident()).prop_map(|(object, prop)| Expr::member(object, &prop)),
        1 => (sub(), sub()).prop_map(|(object, index)| Expr::subscript(object, index)),
        1 => prop::collection::vec(sub(), 0..=3).prop_map(Expr::list),
        1 => sub().prop_map(Expr::paren),
        1 => (ident(), prop::collection::vec(sub(), 0..=2))
            .prop_map(|(class, args)| Expr::new_instance(&class, args)),
    ]
    .boxed()
}

/// Target rooted at an identifier so statements never start with `(`.
fn target() -> impl Strategy<Value = Target> {
    prop_oneof![
        2 => ident().prop_map(|n| Target::ident(&n)),
        1 => (ident(), ident()).prop_map(|(o, p)| Target::member(Expr::ident(&o), &p)),
        1 => (ident(), expr(1)).prop_map(|(o, i)| Target::subscript(Expr::ident(&o), i)),
    ]
}

fn params() -> impl Strategy<Value = Vec<Param>> {
    prop::collection::vec(
        (ident(), prop::option::of(expr(1))).prop_map(|(name, default)| {
            let param = Param::new(&name);
            match default {
                Some(value) => param.default_value(value),
                None => param,
            }
        }),
        0..=3,
    )
}

/// Statements that can appear anywhere in a block.
fn simple_stmt() -> impl Strategy<Value = Stmt> {
    prop_oneof![
        2 => (ident(), prop::option::of(expr(2))).prop_map(|(n, v)| Stmt::local(&n, v)),
        3 => (target(), assign_op(), expr(2))
            .prop_map(|(t, op, v)| Stmt::expr(Expr::assign(t, op, v))),
        2 => (ident(), prop::collection::vec(expr(2), 0..=3))
            .prop_map(|(f, args)| Stmt::expr(Expr::call(Expr::ident(&f), args))),
        1 => expr(2).prop_map(|e| Stmt::return_value(Some(e))),
        1 => Just(Stmt::break_loop()),
        1 => Just(Stmt::continue_loop()),
        1 => target().prop_map(Stmt::delete),
        1 => (expr(1), time_unit()).prop_map(|(d, u)| Stmt::sleep(d, u)),
    ]
}

/// Block body; a bare `return` is only valid as the last statement.
fn body(depth: u32) -> BoxedStrategy<Vec<Stmt>> {
    (prop::collection::vec(stmt(depth), 0..=3), any::<bool>())
        .prop_map(|(mut stmts, bare_return)| {
            if bare_return {
                stmts.push(Stmt::return_value(None));
            }
            stmts
        })
        .boxed()
}

/// Statement at a given depth (limits recursion)
fn stmt(depth: u32) -> BoxedStrategy<Stmt> {
    if depth == 0 {
        return simple_stmt().boxed();
    }
    let block = || body(depth - 1);
    prop_oneof![
        4 => simple_stmt(),
        1 => (expr(2), block()).prop_map(|(c, b)| Stmt::while_loop(c, b)),
        1 => (ident(), expr(1), expr(1), block())
            .prop_map(|(v, s, e, b)| Stmt::for_range(&v, s, e, b)),
        1 => (ident(), expr(1), block()).prop_map(|(v, i, b)| Stmt::for_in(&v, i, b)),
        1 => block().prop_map(Stmt::do_block),
        1 => (expr(1), time_unit(), block()).prop_map(|(d, u, b)| Stmt::after(d, u, b)),
        1 => (expr(1), time_unit(), block()).prop_map(|(d, u, b)| Stmt::every(d, u, b)),
        1 => (ident(), params(), block()).prop_map(|(name, params, b)| {
            let mut def = FunctionDef::new(&name);
            def.params = params;
            def.body = b;
            Stmt::from(def)
        }),
    ]
    .boxed()
}

fn class_def() -> impl Strategy<Value = Stmt> {
    (
        ident(),
        prop::option::of(ident()),
        prop::collection::vec((ident(), expr(1)), 0..=2),
        prop::collection::vec((params(), body(0)), 0..=2),
        prop::collection::vec((ident(), params(), body(0)), 0..=2),
    )
        .prop_map(|(name, parent, props, ctors, methods)| {
            let mut class = ClassDef::new(&name);
            if let Some(parent) = parent {
                class = class.extends(&parent);
            }
            for (prop, value) in props {
                class = class.property(&prop, value);
            }
            for (params, b) in ctors {
                class = class.constructor(params, b);
            }
            for (method, params, b) in methods {
                class = class.method(Name::ident(&method), params, b);
            }
            Stmt::from(class)
        })
}

fn object_def() -> impl Strategy<Value = Stmt> {
    (
        ident(),
        prop::collection::vec((ident(), expr(1)), 0..=2),
        prop::collection::vec(("[-+*/<>=]{1,2}", params(), body(0)), 0..=2),
    )
        .prop_map(|(name, props, operators)| {
            let mut object = ObjectDef::new(&name);
            for (prop, value) in props {
                object = object.property(&prop, value);
            }
            for (op, params, b) in operators {
                object = object.method(Name::quoted(&op), params, b);
            }
            Stmt::from(object)
        })
}

/// Full program
fn program() -> impl Strategy<Value = Program> {
    prop::collection::vec(
        prop_oneof![
            6 => stmt(2),
            1 => class_def(),
            1 => object_def(),
        ],
        0..=6,
    )
    .prop_map(|statements| {
        let mut program = Program::new();
        program.statements = statements;
        program
    })
}

fn shape(program: &Program) -> String {
    without_parens(&SyntaxNode::from(program)).to_sexp()
}

// -- Property tests --

proptest! {
    /// Formatting is idempotent: format(parse(format(x))) == format(x).
    /// This is the core round-trip property.
    #[test]
    fn format_idempotent(p in program()) {
        let r1 = format(&p);
        let parsed = parse(&r1)
            .map_err(|e| {
                TestCaseError::fail(
                    std::format!("parse error: {e}\n--- output ---\n{r1}"))
            })?;
        let r2 = format(&parsed);
        prop_assert_eq!(r1, r2);
    }

    /// Re-parsing formatted output gives back the same tree shape.
    #[test]
    fn tree_shape_preserved(p in program()) {
        let formatted = format(&p);
        let parsed = parse(&formatted).map_err(|e| {
            TestCaseError::fail(
                std::format!("parse error: {e}\n--- output ---\n{formatted}"))
        })?;
        prop_assert_eq!(shape(&p), shape(&parsed), "formatted:\n{}", formatted);
    }

    /// A formatted program never fails to tokenize.
    #[test]
    fn format_never_produces_lex_error(p in program()) {
        let formatted = format(&p);
        tokenize(&formatted).map_err(|e| {
            TestCaseError::fail(
                std::format!("lex error: {e}\n--- output ---\n{formatted}"))
        })?;
    }

    /// Top-level statement count survives the round-trip.
    #[test]
    fn statement_count_preserved(p in program()) {
        let formatted = format(&p);
        let parsed = parse(&formatted).unwrap();
        prop_assert_eq!(p.statements.len(), parsed.statements.len());
    }

    /// String values survive quoting and escaping.
    #[test]
    fn string_values_preserved(s in string_lit()) {
        let ExprKind::Str(original) = &s.kind else {
            unreachable!("string_lit builds strings");
        };
        let program = Program::new().statement(Stmt::local("s", Some(s.clone())));
        let parsed = parse(&format(&program)).unwrap();
        let StmtKind::Local { value: Some(value), .. } =
            &parsed.statements[0].kind
        else {
            panic!("expected local with value");
        };
        let ExprKind::Str(reparsed) = &value.kind else {
            panic!("expected string");
        };
        prop_assert_eq!(&original.value, &reparsed.value);
    }

    /// Arbitrary input never panics the parser.
    #[test]
    fn parse_never_panics(input in "[a-z0-9 =+\\-*/().,\\[\\]\"'\n]{0,64}") {
        let _ = parse(&input);
    }
}
