#![allow(dead_code)]

use microscript_syntax::tree::SyntaxNode;
use microscript_syntax::{Error, Expr, Program, StmtKind, format, parse};

pub fn parse_ok(input: &str) -> Program {
    parse(input).unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

pub fn parse_err(input: &str) -> Error {
    match parse(input) {
        Ok(program) => panic!("expected an error for {input:?}, got {program:?}"),
        Err(e) => e,
    }
}

/// The expression of a single-statement program.
pub fn expr(input: &str) -> Expr {
    let program = parse_ok(input);
    assert_eq!(program.statements.len(), 1, "expected one statement");
    match program.statements.into_iter().next().map(|s| s.kind) {
        Some(StmtKind::Expression(expr)) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

pub fn sexp(input: &str) -> String {
    SyntaxNode::from(&parse_ok(input)).to_sexp()
}

pub fn roundtrip(input: &str) {
    let output = format(&parse_ok(input));
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Drop grouping parentheses, which the formatter adds where the
/// tree's shape requires them.
pub fn without_parens(node: &SyntaxNode) -> SyntaxNode {
    if node.kind == "parenthesized_expression" && node.children.len() == 1 {
        return without_parens(&node.children[0]);
    }
    SyntaxNode {
        children: node.children.iter().map(without_parens).collect(),
        ..node.clone()
    }
}

/// Helper: format an AST, parse it back, assert the tree shape and
/// the formatted text are stable.
pub fn assert_ast_roundtrip(original: &Program) {
    let formatted = format(original);
    let parsed = parse(&formatted).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    });

    assert_eq!(
        without_parens(&SyntaxNode::from(original)).to_sexp(),
        without_parens(&SyntaxNode::from(&parsed)).to_sexp(),
        "tree shape mismatch\n--- formatted ---\n{formatted}"
    );
    assert_eq!(
        formatted,
        format(&parsed),
        "formatting not idempotent\n--- formatted ---\n{formatted}"
    );
}
