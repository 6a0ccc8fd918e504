//! Pretty-printer that serializes a microScript AST back into
//! canonical source text.
//!
//! Produces tab-indented output, one statement per line, with a blank
//! line around function, class, and object definitions. Parentheses
//! are inserted wherever the tree's shape would otherwise be lost.

use std::fmt::Write as _;

use crate::ast::{
    BinaryOp, Conditional, Expr, ExprKind, Member, MemberKind, Name, NameOrigin, Param, Program,
    Schedule, Stmt, StmtKind, Target, UNARY_PRECEDENCE,
};
use crate::token::QuoteStyle;

/// Binding level of postfix operators and primaries.
const POSTFIX_PRECEDENCE: u8 = 10;
const PRIMARY_PRECEDENCE: u8 = 11;

/// Format a `Program` into canonical microScript source.
#[must_use]
pub fn format(program: &Program) -> String {
    let mut formatter = Formatter::default();
    formatter.statements(&program.statements);
    formatter.out
}

/// Format a single expression on one logical line.
#[must_use]
pub fn format_expr(expr: &Expr) -> String {
    let mut formatter = Formatter::default();
    formatter.expr(expr, 0);
    formatter.out
}

#[derive(Default)]
struct Formatter {
    out: String,
    indent: usize,
}

const fn is_definition(stmt: &Stmt) -> bool {
    matches!(
        stmt.kind,
        StmtKind::Function(_) | StmtKind::Class(_) | StmtKind::Object(_)
    )
}

impl Formatter {
    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn statements(&mut self, statements: &[Stmt]) {
        let mut prev_was_definition = false;
        for (i, stmt) in statements.iter().enumerate() {
            let definition = is_definition(stmt);
            if i > 0 && (definition || prev_was_definition) {
                self.out.push('\n');
            }
            self.push_indent();
            self.stmt(stmt);
            self.out.push('\n');
            prev_was_definition = definition;
        }
    }

    /// Indented statements followed by `end` at the current level.
    fn body_then_end(&mut self, body: &[Stmt]) {
        self.out.push('\n');
        self.indent += 1;
        self.statements(body);
        self.indent -= 1;
        self.push_indent();
        self.out.push_str("end");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Local { name, value } => {
                self.out.push_str("local ");
                self.out.push_str(&name.name);
                if let Some(value) = value {
                    self.out.push_str(" = ");
                    self.expr(value, 0);
                }
            }
            StmtKind::Function(def) => {
                self.out.push_str(&def.name.name);
                self.out.push_str(" = function");
                self.params(&def.params);
                self.body_then_end(&def.body);
            }
            StmtKind::Class(def) => {
                self.out.push_str(&def.name.name);
                self.out.push_str(" = class");
                if let Some(parent) = &def.parent {
                    self.out.push_str(" extends ");
                    self.out.push_str(&parent.name);
                }
                self.members(&def.members);
            }
            StmtKind::Object(def) => {
                self.out.push_str(&def.name.name);
                self.out.push_str(" = object");
                self.members(&def.members);
            }
            StmtKind::While { condition, body } => {
                self.out.push_str("while ");
                self.expr(condition, 0);
                self.body_then_end(body);
            }
            StmtKind::For {
                variable,
                start,
                end,
                step,
                body,
            } => {
                self.out.push_str("for ");
                self.out.push_str(&variable.name);
                self.out.push_str(" = ");
                self.expr(start, 0);
                self.out.push_str(" to ");
                self.expr(end, 0);
                if let Some(step) = step {
                    self.out.push_str(" by ");
                    self.expr(step, 0);
                }
                self.body_then_end(body);
            }
            StmtKind::ForIn {
                variable,
                iterable,
                body,
            } => {
                self.out.push_str("for ");
                self.out.push_str(&variable.name);
                self.out.push_str(" in ");
                self.expr(iterable, 0);
                self.body_then_end(body);
            }
            StmtKind::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value, 0);
                }
            }
            StmtKind::Break => self.out.push_str("break"),
            StmtKind::Continue => self.out.push_str("continue"),
            StmtKind::Delete(target) => {
                self.out.push_str("delete ");
                self.target(target);
            }
            StmtKind::Do(body) => {
                self.out.push_str("do");
                self.body_then_end(body);
            }
            StmtKind::After(schedule) => self.schedule("after", schedule),
            StmtKind::Every(schedule) => self.schedule("every", schedule),
            StmtKind::Sleep { duration, unit } => {
                self.out.push_str("sleep ");
                self.expr(duration, 0);
                if let Some(unit) = unit {
                    let _ = write!(self.out, " {unit}");
                }
            }
            StmtKind::Expression(expr) => self.expr(expr, 0),
        }
    }

    fn schedule(&mut self, keyword: &str, schedule: &Schedule) {
        self.out.push_str(keyword);
        self.out.push(' ');
        self.expr(&schedule.delay, 0);
        if let Some(unit) = schedule.unit {
            let _ = write!(self.out, " {unit}");
        }
        self.out.push_str(" do");
        self.body_then_end(&schedule.body);
    }

    fn members(&mut self, members: &[Member]) {
        self.out.push('\n');
        self.indent += 1;
        let mut prev_was_function = false;
        for (i, member) in members.iter().enumerate() {
            let function = !matches!(member.kind, MemberKind::Property { .. });
            if i > 0 && (function || prev_was_function) {
                self.out.push('\n');
            }
            self.push_indent();
            self.member(member);
            self.out.push('\n');
            prev_was_function = function;
        }
        self.indent -= 1;
        self.push_indent();
        self.out.push_str("end");
    }

    fn member(&mut self, member: &Member) {
        match &member.kind {
            MemberKind::Constructor { params, body } => {
                self.out.push_str("constructor = function");
                self.params(params);
                self.body_then_end(body);
            }
            MemberKind::Method { name, params, body } => {
                self.name(name);
                self.out.push_str(" = function");
                self.params(params);
                self.body_then_end(body);
            }
            MemberKind::Property { name, value } => {
                self.name(name);
                self.out.push_str(" = ");
                self.expr(value, 0);
            }
        }
    }

    fn name(&mut self, name: &Name) {
        match name.origin {
            NameOrigin::Identifier => self.out.push_str(&name.text),
            NameOrigin::Quoted(style) => push_string(&mut self.out, &name.text, style),
        }
    }

    fn params(&mut self, params: &[Param]) {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name.name);
            if let Some(default) = &param.default {
                self.out.push_str(" = ");
                self.expr(default, 0);
            }
        }
        self.out.push(')');
    }

    fn list(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item, 0);
        }
    }

    fn target(&mut self, target: &Target) {
        match target {
            Target::Identifier(ident) => self.out.push_str(&ident.name),
            Target::Member(m, _) => {
                self.member_object(&m.object);
                self.out.push('.');
                self.out.push_str(&m.property.name);
            }
            Target::Subscript(s, _) => {
                self.expr(&s.object, POSTFIX_PRECEDENCE);
                self.out.push('[');
                self.expr(&s.index, 0);
                self.out.push(']');
            }
        }
    }

    /// Write `expr`, parenthesized if it binds looser than
    /// `min_prec`.
    fn expr(&mut self, expr: &Expr, min_prec: u8) {
        let prec = precedence(&expr.kind);
        if prec < min_prec {
            self.out.push('(');
            self.expr(expr, 0);
            self.out.push(')');
            return;
        }

        match &expr.kind {
            ExprKind::Identifier(name) => self.out.push_str(name),
            ExprKind::Number(n) => self.out.push_str(&n.raw),
            ExprKind::Str(s) => push_string(&mut self.out, &s.value, s.style),
            ExprKind::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            ExprKind::This => self.out.push_str("this"),
            ExprKind::Super => self.out.push_str("super"),
            ExprKind::List(items) => {
                self.out.push('[');
                self.list(items);
                self.out.push(']');
            }
            ExprKind::Paren(inner) => {
                self.out.push('(');
                self.expr(inner, 0);
                self.out.push(')');
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.as_str());
                if matches!(op, crate::ast::UnaryOp::Not) {
                    self.out.push(' ');
                }
                self.expr(operand, UNARY_PRECEDENCE);
            }
            ExprKind::Binary { op, left, right } => {
                let (left_min, right_min) = operand_precedence(*op);
                self.expr(left, left_min);
                let _ = write!(self.out, " {op} ");
                self.expr(right, right_min);
            }
            ExprKind::Assign { target, op, value } => {
                self.target(target);
                let _ = write!(self.out, " {op} ");
                self.expr(value, 0);
            }
            ExprKind::Call { callee, args } => {
                // `new Foo` directly followed by `(` would absorb the
                // arguments.
                if matches!(callee.kind, ExprKind::New { args: None, .. }) {
                    self.out.push('(');
                    self.expr(callee, 0);
                    self.out.push(')');
                } else {
                    self.expr(callee, POSTFIX_PRECEDENCE);
                }
                self.out.push('(');
                self.list(args);
                self.out.push(')');
            }
            ExprKind::Member(m) => {
                self.member_object(&m.object);
                self.out.push('.');
                self.out.push_str(&m.property.name);
            }
            ExprKind::Subscript(s) => {
                self.expr(&s.object, POSTFIX_PRECEDENCE);
                self.out.push('[');
                self.expr(&s.index, 0);
                self.out.push(']');
            }
            ExprKind::New { class, args } => {
                self.out.push_str("new ");
                self.out.push_str(&class.name);
                if let Some(args) = args {
                    self.out.push('(');
                    self.list(args);
                    self.out.push(')');
                }
            }
            ExprKind::Function(f) => {
                self.out.push_str("function");
                self.params(&f.params);
                self.body_then_end(&f.body);
            }
            ExprKind::Conditional(c) => self.conditional(c),
        }
    }

    /// A number followed by `.` would lex as a decimal point.
    fn member_object(&mut self, object: &Expr) {
        if matches!(object.kind, ExprKind::Number(_)) {
            self.out.push('(');
            self.expr(object, 0);
            self.out.push(')');
        } else {
            self.expr(object, POSTFIX_PRECEDENCE);
        }
    }

    fn conditional(&mut self, c: &Conditional) {
        self.out.push_str("if ");
        self.expr(&c.condition, 0);
        self.out.push_str(" then");
        self.branch(&c.consequence);

        for clause in &c.elsif_clauses {
            self.push_indent();
            self.out.push_str("elsif ");
            self.expr(&clause.condition, 0);
            self.out.push_str(" then");
            self.branch(&clause.body);
        }

        if let Some(clause) = &c.else_clause {
            self.push_indent();
            self.out.push_str("else");
            self.branch(&clause.body);
        }

        self.push_indent();
        self.out.push_str("end");
    }

    fn branch(&mut self, body: &[Stmt]) {
        self.out.push('\n');
        self.indent += 1;
        self.statements(body);
        self.indent -= 1;
    }
}

fn precedence(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::Assign { .. } => 0,
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Unary { .. } => UNARY_PRECEDENCE,
        ExprKind::Call { .. } | ExprKind::Member(_) | ExprKind::Subscript(_) => POSTFIX_PRECEDENCE,
        _ => PRIMARY_PRECEDENCE,
    }
}

/// Minimum precedence for the left and right operands of `op`.
const fn operand_precedence(op: BinaryOp) -> (u8, u8) {
    let prec = op.precedence();
    if op.is_right_assoc() {
        (prec + 1, prec)
    } else {
        (prec, prec + 1)
    }
}

/// Write `value` as a string literal. Triple-quoted output falls back
/// to double quotes when the value cannot be written raw.
fn push_string(out: &mut String, value: &str, style: QuoteStyle) {
    let quote = match style {
        QuoteStyle::Triple if !value.contains("\"\"\"") && !value.ends_with('"') => {
            out.push_str("\"\"\"");
            out.push_str(value);
            out.push_str("\"\"\"");
            return;
        }
        QuoteStyle::Single => '\'',
        QuoteStyle::Double | QuoteStyle::Triple => '"',
    };

    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn reformat(input: &str) -> String {
        format(&parse(input).expect("parse failed"))
    }

    #[test]
    fn simple_statements() {
        assert_eq!(reformat("local   x=1\nprint( x )"), "local x = 1\nprint(x)\n");
    }

    #[test]
    fn empty_program() {
        assert_eq!(reformat("// only a comment"), "");
    }

    #[test]
    fn nested_blocks_use_tabs() {
        let input = "while a\n\tif b then\n\t\tbreak\n\tend\nend\n";
        assert_eq!(reformat(input), input);
    }

    #[test]
    fn definitions_are_separated_by_blank_lines() {
        let input = "x = 1\n\nf = function(a, b = 2)\n\treturn a + b\nend\n\ny = 2\n";
        assert_eq!(reformat(input), input);
    }

    #[test]
    fn class_members() {
        let input = "\
Point = class extends Base
\tx = 0
\ty = 0

\tconstructor = function(x, y)
\t\tthis.x = x
\tend

\t\"+\" = function(other)
\t\treturn new Point(this.x + other.x, this.y + other.y)
\tend
end
";
        assert_eq!(reformat(input), input);
    }

    #[test]
    fn conditional_expression_indentation() {
        let input = "local x = if a then\n\t1\nelsif b then\n\t2\nelse\n\t3\nend\n";
        assert_eq!(reformat(input), input);
    }

    #[test]
    fn keeps_parentheses_from_source() {
        assert_eq!(reformat("x = (1 + 2) * 3"), "x = (1 + 2) * 3\n");
    }

    #[test]
    fn inserts_parentheses_for_built_trees() {
        use crate::ast::{BinaryOp, Expr};
        let sum = Expr::binary(BinaryOp::Add, Expr::number(1.0), Expr::number(2.0));
        let product = Expr::binary(BinaryOp::Mul, sum, Expr::number(3.0));
        assert_eq!(format_expr(&product), "(1 + 2) * 3");

        let pow = Expr::binary(
            BinaryOp::Pow,
            Expr::binary(BinaryOp::Pow, Expr::ident("a"), Expr::ident("b")),
            Expr::ident("c"),
        );
        assert_eq!(format_expr(&pow), "(a ^ b) ^ c");
    }

    #[test]
    fn string_quoting_preserved() {
        assert_eq!(
            reformat("a = 'it\\'s'\nb = \"tab\\t\"\nc = \"\"\"raw \\n\"\"\""),
            "a = 'it\\'s'\nb = \"tab\\t\"\nc = \"\"\"raw \\n\"\"\"\n"
        );
    }

    #[test]
    fn triple_quote_fallback() {
        let mut out = String::new();
        push_string(&mut out, "ends with \"", QuoteStyle::Triple);
        assert_eq!(out, "\"ends with \\\"\"");
    }

    #[test]
    fn scheduling_blocks() {
        let input = "after 2 seconds do\n\tsleep 100\nend\nevery 1 second do\nend\n";
        assert_eq!(reformat(input), input);
    }

    #[test]
    fn new_without_args_then_call() {
        use crate::ast::{Expr, ExprKind, Ident};
        let new = Expr {
            kind: ExprKind::New {
                class: Ident {
                    name: "Foo".to_string(),
                    span: crate::token::Span::default(),
                },
                args: None,
            },
            span: crate::token::Span::default(),
        };
        let call = Expr::call(new, vec![Expr::number(1.0)]);
        assert_eq!(format_expr(&call), "(new Foo)(1)");
    }
}
