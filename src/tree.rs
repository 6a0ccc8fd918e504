//! Generic syntax tree encoding.
//!
//! [`SyntaxNode`] flattens the typed AST into uniform
//! `kind`/`text`/`span`/`children` records named after the language
//! grammar's node types (`source_file`, `binary_expression`,
//! `method_definition`, ...). Keywords and punctuation are not
//! represented; operator spellings are kept in `text`.
//!
//! The encoding serializes with serde, and [`SyntaxNode::to_sexp`]
//! prints its shape as an S-expression.

use serde::Serialize;

use crate::ast::{
    Conditional, Expr, ExprKind, Member, MemberKind, Name, NameOrigin, Param, Program, Stmt,
    StmtKind, Target, TimeUnit,
};
use crate::token::Span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub kind: &'static str,
    /// Leaf text (identifier name, number spelling, decoded string)
    /// or the operator of an operator expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl SyntaxNode {
    fn leaf(kind: &'static str, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            span,
            children: Vec::new(),
        }
    }

    const fn branch(kind: &'static str, span: Span, children: Vec<Self>) -> Self {
        Self {
            kind,
            text: None,
            span,
            children,
        }
    }

    fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Render as an S-expression of node kinds, e.g.
    /// `(source_file (expression_statement (identifier)))`.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind);
        for child in &self.children {
            out.push(' ');
            child.write_sexp(out);
        }
        out.push(')');
    }

    /// Depth-first iterator over this node and its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

impl From<&Program> for SyntaxNode {
    fn from(program: &Program) -> Self {
        Self::branch("source_file", program.span, statements(&program.statements))
    }
}

impl From<&Stmt> for SyntaxNode {
    fn from(stmt: &Stmt) -> Self {
        let kind = stmt.kind.node_name();
        let span = stmt.span;
        let children = match &stmt.kind {
            StmtKind::Local { name, value } => {
                let mut children = vec![Self::leaf("identifier", &name.name, name.span)];
                children.extend(value.as_ref().map(Self::from));
                children
            }
            StmtKind::Function(def) => {
                let mut children = vec![Self::leaf("identifier", &def.name.name, def.name.span)];
                children.extend(parameter_list(&def.params));
                children.extend(statements(&def.body));
                children
            }
            StmtKind::Class(def) => {
                let mut children = vec![Self::leaf("identifier", &def.name.name, def.name.span)];
                children.extend(
                    def.parent
                        .iter()
                        .map(|p| Self::leaf("identifier", &p.name, p.span)),
                );
                children.extend(def.members.iter().map(Self::from));
                children
            }
            StmtKind::Object(def) => {
                let mut children = vec![Self::leaf("identifier", &def.name.name, def.name.span)];
                children.extend(def.members.iter().map(Self::from));
                children
            }
            StmtKind::While { condition, body } => {
                let mut children = vec![Self::from(condition)];
                children.extend(statements(body));
                children
            }
            StmtKind::For {
                variable,
                start,
                end,
                step,
                body,
            } => {
                let mut children = vec![
                    Self::leaf("identifier", &variable.name, variable.span),
                    Self::from(start),
                    Self::from(end),
                ];
                children.extend(step.as_ref().map(Self::from));
                children.extend(statements(body));
                children
            }
            StmtKind::ForIn {
                variable,
                iterable,
                body,
            } => {
                let mut children = vec![
                    Self::leaf("identifier", &variable.name, variable.span),
                    Self::from(iterable),
                ];
                children.extend(statements(body));
                children
            }
            StmtKind::Return(value) => value.iter().map(Self::from).collect(),
            StmtKind::Break | StmtKind::Continue => Vec::new(),
            StmtKind::Delete(target) => vec![Self::from(target)],
            StmtKind::Do(body) => statements(body),
            StmtKind::After(schedule) | StmtKind::Every(schedule) => {
                let mut children = vec![Self::from(&schedule.delay)];
                children.extend(schedule.unit.map(|u| time_unit(u, span)));
                children.extend(statements(&schedule.body));
                children
            }
            StmtKind::Sleep { duration, unit } => {
                let mut children = vec![Self::from(duration)];
                children.extend(unit.map(|u| time_unit(u, span)));
                children
            }
            StmtKind::Expression(expr) => vec![Self::from(expr)],
        };
        Self::branch(kind, span, children)
    }
}

impl From<&Member> for SyntaxNode {
    fn from(member: &Member) -> Self {
        let span = member.span;
        match &member.kind {
            MemberKind::Constructor { params, body } => {
                let mut children: Vec<Self> = parameter_list(params).into_iter().collect();
                children.extend(statements(body));
                Self::branch("constructor_definition", span, children)
            }
            MemberKind::Method { name, params, body } => {
                let mut children = vec![member_name(name)];
                children.extend(parameter_list(params));
                children.extend(statements(body));
                Self::branch("method_definition", span, children)
            }
            MemberKind::Property { name, value } => Self::branch(
                "property_assignment",
                span,
                vec![member_name(name), Self::from(value)],
            ),
        }
    }
}

impl From<&Target> for SyntaxNode {
    fn from(target: &Target) -> Self {
        match target {
            Target::Identifier(ident) => Self::leaf("identifier", &ident.name, ident.span),
            Target::Member(m, span) => Self::branch(
                "member_expression",
                *span,
                vec![
                    Self::from(m.object.as_ref()),
                    Self::leaf("identifier", &m.property.name, m.property.span),
                ],
            ),
            Target::Subscript(s, span) => Self::branch(
                "subscript_expression",
                *span,
                vec![Self::from(s.object.as_ref()), Self::from(s.index.as_ref())],
            ),
        }
    }
}

impl From<&Expr> for SyntaxNode {
    fn from(expr: &Expr) -> Self {
        let kind = expr.kind.node_name();
        let span = expr.span;
        match &expr.kind {
            ExprKind::Identifier(name) => Self::leaf(kind, name, span),
            ExprKind::Number(n) => Self::leaf(kind, &n.raw, span),
            ExprKind::Str(s) => Self::leaf(kind, &s.value, span),
            ExprKind::Boolean(b) => Self::leaf(kind, b.to_string(), span),
            ExprKind::This | ExprKind::Super => Self::branch(kind, span, Vec::new()),
            ExprKind::List(items) => Self::branch(kind, span, items.iter().map(Self::from).collect()),
            ExprKind::Paren(inner) => Self::branch(kind, span, vec![Self::from(inner.as_ref())]),
            ExprKind::Unary { op, operand } => {
                Self::branch(kind, span, vec![Self::from(operand.as_ref())]).with_text(op.as_str())
            }
            ExprKind::Binary { op, left, right } => Self::branch(
                kind,
                span,
                vec![Self::from(left.as_ref()), Self::from(right.as_ref())],
            )
            .with_text(op.as_str()),
            ExprKind::Assign { target, op, value } => Self::branch(
                kind,
                span,
                vec![Self::from(target), Self::from(value.as_ref())],
            )
            .with_text(op.as_str()),
            ExprKind::Call { callee, args } => {
                let mut children = vec![Self::from(callee.as_ref())];
                children.extend(argument_list(args));
                Self::branch(kind, span, children)
            }
            ExprKind::Member(m) => Self::branch(
                kind,
                span,
                vec![
                    Self::from(m.object.as_ref()),
                    Self::leaf("identifier", &m.property.name, m.property.span),
                ],
            ),
            ExprKind::Subscript(s) => Self::branch(
                kind,
                span,
                vec![Self::from(s.object.as_ref()), Self::from(s.index.as_ref())],
            ),
            ExprKind::New { class, args } => {
                let mut children = vec![Self::leaf("identifier", &class.name, class.span)];
                if let Some(args) = args {
                    children.extend(argument_list(args));
                }
                Self::branch(kind, span, children)
            }
            ExprKind::Function(f) => {
                let mut children: Vec<Self> = parameter_list(&f.params).into_iter().collect();
                children.extend(statements(&f.body));
                Self::branch(kind, span, children)
            }
            ExprKind::Conditional(c) => Self::branch(kind, span, conditional(c)),
        }
    }
}

fn statements(stmts: &[Stmt]) -> Vec<SyntaxNode> {
    stmts.iter().map(SyntaxNode::from).collect()
}

/// Span from the first to the last node, or `None` when empty.
fn covering(nodes: &[SyntaxNode]) -> Option<Span> {
    let first = nodes.first()?;
    let last = nodes.last()?;
    Some(first.span.to(last.span))
}

fn parameter_list(params: &[Param]) -> Option<SyntaxNode> {
    let children: Vec<SyntaxNode> = params
        .iter()
        .map(|p| {
            let mut children = vec![SyntaxNode::leaf("identifier", &p.name.name, p.name.span)];
            children.extend(p.default.as_ref().map(SyntaxNode::from));
            SyntaxNode::branch("parameter", p.span, children)
        })
        .collect();
    let span = covering(&children)?;
    Some(SyntaxNode::branch("parameter_list", span, children))
}

fn argument_list(args: &[Expr]) -> Option<SyntaxNode> {
    let children: Vec<SyntaxNode> = args.iter().map(SyntaxNode::from).collect();
    let span = covering(&children)?;
    Some(SyntaxNode::branch("argument_list", span, children))
}

fn member_name(name: &Name) -> SyntaxNode {
    let kind = match name.origin {
        NameOrigin::Identifier => "identifier",
        NameOrigin::Quoted(_) => "string",
    };
    SyntaxNode::leaf(kind, &name.text, name.span)
}

/// The unit keyword has no span of its own in the AST; it borrows the
/// enclosing statement's.
fn time_unit(unit: TimeUnit, span: Span) -> SyntaxNode {
    SyntaxNode::leaf("time_unit", unit.as_str(), span)
}

fn conditional(c: &Conditional) -> Vec<SyntaxNode> {
    let mut children = vec![SyntaxNode::from(c.condition.as_ref())];
    children.extend(statements(&c.consequence));
    for clause in &c.elsif_clauses {
        let mut clause_children = vec![SyntaxNode::from(&clause.condition)];
        clause_children.extend(statements(&clause.body));
        children.push(SyntaxNode::branch("elsif_clause", clause.span, clause_children));
    }
    if let Some(clause) = &c.else_clause {
        children.push(SyntaxNode::branch(
            "else_clause",
            clause.span,
            statements(&clause.body),
        ));
    }
    children
}
