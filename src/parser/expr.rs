//! Expression parsing: precedence climbing over the binary operator
//! table, with a postfix loop for calls, member access, and
//! subscripts.
//!
//! | Level | Operators                          | Assoc  |
//! |-------|------------------------------------|--------|
//! | 0     | `= += -= *= /= %= &= \|=`          | right  |
//! | 1     | `or`                               | left   |
//! | 2     | `and`                              | left   |
//! | 3     | `== != < > <= >=`                  | left   |
//! | 4     | `\| &`                             | left   |
//! | 5     | `<< >>`                            | left   |
//! | 6     | `+ -`                              | left   |
//! | 7     | `* / %`                            | left   |
//! | 8     | `^`                                | right  |
//! | 9     | prefix `not`, `-`                  | prefix |
//! | 10-11 | call, member, subscript            | postfix|
//!
//! A `(` following any primary or postfix result is always a call.
//! Parenthesized expressions only occur in primary position, so the
//! two never compete.

use super::{PResult, ParseError, ParseErrorKind, Parser};
use crate::ast::{
    AssignOp, BinaryOp, Conditional, ElseClause, ElsifClause, Expr, ExprKind, FunctionLit, Ident,
    MemberExpr, NumberLit, Param, Stmt, StringLit, SubscriptExpr, Target, UNARY_PRECEDENCE,
    UnaryOp,
};
use crate::token::{Keyword, Literal, Span, Token, TokenKind};

const fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Keyword(Keyword::Or) => BinaryOp::Or,
        TokenKind::Keyword(Keyword::And) => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Caret => BinaryOp::Pow,
        _ => return None,
    };
    Some(op)
}

const fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::StarAssign => AssignOp::Mul,
        TokenKind::SlashAssign => AssignOp::Div,
        TokenKind::PercentAssign => AssignOp::Rem,
        TokenKind::AmpAssign => AssignOp::BitAnd,
        TokenKind::PipeAssign => AssignOp::BitOr,
        _ => return None,
    };
    Some(op)
}

/// Whether a token of this kind can begin an expression.
pub(super) const fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::String(_)
            | TokenKind::Boolean
            | TokenKind::Minus
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::Keyword(
                Keyword::This
                    | Keyword::Super
                    | Keyword::New
                    | Keyword::Function
                    | Keyword::If
                    | Keyword::Not
            )
    )
}

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_expr_bp(0)
    }

    /// Parse operators binding at least as tightly as `min_prec`.
    fn parse_expr_bp(&mut self, min_prec: u8) -> PResult<Expr> {
        self.nested(|p| p.parse_binary_chain(min_prec))
    }

    /// Each operator folded into `left` puts the tree one level higher
    /// without recursing, so heights are tracked here rather than by
    /// `nested`.
    fn parse_binary_chain(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        let mut height = self.height;

        loop {
            let Some(kind) = self.peek_kind()? else {
                break;
            };

            if let Some(op) = assign_op(kind) {
                if min_prec > 0 {
                    break;
                }
                left = self.parse_assignment(left, height, op)?;
                height = self.height;
                continue;
            }

            let Some(op) = binary_op(kind) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.bump()?;

            let next_min = if op.is_right_assoc() { prec } else { prec + 1 };
            let right = self.parse_expr_bp(next_min)?;
            self.grow(height.max(self.height))?;
            height = self.height;
            let span = left.span.to(right.span);
            left = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            };
        }

        self.height = height;
        Ok(left)
    }

    fn parse_assignment(&mut self, left: Expr, height: usize, op: AssignOp) -> PResult<Expr> {
        let operator = self.bump()?;
        let start = left.span;
        let target = Target::try_from(left).map_err(|expr| ParseError {
            kind: ParseErrorKind::InvalidAssignmentTarget {
                target: expr.kind.node_name(),
            },
            span: operator.span,
        })?;

        // Right-associative: `a = b = c` is `a = (b = c)`.
        let value = self.parse_expr_bp(0)?;
        self.grow(height.max(self.height))?;
        let span = start.to(value.span);
        Ok(Expr {
            kind: ExprKind::Assign {
                target,
                op,
                value: Box::new(value),
            },
            span,
        })
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek_kind()? {
            Some(TokenKind::Keyword(Keyword::Not)) => UnaryOp::Not,
            Some(TokenKind::Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.bump()?.span;
        let operand = self.parse_expr_bp(UNARY_PRECEDENCE)?;
        self.grow(self.height)?;
        let span = start.to(operand.span);
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        })
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        let mut height = self.height;

        loop {
            let (kind, inner) = match self.peek_kind()? {
                Some(TokenKind::LParen) => {
                    let args = self.parse_arguments()?;
                    let kind = ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    };
                    (kind, self.height)
                }
                Some(TokenKind::Dot) => {
                    self.bump()?;
                    let property = self.expect_ident()?;
                    let kind = ExprKind::Member(MemberExpr {
                        object: Box::new(expr),
                        property,
                    });
                    (kind, 1)
                }
                Some(TokenKind::LBracket) => {
                    self.bump()?;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    let kind = ExprKind::Subscript(SubscriptExpr {
                        object: Box::new(expr),
                        index: Box::new(index),
                    });
                    (kind, self.height)
                }
                _ => break,
            };
            self.grow(height.max(inner))?;
            height = self.height;
            let span = postfix_start(&kind).to(self.prev);
            expr = Expr { kind, span };
        }

        self.height = height;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let Some(kind) = self.peek_kind()? else {
            return Err(self.unexpected(&["expression"]));
        };
        let start = self.peek_span()?;
        // Height of the tallest child; leaves have none.
        let mut inner = 0;

        let kind = match kind {
            TokenKind::Identifier => ExprKind::Identifier(self.bump()?.text),
            TokenKind::Number => {
                let token = self.bump()?;
                let value = match token.value {
                    Some(Literal::Number(n)) => n,
                    _ => f64::NAN,
                };
                ExprKind::Number(NumberLit {
                    value,
                    raw: token.text,
                })
            }
            TokenKind::String(style) => {
                let token = self.bump()?;
                ExprKind::Str(StringLit {
                    value: string_value(token),
                    style,
                })
            }
            TokenKind::Boolean => {
                let token = self.bump()?;
                ExprKind::Boolean(token.value == Some(Literal::Boolean(true)))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.bump()?;
                ExprKind::This
            }
            TokenKind::Keyword(Keyword::Super) => {
                self.bump()?;
                ExprKind::Super
            }
            TokenKind::Keyword(Keyword::New) => {
                self.bump()?;
                let class = self.expect_ident()?;
                let args = if self.at(TokenKind::LParen)? {
                    let args = self.parse_arguments()?;
                    inner = self.height;
                    Some(args)
                } else {
                    None
                };
                ExprKind::New { class, args }
            }
            TokenKind::Keyword(Keyword::Function) => {
                self.bump()?;
                let (params, body) = self.parse_function_rest()?;
                inner = self.height;
                ExprKind::Function(FunctionLit { params, body })
            }
            TokenKind::Keyword(Keyword::If) => {
                let conditional = self.parse_conditional()?;
                inner = self.height;
                ExprKind::Conditional(conditional)
            }
            TokenKind::LParen => {
                self.bump()?;
                let expr = self.parse_expression()?;
                inner = self.height;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(expr))
            }
            TokenKind::LBracket => {
                let items = self.parse_list()?;
                inner = self.height;
                ExprKind::List(items)
            }
            _ => return Err(self.unexpected(&["expression"])),
        };

        self.grow(inner)?;
        Ok(Expr {
            kind,
            span: start.to(self.prev),
        })
    }

    /// `( [expr {, expr}] )`
    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        let mut height = 0;
        if self.eat(TokenKind::RParen)?.is_none() {
            loop {
                args.push(self.parse_expression()?);
                height = height.max(self.height);
                if self.eat(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        self.height = height;
        Ok(args)
    }

    /// `[ [expr {, expr} [,]] ]`
    fn parse_list(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        let mut height = 0;
        while !self.at(TokenKind::RBracket)? {
            items.push(self.parse_expression()?);
            height = height.max(self.height);
            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBracket)?;
        self.height = height;
        Ok(items)
    }

    /// Parameter list and body after the `function` keyword, through
    /// the closing `end`.
    pub(super) fn parse_function_rest(&mut self) -> PResult<(Vec<Param>, Vec<Stmt>)> {
        let params = self.parse_params()?;
        let params_height = self.height;
        let body = self.parse_block(&[Keyword::End])?;
        self.expect_keyword(Keyword::End)?;
        self.height = self.height.max(params_height);
        Ok((params, body))
    }

    /// `( [name [= default] {, name [= default]}] )`
    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut height = 0;
        if self.eat(TokenKind::RParen)?.is_none() {
            loop {
                let name = self.expect_ident()?;
                let default = if self.eat(TokenKind::Assign)?.is_some() {
                    let value = self.parse_expression()?;
                    height = height.max(self.height);
                    Some(value)
                } else {
                    None
                };
                let span = name.span.to(self.prev);
                params.push(Param {
                    name,
                    default,
                    span,
                });
                if self.eat(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        self.height = height;
        Ok(params)
    }

    fn parse_conditional(&mut self) -> PResult<Conditional> {
        const BRANCH_END: &[Keyword] = &[Keyword::Elsif, Keyword::Else, Keyword::End];

        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        let mut height = self.height;
        self.expect_keyword(Keyword::Then)?;
        let consequence = self.parse_block(BRANCH_END)?;
        height = height.max(self.height);

        let mut elsif_clauses = Vec::new();
        while self.at_keyword(Keyword::Elsif)? {
            let start = self.bump()?.span;
            let condition = self.parse_expression()?;
            height = height.max(self.height);
            self.expect_keyword(Keyword::Then)?;
            let body = self.parse_block(BRANCH_END)?;
            height = height.max(self.height);
            elsif_clauses.push(ElsifClause {
                condition,
                body,
                span: start.to(self.prev),
            });
        }

        let else_clause = match self.eat(TokenKind::Keyword(Keyword::Else))? {
            Some(token) => {
                let body = self.parse_block(&[Keyword::End])?;
                height = height.max(self.height);
                Some(ElseClause {
                    body,
                    span: token.span.to(self.prev),
                })
            }
            None => None,
        };

        self.expect_keyword(Keyword::End)?;
        self.height = height;
        Ok(Conditional {
            condition: Box::new(condition),
            consequence,
            elsif_clauses,
            else_clause,
        })
    }

    pub(super) fn expect_ident(&mut self) -> PResult<Ident> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident {
            name: token.text,
            span: token.span,
        })
    }
}

fn postfix_start(kind: &ExprKind) -> Span {
    match kind {
        ExprKind::Call { callee, .. } => callee.span,
        ExprKind::Member(m) => m.object.span,
        ExprKind::Subscript(s) => s.object.span,
        _ => Span::default(),
    }
}

fn string_value(token: Token) -> String {
    match token.value {
        Some(Literal::Str(s)) => s,
        _ => token.text,
    }
}
