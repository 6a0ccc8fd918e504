use super::expr::starts_expression;
use super::{PResult, ParseError, ParseErrorKind, Parser};
use crate::ast::{
    ClassDef, FunctionDef, Member, MemberKind, Name, NameOrigin, ObjectDef, Schedule, Stmt,
    StmtKind, Target, TimeUnit,
};
use crate::token::{Keyword, Literal, TokenKind};

impl Parser<'_> {
    pub(super) fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.peek_span()?;
        let Some(token) = self.peek_kind()? else {
            return Err(self.unexpected(&["statement"]));
        };
        // Arms without children leave this at zero.
        self.height = 0;

        let kind = match token {
            TokenKind::Keyword(Keyword::Local) => self.parse_local()?,
            TokenKind::Keyword(Keyword::While) => self.parse_while()?,
            TokenKind::Keyword(Keyword::For) => self.parse_for()?,
            TokenKind::Keyword(Keyword::Return) => {
                self.bump()?;
                let value = match self.peek_kind()? {
                    Some(kind) if starts_expression(kind) => Some(self.parse_expression()?),
                    _ => None,
                };
                StmtKind::Return(value)
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.bump()?;
                StmtKind::Break
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.bump()?;
                StmtKind::Continue
            }
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete()?,
            TokenKind::Keyword(Keyword::Do) => {
                self.bump()?;
                StmtKind::Do(self.parse_body()?)
            }
            TokenKind::Keyword(Keyword::After) => StmtKind::After(self.parse_schedule()?),
            TokenKind::Keyword(Keyword::Every) => StmtKind::Every(self.parse_schedule()?),
            TokenKind::Keyword(Keyword::Sleep) => {
                self.bump()?;
                let duration = self.parse_expression()?;
                let unit = self.parse_time_unit()?;
                StmtKind::Sleep { duration, unit }
            }
            TokenKind::Identifier => match self.peek_definition()? {
                Some(Keyword::Function) => self.parse_function_def()?,
                Some(Keyword::Class) => self.parse_class()?,
                Some(Keyword::Object) => self.parse_object()?,
                _ => StmtKind::Expression(self.parse_expression()?),
            },
            _ => StmtKind::Expression(self.parse_expression()?),
        };

        self.grow(self.height)?;
        Ok(Stmt {
            kind,
            span: start.to(self.prev),
        })
    }

    /// Statements up to (not including) one of `terminators` or end
    /// of input.
    pub(super) fn parse_block(&mut self, terminators: &[Keyword]) -> PResult<Vec<Stmt>> {
        self.nested(|p| {
            let mut statements = Vec::new();
            let mut height = 0;
            loop {
                match p.peek_kind()? {
                    None => break,
                    Some(TokenKind::Keyword(kw)) if terminators.contains(&kw) => break,
                    Some(_) => {
                        statements.push(p.parse_statement()?);
                        height = height.max(p.height);
                    }
                }
            }
            p.height = height;
            Ok(statements)
        })
    }

    /// Statements through the closing `end`.
    fn parse_body(&mut self) -> PResult<Vec<Stmt>> {
        let body = self.parse_block(&[Keyword::End])?;
        self.expect_keyword(Keyword::End)?;
        Ok(body)
    }

    fn parse_local(&mut self) -> PResult<StmtKind> {
        self.expect_keyword(Keyword::Local)?;
        let name = self.expect_ident()?;
        let value = if self.eat(TokenKind::Assign)?.is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(StmtKind::Local { name, value })
    }

    /// `name = function(params) ... end`
    fn parse_function_def(&mut self) -> PResult<StmtKind> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        self.expect_keyword(Keyword::Function)?;
        let (params, body) = self.parse_function_rest()?;
        Ok(StmtKind::Function(FunctionDef { name, params, body }))
    }

    /// `name = class [extends parent] members end`
    fn parse_class(&mut self) -> PResult<StmtKind> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        self.expect_keyword(Keyword::Class)?;
        let parent = if self.eat(TokenKind::Keyword(Keyword::Extends))?.is_some() {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let members = self.parse_members(true)?;
        Ok(StmtKind::Class(ClassDef {
            name,
            parent,
            members,
        }))
    }

    /// `name = object members end`
    fn parse_object(&mut self) -> PResult<StmtKind> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        self.expect_keyword(Keyword::Object)?;
        let members = self.parse_members(false)?;
        Ok(StmtKind::Object(ObjectDef { name, members }))
    }

    fn parse_members(&mut self, allow_constructor: bool) -> PResult<Vec<Member>> {
        let mut members = Vec::new();
        let mut height = 0;
        loop {
            let start = self.peek_span()?;
            let kind = match self.peek_kind()? {
                Some(TokenKind::Keyword(Keyword::End)) => break,
                Some(TokenKind::Keyword(Keyword::Constructor)) if allow_constructor => {
                    self.bump()?;
                    self.expect(TokenKind::Assign)?;
                    self.expect_keyword(Keyword::Function)?;
                    let (params, body) = self.parse_function_rest()?;
                    MemberKind::Constructor { params, body }
                }
                Some(TokenKind::Identifier | TokenKind::String(_)) => {
                    let name = self.parse_member_name()?;
                    self.expect(TokenKind::Assign)?;
                    if self.eat(TokenKind::Keyword(Keyword::Function))?.is_some() {
                        let (params, body) = self.parse_function_rest()?;
                        MemberKind::Method { name, params, body }
                    } else {
                        let value = self.parse_expression()?;
                        MemberKind::Property { name, value }
                    }
                }
                _ if allow_constructor => {
                    return Err(self.unexpected(&["constructor", "identifier", "string", "end"]));
                }
                _ => return Err(self.unexpected(&["identifier", "string", "end"])),
            };
            self.grow(self.height)?;
            height = height.max(self.height);
            members.push(Member {
                kind,
                span: start.to(self.prev),
            });
        }
        self.expect_keyword(Keyword::End)?;
        self.height = height;
        Ok(members)
    }

    fn parse_member_name(&mut self) -> PResult<Name> {
        let token = self.bump()?;
        let origin = match token.kind {
            TokenKind::String(style) => NameOrigin::Quoted(style),
            _ => NameOrigin::Identifier,
        };
        let text = match token.value {
            Some(Literal::Str(s)) => s,
            _ => token.text,
        };
        Ok(Name {
            text,
            origin,
            span: token.span,
        })
    }

    fn parse_while(&mut self) -> PResult<StmtKind> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.parse_expression()?;
        let height = self.height;
        let body = self.parse_body()?;
        self.height = self.height.max(height);
        Ok(StmtKind::While { condition, body })
    }

    /// Range loop `for i = a to b [by s]` or iteration `for x in xs`.
    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.expect_keyword(Keyword::For)?;
        let variable = self.expect_ident()?;

        if self.eat(TokenKind::Assign)?.is_some() {
            let start = self.parse_expression()?;
            let mut height = self.height;
            self.expect_keyword(Keyword::To)?;
            let end = self.parse_expression()?;
            height = height.max(self.height);
            let step = if self.eat(TokenKind::Keyword(Keyword::By))?.is_some() {
                let step = self.parse_expression()?;
                height = height.max(self.height);
                Some(step)
            } else {
                None
            };
            let body = self.parse_body()?;
            self.height = self.height.max(height);
            return Ok(StmtKind::For {
                variable,
                start,
                end,
                step,
                body,
            });
        }

        if self.eat(TokenKind::Keyword(Keyword::In))?.is_some() {
            let iterable = self.parse_expression()?;
            let height = self.height;
            let body = self.parse_body()?;
            self.height = self.height.max(height);
            return Ok(StmtKind::ForIn {
                variable,
                iterable,
                body,
            });
        }

        Err(self.unexpected(&["=", "in"]))
    }

    fn parse_delete(&mut self) -> PResult<StmtKind> {
        self.expect_keyword(Keyword::Delete)?;
        let expr = self.parse_expression()?;
        let target = Target::try_from(expr).map_err(|expr| ParseError {
            kind: ParseErrorKind::InvalidDeleteTarget {
                target: expr.kind.node_name(),
            },
            span: expr.span,
        })?;
        Ok(StmtKind::Delete(target))
    }

    /// `after`/`every` followed by `delay [unit] do ... end`.
    fn parse_schedule(&mut self) -> PResult<Schedule> {
        self.bump()?;
        let delay = self.parse_expression()?;
        let height = self.height;
        let unit = self.parse_time_unit()?;
        self.expect_keyword(Keyword::Do)?;
        let body = self.parse_body()?;
        self.height = self.height.max(height);
        Ok(Schedule { delay, unit, body })
    }

    fn parse_time_unit(&mut self) -> PResult<Option<TimeUnit>> {
        let unit = match self.peek_kind()? {
            Some(TokenKind::Keyword(Keyword::Second)) => TimeUnit::Second,
            Some(TokenKind::Keyword(Keyword::Seconds)) => TimeUnit::Seconds,
            Some(TokenKind::Keyword(Keyword::Millisecond)) => TimeUnit::Millisecond,
            Some(TokenKind::Keyword(Keyword::Milliseconds)) => TimeUnit::Milliseconds,
            _ => return Ok(None),
        };
        self.bump()?;
        Ok(Some(unit))
    }

    /// `function`, `class`, or `object` when the upcoming tokens are
    /// `identifier = <keyword>`. These take priority over a plain
    /// assignment expression.
    fn peek_definition(&mut self) -> PResult<Option<Keyword>> {
        if self.peek_nth_kind(1)? != Some(TokenKind::Assign) {
            return Ok(None);
        }
        Ok(match self.peek_nth_kind(2)? {
            Some(TokenKind::Keyword(
                kw @ (Keyword::Function | Keyword::Class | Keyword::Object),
            )) => Some(kw),
            _ => None,
        })
    }
}
