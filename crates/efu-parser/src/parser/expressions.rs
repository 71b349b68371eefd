//! Pratt expression parser for EFU.
//!
//! Binary operators are resolved with binding-power climbing; every EFU
//! operator is left-associative. The pipe operator sits below all binary
//! operators and is collected into the linked-list `Pipe` node at the top of
//! each expression.

use efu_common::token::{Keyword, TokenKind};

use super::Parser;
use crate::ast::{BinOp, Binop, FuncCall, Group, Ident, Literal, LiteralValue, Node, PipeOp};
use crate::error::ParseError;

impl Parser {
    /// Parse a full expression: binary climb, then an optional pipe tail.
    pub(crate) fn parse_expr(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_binary(0)?;
        if !self.at(&TokenKind::Pipe) {
            return Ok(first);
        }

        let mut stages = vec![first];
        while self.eat(&TokenKind::Pipe) {
            let stage = self.parse_binary(0)?;
            if !matches!(stage, Node::Ident(_) | Node::FuncCall(_)) {
                return Err(ParseError::new("invalid pipe target", stage.span()));
            }
            stages.push(stage);
        }

        // Build the linked list back-to-front so each cell's span covers its
        // tail.
        let mut next: Option<Box<PipeOp>> = None;
        for stage in stages.into_iter().rev() {
            let span = match &next {
                Some(tail) => stage.span().merge(tail.span),
                None => stage.span(),
            };
            next = Some(Box::new(PipeOp {
                value: Box::new(stage),
                next,
                span,
            }));
        }
        Ok(Node::Pipe(
            *next.expect("pipe chain has at least one stage"),
        ))
    }

    /// The Pratt loop: parse an atom, then fold operators whose left binding
    /// power clears `min_bp`.
    fn parse_binary(&mut self, min_bp: u8) -> Result<Node, ParseError> {
        let mut lhs = self.parse_primary()?;
        loop {
            let Some(op) = BinOp::from_token(self.kind()) else {
                break;
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(r_bp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Node::Binop(Binop {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    /// An expression atom: literal, identifier (optionally a call), a
    /// parenthesized group, or a function literal.
    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match self.kind().clone() {
            TokenKind::Str(text) => {
                let span = self.advance().span;
                Ok(Node::Literal(Literal {
                    value: LiteralValue::Str(text),
                    span,
                }))
            }
            TokenKind::Int(value) => {
                let span = self.advance().span;
                Ok(Node::Literal(Literal {
                    value: LiteralValue::Int(value),
                    span,
                }))
            }
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                if self.at(&TokenKind::LParen) {
                    self.parse_call(name, span)
                } else {
                    Ok(Node::Ident(Ident { name, span }))
                }
            }
            TokenKind::LParen => {
                let open = self.advance().span;
                if self.at(&TokenKind::RParen) {
                    let close = self.advance().span;
                    return Ok(Node::Group(Group {
                        item: None,
                        span: open.merge(close),
                    }));
                }
                let item = self.parse_expr()?;
                let close = self.expect(&TokenKind::RParen)?.span;
                Ok(Node::Group(Group {
                    item: Some(Box::new(item)),
                    span: open.merge(close),
                }))
            }
            TokenKind::Keyword(Keyword::Fn) => self.parse_fn_decl().map(Node::FuncDecl),
            other => Err(ParseError::new(
                format!("expected an expression, found {other}"),
                self.span(),
            )),
        }
    }

    /// `NAME(arg, …)` — the name token was already consumed.
    fn parse_call(
        &mut self,
        name: String,
        name_span: efu_common::span::Span,
    ) -> Result<Node, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) {
            if self.at_eof() {
                return Err(ParseError::new(
                    "unexpected end of input in call arguments",
                    self.span(),
                ));
            }
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RParen)?.span;
        Ok(Node::FuncCall(FuncCall {
            name,
            args,
            span: name_span.merge(close),
        }))
    }
}
