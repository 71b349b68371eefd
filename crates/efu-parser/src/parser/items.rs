//! Statement parsing: `let`, `return`, `fn`, `if`/`else`, blocks, and
//! expression statements.

use efu_common::token::{Keyword, TokenKind};

use super::Parser;
use crate::ast::{FuncDecl, FuncDeclArg, IfElse, KeywordStmt, Node, TypeName, VarDecl};
use crate::error::ParseError;

impl Parser {
    /// Parse one statement, or the `Eof` sentinel at end of input.
    pub(crate) fn parse_statement(&mut self) -> Result<Node, ParseError> {
        match self.kind() {
            TokenKind::Eof => {
                let span = self.span();
                self.advance();
                Ok(Node::Eof { span })
            }
            TokenKind::Keyword(Keyword::Let) => {
                let decl = self.parse_var_decl()?;
                self.expect_semicolon()?;
                Ok(decl)
            }
            TokenKind::Keyword(Keyword::Return) => {
                let stmt = self.parse_return()?;
                self.expect_semicolon()?;
                Ok(stmt)
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if_else(),
            TokenKind::Keyword(Keyword::Fn) => self.parse_fn_decl().map(Node::FuncDecl),
            _ => {
                let expr = self.parse_expr()?;
                self.expect_semicolon()?;
                Ok(expr)
            }
        }
    }

    /// `let X;` / `let X: T;` / `let X: = e;` / `let X: T = e;`
    ///
    /// A `=` without a preceding `:` is rejected: inference is written
    /// `let X: = e;`, never `let X = e;`.
    fn parse_var_decl(&mut self) -> Result<Node, ParseError> {
        let let_span = self.advance().span; // `let`
        let (name, _) = self.expect_ident("variable name")?;

        let mut ty = TypeName::unresolved();
        let mut init = None;
        if self.eat(&TokenKind::Colon) {
            if matches!(self.kind(), TokenKind::Ident(_)) {
                ty = TypeName::named(self.parse_type_name()?);
            }
            if self.eat(&TokenKind::Eq) {
                init = Some(Box::new(self.parse_expr()?));
            }
        } else if self.at(&TokenKind::Eq) {
            return Err(ParseError::new(
                "expected `:` before `=` (write `let x: = value;` to infer)",
                self.span(),
            ));
        }

        let end = init
            .as_ref()
            .map(|node| node.span())
            .unwrap_or_else(|| self.span());
        Ok(Node::VarDecl(VarDecl {
            name,
            ty,
            init,
            span: let_span.merge(end),
        }))
    }

    /// `return;` / `return expr;`
    fn parse_return(&mut self) -> Result<Node, ParseError> {
        let span = self.advance().span; // `return`
        let expr = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let span = expr
            .as_ref()
            .map(|node| span.merge(node.span()))
            .unwrap_or(span);
        Ok(Node::Keyword(KeywordStmt {
            word: Keyword::Return,
            expr,
            span,
        }))
    }

    /// `fn NAME(args) -> RET { body }`; the return annotation is optional.
    ///
    /// Also reachable from expression position (function literals).
    pub(crate) fn parse_fn_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let fn_span = self.advance().span; // `fn`
        let (name, _) = self.expect_ident("function name")?;

        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) {
            if self.at_eof() {
                return Err(ParseError::new(
                    "unexpected end of input in argument list",
                    self.span(),
                ));
            }
            let (arg_name, arg_span) = self.expect_ident("argument name")?;
            let ty = if self.eat(&TokenKind::Colon) {
                TypeName::named(self.parse_type_name()?)
            } else {
                TypeName::unresolved()
            };
            args.push(FuncDeclArg {
                name: arg_name,
                ty,
                span: arg_span,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        let returns = if self.eat(&TokenKind::Arrow) {
            TypeName::named(self.parse_type_name()?)
        } else {
            TypeName::unresolved()
        };

        let body = self.parse_block()?;
        let span = fn_span.merge(self.tokens_end_span());
        Ok(FuncDecl {
            name,
            args,
            returns,
            body,
            span,
        })
    }

    /// `if expr (block | stmt) (else (block | stmt))?`
    ///
    /// `else` is matched as an identifier; it is not a keyword.
    fn parse_if_else(&mut self) -> Result<Node, ParseError> {
        let if_span = self.advance().span; // `if`
        let cond = Box::new(self.parse_expr()?);
        let body = self.parse_branch()?;

        let else_body = if matches!(self.kind(), TokenKind::Ident(name) if name == "else") {
            self.advance();
            Some(self.parse_branch()?)
        } else {
            None
        };

        Ok(Node::IfElse(IfElse {
            cond,
            body,
            else_body,
            span: if_span.merge(self.tokens_end_span()),
        }))
    }

    /// A branch of an `if`/`else`: a braced block or a single statement.
    fn parse_branch(&mut self) -> Result<Vec<Node>, ParseError> {
        if self.at(&TokenKind::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                return Err(ParseError::new(
                    "unexpected end of input inside block",
                    self.span(),
                ));
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// A type annotation: `IDENT ('[' INT? ']')*`, captured as a name string
    /// (`u8`, `u8[]`, `u8[3]`, `u8[][2]`). The type checker later parses the
    /// string back through the lexer.
    pub(crate) fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let (mut name, _) = self.expect_ident("type name")?;
        while self.eat(&TokenKind::LBracket) {
            name.push('[');
            if let TokenKind::Int(size) = *self.kind() {
                self.advance();
                name.push_str(&size.to_string());
            }
            self.expect(&TokenKind::RBracket)?;
            name.push(']');
        }
        Ok(name)
    }

    /// Span just before the current position, used to close spans of
    /// constructs that end with a consumed `}`.
    fn tokens_end_span(&self) -> efu_common::span::Span {
        if self.pos == 0 {
            return self.span();
        }
        self.tokens
            .get(self.pos - 1)
            .map(|t| t.span)
            .unwrap_or_else(|| self.span())
    }
}
