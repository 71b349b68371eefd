//! Recursive-descent parser for EFU.
//!
//! The parser consumes the lexer's token vector and produces the flat
//! top-level `Vec<Node>`. Statements are handled in [`items`], expressions
//! by the Pratt loop in [`expressions`]. On any mishap the offending token's
//! position is reported and the top-level drive stops.

pub(crate) mod expressions;
pub(crate) mod items;

use efu_common::span::Span;
use efu_common::token::{Token, TokenKind};

use crate::error::ParseError;

/// Token-stream parser state.
///
/// `pos` never runs past the trailing `Eof` token, which repeats for any
/// further lookahead.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, end, end),
        }
    }

    /// The current token. Returns the `Eof` sentinel past end of input.
    pub(crate) fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// The current token's kind.
    pub(crate) fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// The current token's span.
    pub(crate) fn span(&self) -> Span {
        self.current().span
    }

    /// Whether the current token has exactly this kind.
    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    /// Whether the input is exhausted.
    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Consume and return the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or report what was found instead.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                format!("expected {kind}, found {}", self.kind()),
                self.span(),
            ))
        }
    }

    /// Consume an identifier and return its name.
    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.span();
                self.advance();
                Ok((name, span))
            }
            other => Err(ParseError::new(
                format!("expected {what}, found {other}"),
                self.span(),
            )),
        }
    }

    /// Consume the statement-terminating semicolon.
    pub(crate) fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(&TokenKind::Semicolon) {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("expected `;`, found {}", self.kind()),
                self.span(),
            ))
        }
    }
}
