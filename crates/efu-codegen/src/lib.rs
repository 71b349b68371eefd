//! EFU code generation -- the two emission backends.
//!
//! [`go`] maps the typed AST to a statically typed Go program; [`js`] maps
//! it to a generator-based JavaScript program with a fixed runtime prelude.
//! Both consume the AST after the type checker has annotated it.

pub mod go;
pub mod js;

use std::fmt;

use efu_common::span::Span;

/// An emission failure.
///
/// The only non-I/O way emission can fail is an AST shape the backend does
/// not handle, which indicates a gap between parser and backend (a compiler
/// bug), or a malformed pipe chain surviving to emission.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitError {
    pub message: String,
    pub span: Span,
}

impl EmitError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EmitError {}
