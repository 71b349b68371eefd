use std::fmt;

use efu_common::span::Span;
use serde::Serialize;

/// A parse error at a source position.
///
/// The parser stops the top-level drive at the first error; the message is
/// rendered through the shared `<file>:<line>:<col>: [ERROR] <message>`
/// diagnostic line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
