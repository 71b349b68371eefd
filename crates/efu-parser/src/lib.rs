//! EFU parser -- tokens to AST.
//!
//! [`parse`] runs the lexer and the recursive-descent parser and returns the
//! flat top-level node list (ending in `Eof`) together with any lexer and
//! parser errors. The drive stops at the first parse error.

pub mod ast;
pub mod debug_ir;
pub mod error;
mod parser;

use efu_common::error::LexError;
use efu_lexer::Lexer;

use ast::Node;
use error::ParseError;
use parser::Parser;

/// The outcome of parsing one source file.
#[derive(Debug)]
pub struct ParseResult {
    /// Top-level nodes in source order, ending with `Node::Eof` when the
    /// drive completed.
    pub nodes: Vec<Node>,
    pub lex_errors: Vec<LexError>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Whether parsing completed without errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && self.lex_errors.is_empty()
    }
}

/// Tokenize and parse a source file.
pub fn parse(source: &str) -> ParseResult {
    let (tokens, lex_errors) = Lexer::tokenize(source);
    let mut parser = Parser::new(tokens);
    let mut nodes = Vec::new();
    let mut errors = Vec::new();
    loop {
        match parser.parse_statement() {
            Ok(node) => {
                let done = matches!(node, Node::Eof { .. });
                nodes.push(node);
                if done {
                    break;
                }
            }
            Err(err) => {
                errors.push(err);
                break;
            }
        }
    }
    ParseResult {
        nodes,
        lex_errors,
        errors,
    }
}
