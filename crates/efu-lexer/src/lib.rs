//! EFU lexer -- tokenizer for the EFU programming language.

mod cursor;

use cursor::Cursor;
use efu_common::error::{LexError, LexErrorKind};
use efu_common::span::Span;
use efu_common::token::{keyword_from_str, Token, TokenKind};

/// The EFU lexer. Converts source text into a stream of tokens.
///
/// A [`Cursor`] tracks the scanning position; the lexer itself is cheap to
/// clone, which is how [`Lexer::peek`] provides non-destructive one-token
/// lookahead. Once the input is exhausted, `next_token` returns `Eof`
/// indefinitely.
#[derive(Clone)]
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    source: &'src str,
    /// Errors recorded while scanning. Lexing never aborts.
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            source,
            errors: Vec::new(),
        }
    }

    /// Convenience: tokenize the entire source.
    ///
    /// The returned vector includes the final `Eof` token.
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, lexer.errors)
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Token {
        self.clone().next_token()
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.cursor.offset();

        let Some(c) = self.cursor.first() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Single-character symbols ───────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),
            '%' => self.single_char_token(TokenKind::Percent, start),

            // ── Multi-character symbols (greedy) ───────────────────────
            '=' => self.lex_eq(start),
            '!' => self.lex_bang(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_amp(start),
            '|' => self.lex_bar(start),
            '-' => self.lex_minus(start),

            // ── Literals ───────────────────────────────────────────────
            '0'..='9' => self.lex_number(start, false),
            '`' => self.lex_string(start),

            // ── Identifiers and keywords ───────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character (error recovery) ─────────────────────
            other => {
                self.cursor.bump();
                self.errors.push(LexError::new(
                    LexErrorKind::UnexpectedCharacter(other),
                    Span::new(start, self.cursor.offset()),
                ));
                Token::new(TokenKind::Error(other), start, self.cursor.offset())
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Skip whitespace (including newlines) and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor
                .bump_while(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');
            if self.cursor.first() == Some('/') && self.cursor.second() == Some('/') {
                self.cursor.bump_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.bump();
        Token::new(kind, start, self.cursor.offset())
    }

    // ── Symbol lexing ──────────────────────────────────────────────────

    /// `=` -> `Eq`, `==` -> `EqEq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.bump();
        match self.cursor.first() {
            Some('=') => self.single_char_token(TokenKind::EqEq, start),
            Some('>') => self.single_char_token(TokenKind::FatArrow, start),
            _ => Token::new(TokenKind::Eq, start, self.cursor.offset()),
        }
    }

    /// `!` -> `Bang`, `!=` -> `NotEq`
    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.bump();
        if self.cursor.first() == Some('=') {
            self.single_char_token(TokenKind::NotEq, start)
        } else {
            Token::new(TokenKind::Bang, start, self.cursor.offset())
        }
    }

    /// `<` -> `Lt`, `<=` -> `LtEq`, `<<` -> `Shl`
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.bump();
        match self.cursor.first() {
            Some('=') => self.single_char_token(TokenKind::LtEq, start),
            Some('<') => self.single_char_token(TokenKind::Shl, start),
            _ => Token::new(TokenKind::Lt, start, self.cursor.offset()),
        }
    }

    /// `>` -> `Gt`, `>=` -> `GtEq`, `>>` -> `Shr`
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.bump();
        match self.cursor.first() {
            Some('=') => self.single_char_token(TokenKind::GtEq, start),
            Some('>') => self.single_char_token(TokenKind::Shr, start),
            _ => Token::new(TokenKind::Gt, start, self.cursor.offset()),
        }
    }

    /// `&&` -> `AmpAmp`, single `&` -> `Amp`
    fn lex_amp(&mut self, start: u32) -> Token {
        self.cursor.bump();
        if self.cursor.first() == Some('&') {
            self.single_char_token(TokenKind::AmpAmp, start)
        } else {
            Token::new(TokenKind::Amp, start, self.cursor.offset())
        }
    }

    /// `||` -> `BarBar`, `|>` -> `Pipe`, single `|` -> `Bar`
    fn lex_bar(&mut self, start: u32) -> Token {
        self.cursor.bump();
        match self.cursor.first() {
            Some('|') => self.single_char_token(TokenKind::BarBar, start),
            Some('>') => self.single_char_token(TokenKind::Pipe, start),
            _ => Token::new(TokenKind::Bar, start, self.cursor.offset()),
        }
    }

    /// `->` -> `Arrow`, `-<digit>` -> negative integer literal, `-` -> `Minus`
    ///
    /// A `-` immediately preceding a digit (no intervening space) is consumed
    /// as the sign of the integer literal.
    fn lex_minus(&mut self, start: u32) -> Token {
        self.cursor.bump();
        match self.cursor.first() {
            Some(c) if c.is_ascii_digit() => self.lex_number(start, true),
            Some('>') => self.single_char_token(TokenKind::Arrow, start),
            _ => Token::new(TokenKind::Minus, start, self.cursor.offset()),
        }
    }

    // ── Literal lexing ─────────────────────────────────────────────────

    /// Maximal run of decimal digits; the sign was consumed by the caller.
    fn lex_number(&mut self, start: u32, negative: bool) -> Token {
        let mut value: i64 = 0;
        while let Some(c) = self.cursor.first() {
            let Some(digit) = c.to_digit(10) else { break };
            self.cursor.bump();
            value = value.saturating_mul(10).saturating_add(digit as i64);
        }
        if negative {
            value = -value;
        }
        Token::new(TokenKind::Int(value), start, self.cursor.offset())
    }

    /// String literal: opens with `` ` ``, closes with `'`.
    ///
    /// Escapes: `\n`, `\r`, `\t`; `\<any>` passes the literal next character.
    /// An unterminated string reads to EOF (recorded, tolerated).
    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.bump(); // opening backtick
        let mut text = String::new();
        loop {
            match self.cursor.bump() {
                None => {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, self.cursor.offset()),
                    ));
                    break;
                }
                Some('\'') => break,
                Some('\\') => match self.cursor.bump() {
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some(other) => text.push(other),
                    None => {
                        self.errors.push(LexError::new(
                            LexErrorKind::UnterminatedString,
                            Span::new(start, self.cursor.offset()),
                        ));
                        break;
                    }
                },
                Some(c) => text.push(c),
            }
        }
        Token::new(TokenKind::Str(text), start, self.cursor.offset())
    }

    /// Identifier or keyword.
    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.bump_while(is_ident_continue);
        let end = self.cursor.offset();
        let word = &self.source[start as usize..end as usize];
        let kind = match keyword_from_str(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(word.to_string()),
        };
        Token::new(kind, start, end)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
