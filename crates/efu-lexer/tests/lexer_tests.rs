//! Integration tests for the EFU lexer.
//!
//! Each test tokenizes a source snippet and asserts on the produced token
//! kinds, spans, and recorded errors.

use efu_common::error::LexErrorKind;
use efu_common::span::LineIndex;
use efu_common::token::{Keyword, TokenKind};
use efu_lexer::Lexer;

/// Helper: tokenize and return just the kinds, without the trailing Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let (tokens, errors) = Lexer::tokenize(source);
    assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
    let mut kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds.pop(), Some(TokenKind::Eof));
    kinds
}

// ── Symbols ────────────────────────────────────────────────────────────

#[test]
fn two_char_symbols_are_greedy() {
    assert_eq!(
        kinds("&& || == => != >> >= << <= |> ->"),
        vec![
            TokenKind::AmpAmp,
            TokenKind::BarBar,
            TokenKind::EqEq,
            TokenKind::FatArrow,
            TokenKind::NotEq,
            TokenKind::Shr,
            TokenKind::GtEq,
            TokenKind::Shl,
            TokenKind::LtEq,
            TokenKind::Pipe,
            TokenKind::Arrow,
        ]
    );
}

#[test]
fn single_char_symbols() {
    assert_eq!(
        kinds("( ) { } [ ] , : ; + * / % < > = ! & |"),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Plus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Eq,
            TokenKind::Bang,
            TokenKind::Amp,
            TokenKind::Bar,
        ]
    );
}

// ── Integers ───────────────────────────────────────────────────────────

#[test]
fn integer_literals() {
    assert_eq!(kinds("0 42 1234"), vec![
        TokenKind::Int(0),
        TokenKind::Int(42),
        TokenKind::Int(1234),
    ]);
}

#[test]
fn minus_glues_onto_a_following_digit() {
    // `-` with no space before a digit signs the literal.
    assert_eq!(kinds("-5"), vec![TokenKind::Int(-5)]);
    // With a space it stays a minus symbol.
    assert_eq!(kinds("- 5"), vec![TokenKind::Minus, TokenKind::Int(5)]);
    // Even directly after an identifier: `x-1` is `x`, `-1`.
    assert_eq!(
        kinds("x-1"),
        vec![TokenKind::Ident("x".into()), TokenKind::Int(-1)]
    );
}

#[test]
fn arrow_wins_over_minus() {
    assert_eq!(kinds("->"), vec![TokenKind::Arrow]);
}

// ── Strings ────────────────────────────────────────────────────────────

#[test]
fn string_literal_backtick_to_quote() {
    assert_eq!(kinds("`hello'"), vec![TokenKind::Str("hello".into())]);
}

#[test]
fn string_escapes() {
    assert_eq!(
        kinds(r"`a\nb\tc\rd'"),
        vec![TokenKind::Str("a\nb\tc\rd".into())]
    );
    // `\<any>` passes the next character through.
    assert_eq!(kinds(r"`\q\''"), vec![TokenKind::Str("q'".into())]);
}

#[test]
fn unterminated_string_reads_to_eof() {
    let (tokens, errors) = Lexer::tokenize("`open");
    assert_eq!(tokens[0].kind, TokenKind::Str("open".into()));
    assert_eq!(tokens[1].kind, TokenKind::Eof);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
}

// ── Identifiers and keywords ───────────────────────────────────────────

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("fn if return let main _tmp x1"),
        vec![
            TokenKind::Keyword(Keyword::Fn),
            TokenKind::Keyword(Keyword::If),
            TokenKind::Keyword(Keyword::Return),
            TokenKind::Keyword(Keyword::Let),
            TokenKind::Ident("main".into()),
            TokenKind::Ident("_tmp".into()),
            TokenKind::Ident("x1".into()),
        ]
    );
}

#[test]
fn else_is_an_identifier() {
    assert_eq!(kinds("else"), vec![TokenKind::Ident("else".into())]);
}

// ── Trivia ─────────────────────────────────────────────────────────────

#[test]
fn line_comments_are_skipped() {
    assert_eq!(
        kinds("let // the rest is gone\nx"),
        vec![
            TokenKind::Keyword(Keyword::Let),
            TokenKind::Ident("x".into()),
        ]
    );
}

#[test]
fn comment_at_eof_without_newline() {
    assert_eq!(kinds("x // trailing"), vec![TokenKind::Ident("x".into())]);
}

// ── Positions ──────────────────────────────────────────────────────────

#[test]
fn spans_are_monotonic_and_line_col_resolves() {
    let source = "let x;\nlet y;\n";
    let (tokens, _) = Lexer::tokenize(source);
    let mut last = 0;
    for token in &tokens {
        assert!(token.span.start >= last, "span went backwards: {token:?}");
        last = token.span.start;
    }
    let index = LineIndex::new(source);
    // `y` is the 5th token (let x ; let y) at line 2, column 5.
    assert_eq!(tokens[4].kind, TokenKind::Ident("y".into()));
    assert_eq!(index.line_col(tokens[4].span.start), (2, 5));
}

#[test]
fn eof_repeats_forever() {
    let mut lexer = Lexer::new("x");
    assert_eq!(lexer.next_token().kind, TokenKind::Ident("x".into()));
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn peek_is_non_destructive() {
    let mut lexer = Lexer::new("a b");
    assert_eq!(lexer.peek().kind, TokenKind::Ident("a".into()));
    assert_eq!(lexer.next_token().kind, TokenKind::Ident("a".into()));
    assert_eq!(lexer.peek().kind, TokenKind::Ident("b".into()));
}

#[test]
fn unexpected_character_yields_recovery_token() {
    let (tokens, errors) = Lexer::tokenize("a @ b");
    assert_eq!(tokens[1].kind, TokenKind::Error('@'));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter('@'));
}
