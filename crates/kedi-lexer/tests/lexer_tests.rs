//! Lexer tests: keywords, operators, literals, comments, newline handling,
//! error recovery, and the 100-iteration determinism check.

use kedi_lexer::{Lexer, TokenKind, ALL_KEYWORDS};
use kedi_types::{ErrorCode, SourceFile, Span, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.kedi", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.kedi", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .iter()
        .map(|e| e.code)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_all_keywords() {
    for kw in ALL_KEYWORDS {
        let k = kinds(kw);
        assert_eq!(k.len(), 1, "keyword '{kw}'");
        assert!(k[0].is_keyword(), "'{kw}' lexed as {:?}", k[0]);
    }
}

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("fib n_2 _tmp funny"),
        vec![ident("fib"), ident("n_2"), ident("_tmp"), ident("funny")]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("lettuce"), vec![ident("lettuce")]);
    assert_eq!(kinds("iffy"), vec![ident("iffy")]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_single_char_operators() {
    assert_eq!(
        kinds("+ - * / % ( ) { } , = < >"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::Eq,
            TokenKind::Less,
            TokenKind::Greater,
        ]
    );
}

#[test]
fn test_two_char_operators() {
    assert_eq!(
        kinds("== != <= >="),
        vec![
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::LessEq,
            TokenKind::GreaterEq,
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        kinds("a<=b==c"),
        vec![
            ident("a"),
            TokenKind::LessEq,
            ident("b"),
            TokenKind::EqEq,
            ident("c"),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_number_literals() {
    assert_eq!(
        kinds("0 42 2147483647"),
        vec![
            TokenKind::NumberLit(0),
            TokenKind::NumberLit(42),
            TokenKind::NumberLit(i32::MAX),
        ]
    );
}

#[test]
fn test_negative_number_is_minus_then_literal() {
    assert_eq!(
        kinds("-5"),
        vec![TokenKind::Minus, TokenKind::NumberLit(5)]
    );
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(error_codes("2147483648"), vec![ErrorCode::INTEGER_OUT_OF_RANGE]);
    assert_eq!(kinds("99999999999"), vec![TokenKind::NumberLit(0)]);
}

#[test]
fn test_bool_literals() {
    assert_eq!(kinds("true false"), vec![TokenKind::True, TokenKind::False]);
}

// ─────────────────────────────────────────────────────────────────────
// Comments & newlines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment_dropped() {
    assert_eq!(
        kinds("let x = 1 // trailing\nx"),
        vec![
            TokenKind::Let,
            ident("x"),
            TokenKind::Eq,
            TokenKind::NumberLit(1),
            TokenKind::Newline,
            ident("x"),
        ]
    );
}

#[test]
fn test_comment_only_source() {
    assert!(kinds("// nothing here").is_empty());
}

#[test]
fn test_newlines_are_tokens() {
    assert_eq!(
        kinds("a\n\nb"),
        vec![ident("a"), TokenKind::Newline, TokenKind::Newline, ident("b")]
    );
}

#[test]
fn test_crlf_line_endings() {
    assert_eq!(kinds("a\r\nb"), vec![ident("a"), TokenKind::Newline, ident("b")]);
}

#[test]
fn test_empty_source_is_just_eof() {
    let sf = SourceFile::new("test.kedi", "");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(!result.errors.has_errors());
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_token_spans() {
    let sf = SourceFile::new("test.kedi", "let total = 10\n  total");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens[0].span, Span::new(1, 1, 1, 3));
    assert_eq!(tokens[1].span, Span::new(1, 5, 1, 9));
    assert_eq!(tokens[3].span, Span::new(1, 13, 1, 14));
    assert_eq!(tokens[5].span, Span::new(2, 3, 2, 7));
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_character_is_skipped() {
    let sf = SourceFile::new("test.kedi", "a @ b");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_CHARACTER);
    assert_eq!(result.errors.errors[0].span, Span::new(1, 3, 1, 3));
    let kinds: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![ident("a"), ident("b"), TokenKind::Eof]);
}

#[test]
fn test_bare_bang_suggests_not() {
    let sf = SourceFile::new("test.kedi", "!x");
    let result = Lexer::new(&sf).lex();
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNEXPECTED_CHARACTER);
    assert!(err.suggestion.as_deref().unwrap_or("").contains("not"));
}

#[test]
fn test_multibyte_character_reported_once() {
    assert_eq!(error_codes("é"), vec![ErrorCode::UNEXPECTED_CHARACTER]);
}

#[test]
fn test_error_cap_stops_lexing() {
    let source = "#".repeat(MAX_ERRORS + 10);
    let sf = SourceFile::new("test.kedi", source);
    let result = Lexer::new(&sf).lex();
    assert!(result.errors.is_full());
    assert_eq!(result.errors.errors.len(), MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Whole programs
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_function_header() {
    assert_eq!(
        kinds("fun add(a, b) {"),
        vec![
            TokenKind::Fun,
            ident("add"),
            TokenKind::LParen,
            ident("a"),
            TokenKind::Comma,
            ident("b"),
            TokenKind::RParen,
            TokenKind::LBrace,
        ]
    );
}

#[test]
fn test_determinism_100_iterations() {
    let source = "fun fib(n) {\n  if n < 2 { return n }\n  return fib(n - 1) + fib(n - 2)\n}\n";
    let sf = SourceFile::new("test.kedi", source);
    let first = Lexer::new(&sf).lex().tokens;
    for _ in 0..100 {
        assert_eq!(Lexer::new(&sf).lex().tokens, first);
    }
}
