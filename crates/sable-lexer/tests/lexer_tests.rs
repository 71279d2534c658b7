//! Integration tests for the lexer.

use sable_common::ErrorCategory;
use sable_lexer::{Lexer, LexerFlags, Token, TokenData, TokenKind};

fn lex_tokens(source: &str, strict: bool) -> (Vec<Token>, Lexer<'_>) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex(LexerFlags::empty(), strict);
        tokens.push(token);
        if matches!(token.kind, TokenKind::Eof | TokenKind::Error) {
            return (tokens, lexer);
        }
    }
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex_tokens(source, false)
        .0
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn single_error(source: &str, strict: bool) -> (ErrorCategory, String) {
    let (tokens, lexer) = lex_tokens(source, strict);
    let last = tokens.last().map(|t| t.kind);
    assert_eq!(last, Some(TokenKind::Error), "expected an error for {source:?}");
    let err = lexer.last_error().cloned();
    let err = err.unwrap_or_else(|| panic!("missing error for {source:?}"));
    (err.category, err.message)
}

// =============================================================================
// Identifiers and keywords
// =============================================================================

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        kinds("var x = typeof y"),
        vec![
            TokenKind::Var,
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::TypeOf,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_strict_reserved_words_depend_on_mode() {
    let (sloppy, _) = lex_tokens("let", false);
    assert_eq!(sloppy[0].kind, TokenKind::Identifier);

    let (strict, lexer) = lex_tokens("let", true);
    assert_eq!(strict[0].kind, TokenKind::ReservedIfStrict);
    assert_eq!(lexer.interner().resolve(strict[0].ident()), "let");
}

#[test]
fn test_ignore_reserved_words_for_property_names() {
    let mut lexer = Lexer::new("a.class");
    lexer.lex(LexerFlags::empty(), false);
    lexer.lex(LexerFlags::empty(), false);
    let name = lexer.lex(LexerFlags::IGNORE_RESERVED_WORDS, false);
    assert_eq!(name.kind, TokenKind::Identifier);
    assert_eq!(lexer.interner().resolve(name.ident()), "class");
}

#[test]
fn test_keywords_carry_their_spelling() {
    let mut lexer = Lexer::new("delete");
    let token = lexer.lex(LexerFlags::empty(), false);
    assert_eq!(token.kind, TokenKind::Delete);
    assert_eq!(lexer.interner().resolve(token.ident()), "delete");

    let mut lexer = Lexer::new("delete");
    let token = lexer.lex(LexerFlags::DONT_BUILD_KEYWORDS, false);
    assert_eq!(token.kind, TokenKind::Delete);
    assert_eq!(token.data, TokenData::None);
}

#[test]
fn test_escaped_identifier_is_never_a_keyword() {
    let (tokens, lexer) = lex_tokens("v\\u0061r", false);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(lexer.interner().resolve(tokens[0].ident()), "var");
}

#[test]
fn test_unicode_identifiers() {
    let (tokens, lexer) = lex_tokens("café $_x \\u{62}", false);
    assert_eq!(lexer.interner().resolve(tokens[0].ident()), "café");
    assert_eq!(lexer.interner().resolve(tokens[1].ident()), "$_x");
    assert_eq!(lexer.interner().resolve(tokens[2].ident()), "b");
}

#[test]
fn test_invalid_identifier_escape() {
    let (category, message) = single_error("a\\u0020b", false);
    assert_eq!(category, ErrorCategory::Lex);
    assert_eq!(message, "Invalid unicode escape in identifier");
}

// =============================================================================
// Numbers
// =============================================================================

#[test]
fn test_numeric_literals() {
    let (tokens, _) = lex_tokens("42 3.5 .5 1e3 0x1F 0b101 0o17 017 08", false);
    let values: Vec<f64> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Number)
        .map(Token::number)
        .collect();
    assert_eq!(values, vec![42.0, 3.5, 0.5, 1000.0, 31.0, 5.0, 15.0, 15.0, 8.0]);
}

#[test]
fn test_member_access_on_number() {
    assert_eq!(
        kinds("1..toString"),
        vec![
            TokenKind::Number,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_legacy_octal_rejected_in_strict_code() {
    let (category, message) = single_error("017", true);
    assert_eq!(category, ErrorCategory::Lex);
    assert_eq!(message, "Octal literals are not allowed in strict mode");
}

#[test]
fn test_identifier_directly_after_number() {
    let (_, message) = single_error("3in x", false);
    assert_eq!(message, "No identifiers allowed directly after numeric literal");
}

#[test]
fn test_bad_exponent_and_radix() {
    assert_eq!(
        single_error("1e+", false).1,
        "Non-number found after exponent indicator"
    );
    assert_eq!(single_error("0x", false).1, "No hexadecimal digits after '0x'");
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_escapes_are_cooked() {
    let (tokens, lexer) = lex_tokens(r#"'a\tb' "\x41B\u{43}" 'it\'s' "\101""#, false);
    let strings: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::String)
        .map(|t| lexer.interner().resolve(t.string()))
        .collect();
    assert_eq!(strings, vec!["a\tb", "ABC", "it's", "A"]);
}

#[test]
fn test_line_continuation_in_string() {
    let (tokens, lexer) = lex_tokens("'a\\\nb' c", false);
    assert_eq!(lexer.interner().resolve(tokens[0].string()), "ab");
    assert_eq!(tokens[1].location.line, 2);
}

#[test]
fn test_dont_build_strings_still_validates() {
    let mut lexer = Lexer::new("'abc'");
    let token = lexer.lex(LexerFlags::DONT_BUILD_STRINGS, false);
    assert_eq!(token.kind, TokenKind::String);
    assert!(token.string().is_none());

    let mut lexer = Lexer::new("'\\x4'");
    let token = lexer.lex(LexerFlags::DONT_BUILD_STRINGS, false);
    assert_eq!(token.kind, TokenKind::Error);
}

#[test]
fn test_unterminated_string() {
    let (category, message) = single_error("'abc\n'", false);
    assert_eq!(category, ErrorCategory::UnterminatedLiteral);
    assert_eq!(message, "Unterminated string literal");
}

#[test]
fn test_octal_escape_in_strict_string() {
    let (category, message) = single_error("'\\1'", true);
    assert_eq!(category, ErrorCategory::Lex);
    assert_eq!(message, "The only valid numeric escape in strict mode is '\\0'");

    let (tokens, _) = lex_tokens("'\\0'", true);
    assert_eq!(tokens[0].kind, TokenKind::String);
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn test_template_segments() {
    let mut lexer = Lexer::new("`a${x}b\r\nc`");
    let head = lexer.lex(LexerFlags::empty(), false);
    let TokenData::Template { cooked, tail, .. } = head.data else {
        panic!("expected template head, got {head:?}");
    };
    assert_eq!(lexer.interner().resolve(cooked), "a");
    assert!(!tail);

    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::Identifier);
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::CloseBrace);

    let rest = lexer.scan_template_continuation();
    assert_eq!(rest.kind, TokenKind::Template);
    let TokenData::Template { cooked, raw, tail } = rest.data else {
        panic!("expected template tail, got {rest:?}");
    };
    assert_eq!(lexer.interner().resolve(cooked), "b\nc");
    assert_eq!(lexer.interner().resolve(raw), "b\nc");
    assert!(tail);
    assert_eq!(lexer.line_number(), 2);
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::Eof);
}

#[test]
fn test_unterminated_template() {
    let (category, _) = single_error("`abc", false);
    assert_eq!(category, ErrorCategory::UnterminatedLiteral);
}

// =============================================================================
// Regular expressions
// =============================================================================

#[test]
fn test_regex_rescan() {
    let mut lexer = Lexer::new("/[/]+\\//gi;");
    let slash = lexer.lex(LexerFlags::empty(), false);
    assert_eq!(slash.kind, TokenKind::Divide);
    let (pattern, flags) = lexer.scan_regex(false).unwrap();
    assert_eq!(lexer.interner().resolve(pattern), "[/]+\\/");
    assert_eq!(lexer.interner().resolve(flags), "gi");
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::Semicolon);
}

#[test]
fn test_regex_rescan_after_divide_equal() {
    let mut lexer = Lexer::new("/=a/");
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::DivideEqual);
    let (pattern, _) = lexer.scan_regex(true).unwrap();
    assert_eq!(lexer.interner().resolve(pattern), "=a");
}

#[test]
fn test_unterminated_regex() {
    let mut lexer = Lexer::new("/abc\n/");
    lexer.lex(LexerFlags::empty(), false);
    let err = lexer.scan_regex(false).unwrap_err();
    assert_eq!(err.category, ErrorCategory::UnterminatedLiteral);
    assert_eq!(err.span.start, 0);
}

// =============================================================================
// Positions and trivia
// =============================================================================

#[test]
fn test_line_tracking_and_terminators() {
    let (tokens, _) = lex_tokens("a\r\n  b // c\n/* d */ e", false);
    assert_eq!(tokens[1].location.line, 2);
    assert_eq!(tokens[1].location.column(), 2);
    assert_eq!(tokens[2].location.line, 3);
    assert_eq!(tokens[2].location.column(), 8);
}

#[test]
fn test_prev_terminator_flag() {
    let mut lexer = Lexer::new("a\nb c");
    lexer.lex(LexerFlags::empty(), false);
    lexer.lex(LexerFlags::empty(), false);
    assert!(lexer.prev_terminator());
    lexer.lex(LexerFlags::empty(), false);
    assert!(!lexer.prev_terminator());
}

#[test]
fn test_state_restore_relexes() {
    let mut lexer = Lexer::new("a + b");
    lexer.lex(LexerFlags::empty(), false);
    let saved = lexer.state();
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::Plus);
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::Identifier);
    lexer.restore(saved);
    assert_eq!(lexer.lex(LexerFlags::empty(), false).kind, TokenKind::Plus);
}

#[test]
fn test_unterminated_block_comment() {
    let (category, message) = single_error("a /* b", false);
    assert_eq!(category, ErrorCategory::UnterminatedLiteral);
    assert_eq!(message, "Multiline comment was not closed properly");
}

#[test]
fn test_invalid_character() {
    let (category, message) = single_error("a # b", false);
    assert_eq!(category, ErrorCategory::Lex);
    assert_eq!(message, "Invalid character: '#'");
}
