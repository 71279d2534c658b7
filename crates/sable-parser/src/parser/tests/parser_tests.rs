use super::*;
use crate::builder::{AstBuilder, SyntaxChecker};

fn checker_parser<'a>(source: &'a str, options: &'a ParserOptions) -> Parser<'a> {
    let mut parser = Parser::new(source, options, None);
    parser.scopes.push();
    parser.next();
    parser
}

#[test]
fn test_restore_rewinds_tokens_and_clears_errors() {
    let options = ParserOptions::default();
    let mut parser = checker_parser("a + b", &options);
    let mut checker = SyntaxChecker::new();
    let save = parser.save_point(&checker);
    parser.next();
    parser.next();
    assert!(parser.at(TokenKind::Identifier));
    parser.fail_unexpected::<()>();
    assert!(parser.error.is_some());

    parser.restore(&mut checker, save);
    assert!(parser.error.is_none());
    assert!(parser.at(TokenKind::Identifier));
    assert_eq!(parser.token.location.start, 0);
    assert_eq!(parser.last_token_end, 0);
}

#[test]
fn test_first_error_wins() {
    let options = ParserOptions::default();
    let mut parser = checker_parser("x", &options);
    parser.semantic_fail::<()>("first");
    parser.fail::<()>("second");
    let error = parser.take_error();
    assert_eq!(error.message, "first.");
    assert_eq!(error.category, ErrorCategory::Semantic);
}

#[test]
fn test_fail_describes_current_token() {
    let options = ParserOptions::default();
    let mut parser = checker_parser("42", &options);
    parser.fail::<()>("Expected something else");
    let error = parser.take_error();
    assert_eq!(error.message, "Unexpected number '42'. Expected something else.");
    assert_eq!(error.category, ErrorCategory::Irrecoverable);
    assert_eq!((error.line, error.column), (1, 0));
}

#[test]
fn test_expect_production_message() {
    let options = ParserOptions::default();
    let mut parser = checker_parser("x", &options);
    assert!(parser
        .expect_production(TokenKind::CloseParen, "end", "argument list")
        .is_none());
    let error = parser.take_error();
    assert_eq!(
        error.message,
        "Unexpected identifier 'x'. Expected ')' to end a argument list."
    );
}

#[test]
fn test_failure_at_end_of_input_is_recoverable() {
    let options = ParserOptions::default();
    let mut parser = checker_parser("", &options);
    parser.fail_unexpected::<()>();
    let error = parser.take_error();
    assert_eq!(error.message, "Unexpected end of script");
    assert_eq!(error.category, ErrorCategory::Recoverable);
}

#[test]
fn test_arrow_lookahead_leaves_position_unchanged() {
    let options = ParserOptions::default();
    let mut parser = checker_parser("(a, b) => a", &options);
    let mut checker = SyntaxChecker::new();
    assert!(parser.is_arrow_function_start(&mut checker));
    assert!(parser.at(TokenKind::OpenParen));
    assert_eq!(parser.scopes.len(), 1);

    let mut parser = checker_parser("(a, b) + c", &options);
    assert!(!parser.is_arrow_function_start(&mut checker));
    assert!(parser.at(TokenKind::OpenParen));
    assert!(parser.error.is_none());
}

#[test]
fn test_depth_limit_reports_stack_overflow() {
    let options = ParserOptions {
        max_recursion_depth: 8,
        ..ParserOptions::default()
    };
    let source = "((((((((((1))))))))))";
    let mut parser = Parser::new(source, &options, None);
    let mut checker = SyntaxChecker::new();
    assert!(parser.parse_program(&mut checker).is_none());
    let error = parser.take_error();
    assert_eq!(error.category, ErrorCategory::StackOverflow);
    assert_eq!(error.message, "Stack exhausted.");
}

#[test]
fn test_pattern_writes_commit_only_for_assignments() {
    let options = ParserOptions::default();
    let source = "[a, b] = c; [d];";
    let mut parser = Parser::new(source, &options, None);
    let mut builder = AstBuilder::new(parser.names(), source.len(), false);
    assert!(parser.parse_program(&mut builder).is_some());
    assert!(parser.pattern_writes.is_empty());

    let interner = parser.interner();
    let written = parser.scopes.get(0).free_written_variables();
    let mut written: Vec<&str> = written.iter().map(|&name| interner.resolve(name)).collect();
    written.sort();
    assert_eq!(written, vec!["a", "b"]);
}

#[test]
fn test_program_summary_reports_captures() {
    let options = ParserOptions::default();
    let source = "var x = 1, y = 2; function f() { return x; }";
    let mut parser = Parser::new(source, &options, None);
    let mut builder = AstBuilder::new(parser.names(), source.len(), false);
    assert!(parser.parse_program(&mut builder).is_some());
    let summary = parser.program_summary();
    assert_eq!(summary.captured_variables, vec![Arc::<str>::from("x")]);
    assert!(!summary.features.contains(CodeFeatures::STRICT_MODE));
}
