//! Error categories, messages and positions.

use sable_parser::{ErrorCategory, ParseError, ParserOptions, parse, validate};

fn error_of(source: &str) -> ParseError {
    error_with(source, &ParserOptions::default())
}

fn error_with(source: &str, options: &ParserOptions) -> ParseError {
    match validate(source, options) {
        Ok(()) => panic!("expected {source:?} to be rejected"),
        Err(error) => error,
    }
}

#[test]
fn test_unexpected_identifier() {
    let error = error_of("a b");
    assert_eq!(error.category, ErrorCategory::Irrecoverable);
    assert_eq!(error.message, "Unexpected identifier 'b'");
    assert_eq!((error.line, error.column), (1, 2));
    assert_eq!(error.to_string(), "1:2: Unexpected identifier 'b'");
}

#[test]
fn test_truncated_input_is_recoverable() {
    let error = error_of("1 +");
    assert_eq!(error.category, ErrorCategory::Recoverable);
    assert!(error.message.starts_with("Unexpected end of script"), "{error}");

    let error = error_of("if (x) {");
    assert_eq!(error.category, ErrorCategory::Recoverable);
    assert_eq!(
        error.message,
        "Unexpected end of script. Expected a closing '}' at the end of a block statement."
    );
}

#[test]
fn test_missing_initializer() {
    let error = error_of("var x = ;");
    assert_eq!(error.category, ErrorCategory::Irrecoverable);
    assert!(error.message.starts_with("Unexpected token ';'"), "{error}");
}

#[test]
fn test_position_is_reported_on_later_lines() {
    let error = error_of("var a = 1;\nvar b = 2;\n  a b");
    assert_eq!((error.line, error.column), (3, 4));
}

#[test]
fn test_earliest_defect_is_reported() {
    let error = error_of("a b; c d;");
    assert_eq!(error.message, "Unexpected identifier 'b'");
    assert_eq!(error.column, 2);
}

#[test]
fn test_error_inside_lazy_body_is_reported() {
    let error = error_of("function f() { a b }");
    assert_eq!(error.message, "Unexpected identifier 'b'");
    assert_eq!(error.column, 17);
}

#[test]
fn test_return_outside_function() {
    let error = error_of("return 1");
    assert_eq!(error.category, ErrorCategory::Semantic);
    assert_eq!(error.message, "Return statements are only valid inside functions.");
}

#[test]
fn test_jump_targets() {
    let error = error_of("break;");
    assert_eq!(error.category, ErrorCategory::Semantic);
    assert_eq!(error.message, "'break' is only valid inside a switch or loop statement.");

    let error = error_of("while (a) { continue missing; }");
    assert_eq!(error.message, "Cannot use the undeclared label 'missing'.");

    let error = error_of("label: { for (;;) { continue label; } }");
    assert_eq!(
        error.message,
        "Cannot continue to the label 'label' as it is not targeting a loop."
    );

    let error = error_of("function f() { while (a) { (function () { break; }); } }");
    assert_eq!(error.category, ErrorCategory::Semantic);
}

#[test]
fn test_duplicate_label() {
    let error = error_of("a: a: x;");
    assert!(error.message.ends_with("Attempted to redeclare the label 'a'."), "{error}");
}

#[test]
fn test_invalid_regex_flags() {
    let error = error_of("x = /a/gg");
    assert_eq!(error.category, ErrorCategory::RegexSyntax);
    assert_eq!(error.message, "Invalid regular expression: invalid flags");
}

#[test]
fn test_invalid_regex_pattern() {
    let error = error_of("x = /+a/;");
    assert_eq!(error.category, ErrorCategory::RegexSyntax);
    assert_eq!(error.message, "Invalid regular expression: nothing to repeat");

    let error = error_of("x = /(a/;");
    assert_eq!(error.category, ErrorCategory::RegexSyntax);
    assert_eq!(error.message, "Invalid regular expression: missing )");
}

#[test]
fn test_unterminated_literals() {
    let error = error_of("x = 'abc");
    assert_eq!(error.category, ErrorCategory::UnterminatedLiteral);
    assert_eq!(error.message, "Unterminated string literal");

    let error = error_of("x = 1; /* open");
    assert_eq!(error.category, ErrorCategory::UnterminatedLiteral);
    assert!(error.category.is_syntax_error());
}

#[test]
fn test_assignment_to_non_reference() {
    let error = error_of("1 = 2;");
    assert_eq!(error.category, ErrorCategory::Semantic);
    assert_eq!(error.message, "Left hand side of operator '=' must be a reference.");
}

#[test]
fn test_multiple_constructors() {
    let error = error_of("class A { constructor() {} constructor() {} }");
    assert_eq!(error.message, "Cannot declare multiple constructors in a single class.");
}

#[test]
fn test_super_outside_methods() {
    let error = error_of("function f() { return super.x; }");
    assert_eq!(error.category, ErrorCategory::Semantic);
}

#[test]
fn test_parameter_defaults_are_gated_by_options() {
    let error = error_of("function f(a = 1) {}");
    assert_eq!(error.category, ErrorCategory::Semantic);
    assert_eq!(
        error.message,
        "Default values in destructuring parameters are currently not supported."
    );

    let options = ParserOptions {
        allow_parameter_defaults: true,
        ..ParserOptions::default()
    };
    assert!(validate("function f(a = 1, [b] = c) {}", &options).is_ok());
}

#[test]
fn test_arrow_parameter_defaults_report_like_functions() {
    let function = error_of("function f(a = 1) { return a; }");
    let arrow = error_of("f = (a = 1) => a;");
    assert_eq!(arrow.category, ErrorCategory::Semantic);
    assert_eq!(arrow.message, function.message);

    let destructured = error_of("f = ({a = 1}) => a;");
    assert_eq!(destructured.category, ErrorCategory::Semantic);

    let options = ParserOptions {
        allow_parameter_defaults: true,
        ..ParserOptions::default()
    };
    assert!(validate("f = (a = 1, {b = 2}) => a + b;", &options).is_ok());
    assert!(validate("f = (a = 1);", &ParserOptions::default()).is_ok());
}

#[test]
fn test_default_limit_fits_a_default_thread_stack() {
    let nested = |open: &str, inner: &str, close: &str| {
        format!("{}{inner}{}", open.repeat(2000), close.repeat(2000))
    };
    let sources = [
        nested("function f(){", "", "}"),
        nested("{", "", "}"),
        nested("x = function(){", "", "};"),
        nested("(", "1", ")"),
    ];
    let outcomes = std::thread::Builder::new()
        .spawn(move || {
            let eager = ParserOptions {
                eager_function_bodies: true,
                ..ParserOptions::default()
            };
            sources
                .iter()
                .flat_map(|source| {
                    [
                        validate(source, &ParserOptions::default()).map_err(|e| e.category),
                        parse(source, &ParserOptions::default()).map(|_| ()).map_err(|e| e.category),
                        parse(source, &eager).map(|_| ()).map_err(|e| e.category),
                    ]
                })
                .collect::<Vec<_>>()
        })
        .expect("spawn parser thread")
        .join()
        .expect("parser thread finished");
    for outcome in outcomes {
        assert_eq!(outcome, Err(ErrorCategory::StackOverflow));
    }
}

#[test]
fn test_deep_nesting_overflows() {
    let options = ParserOptions {
        max_recursion_depth: 64,
        ..ParserOptions::default()
    };
    let source = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    let error = error_with(&source, &options);
    assert_eq!(error.category, ErrorCategory::StackOverflow);
    assert!(!error.category.is_syntax_error());
}

#[test]
fn test_exponent_after_unary_needs_parentheses() {
    let error = error_of("-2 ** 2;");
    assert!(error.message.contains("parentheses must be used"), "{error}");
    assert!(validate("(-2) ** 2;", &ParserOptions::default()).is_ok());
}
