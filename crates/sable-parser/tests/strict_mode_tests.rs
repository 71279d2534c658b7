//! Strict-mode legality, both from a directive and from options.

use sable_parser::{CodeFeatures, ErrorCategory, ParseError, ParserOptions, parse, validate};

fn error_of(source: &str) -> ParseError {
    match validate(source, &ParserOptions::default()) {
        Ok(()) => panic!("expected {source:?} to be rejected"),
        Err(error) => error,
    }
}

fn assert_semantic(source: &str, message: &str) {
    let error = error_of(source);
    assert_eq!(error.category, ErrorCategory::Semantic, "{source:?}: {error}");
    assert_eq!(error.message, message, "{source:?}");
}

#[test]
fn test_arguments_callee_needs_the_directive_to_fail() {
    let sloppy = "function f() { return arguments.callee; }";
    assert!(validate(sloppy, &ParserOptions::default()).is_ok());

    assert_semantic(
        "function f() { \"use strict\"; return arguments.callee; }",
        "Cannot access 'callee' on 'arguments' in strict mode.",
    );
}

#[test]
fn test_directive_applies_to_earlier_parameters() {
    assert!(validate("function f(eval) { return eval; }", &ParserOptions::default()).is_ok());
    let error = error_of("function f(eval) { 'use strict'; }");
    assert_eq!(error.category, ErrorCategory::Semantic);
}

#[test]
fn test_directive_applies_to_the_function_name() {
    assert_semantic(
        "function eval() { 'use strict'; }",
        "Cannot name a function 'eval' in strict mode.",
    );
}

#[test]
fn test_directive_must_lead_the_body() {
    let late = "function f() { var x; 'use strict'; with (x) {} }";
    assert!(validate(late, &ParserOptions::default()).is_ok());
}

#[test]
fn test_escaped_directive_is_not_strict() {
    let output = parse("'use\\x20strict'; with (a) {}", &ParserOptions::default())
        .expect("escaped directive does not enable strict mode");
    assert!(!output.features.contains(CodeFeatures::STRICT_MODE));
}

#[test]
fn test_strict_program_rejects_with() {
    assert_semantic(
        "'use strict'; with (a) {}",
        "'with' statements are not valid in strict mode.",
    );
    let error = validate("with (a) {}", &ParserOptions::strict()).unwrap_err();
    assert_eq!(error.category, ErrorCategory::Semantic);
}

#[test]
fn test_strict_declarations_of_eval_and_arguments() {
    assert_semantic(
        "'use strict'; var eval;",
        "Cannot declare a variable named 'eval' in strict mode.",
    );
    assert_semantic(
        "'use strict'; function f(arguments) {}",
        "Cannot declare a parameter named 'arguments' in strict mode.",
    );
}

#[test]
fn test_strict_assignment_to_eval() {
    assert_semantic("'use strict'; eval = 1;", "Cannot modify 'eval' in strict mode.");
    assert_semantic("'use strict'; arguments++;", "Cannot modify 'arguments' in strict mode.");
    assert!(validate("eval = 1; arguments++;", &ParserOptions::default()).is_ok());
}

#[test]
fn test_strict_destructuring_assignment_to_eval() {
    assert_semantic("'use strict'; [eval] = a;", "Cannot modify 'eval' in strict mode.");
    assert!(validate("'use strict'; [eval];", &ParserOptions::default()).is_ok());
}

#[test]
fn test_strict_duplicate_parameters() {
    assert!(validate("function f(a, a) {}", &ParserOptions::default()).is_ok());
    assert_semantic(
        "'use strict'; function f(a, a) {}",
        "Cannot declare a parameter named 'a' in strict mode as it has already been declared.",
    );
}

#[test]
fn test_strict_delete_of_identifier() {
    assert!(validate("delete x;", &ParserOptions::default()).is_ok());
    let error = error_of("'use strict'; delete x;");
    assert_eq!(error.category, ErrorCategory::Semantic);
    assert!(validate("'use strict'; delete o.x;", &ParserOptions::default()).is_ok());
}

#[test]
fn test_reserved_words_in_strict_code() {
    assert!(validate("var yield = 1;", &ParserOptions::default()).is_ok());
    assert!(validate("'use strict'; var yield = 1;", &ParserOptions::default()).is_err());
}

#[test]
fn test_strict_function_in_nested_statement() {
    assert!(validate("if (a) { function f() {} }", &ParserOptions::default()).is_ok());
    assert_semantic(
        "'use strict'; if (a) { function f() {} }",
        "Strict mode does not allow function declarations in a lexically nested statement.",
    );
}

#[test]
fn test_strictness_is_inherited_by_nested_functions() {
    let output = parse(
        "'use strict'; function f() { return 1; }",
        &ParserOptions::default(),
    )
    .expect("valid program");
    assert!(output.print().contains(":strict)"));
    assert!(output.features.contains(CodeFeatures::STRICT_MODE));
}

#[test]
fn test_class_bodies_are_strict() {
    let error = error_of("class A { m() { with (a) {} } }");
    assert_eq!(error.message, "'with' statements are not valid in strict mode.");
}
