//! Tree shapes produced by the full-build parser.

use sable_parser::{CodeFeatures, NodeData, ParserOptions, parse};

fn eager() -> ParserOptions {
    ParserOptions {
        eager_function_bodies: true,
        ..ParserOptions::default()
    }
}

fn print(source: &str) -> String {
    print_with(source, &ParserOptions::default())
}

fn print_with(source: &str, options: &ParserOptions) -> String {
    match parse(source, options) {
        Ok(output) => output.print(),
        Err(error) => panic!("failed to parse {source:?}: {error}"),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert_eq!(print("1+2*3;"), "(program (expr (+ 1 (* 2 3))))");
    assert_eq!(print("1*2+3;"), "(program (expr (+ (* 1 2) 3)))");
}

#[test]
fn test_exponent_is_right_associative() {
    assert_eq!(print("2**3**2;"), "(program (expr (** 2 (** 3 2))))");
}

#[test]
fn test_subtraction_is_left_associative() {
    assert_eq!(print("a - b - c;"), "(program (expr (- (- a b) c)))");
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(print("a = b = c;"), "(program (expr (= a (= b c))))");
    assert_eq!(print("a += 1;"), "(program (expr (+= a 1)))");
}

#[test]
fn test_conditional_and_sequence() {
    assert_eq!(print("a ? b : c;"), "(program (expr (? a b c)))");
    assert_eq!(print("a, b, c;"), "(program (expr (, a b c)))");
}

#[test]
fn test_automatic_semicolon_after_return() {
    let split = print_with("function f() { return\n1 }", &eager());
    assert_eq!(split, "(program (function f () (body (return) (expr 1))))");

    let joined = print_with("function f() { return 1 }", &eager());
    assert_eq!(joined, "(program (function f () (body (return 1))))");
}

#[test]
fn test_line_break_separates_statements() {
    assert_eq!(print("a\nb"), "(program (expr a) (expr b))");
}

#[test]
fn test_postfix_update_needs_same_line() {
    assert_eq!(print("a++;"), "(program (expr (post++ a)))");
    assert_eq!(print("a\n++b"), "(program (expr a) (expr (++ b)))");
}

#[test]
fn test_variable_declarations() {
    assert_eq!(print("var x = 1, y;"), "(program (var (= x 1) y))");
    assert_eq!(print("const c = 2;"), "(program (const (= c 2)))");
}

#[test]
fn test_array_destructuring_keeps_holes_and_rest() {
    assert_eq!(
        print("let [a, , ...rest] = x;"),
        "(program (let (= (array-pattern a _ (... rest)) x)))"
    );
}

#[test]
fn test_object_destructuring_with_default() {
    assert_eq!(
        print("var {a, b: c = 1} = o;"),
        "(program (var (= (object-pattern (: a a) (: b (= c 1))) o)))"
    );
}

#[test]
fn test_destructuring_assignment_and_array_literal() {
    assert_eq!(print("[a, b] = c;"), "(program (expr (= (array-pattern a b) c)))");
    assert_eq!(print("[a, , b];"), "(program (expr (array a _ b)))");
}

#[test]
fn test_member_access_and_calls() {
    assert_eq!(print("a.b.c(1, 2);"), "(program (expr (call (. (. a b) c) 1 2)))");
    assert_eq!(print("a[b];"), "(program (expr ([] a b)))");
    assert_eq!(print("new Foo(x);"), "(program (expr (new Foo x)))");
}

#[test]
fn test_property_names_may_be_keywords() {
    assert_eq!(print("a.if.class;"), "(program (expr (. (. a if) class)))");
}

#[test]
fn test_object_literal_properties() {
    assert_eq!(
        print("x = {a: 1, b, 'c': 2};"),
        "(program (expr (= x (object (: a 1) (shorthand b) (: c 2)))))"
    );
}

#[test]
fn test_statements() {
    assert_eq!(print("if (a) b; else c;"), "(program (if a (expr b) (expr c)))");
    assert_eq!(print("while (a) {}"), "(program (while a (block)))");
    assert_eq!(print("for (;;) {}"), "(program (for _ _ _ (block)))");
    assert_eq!(print("for (x in o) y;"), "(program (for-in x o (expr y)))");
    assert_eq!(print("throw e;"), "(program (throw e))");
    assert_eq!(print(";"), "(program (empty))");
}

#[test]
fn test_labels_and_jumps() {
    assert_eq!(
        print("outer: for (;;) { break outer; }"),
        "(program (label outer (for _ _ _ (block (break outer)))))"
    );
    assert_eq!(
        print("while (a) { continue; }"),
        "(program (while a (block (continue))))"
    );
}

#[test]
fn test_switch_and_try() {
    assert_eq!(
        print("switch (x) { case 1: a; default: b; }"),
        "(program (switch x (case 1 (expr a)) (default (expr b))))"
    );
    assert_eq!(
        print("try { a; } catch (e) { b; } finally { c; }"),
        "(program (try (block (expr a)) (catch e (block (expr b))) (finally (block (expr c)))))"
    );
}

#[test]
fn test_regex_and_template_literals() {
    assert_eq!(print("x = /ab+c/gi;"), "(program (expr (= x /ab+c/gi)))");
    assert_eq!(print("`a${x}b`;"), "(program (expr (template \"a\" x \"b\")))");
}

#[test]
fn test_regex_after_assignment_operator() {
    assert_eq!(print("x /= 2;"), "(program (expr (/= x 2)))");
}

#[test]
fn test_function_bodies_are_lazy_by_default() {
    let source = "function f(a, b) { return a + b; }";
    assert_eq!(
        print(source),
        "(program (function f (a b) (lazy-body 10..34 params=2)))"
    );
    assert_eq!(
        print_with(source, &eager()),
        "(program (function f (a b) (body (return (+ a b)))))"
    );
}

#[test]
fn test_arrow_functions() {
    assert_eq!(
        print_with("f = (a, b) => a;", &eager()),
        "(program (expr (= f (=> (a b) (body (return a))))))"
    );
    assert_eq!(
        print_with("f = x => { return x; };", &eager()),
        "(program (expr (= f (=> (x) (body (return x))))))"
    );
}

#[test]
fn test_parenthesized_expression_is_not_an_arrow() {
    assert_eq!(print("(a, b);"), "(program (expr (, a b)))");
}

#[test]
fn test_class_declaration() {
    let printed = print_with(
        "class A extends B { constructor() { super(); } get x() { return 1; } static m() {} }",
        &eager(),
    );
    assert!(printed.starts_with("(program (class A (extends B) (constructor (function A ()"));
    assert!(printed.contains("(get x (function x () (body (return 1))))"));
    assert!(printed.contains("(static (method m (function m () (body))))"));
}

#[test]
fn test_directive_marks_program_strict() {
    assert_eq!(print("'use strict'; x;"), "(program :strict (expr \"use strict\") (expr x))");
}

#[test]
fn test_top_level_declarations_are_reported() {
    let output = parse(
        "var a; let b = 1; function f() {} class C {}",
        &ParserOptions::default(),
    )
    .expect("valid program");
    assert_eq!(output.var_names(), vec!["a", "b", "C"]);
    assert_eq!(output.function_declarations.len(), 1);
}

#[test]
fn test_features_record_this_and_eval() {
    let output = parse("this.x = eval('1');", &ParserOptions::default()).expect("valid program");
    assert!(output.features.contains(CodeFeatures::THIS));
    assert!(output.features.contains(CodeFeatures::EVAL));
    assert!(!output.features.contains(CodeFeatures::STRICT_MODE));
}

#[test]
fn test_captured_variables_come_from_lazy_bodies() {
    let output = parse(
        "var a = 1, b = 2; function f() { return a; }",
        &ParserOptions::default(),
    )
    .expect("valid program");
    let captured: Vec<&str> = output.captured_variables.iter().map(|name| &**name).collect();
    assert_eq!(captured, vec!["a"]);
}

#[test]
fn test_constant_folding_is_opt_in() {
    let folded = ParserOptions {
        fold_constants: true,
        ..ParserOptions::default()
    };
    assert_eq!(print_with("x = 1 + 2 * 3;", &folded), "(program (expr (= x 7)))");
    assert_eq!(print("x = 1 + 2 * 3;"), "(program (expr (= x (+ 1 (* 2 3)))))");
}

#[test]
fn test_lazy_body_can_be_rebuilt() {
    let source = "var k = 3; function f(a) { var b = a * k; return b; }";
    let options = ParserOptions::default();
    let output = parse(source, &options).expect("valid program");
    let function = output.function_declarations[0];
    let Some(NodeData::Function(function)) = output.arena.data(function).cloned() else {
        panic!("expected a function node");
    };
    let Some(NodeData::LazyFunctionBody(lazy)) = output.arena.data(function.body).cloned() else {
        panic!("expected a lazy body");
    };

    let rebuilt = sable_parser::parse_function_body(source, &lazy, &options).expect("reparse");
    assert_eq!(
        rebuilt.print(),
        "(function (a) (body (var (= b (* a k))) (return b)))"
    );
}
