//! Reusing validated function bodies across parses of one source.

use std::sync::Arc;

use sable_parser::{
    ErrorCategory, FunctionCache, ParserOptions, parse, parse_with_cache, validate_with_cache,
};

const SOURCE: &str = "var total = 0, unused = 1;
function add(a, b) {
    var sum = a + b;
    function inner() { return sum * total; }
    return inner();
}
var twice = (x) => x + x + total;
add(1, 2);
";

fn body_start(source: &str, needle: &str) -> u32 {
    let function = source.find(needle).expect("needle present");
    (function + source[function..].find('{').expect("body present")) as u32
}

#[test]
fn test_warm_parse_matches_cold_parse() {
    let options = ParserOptions::default();
    let cold = parse(SOURCE, &options).expect("valid program");

    let mut cache = FunctionCache::new();
    let first = parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    assert!(!cache.is_empty());
    let entries = cache.len();

    let warm = parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    assert_eq!(cache.len(), entries);
    assert_eq!(first.print(), cold.print());
    assert_eq!(warm.print(), cold.print());
    assert_eq!(warm.captured_variables, cold.captured_variables);
    assert_eq!(warm.features, cold.features);
}

#[test]
fn test_nested_bodies_are_recorded() {
    let mut cache = FunctionCache::new();
    validate_with_cache(SOURCE, &ParserOptions::default(), &mut cache).expect("valid program");
    assert!(cache.lookup(body_start(SOURCE, "function add")).is_some());
    assert!(cache.lookup(body_start(SOURCE, "function inner")).is_some());
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_cached_summary_is_used() {
    let options = ParserOptions::default();
    let mut cache = FunctionCache::new();
    let cold = parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    let cold_captured: Vec<&str> = cold.captured_variables.iter().map(|name| &**name).collect();
    assert_eq!(cold_captured, vec!["total"]);

    let start = body_start(SOURCE, "function add");
    let mut entry = cache.lookup(start).cloned().expect("cached body");
    entry.used_variables.push(Arc::from("unused"));
    cache.insert(start, entry);

    let warm = parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    let warm_captured: Vec<&str> = warm.captured_variables.iter().map(|name| &**name).collect();
    assert_eq!(warm_captured, vec!["total", "unused"]);
}

#[test]
fn test_check_only_pass_warms_the_cache_for_a_full_build() {
    let options = ParserOptions::default();
    let mut cache = FunctionCache::new();
    validate_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    let warm = parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    let cold = parse(SOURCE, &options).expect("valid program");
    assert_eq!(warm.print(), cold.print());
}

#[test]
fn test_short_bodies_are_not_cached() {
    let mut cache = FunctionCache::new();
    validate_with_cache("function f() {}", &ParserOptions::default(), &mut cache)
        .expect("valid program");
    assert!(cache.is_empty());
}

#[test]
fn test_arrow_expression_body_resumes_correctly() {
    let source = "var g = (a, b) => a + b + c + d, h = 1;\nh;";
    let options = ParserOptions::default();
    let mut cache = FunctionCache::new();
    let cold = parse_with_cache(source, &options, &mut cache).expect("valid program");
    assert_eq!(cache.len(), 1);
    let warm = parse_with_cache(source, &options, &mut cache).expect("valid program");
    assert_eq!(warm.print(), cold.print());
    assert_eq!(warm.var_names(), vec!["g", "h"]);
}

#[test]
fn test_cache_rebinds_to_new_source() {
    let options = ParserOptions::default();
    let mut cache = FunctionCache::new();
    validate_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    assert!(!cache.is_empty());

    let other = "function different(x) { return x + 1; }";
    let output = parse_with_cache(other, &options, &mut cache).expect("valid program");
    assert_eq!(cache.len(), 1);
    assert!(cache.lookup(body_start(other, "function different")).is_some());
    assert_eq!(output.print(), parse(other, &options).expect("valid").print());
}

#[test]
fn test_eager_parse_ignores_the_cache() {
    let options = ParserOptions {
        eager_function_bodies: true,
        ..ParserOptions::default()
    };
    let mut cache = FunctionCache::new();
    parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    assert!(cache.is_empty());
}

#[test]
fn test_loose_entries_are_not_reused_under_strict_options() {
    let source = "function f() { with (o) { total = total + 1; } return total; }";
    let loose = ParserOptions::default();
    let strict = ParserOptions::strict();
    let cold = parse(source, &strict).expect_err("with is rejected in strict code");

    let mut cache = FunctionCache::new();
    parse_with_cache(source, &loose, &mut cache).expect("valid loose program");
    assert_eq!(cache.len(), 1);

    let warm = parse_with_cache(source, &strict, &mut cache).expect_err("still rejected");
    assert_eq!(warm, cold);
    assert_eq!(warm.category, ErrorCategory::Semantic);
    assert_eq!(warm.message, "'with' statements are not valid in strict mode.");

    parse_with_cache(source, &loose, &mut cache).expect("valid loose program");
    let checked = validate_with_cache(source, &strict, &mut cache).expect_err("still rejected");
    assert_eq!(checked, cold);
}

#[test]
fn test_parameter_default_option_rebinds_the_cache() {
    let source = "function outer() { function inner(a = 1) { return a; } return inner; }";
    let allowing = ParserOptions {
        allow_parameter_defaults: true,
        ..ParserOptions::default()
    };
    let mut cache = FunctionCache::new();
    parse_with_cache(source, &allowing, &mut cache).expect("defaults allowed");
    assert!(!cache.is_empty());

    let error = parse_with_cache(source, &ParserOptions::default(), &mut cache)
        .expect_err("defaults rejected");
    assert_eq!(error.category, ErrorCategory::Semantic);
}

#[test]
fn test_entry_from_other_enclosing_strictness_is_skipped() {
    let options = ParserOptions::default();
    let mut cache = FunctionCache::new();
    parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");

    let start = body_start(SOURCE, "function add");
    let mut entry = cache.lookup(start).cloned().expect("cached body");
    assert!(!entry.inherited_strict);
    entry.inherited_strict = true;
    entry.used_variables.push(Arc::from("unused"));
    cache.insert(start, entry);

    let warm = parse_with_cache(SOURCE, &options, &mut cache).expect("valid program");
    let warm_captured: Vec<&str> = warm.captured_variables.iter().map(|name| &**name).collect();
    assert_eq!(warm_captured, vec!["total"]);
    assert!(!cache.lookup(start).expect("re-recorded").inherited_strict);
}
