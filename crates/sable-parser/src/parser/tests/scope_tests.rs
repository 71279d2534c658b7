use super::*;
use sable_common::Interner;

fn stack() -> (ScopeStack, Interner) {
    let mut interner = Interner::new();
    let names = KnownNames::new(&mut interner);
    (ScopeStack::new(names), interner)
}

#[test]
fn test_push_inherits_strictness() {
    let (mut scopes, _) = stack();
    scopes.push();
    scopes.current_mut().strict = true;
    scopes.push();
    assert!(scopes.current().strict);
    assert!(!scopes.current().is_function);
}

#[test]
fn test_declare_variable_reports_strict_validity() {
    let (mut scopes, mut interner) = stack();
    scopes.push();
    let x = interner.intern("x");
    let eval = interner.intern("eval");
    assert!(scopes.declare_variable(x));
    assert!(scopes.current().is_valid_strict_mode);
    assert!(!scopes.declare_variable(eval));
    assert!(!scopes.current().is_valid_strict_mode);
    assert!(scopes.has_declared_variable(eval));
}

#[test]
fn test_declarations_skip_sealed_scopes() {
    let (mut scopes, mut interner) = stack();
    scopes.push();
    scopes.push();
    scopes.current_mut().allows_new_decls = false;
    let x = interner.intern("x");
    scopes.declare_variable(x);
    assert!(!scopes.current().has_declared_variable(x));
    assert!(scopes.has_declared_variable(x));
    assert!(scopes.get(0).has_declared_variable(x));
}

#[test]
fn test_parameters_track_duplicates_and_arguments() {
    let (mut scopes, mut interner) = stack();
    scopes.push();
    let a = interner.intern("a");
    let arguments = interner.intern("arguments");
    assert!(scopes.declare_parameter(a));
    assert!(!scopes.declare_parameter(a));
    assert!(!scopes.declare_parameter(arguments));
    assert!(scopes.current().shadows_arguments);
}

#[test]
fn test_bound_parameter_results() {
    let (mut scopes, mut interner) = stack();
    scopes.push();
    let a = interner.intern("a");
    let eval = interner.intern("eval");
    assert_eq!(scopes.declare_bound_parameter(a), BindingResult::Valid);
    assert_eq!(scopes.declare_bound_parameter(a), BindingResult::InvalidDuplicate);
    assert_eq!(scopes.declare_bound_parameter(eval), BindingResult::InvalidStrictMode);
}

#[test]
fn test_pop_folds_free_variables_into_parent() {
    let (mut scopes, mut interner) = stack();
    let outer = interner.intern("outer");
    let local = interner.intern("local");
    scopes.push();
    scopes.declare_variable(outer);
    scopes.push();
    scopes.current_mut().set_is_function();
    scopes.declare_variable(local);
    scopes.use_variable(local);
    scopes.use_variable(outer);
    scopes.pop(true);

    let captured = scopes.captured_variables();
    assert_eq!(captured.names, vec![outer]);
    assert!(!captured.modified_parameter);
    assert_eq!(scopes.current().free_used_variables(), Vec::<Atom>::new());
}

#[test]
fn test_eval_use_propagates_and_captures_everything() {
    let (mut scopes, mut interner) = stack();
    let x = interner.intern("x");
    let eval = interner.intern("eval");
    scopes.push();
    scopes.declare_variable(x);
    scopes.push();
    scopes.use_variable(eval);
    scopes.pop(true);
    assert!(scopes.current().uses_eval);
    let captured = scopes.captured_variables();
    assert!(captured.modified_parameter);
    assert_eq!(captured.names, vec![x]);
}

#[test]
fn test_written_parameter_is_modified() {
    let (mut scopes, mut interner) = stack();
    let p = interner.intern("p");
    scopes.push();
    scopes.declare_parameter(p);
    scopes.declare_write(p);
    assert!(scopes.captured_variables().modified_parameter);
}

#[test]
fn test_labels_stop_at_function_boundary() {
    let (mut scopes, mut interner) = stack();
    let outer = interner.intern("outer");
    scopes.push();
    scopes.current_mut().push_label(outer, true);
    scopes.current_mut().start_loop();
    scopes.push();
    assert_eq!(
        scopes.label(outer),
        Some(ScopeLabel {
            name: outer,
            is_loop: true
        })
    );
    assert!(scopes.continue_is_valid());

    scopes.push();
    scopes.current_mut().set_is_function();
    assert_eq!(scopes.label(outer), None);
    assert!(!scopes.break_is_valid());
    assert!(!scopes.continue_is_valid());
}

#[test]
fn test_switch_allows_break_only() {
    let (mut scopes, _) = stack();
    scopes.push();
    scopes.current_mut().start_switch();
    assert!(scopes.break_is_valid());
    assert!(!scopes.continue_is_valid());
    scopes.current_mut().end_switch();
    assert!(!scopes.break_is_valid());
}

#[test]
fn test_closest_non_arrow_function_skips_arrows() {
    let (mut scopes, _) = stack();
    scopes.push();
    scopes.push();
    scopes.current_mut().set_is_function();
    scopes.push();
    scopes.current_mut().set_is_function();
    scopes.current_mut().is_arrow = true;
    assert_eq!(scopes.function_scope_index(), 2);
    assert_eq!(scopes.closest_non_arrow_function_index(), 1);
}
