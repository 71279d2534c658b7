//! Lexical scope records maintained while parsing.
//!
//! One `Scope` is pushed per program, function, class and catch clause.
//! Blocks do not get their own scope: `var`, `let` and `const` all land in
//! the nearest scope that accepts new declarations. When a scope is popped,
//! the names it used but did not declare flow into its parent, which is how
//! a function learns which outer variables it captures.

use rustc_hash::FxHashSet;
use sable_common::{Atom, KnownNames};
use smallvec::SmallVec;

use crate::ast::{ConstructorKind, SuperBinding};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeLabel {
    pub name: Atom,
    pub is_loop: bool,
}

/// Outcome of binding a name inside a destructuring parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingResult {
    Valid,
    /// The name was already declared in this scope.
    InvalidDuplicate,
    /// `eval` or `arguments`; only an error once the scope is strict.
    InvalidStrictMode,
}

/// What a popped function scope captured from its surroundings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedVariables {
    pub names: Vec<Atom>,
    pub modified_parameter: bool,
    pub modified_arguments: bool,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub is_function: bool,
    pub is_function_boundary: bool,
    pub is_arrow: bool,
    pub strict: bool,
    pub allows_new_decls: bool,
    pub shadows_arguments: bool,
    pub uses_eval: bool,
    pub needs_full_activation: bool,
    /// False once a name that strict code forbids was declared here.
    pub is_valid_strict_mode: bool,
    pub has_direct_super: bool,
    pub needs_super_binding: bool,
    pub constructor_kind: ConstructorKind,
    pub expected_super_binding: SuperBinding,
    loop_depth: u32,
    switch_depth: u32,
    labels: SmallVec<[ScopeLabel; 2]>,
    declared_parameters: FxHashSet<Atom>,
    declared_variables: FxHashSet<Atom>,
    used_variables: FxHashSet<Atom>,
    closed_variables: FxHashSet<Atom>,
    written_variables: FxHashSet<Atom>,
}

impl Scope {
    pub fn new(is_function: bool, strict: bool) -> Self {
        Scope {
            is_function,
            is_function_boundary: false,
            is_arrow: false,
            strict,
            allows_new_decls: true,
            shadows_arguments: false,
            uses_eval: false,
            needs_full_activation: false,
            is_valid_strict_mode: true,
            has_direct_super: false,
            needs_super_binding: false,
            constructor_kind: ConstructorKind::None,
            expected_super_binding: SuperBinding::NotNeeded,
            loop_depth: 0,
            switch_depth: 0,
            labels: SmallVec::new(),
            declared_parameters: FxHashSet::default(),
            declared_variables: FxHashSet::default(),
            used_variables: FxHashSet::default(),
            closed_variables: FxHashSet::default(),
            written_variables: FxHashSet::default(),
        }
    }

    pub fn set_is_function(&mut self) {
        self.is_function = true;
        self.is_function_boundary = true;
    }

    // ---- Control flow ----

    pub fn start_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub fn end_loop(&mut self) {
        debug_assert!(self.loop_depth > 0);
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }

    pub fn start_switch(&mut self) {
        self.switch_depth += 1;
    }

    pub fn end_switch(&mut self) {
        self.switch_depth = self.switch_depth.saturating_sub(1);
    }

    pub fn break_is_valid(&self) -> bool {
        self.loop_depth > 0 || self.switch_depth > 0
    }

    pub fn continue_is_valid(&self) -> bool {
        self.loop_depth > 0
    }

    pub fn push_label(&mut self, name: Atom, is_loop: bool) {
        self.labels.push(ScopeLabel { name, is_loop });
    }

    pub fn pop_label(&mut self) {
        debug_assert!(!self.labels.is_empty());
        self.labels.pop();
    }

    pub fn label(&self, name: Atom) -> Option<ScopeLabel> {
        self.labels.iter().rev().find(|label| label.name == name).copied()
    }

    // ---- Declarations ----

    /// The function's own name, visible inside its body.
    pub fn declare_callee(&mut self, name: Atom, names: &KnownNames) {
        self.is_valid_strict_mode &= !names.is_eval_or_arguments(name);
        self.declared_variables.insert(name);
    }

    /// Returns false when strict code may not declare `name`.
    pub fn declare_variable(&mut self, name: Atom, names: &KnownNames) -> bool {
        let valid = !names.is_eval_or_arguments(name);
        self.is_valid_strict_mode &= valid;
        self.declared_variables.insert(name);
        valid
    }

    pub fn has_declared_variable(&self, name: Atom) -> bool {
        self.declared_variables.contains(&name)
    }

    pub fn has_declared_parameter(&self, name: Atom) -> bool {
        self.declared_parameters.contains(&name) || self.declared_variables.contains(&name)
    }

    /// Returns false when strict code may not use `name` as a parameter,
    /// including duplicates.
    pub fn declare_parameter(&mut self, name: Atom, names: &KnownNames) -> bool {
        let is_arguments = name == names.arguments;
        let is_new = self.declared_variables.insert(name);
        let valid = is_new && name != names.eval && !is_arguments;
        self.is_valid_strict_mode &= valid;
        self.declared_parameters.insert(name);
        if is_arguments {
            self.shadows_arguments = true;
        }
        valid
    }

    pub fn declare_bound_parameter(&mut self, name: Atom, names: &KnownNames) -> BindingResult {
        let is_arguments = name == names.arguments;
        let is_new = self.declared_variables.insert(name);
        let valid = is_new && name != names.eval && !is_arguments;
        self.is_valid_strict_mode &= valid;
        if is_arguments {
            self.shadows_arguments = true;
        }
        if !is_new {
            BindingResult::InvalidDuplicate
        } else if valid {
            BindingResult::Valid
        } else {
            BindingResult::InvalidStrictMode
        }
    }

    pub fn use_variable(&mut self, name: Atom, is_eval: bool) {
        self.uses_eval |= is_eval;
        self.used_variables.insert(name);
    }

    pub fn declare_write(&mut self, name: Atom) {
        self.written_variables.insert(name);
    }

    /// Fold a finished nested scope into this one. Names the nested scope
    /// declared itself stay behind.
    pub fn collect_free_variables(&mut self, nested: &Scope, track_closed: bool) {
        self.uses_eval |= nested.uses_eval;
        for &name in &nested.used_variables {
            if nested.declared_variables.contains(&name) {
                continue;
            }
            self.used_variables.insert(name);
            if track_closed {
                self.closed_variables.insert(name);
            }
        }
        for &name in &nested.written_variables {
            if !nested.declared_variables.contains(&name) {
                self.written_variables.insert(name);
            }
        }
    }

    /// Locals that nested functions close over, plus whether parameters or
    /// `arguments` may be modified behind the function's back.
    pub fn captured_variables(&self, names: &KnownNames) -> CapturedVariables {
        if self.needs_full_activation || self.uses_eval {
            return CapturedVariables {
                names: self.declared_variables.iter().copied().collect(),
                modified_parameter: true,
                modified_arguments: false,
            };
        }
        let mut captured = CapturedVariables {
            names: self
                .closed_variables
                .iter()
                .copied()
                .filter(|name| self.declared_variables.contains(name))
                .collect(),
            modified_parameter: false,
            modified_arguments: self.shadows_arguments,
        };
        if !self.declared_parameters.is_empty() {
            for &name in &self.written_variables {
                if name == names.arguments {
                    captured.modified_arguments = true;
                }
                if self.declared_parameters.contains(&name) {
                    captured.modified_parameter = true;
                    break;
                }
            }
        }
        captured
    }

    /// Used names that are not declared here: the function's free variables.
    pub fn free_used_variables(&self) -> Vec<Atom> {
        self.free_of(&self.used_variables)
    }

    /// Written names that are not declared here.
    pub fn free_written_variables(&self) -> Vec<Atom> {
        self.free_of(&self.written_variables)
    }

    fn free_of(&self, set: &FxHashSet<Atom>) -> Vec<Atom> {
        set.iter()
            .copied()
            .filter(|name| !self.declared_variables.contains(name))
            .collect()
    }

    /// Re-establish the summary a function-cache entry recorded.
    pub fn restore_summary(
        &mut self,
        strict: bool,
        uses_eval: bool,
        needs_full_activation: bool,
        used: impl IntoIterator<Item = Atom>,
        written: impl IntoIterator<Item = Atom>,
    ) {
        self.strict = strict;
        self.uses_eval = uses_eval;
        self.needs_full_activation = needs_full_activation;
        self.used_variables.extend(used);
        self.written_variables.extend(written);
    }
}

/// The stack of open scopes. Never empty while a parse is running.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    names: KnownNames,
}

impl ScopeStack {
    pub fn new(names: KnownNames) -> Self {
        ScopeStack {
            scopes: Vec::with_capacity(10),
            names,
        }
    }

    /// Push a scope inheriting strictness and function-ness from the
    /// current one.
    pub fn push(&mut self) -> usize {
        let (is_function, strict) = self
            .scopes
            .last()
            .map_or((false, false), |scope| (scope.is_function, scope.strict));
        self.scopes.push(Scope::new(is_function, strict));
        self.scopes.len() - 1
    }

    /// Pop the current scope and fold its free variables into the parent.
    /// The outermost scope is returned as-is.
    pub fn pop(&mut self, track_closed: bool) -> Option<Scope> {
        let scope = self.scopes.pop()?;
        if let Some(parent) = self.scopes.last_mut() {
            parent.collect_free_variables(&scope, track_closed);
        }
        Some(scope)
    }

    /// Pop without folding, for speculative scopes whose contents are
    /// discarded.
    pub fn discard(&mut self) {
        self.scopes.pop();
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Drop scopes above `len`, used when a save point is restored.
    pub fn truncate(&mut self, len: usize) {
        self.scopes.truncate(len);
    }

    #[inline]
    pub fn current(&self) -> &Scope {
        debug_assert!(!self.scopes.is_empty());
        &self.scopes[self.scopes.len() - 1]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Scope {
        debug_assert!(!self.scopes.is_empty());
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn current_index(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    pub fn get(&self, index: usize) -> &Scope {
        &self.scopes[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Scope {
        &mut self.scopes[index]
    }

    pub fn strict(&self) -> bool {
        self.scopes.last().is_some_and(|scope| scope.strict)
    }

    pub fn names(&self) -> &KnownNames {
        &self.names
    }

    /// Index of the innermost function-boundary scope, or the outermost
    /// scope at top level.
    pub fn function_scope_index(&self) -> usize {
        let mut i = self.scopes.len().saturating_sub(1);
        while i > 0 && !self.scopes[i].is_function_boundary {
            i -= 1;
        }
        i
    }

    /// Innermost function scope that is not an arrow function: arrows see
    /// the `this`, `super` and `arguments` of their surroundings.
    pub fn closest_non_arrow_function_index(&self) -> usize {
        let mut i = self.function_scope_index();
        while i > 0 && self.scopes[i].is_arrow {
            i -= 1;
            while i > 0 && !self.scopes[i].is_function_boundary {
                i -= 1;
            }
        }
        i
    }

    fn declaring_index(&self) -> usize {
        let mut i = self.scopes.len().saturating_sub(1);
        while i > 0 && !self.scopes[i].allows_new_decls {
            i -= 1;
        }
        i
    }

    /// Declare `name` in the nearest scope that accepts declarations.
    /// Returns false when strict code may not declare it.
    pub fn declare_variable(&mut self, name: Atom) -> bool {
        let names = self.names;
        let index = self.declaring_index();
        self.scopes[index].declare_variable(name, &names)
    }

    pub fn declare_callee(&mut self, name: Atom) {
        let names = self.names;
        self.current_mut().declare_callee(name, &names);
    }

    pub fn has_declared_variable(&self, name: Atom) -> bool {
        self.scopes[self.declaring_index()].has_declared_variable(name)
    }

    pub fn has_declared_parameter(&self, name: Atom) -> bool {
        self.scopes[self.declaring_index()].has_declared_parameter(name)
    }

    pub fn declare_parameter(&mut self, name: Atom) -> bool {
        let names = self.names;
        self.current_mut().declare_parameter(name, &names)
    }

    pub fn declare_bound_parameter(&mut self, name: Atom) -> BindingResult {
        let names = self.names;
        self.current_mut().declare_bound_parameter(name, &names)
    }

    pub fn use_variable(&mut self, name: Atom) {
        let is_eval = name == self.names.eval;
        self.current_mut().use_variable(name, is_eval);
    }

    pub fn declare_write(&mut self, name: Atom) {
        self.current_mut().declare_write(name);
    }

    pub fn captured_variables(&self) -> CapturedVariables {
        self.current().captured_variables(&self.names)
    }

    // ---- Labels, break and continue ----
    //
    // Lookups walk outward through enclosing scopes but stop at the first
    // function boundary.

    fn containing_scopes(&self) -> impl Iterator<Item = &Scope> {
        let last = self.scopes.len().saturating_sub(1);
        let mut stop = false;
        (0..=last).rev().map_while(move |i| {
            if stop || self.scopes.is_empty() {
                return None;
            }
            let scope = &self.scopes[i];
            stop = i == 0 || scope.is_function_boundary;
            Some(scope)
        })
    }

    pub fn label(&self, name: Atom) -> Option<ScopeLabel> {
        self.containing_scopes().find_map(|scope| scope.label(name))
    }

    pub fn break_is_valid(&self) -> bool {
        self.containing_scopes().any(Scope::break_is_valid)
    }

    pub fn continue_is_valid(&self) -> bool {
        self.containing_scopes().any(Scope::continue_is_valid)
    }
}

#[cfg(test)]
#[path = "parser/tests/scope_tests.rs"]
mod tests;
