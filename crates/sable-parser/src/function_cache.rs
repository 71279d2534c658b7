//! Memo table for function bodies that were already validated.
//!
//! A body is keyed by the offset of its first token (`{`, or the first
//! token of an arrow's expression body). An entry records where the body
//! ends and the scope summary the enclosing function needs, so a later
//! parse of the same source can jump straight past it.
//!
//! Entries are only valid for the options and the enclosing strictness
//! they were checked under: the cache is bound to the source together with
//! the options that change what is legal, and an entry is skipped when the
//! scope around the body has a different strictness than it had then.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;

use crate::options::ParserOptions;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionCacheEntry {
    /// Offset just past the body's last token (`}` or the end of an
    /// arrow's expression body); lexing resumes here.
    pub end_offset: u32,
    /// Location of that last token.
    pub last_token_start: u32,
    pub last_token_line: u32,
    pub last_token_line_start: u32,
    pub parameter_count: u32,
    /// Strictness of the scope around the function when the body was
    /// checked.
    pub inherited_strict: bool,
    /// Strictness of the body itself, after its directive prologue.
    pub strict: bool,
    pub needs_full_activation: bool,
    pub uses_eval: bool,
    pub used_variables: Vec<Arc<str>>,
    pub written_variables: Vec<Arc<str>>,
    pub is_arrow_expression_body: bool,
}

/// Caller-owned cache shared across parses of one source text.
///
/// The cache binds to the first source and options it is used with.
/// Handing it a different source, or options under which different code is
/// legal, clears it.
#[derive(Debug, Default)]
pub struct FunctionCache {
    binding: Option<u64>,
    entries: FxHashMap<u32, FunctionCacheEntry>,
}

impl FunctionCache {
    pub fn new() -> Self {
        FunctionCache::default()
    }

    /// Bind to `source` parsed under `options`, dropping entries recorded
    /// for another text or another set of legality rules.
    pub fn bind_source(&mut self, source: &str, options: &ParserOptions) {
        let mut hasher = FxHasher::default();
        source.hash(&mut hasher);
        options.strict.hash(&mut hasher);
        options.allow_parameter_defaults.hash(&mut hasher);
        options.max_recursion_depth.hash(&mut hasher);
        let hash = hasher.finish();
        if self.binding != Some(hash) {
            if self.binding.is_some() {
                tracing::debug!(entries = self.entries.len(), "function cache rebound");
            }
            self.entries.clear();
            self.binding = Some(hash);
        }
    }

    #[inline]
    pub fn lookup(&self, body_start: u32) -> Option<&FunctionCacheEntry> {
        self.entries.get(&body_start)
    }

    pub fn insert(&mut self, body_start: u32, entry: FunctionCacheEntry) {
        self.entries.insert(body_start, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.binding = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(end_offset: u32) -> FunctionCacheEntry {
        FunctionCacheEntry {
            end_offset,
            last_token_start: end_offset - 1,
            last_token_line: 1,
            last_token_line_start: 0,
            parameter_count: 0,
            inherited_strict: false,
            strict: false,
            needs_full_activation: false,
            uses_eval: false,
            used_variables: vec![Arc::from("x")],
            written_variables: Vec::new(),
            is_arrow_expression_body: false,
        }
    }

    #[test]
    fn test_same_source_keeps_entries() {
        let mut cache = FunctionCache::new();
        cache.bind_source("function f() {}", &ParserOptions::default());
        cache.insert(13, entry(15));
        cache.bind_source("function f() {}", &ParserOptions::default());
        assert_eq!(cache.lookup(13).map(|e| e.end_offset), Some(15));
        assert_eq!(cache.lookup(0), None);
    }

    #[test]
    fn test_new_source_resets() {
        let mut cache = FunctionCache::new();
        cache.bind_source("function f() {}", &ParserOptions::default());
        cache.insert(13, entry(15));
        cache.bind_source("function g() {}", &ParserOptions::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_legality_options_reset() {
        let mut cache = FunctionCache::new();
        cache.bind_source("function f() {}", &ParserOptions::default());
        cache.insert(13, entry(15));

        let folding = ParserOptions {
            fold_constants: true,
            eager_function_bodies: true,
            ..ParserOptions::default()
        };
        cache.bind_source("function f() {}", &folding);
        assert_eq!(cache.len(), 1);

        cache.bind_source("function f() {}", &ParserOptions::strict());
        assert!(cache.is_empty());

        cache.insert(13, entry(15));
        let defaults = ParserOptions {
            allow_parameter_defaults: true,
            ..ParserOptions::strict()
        };
        cache.bind_source("function f() {}", &defaults);
        assert!(cache.is_empty());
    }
}
