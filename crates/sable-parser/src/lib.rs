//! Dual-backend JavaScript parser.
//!
//! One grammar, two tree builders:
//! - [`parse`] builds a `NodeArena` tree with `AstBuilder`.
//! - [`validate`] runs the same productions through `SyntaxChecker`, which
//!   allocates nothing and only answers "is this valid?".
//!
//! Both accept exactly the same inputs and report the same first error.
//! Nested function bodies are syntax-checked and recorded as lazy bodies
//! unless `ParserOptions::eager_function_bodies` is set; a lazy body can be
//! built later with [`parse_function_body`]. A caller-owned
//! [`FunctionCache`] lets repeated parses of one source skip bodies that
//! were already checked.

use std::sync::Arc;

use sable_common::{Atom, Interner};
use tracing::debug;

pub mod ast;
pub mod builder;
pub mod function_cache;
pub mod options;
pub mod parser;
pub mod scope;

pub use ast::{CodeFeatures, LazyFunction, NodeArena, NodeData, NodeIndex, NodeList, print_tree};
pub use builder::{AstBuilder, SyntaxChecker, TreeBuilder};
pub use function_cache::{FunctionCache, FunctionCacheEntry};
pub use options::{CodeType, ParserOptions};
pub use parser::Parser;
pub use sable_common::{ErrorCategory, ParseError};

/// A successfully built program or function.
#[derive(Debug)]
pub struct ParseOutput {
    pub arena: NodeArena,
    /// `Program` node, or the `Function` rebuilt by `parse_function_body`.
    pub root: NodeIndex,
    pub features: CodeFeatures,
    /// Locals of the outermost scope that nested functions close over,
    /// sorted.
    pub captured_variables: Vec<Arc<str>>,
    pub constant_count: u32,
    /// Top-level `var`/`let`/`const`/class names in declaration order.
    pub var_declarations: Vec<Atom>,
    /// Top-level function declarations.
    pub function_declarations: NodeList,
}

impl ParseOutput {
    pub fn interner(&self) -> &Interner {
        self.arena.interner()
    }

    /// S-expression rendering of the whole tree.
    pub fn print(&self) -> String {
        print_tree(&self.arena, self.root)
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.var_declarations
            .iter()
            .map(|&name| self.arena.resolve(name))
            .collect()
    }
}

/// Parse `source` into a full tree.
pub fn parse(source: &str, options: &ParserOptions) -> Result<ParseOutput, ParseError> {
    build(source, options, None, None)
}

/// Check `source` without building a tree.
pub fn validate(source: &str, options: &ParserOptions) -> Result<(), ParseError> {
    check(source, options, None)
}

/// `parse`, reusing and extending `cache`.
pub fn parse_with_cache(
    source: &str,
    options: &ParserOptions,
    cache: &mut FunctionCache,
) -> Result<ParseOutput, ParseError> {
    build(source, options, Some(cache), None)
}

/// `validate`, reusing and extending `cache`.
pub fn validate_with_cache(
    source: &str,
    options: &ParserOptions,
    cache: &mut FunctionCache,
) -> Result<(), ParseError> {
    check(source, options, Some(cache))
}

/// Build the function a lazy body was recorded for. `source` must be the
/// text the lazy body came from. The root of the result is a `Function`
/// node with a full body; functions nested in it stay lazy.
pub fn parse_function_body(
    source: &str,
    function: &LazyFunction,
    options: &ParserOptions,
) -> Result<ParseOutput, ParseError> {
    build(source, options, None, Some(function))
}

fn build(
    source: &str,
    options: &ParserOptions,
    cache: Option<&mut FunctionCache>,
    function: Option<&LazyFunction>,
) -> Result<ParseOutput, ParseError> {
    let mut parser = Parser::new(source, options, cache);
    let mut builder = AstBuilder::new(parser.names(), source.len(), options.fold_constants);
    let root = match function {
        Some(function) => parser.parse_lazy_function(&mut builder, function),
        None => parser.parse_program(&mut builder),
    };
    let Some(root) = root else {
        let error = parser.take_error();
        debug!(%error, "parse failed");
        return Err(error);
    };
    let summary = match function {
        Some(function) => parser.reparsed_summary(function.strict),
        None => parser.program_summary(),
    };
    let (arena, frame) = builder.finish(parser.into_interner());
    debug!(nodes = arena.len(), "parse finished");
    Ok(ParseOutput {
        arena,
        root,
        features: frame.features | summary.features,
        captured_variables: summary.captured_variables,
        constant_count: frame.constant_count,
        var_declarations: frame.var_declarations,
        function_declarations: frame.function_declarations,
    })
}

fn check(
    source: &str,
    options: &ParserOptions,
    cache: Option<&mut FunctionCache>,
) -> Result<(), ParseError> {
    let mut parser = Parser::new(source, options, cache);
    let mut checker = SyntaxChecker::new();
    match parser.parse_program(&mut checker) {
        Some(_) => Ok(()),
        None => {
            let error = parser.take_error();
            debug!(%error, "validation failed");
            Err(error)
        }
    }
}
