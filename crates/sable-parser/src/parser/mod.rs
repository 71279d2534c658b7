//! The grammar.
//!
//! `Parser` pulls tokens from the lexer one at a time and reports every
//! construct to a [`TreeBuilder`]. The same productions build a full tree
//! with `AstBuilder` and only validate with `SyntaxChecker`. Nested
//! function bodies are validated with a fresh `SyntaxChecker` and recorded
//! as lazy bodies unless eager bodies were requested.
//!
//! Productions return `Option`. `None` means an error has been latched in
//! `self.error`; the one exception is the statement production, which also
//! returns `None` without an error at the end of a statement list.
//!
//! The grammar is split by concern:
//! - `state_statements.rs`: statement lists, directives and statements
//! - `state_expressions.rs`: expressions, literals and operators
//! - `state_functions.rs`: functions, arrows, classes and lazy bodies
//! - `destructuring.rs`: binding and assignment patterns

mod depth;
mod destructuring;
mod state_expressions;
mod state_functions;
mod state_statements;

use std::sync::Arc;

use sable_common::{
    Atom, ErrorCategory, Interner, KnownNames, ParseError, SourceSpan, TokenLocation,
};
use sable_lexer::{LexError, Lexer, LexerFlags, LexerState, RegexError, Token, TokenKind};
use tracing::trace;

use crate::ast::{CodeFeatures, LazyFunction};
use crate::builder::TreeBuilder;
use crate::function_cache::FunctionCache;
use crate::options::ParserOptions;
use crate::scope::{CapturedVariables, ScopeStack};

pub(crate) use depth::DepthCounter;
pub(crate) use destructuring::DestructuringKind;

/// Builder and parser position captured before a speculative parse.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SavePoint<C> {
    /// Lexer state from just before the current token.
    lexer: LexerState,
    last_token_start: u32,
    last_token_end: u32,
    last_line: u32,
    last_line_start: u32,
    scopes_len: usize,
    non_trivial_expression_count: u32,
    last_identifier: Atom,
    checkpoint: C,
}

/// Scope facts about the unit that was parsed, read once the parse is done.
#[derive(Clone, Debug, Default)]
pub(crate) struct UnitSummary {
    pub features: CodeFeatures,
    /// Sorted.
    pub captured_variables: Vec<Arc<str>>,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    /// Lexer state from just before `token` was scanned.
    token_state: LexerState,
    /// Start and end of the previously consumed token.
    last_token_start: u32,
    last_token_end: u32,
    last_line: u32,
    last_line_start: u32,

    options: &'a ParserOptions,
    names: KnownNames,
    scopes: ScopeStack,
    error: Option<ParseError>,
    depth: DepthCounter,

    /// Statement nesting inside the current function body; 1 means
    /// directly in the body.
    statement_depth: u32,
    /// Cleared while parsing the head of a `for` statement.
    allows_in: bool,
    /// Bumped by every operator, call and member access, so a statement
    /// that leaves it unchanged was a bare literal.
    non_trivial_expression_count: u32,
    last_identifier: Atom,
    /// Names bound by assignment patterns still being parsed speculatively.
    pattern_writes: Vec<Atom>,
    /// Name of the function whose body is being parsed.
    last_function_name: Atom,

    cache: Option<&'a mut FunctionCache>,
    /// Build the next function body in full even when bodies are lazy.
    force_eager_body: bool,
    /// Set while looking ahead for arrow parameters. Parameter defaults
    /// are accepted so the shape is recognized; the committed parse applies
    /// `allow_parameter_defaults`.
    in_arrow_lookahead: bool,
    /// Scope summary of the last function body built through
    /// `force_eager_body`.
    reparsed_captures: CapturedVariables,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        options: &'a ParserOptions,
        cache: Option<&'a mut FunctionCache>,
    ) -> Self {
        let mut lexer = Lexer::new(source);
        let names = KnownNames::new(lexer.interner_mut());
        let mut cache = cache;
        if let Some(cache) = cache.as_deref_mut() {
            cache.bind_source(source, options);
        }
        Parser {
            lexer,
            token: Token::default(),
            token_state: LexerState::default(),
            last_token_start: 0,
            last_token_end: 0,
            last_line: 1,
            last_line_start: 0,
            options,
            names,
            scopes: ScopeStack::new(names),
            error: None,
            depth: DepthCounter::new(options.max_recursion_depth),
            statement_depth: 0,
            allows_in: true,
            non_trivial_expression_count: 0,
            last_identifier: Atom::NONE,
            pattern_writes: Vec::new(),
            last_function_name: Atom::NONE,
            cache,
            force_eager_body: false,
            in_arrow_lookahead: false,
            reparsed_captures: CapturedVariables::default(),
        }
    }

    pub fn names(&self) -> KnownNames {
        self.names
    }

    pub fn interner(&self) -> &Interner {
        self.lexer.interner()
    }

    pub fn into_interner(self) -> Interner {
        self.lexer.into_interner()
    }

    /// The latched error. A production that failed without latching one
    /// is reported at the current token.
    pub fn take_error(&mut self) -> ParseError {
        if self.error.is_none() {
            if self.depth.is_exceeded() {
                let _: Option<()> = self.stack_overflow();
            } else {
                let _: Option<()> = self.fail_unexpected();
            }
        }
        self.error.take().unwrap_or_else(|| {
            ParseError::new(
                ErrorCategory::Irrecoverable,
                "Parse error",
                self.token.span(),
                self.token.location.line,
                self.token.location.column(),
            )
        })
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Parse the whole source as a program (or eval code).
    pub fn parse_program<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        self.scopes.push();
        self.scopes.current_mut().strict = self.options.strict;
        self.next();

        let statements = self.parse_source_elements(b, true)?;
        if !self.at(TokenKind::Eof) {
            return self.fail_unexpected();
        }
        let strict = self.scopes.current().strict;
        let span = SourceSpan::new(0, self.lexer.source().len() as u32);
        Some(b.create_program(span, statements, strict, self.options.code_type))
    }

    /// Rebuild one function from the metadata of its lazy body. The
    /// returned node is a `Function` whose body is built in full; functions
    /// nested inside it stay lazy.
    pub fn parse_lazy_function<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        function: &LazyFunction,
    ) -> Option<B::Node> {
        self.reparse_function(b, function)
    }

    /// Features and captured variables of the outermost scope.
    pub(crate) fn program_summary(&self) -> UnitSummary {
        if self.scopes.is_empty() {
            return UnitSummary::default();
        }
        let scope = self.scopes.get(0);
        let captured = self.scopes.get(0).captured_variables(&self.names);
        self.summarize(scope.strict, scope.shadows_arguments, &captured)
    }

    /// Like `program_summary`, for the function rebuilt by
    /// `parse_lazy_function`.
    pub(crate) fn reparsed_summary(&self, strict: bool) -> UnitSummary {
        self.summarize(strict, false, &self.reparsed_captures)
    }

    fn summarize(
        &self,
        strict: bool,
        shadows_arguments: bool,
        captured: &CapturedVariables,
    ) -> UnitSummary {
        let mut features = CodeFeatures::empty();
        features.set(CodeFeatures::STRICT_MODE, strict);
        features.set(CodeFeatures::SHADOWS_ARGUMENTS, shadows_arguments);
        features.set(CodeFeatures::MODIFIED_PARAMETER, captured.modified_parameter);
        features.set(CodeFeatures::MODIFIED_ARGUMENTS, captured.modified_arguments);
        let interner = self.lexer.interner();
        let mut captured_variables: Vec<Arc<str>> = captured
            .names
            .iter()
            .map(|&name| interner.resolve_shared(name))
            .collect();
        captured_variables.sort();
        UnitSummary {
            features,
            captured_variables,
        }
    }

    // =========================================================================
    // Token handling
    // =========================================================================

    #[inline]
    pub(crate) fn next(&mut self) {
        self.next_with(LexerFlags::empty());
    }

    pub(crate) fn next_with(&mut self, flags: LexerFlags) {
        self.last_token_start = self.token.location.start;
        self.last_token_end = self.token.location.end;
        self.last_line = self.lexer.line_number();
        self.last_line_start = self.lexer.line_start();
        self.token_state = self.lexer.state();
        self.token = self.lexer.lex(flags, self.scopes.strict());
    }

    #[inline]
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    #[inline]
    pub(crate) fn consume(&mut self, kind: TokenKind) -> bool {
        self.consume_with(kind, LexerFlags::empty())
    }

    pub(crate) fn consume_with(&mut self, kind: TokenKind, flags: LexerFlags) -> bool {
        if self.token.kind != kind {
            return false;
        }
        self.next_with(flags);
        true
    }

    /// The current token is the contextual keyword `of`.
    pub(crate) fn at_of(&self) -> bool {
        self.at(TokenKind::Identifier) && self.token.ident() == self.names.of
    }

    /// Whether a statement may end here without a `;`.
    pub(crate) fn allows_automatic_semicolon(&self) -> bool {
        self.at(TokenKind::CloseBrace) || self.at(TokenKind::Eof) || self.lexer.prev_terminator()
    }

    /// Consume a `;` or accept an inserted one.
    pub(crate) fn auto_semicolon(&mut self) -> bool {
        if self.at(TokenKind::Semicolon) {
            self.next();
            return true;
        }
        self.allows_automatic_semicolon()
    }

    /// Continue lexing at `offset`, as if a token starting at
    /// `token_start` and ending there had just been consumed.
    pub(crate) fn resume_at(&mut self, token_start: u32, offset: u32, line: u32, line_start: u32) {
        self.lexer.set_offset(offset, line, line_start);
        self.last_token_start = token_start;
        self.last_token_end = offset;
        self.last_line = line;
        self.last_line_start = line_start;
        self.token_state = self.lexer.state();
        self.token = self.lexer.lex(LexerFlags::empty(), self.scopes.strict());
    }

    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> SourceSpan {
        SourceSpan::new(start, self.last_token_end.max(start))
    }

    #[inline]
    pub(crate) fn token_text(&self) -> &'a str {
        self.lexer.source_slice(self.token.span())
    }

    pub(crate) fn text(&self, atom: Atom) -> &str {
        self.lexer.interner().resolve(atom)
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    pub(crate) fn save_point<B: TreeBuilder>(&self, b: &B) -> SavePoint<B::Checkpoint> {
        SavePoint {
            lexer: self.token_state,
            last_token_start: self.last_token_start,
            last_token_end: self.last_token_end,
            last_line: self.last_line,
            last_line_start: self.last_line_start,
            scopes_len: self.scopes.len(),
            non_trivial_expression_count: self.non_trivial_expression_count,
            last_identifier: self.last_identifier,
            checkpoint: b.checkpoint(),
        }
    }

    /// Rewind to `save`, forgetting errors, scopes and nodes created since.
    pub(crate) fn restore<B: TreeBuilder>(&mut self, b: &mut B, save: SavePoint<B::Checkpoint>) {
        self.error = None;
        self.scopes.truncate(save.scopes_len);
        self.lexer.restore(save.lexer);
        self.last_token_start = save.last_token_start;
        self.last_token_end = save.last_token_end;
        self.last_line = save.last_line;
        self.last_line_start = save.last_line_start;
        self.non_trivial_expression_count = save.non_trivial_expression_count;
        self.last_identifier = save.last_identifier;
        self.token_state = save.lexer;
        self.token = self.lexer.lex(LexerFlags::empty(), self.scopes.strict());
        b.rollback(save.checkpoint);
    }

    pub(crate) fn parameter_defaults_allowed(&self) -> bool {
        self.options.allow_parameter_defaults || self.in_arrow_lookahead
    }

    /// Run `f` one level deeper, failing once the recursion budget is spent.
    #[inline]
    pub(crate) fn with_depth<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        self.with_depth_cost(1, f)
    }

    /// Like `with_depth`, for productions that cost more than one unit.
    #[inline]
    pub(crate) fn with_depth_cost<T>(
        &mut self,
        cost: u32,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if !self.depth.enter(cost) {
            return self.stack_overflow();
        }
        let result = f(self);
        self.depth.leave(cost);
        result
    }

    /// Run `f`, dropping the scopes it pushed when it fails so enclosing
    /// productions unwind against their own scope.
    #[inline]
    pub(crate) fn with_scope_rollback<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let scopes_len = self.scopes.len();
        let result = f(self);
        if result.is_none() {
            self.scopes.truncate(scopes_len);
        }
        result
    }

    // =========================================================================
    // Errors
    // =========================================================================

    fn latch(&mut self, category: ErrorCategory, message: String, location: TokenLocation) {
        if self.error.is_none() {
            trace!(category = category.as_str(), %message, "parse error");
            self.error = Some(ParseError::new(
                category,
                message,
                location.span(),
                location.line,
                location.column(),
            ));
        }
    }

    /// Latch the lexer's own error for an `Error` token.
    fn latch_lex_error(&mut self) {
        if let Some(err) = self.lexer.last_error().cloned() {
            self.lex_fail::<()>(&err);
        } else {
            let message = self.unexpected_token_message();
            self.latch(ErrorCategory::Lex, message, self.token.location);
        }
    }

    /// Report a lexer error as is.
    pub(crate) fn lex_fail<T>(&mut self, err: &LexError) -> Option<T> {
        if self.error.is_none() {
            self.error = Some(ParseError::new(
                err.category,
                err.message.clone(),
                err.span,
                err.line,
                err.column(),
            ));
        }
        None
    }

    fn unexpected_token_message(&self) -> String {
        let text = self.token_text();
        match self.token.kind {
            TokenKind::Eof => "Unexpected end of script".to_string(),
            TokenKind::String => format!("Unexpected string literal {text}"),
            TokenKind::Number => format!("Unexpected number '{text}'"),
            TokenKind::ReservedIfStrict if self.scopes.strict() => {
                format!("Unexpected use of reserved word '{text}' in strict mode")
            }
            TokenKind::Reserved | TokenKind::ReservedIfStrict => {
                format!("Unexpected use of reserved word '{text}'")
            }
            TokenKind::Identifier => format!("Unexpected identifier '{text}'"),
            kind if kind.is_keyword() => format!("Unexpected keyword '{text}'"),
            _ => format!("Unexpected token '{text}'"),
        }
    }

    fn syntax_category(&self) -> ErrorCategory {
        if self.at(TokenKind::Eof) {
            ErrorCategory::Recoverable
        } else {
            ErrorCategory::Irrecoverable
        }
    }

    /// Describe the current token, then `message`.
    pub(crate) fn fail<T>(&mut self, message: &str) -> Option<T> {
        if self.error.is_some() {
            return None;
        }
        if self.at(TokenKind::Error) {
            self.latch_lex_error();
            return None;
        }
        let message = format!("{}. {message}.", self.unexpected_token_message());
        self.latch(self.syntax_category(), message, self.token.location);
        None
    }

    /// Describe the current token and nothing else.
    pub(crate) fn fail_unexpected<T>(&mut self) -> Option<T> {
        if self.error.is_some() {
            return None;
        }
        if self.at(TokenKind::Error) {
            self.latch_lex_error();
            return None;
        }
        let message = self.unexpected_token_message();
        self.latch(self.syntax_category(), message, self.token.location);
        None
    }

    /// A well-formed construct that is not allowed here.
    pub(crate) fn semantic_fail<T>(&mut self, message: &str) -> Option<T> {
        self.latch(
            ErrorCategory::Semantic,
            format!("{message}."),
            self.token.location,
        );
        None
    }

    pub(crate) fn stack_overflow<T>(&mut self) -> Option<T> {
        self.latch(
            ErrorCategory::StackOverflow,
            "Stack exhausted.".to_string(),
            self.token.location,
        );
        None
    }

    pub(crate) fn regex_fail<T>(&mut self, error: &RegexError, location: TokenLocation) -> Option<T> {
        self.latch(
            ErrorCategory::RegexSyntax,
            format!("Invalid regular expression: {error}"),
            location,
        );
        None
    }

    /// Fail when the current token is a keyword or reserved word used
    /// where a name is required.
    pub(crate) fn fail_if_keyword(&mut self, description: &str) -> Option<()> {
        let text = self.token_text();
        match self.token.kind {
            TokenKind::ReservedIfStrict if self.scopes.strict() => self.semantic_fail(&format!(
                "Cannot use the reserved word '{text}' as a {description} in strict mode"
            )),
            TokenKind::Reserved | TokenKind::ReservedIfStrict => self.semantic_fail(&format!(
                "Cannot use the reserved word '{text}' as a {description}"
            )),
            kind if kind.is_keyword() => {
                self.semantic_fail(&format!("Cannot use the keyword '{text}' as a {description}"))
            }
            _ => Some(()),
        }
    }

    /// Consume `kind` or fail with "Expected '<kind>' to <operation> a
    /// <production>".
    pub(crate) fn expect_production(
        &mut self,
        kind: TokenKind,
        operation: &str,
        production: &str,
    ) -> Option<()> {
        if self.consume(kind) {
            return Some(());
        }
        self.fail(&format!(
            "Expected '{}' to {operation} a {production}",
            kind.as_str()
        ))
    }
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
