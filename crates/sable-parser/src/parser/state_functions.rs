//! Parser state - functions, arrows, classes and lazy bodies

use std::sync::Arc;

use sable_common::limits::{
    FUNCTION_BODY_DEPTH_COST, MIN_CACHED_ARROW_FUNCTION_LENGTH, MIN_CACHED_FUNCTION_LENGTH,
};
use sable_common::{Atom, SourceSpan, TextPosition};
use sable_lexer::{LexerFlags, TokenKind};
use tracing::trace;

use super::{DestructuringKind, Parser};
use crate::ast::{
    ConstructorKind, FunctionMode, LazyFunction, PropertyKind, PropertyName, SuperBinding,
};
use crate::builder::{ParserClassInfo, ParserFunctionInfo, SyntaxChecker, TreeBuilder};
use crate::function_cache::FunctionCacheEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FunctionRequirements {
    None,
    NeedsName,
}

/// How a function body was obtained.
enum BodySource<N> {
    /// Built in full into the caller's builder.
    Eager(N),
    /// Walked with a `SyntaxChecker`.
    Checked,
    /// Skipped using a function-cache entry.
    Cached,
}

/// Where a function body ends.
#[derive(Clone, Copy)]
struct BodyEnd {
    last_token_start: u32,
    offset: u32,
    line: u32,
    line_start: u32,
}

impl<'a> Parser<'a> {
    // =========================================================================
    // Function productions
    // =========================================================================

    /// `function name(params) { body }` as a statement.
    pub(crate) fn parse_function_declaration<B: TreeBuilder>(
        &mut self,
        b: &mut B,
    ) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        let mut info = ParserFunctionInfo::new(FunctionMode::Normal);
        if self
            .parse_function_info(
                b,
                FunctionRequirements::NeedsName,
                true,
                ConstructorKind::None,
                SuperBinding::NotNeeded,
                &mut info,
            )
            .is_none()
        {
            return self.fail("Cannot parse this function");
        }
        if !self.scopes.declare_variable(info.name) && self.scopes.strict() {
            return self.semantic_fail(&format!(
                "Cannot declare a function named '{}' in strict mode",
                self.text(info.name)
            ));
        }
        Some(b.create_function_declaration(self.span_from(start), info))
    }

    /// `x => ...` or `(a, b) => ...`
    pub(crate) fn parse_arrow_function_expression<B: TreeBuilder>(
        &mut self,
        b: &mut B,
    ) -> Option<B::Node> {
        let start = self.token.location.start;
        let mut info = ParserFunctionInfo::new(FunctionMode::Arrow);
        self.parse_function_info(
            b,
            FunctionRequirements::None,
            true,
            ConstructorKind::None,
            SuperBinding::NotNeeded,
            &mut info,
        )?;
        Some(b.create_function_expr(self.span_from(start), info))
    }

    /// Whether the tokens ahead form the parameters of an arrow function.
    /// Looks ahead speculatively and always leaves the parser where it was.
    pub(crate) fn is_arrow_function_start<B: TreeBuilder>(&mut self, b: &mut B) -> bool {
        match self.token.kind {
            TokenKind::Identifier => {
                if self.lexer.peek_significant_byte() != Some(b'=') {
                    return false;
                }
                let save = self.save_point(b);
                self.next();
                let is_arrow = self.at(TokenKind::Arrow);
                self.restore(b, save);
                is_arrow
            }
            TokenKind::OpenParen => {
                let save = self.save_point(b);
                self.next();
                self.scopes.push();
                let scope = self.scopes.current_mut();
                scope.set_is_function();
                scope.is_arrow = true;
                let mut is_arrow = true;
                if !self.at(TokenKind::CloseParen) {
                    let mut checker = SyntaxChecker::new();
                    let mut info = ParserFunctionInfo::<SyntaxChecker>::new(FunctionMode::Arrow);
                    let outer = std::mem::replace(&mut self.in_arrow_lookahead, true);
                    is_arrow = self.parse_formal_parameters(&mut checker, &mut info).is_some();
                    self.in_arrow_lookahead = outer;
                }
                is_arrow = is_arrow && self.consume(TokenKind::CloseParen) && self.at(TokenKind::Arrow);
                self.restore(b, save);
                is_arrow
            }
            _ => false,
        }
    }

    /// Parse everything of a function after the `function` keyword (or
    /// from the parameters, for methods and arrows): optional name,
    /// parameters and body. The body is built in full, walked with a
    /// `SyntaxChecker`, or skipped through the function cache.
    pub(crate) fn parse_function_info<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        requirements: FunctionRequirements,
        name_in_containing_scope: bool,
        constructor_kind: ConstructorKind,
        super_binding: SuperBinding,
        info: &mut ParserFunctionInfo<B>,
    ) -> Option<()> {
        self.with_scope_rollback(|p| {
            p.parse_function_scope(
                b,
                requirements,
                name_in_containing_scope,
                constructor_kind,
                super_binding,
                info,
            )
        })
    }

    fn parse_function_scope<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        requirements: FunctionRequirements,
        name_in_containing_scope: bool,
        constructor_kind: ConstructorKind,
        super_binding: SuperBinding,
        info: &mut ParserFunctionInfo<B>,
    ) -> Option<()> {
        let force_eager = std::mem::take(&mut self.force_eager_body);
        let saved_function_name = self.last_function_name;
        let mode = info.mode;

        self.scopes.push();
        let scope = self.scopes.current_mut();
        scope.set_is_function();
        scope.is_arrow = mode == FunctionMode::Arrow;
        scope.constructor_kind = constructor_kind;
        scope.expected_super_binding = super_binding;

        if mode == FunctionMode::Normal {
            self.parse_function_name(requirements, name_in_containing_scope, info)?;
        }

        let params_start = self.token.location.start_position();
        info.start_offset = params_start.offset;
        info.start_line = params_start.line;
        info.constructor_kind = constructor_kind;
        self.parse_function_parameters(b, info)?;

        let expression_body = if mode == FunctionMode::Arrow {
            if !self.at(TokenKind::Arrow) {
                return self.fail("Expected a '=>' after arrow function parameter declaration");
            }
            if self.lexer.prev_terminator() {
                return self.fail_unexpected();
            }
            self.next();
            !self.at(TokenKind::OpenBrace)
        } else {
            if !self.at(TokenKind::OpenBrace) {
                return self.fail(&format!(
                    "Expected an opening '{{' at the start of a {} body",
                    mode.as_str()
                ));
            }
            false
        };

        let effective = {
            let scope = self.scopes.get(self.scopes.closest_non_arrow_function_index());
            (scope.constructor_kind, scope.expected_super_binding)
        };
        let body_start = self.token.location;
        info.body_start_column = body_start.column();

        let lazy = !(B::CREATES_AST && (self.options.eager_function_bodies || force_eager));
        let inherited_strict = self.scopes.strict();
        let cached = if lazy && B::CAN_USE_FUNCTION_CACHE {
            self.cache
                .as_deref()
                .and_then(|cache| cache.lookup(body_start.start))
                .filter(|entry| entry.inherited_strict == inherited_strict)
                .cloned()
        } else {
            None
        };

        let (source, end) = match cached {
            Some(entry) => {
                trace!(offset = body_start.start, end = entry.end_offset, "function cache hit");
                debug_assert_eq!(entry.parameter_count, info.parameter_count);
                self.restore_cached_summary(&entry);
                let end = BodyEnd {
                    last_token_start: entry.last_token_start,
                    offset: entry.end_offset,
                    line: entry.last_token_line,
                    line_start: entry.last_token_line_start,
                };
                (BodySource::Cached, end)
            }
            None => {
                let source = if lazy {
                    let mut checker = SyntaxChecker::new();
                    self.parse_function_body_contents(&mut checker, mode, expression_body)?;
                    BodySource::Checked
                } else {
                    b.begin_function_body();
                    let statements = self.parse_function_body_contents(b, mode, expression_body)?;
                    BodySource::Eager(statements)
                };
                let end = if expression_body {
                    BodyEnd {
                        last_token_start: self.last_token_start,
                        offset: self.last_token_end,
                        line: self.last_line,
                        line_start: self.last_line_start,
                    }
                } else {
                    if !self.at(TokenKind::CloseBrace) {
                        return self.fail(&format!(
                            "Expected a closing '}}' after a {} body",
                            mode.as_str()
                        ));
                    }
                    BodyEnd {
                        last_token_start: self.token.location.start,
                        offset: self.token.location.end,
                        line: self.lexer.line_number(),
                        line_start: self.lexer.line_start(),
                    }
                };
                (source, end)
            }
        };

        let strict = self.scopes.strict();
        if strict && self.names.is_eval_or_arguments(info.name) {
            return self.semantic_fail(&format!(
                "'{}' is not a valid function name in strict mode",
                self.text(info.name)
            ));
        }

        if matches!(source, BodySource::Checked) {
            self.record_function_cache_entry(
                body_start.start,
                params_start,
                end,
                info.parameter_count,
                inherited_strict,
                expression_body,
            );
        }
        if force_eager {
            self.reparsed_captures = self.scopes.captured_variables();
        }
        self.scopes.pop(B::NEEDS_FREE_VARIABLE_INFO);

        // The token after the body is lexed under the enclosing scope's
        // strictness.
        match source {
            BodySource::Cached => {
                self.resume_at(end.last_token_start, end.offset, end.line, end.line_start);
                if expression_body && !self.is_end_of_arrow_function() {
                    return self.fail_arrow_function_end();
                }
            }
            _ if !expression_body => self.next(),
            _ => {}
        }

        info.end_offset = end.offset;
        info.end_line = end.line;
        let body_span = SourceSpan::new(body_start.start, end.offset);
        let body = match source {
            BodySource::Eager(statements) => b.create_function_body(body_span, statements, strict),
            BodySource::Checked | BodySource::Cached => b.create_lazy_function_body(
                body_span,
                LazyFunction {
                    parameters_start: params_start,
                    end_offset: end.offset,
                    end_line: end.line,
                    parameter_count: info.parameter_count,
                    strict,
                    mode,
                    constructor_kind: effective.0,
                    super_binding: effective.1,
                    expression_body,
                },
            ),
        };
        info.body = Some(body);
        self.last_function_name = saved_function_name;
        Some(())
    }

    fn parse_function_name<B: TreeBuilder>(
        &mut self,
        requirements: FunctionRequirements,
        name_in_containing_scope: bool,
        info: &mut ParserFunctionInfo<B>,
    ) -> Option<()> {
        if self.at(TokenKind::Identifier) {
            let name = self.token.ident();
            info.name = name;
            self.last_function_name = name;
            self.next();
            if name_in_containing_scope {
                self.scopes.declare_callee(name);
            } else if !self.scopes.declare_variable(name) && self.scopes.strict() {
                return self.semantic_fail(&format!(
                    "'{}' is not a valid {} name in strict mode",
                    self.text(name),
                    info.mode.as_str()
                ));
            }
            return Some(());
        }
        if requirements == FunctionRequirements::NeedsName {
            if self.at(TokenKind::OpenParen) {
                return self.semantic_fail("Function statements must have a name");
            }
            self.fail_if_keyword("function name")?;
            return self.fail_unexpected();
        }
        self.last_function_name = Atom::NONE;
        Some(())
    }

    fn restore_cached_summary(&mut self, entry: &FunctionCacheEntry) {
        let interner = self.lexer.interner_mut();
        let used: Vec<Atom> = entry
            .used_variables
            .iter()
            .map(|name| interner.intern(name))
            .collect();
        let written: Vec<Atom> = entry
            .written_variables
            .iter()
            .map(|name| interner.intern(name))
            .collect();
        self.scopes.current_mut().restore_summary(
            entry.strict,
            entry.uses_eval,
            entry.needs_full_activation,
            used,
            written,
        );
    }

    /// Remember a walked body so the next parse of this source can skip
    /// it. Short bodies are cheaper to walk than to look up.
    fn record_function_cache_entry(
        &mut self,
        body_start: u32,
        params_start: TextPosition,
        end: BodyEnd,
        parameter_count: u32,
        inherited_strict: bool,
        expression_body: bool,
    ) {
        if self.cache.is_none() {
            return;
        }
        let length = end.offset.saturating_sub(params_start.offset);
        let min_length = if expression_body {
            MIN_CACHED_ARROW_FUNCTION_LENGTH
        } else {
            MIN_CACHED_FUNCTION_LENGTH
        };
        if length <= min_length {
            return;
        }

        let scope = self.scopes.current();
        let interner = self.lexer.interner();
        let shared = |names: Vec<Atom>| -> Vec<Arc<str>> {
            names
                .into_iter()
                .map(|name| interner.resolve_shared(name))
                .collect()
        };
        let entry = FunctionCacheEntry {
            end_offset: end.offset,
            last_token_start: end.last_token_start,
            last_token_line: end.line,
            last_token_line_start: end.line_start,
            parameter_count,
            inherited_strict,
            strict: scope.strict,
            needs_full_activation: scope.needs_full_activation,
            uses_eval: scope.uses_eval,
            used_variables: shared(scope.free_used_variables()),
            written_variables: shared(scope.free_written_variables()),
            is_arrow_expression_body: expression_body,
        };
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.insert(body_start, entry);
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    fn parse_function_parameters<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        info: &mut ParserFunctionInfo<B>,
    ) -> Option<()> {
        let mode = info.mode;
        if mode == FunctionMode::Arrow {
            if self.at(TokenKind::Identifier) {
                let Some(param) = self.parse_destructuring_pattern(b, DestructuringKind::Parameters, 0)
                else {
                    return self.fail("Cannot parse parameter pattern");
                };
                b.append(&mut info.params, param);
                info.parameter_count = 1;
                return Some(());
            }
            if self.consume(TokenKind::OpenParen) {
                if !self.at(TokenKind::CloseParen) {
                    self.parse_formal_parameters(b, info)?;
                }
                if !self.consume(TokenKind::CloseParen) {
                    return self.fail("Expected a ')' or a ',' after a parameter declaration");
                }
                return Some(());
            }
            self.fail_if_keyword("arrow function input parameter")?;
            return self.fail("Expected an arrow function input parameter");
        }

        if !self.consume(TokenKind::OpenParen) {
            self.fail_if_keyword(&format!("{} name", mode.as_str()))?;
            return self.fail(&format!(
                "Expected an opening '(' before a {}'s parameter list",
                mode.as_str()
            ));
        }
        match mode {
            FunctionMode::Getter => {
                if !self.consume(TokenKind::CloseParen) {
                    return self.fail("getter functions must have no parameters");
                }
            }
            FunctionMode::Setter => {
                if self.at(TokenKind::CloseParen) {
                    return self.fail("setter functions must have one parameter");
                }
                let Some(param) = self.parse_destructuring_pattern(b, DestructuringKind::Parameters, 0)
                else {
                    return self.fail("Cannot parse parameter pattern");
                };
                b.append(&mut info.params, param);
                info.parameter_count = 1;
                if !self.consume(TokenKind::CloseParen) {
                    return self.fail("Expected a ')' after a parameter declaration");
                }
            }
            _ => {
                if !self.at(TokenKind::CloseParen)
                    && self.parse_formal_parameters(b, info).is_none()
                {
                    return self.fail(&format!("Cannot parse parameters for this {}", mode.as_str()));
                }
                if !self.consume(TokenKind::CloseParen) {
                    return self.fail("Expected a ')' or a ',' after a parameter declaration");
                }
            }
        }
        Some(())
    }

    /// Comma-separated parameter patterns, up to (not including) `)`.
    fn parse_formal_parameters<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        info: &mut ParserFunctionInfo<B>,
    ) -> Option<()> {
        loop {
            let start = self.token.location.start;
            let Some(mut param) = self.parse_destructuring_pattern(b, DestructuringKind::Parameters, 0)
            else {
                return self.fail("Cannot parse parameter pattern");
            };
            if self.at(TokenKind::Equal) {
                if !self.parameter_defaults_allowed() {
                    return self
                        .semantic_fail("Default values in destructuring parameters are currently not supported");
                }
                self.next_with(B::DONT_BUILD_STRINGS);
                let Some(default) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse the default value of a parameter");
                };
                param = b.create_pattern_default(self.span_from(start), param, default);
            }
            b.append(&mut info.params, param);
            info.parameter_count += 1;
            if !self.consume(TokenKind::Comma) {
                return Some(());
            }
        }
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// Statements of a block body (stopping at its `}`), or the single
    /// expression of an arrow body wrapped in a `return`.
    fn parse_function_body_contents<C: TreeBuilder>(
        &mut self,
        c: &mut C,
        mode: FunctionMode,
        expression_body: bool,
    ) -> Option<C::List> {
        let saved_statement_depth = std::mem::take(&mut self.statement_depth);
        let saved_last_identifier = self.last_identifier;
        let saved_non_trivial = self.non_trivial_expression_count;
        let saved_allows_in = std::mem::replace(&mut self.allows_in, true);

        let result = self.with_depth_cost(FUNCTION_BODY_DEPTH_COST, |p| {
            if expression_body {
                p.parse_arrow_expression_body(c)
            } else {
                p.parse_block_body(c, mode)
            }
        });

        self.statement_depth = saved_statement_depth;
        self.last_identifier = saved_last_identifier;
        self.non_trivial_expression_count = saved_non_trivial;
        self.allows_in = saved_allows_in;
        result
    }

    fn parse_block_body<C: TreeBuilder>(&mut self, c: &mut C, mode: FunctionMode) -> Option<C::List> {
        self.next();
        if self.at(TokenKind::CloseBrace) {
            return Some(C::List::default());
        }
        let Some(statements) = self.parse_source_elements(c, true) else {
            return self.fail(&format!("Cannot parse the body of this {}", mode.as_str()));
        };
        Some(statements)
    }

    fn parse_arrow_expression_body<C: TreeBuilder>(&mut self, c: &mut C) -> Option<C::List> {
        let start = self.token.location.start;
        let Some(expression) = self.parse_assignment_expression(c) else {
            return self.fail("Cannot parse the arrow function expression");
        };
        if !self.is_end_of_arrow_function() {
            return self.fail_arrow_function_end();
        }
        let mut statements = C::List::default();
        let statement = c.create_return(self.span_from(start), Some(expression));
        c.append(&mut statements, statement);
        Some(statements)
    }

    fn is_end_of_arrow_function(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::CloseParen
                | TokenKind::CloseBrace
                | TokenKind::CloseBracket
                | TokenKind::Eof
                | TokenKind::Colon
        ) || self.lexer.prev_terminator()
    }

    fn fail_arrow_function_end<T>(&mut self) -> Option<T> {
        self.fail(
            "Expected a ';', ']', '}', ')', ',', line terminator or EOF following a arrow function statement",
        )
    }

    // =========================================================================
    // Lazy bodies
    // =========================================================================

    /// Rebuild the function a `LazyFunction` came from. The lexer resumes at
    /// its parameter list and the body is built eagerly.
    pub(crate) fn reparse_function<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        lazy: &LazyFunction,
    ) -> Option<B::Node> {
        let start = lazy.parameters_start.offset;
        self.scopes.push();
        let outer = self.scopes.current_mut();
        outer.set_is_function();
        outer.strict = lazy.strict;
        outer.constructor_kind = lazy.constructor_kind;
        outer.expected_super_binding = lazy.super_binding;

        let position = lazy.parameters_start;
        self.resume_at(position.offset, position.offset, position.line, position.line_start);
        self.force_eager_body = true;

        let (constructor_kind, super_binding) = if lazy.mode == FunctionMode::Arrow {
            (ConstructorKind::None, SuperBinding::NotNeeded)
        } else {
            (lazy.constructor_kind, lazy.super_binding)
        };
        let mut info = ParserFunctionInfo::new(lazy.mode);
        self.parse_function_info(
            b,
            FunctionRequirements::None,
            true,
            constructor_kind,
            super_binding,
            &mut info,
        )?;
        Some(b.create_function_expr(self.span_from(start), info))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn parse_class_declaration<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        let info = self.parse_class(b, FunctionRequirements::NeedsName)?;
        let name = info.name;
        self.scopes.declare_variable(name);
        b.add_var(name);
        Some(b.create_class_declaration(self.span_from(start), info))
    }

    /// `class Name extends Base { members }`. Class bodies are strict.
    pub(crate) fn parse_class<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        requirements: FunctionRequirements,
    ) -> Option<ParserClassInfo<B>> {
        self.with_scope_rollback(|p| p.parse_class_scope(b, requirements))
    }

    fn parse_class_scope<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        requirements: FunctionRequirements,
    ) -> Option<ParserClassInfo<B>> {
        self.next();
        self.scopes.push();
        self.scopes.current_mut().strict = true;

        let mut class = ParserClassInfo::<B>::default();
        if self.at(TokenKind::Identifier) {
            class.name = self.token.ident();
            self.next();
            if !self.scopes.declare_variable(class.name) {
                return self.semantic_fail(&format!(
                    "'{}' is not a valid class name",
                    self.text(class.name)
                ));
            }
        } else if requirements == FunctionRequirements::NeedsName {
            if self.at(TokenKind::OpenBrace) {
                return self.semantic_fail("Class statements must have a name");
            }
            self.fail_if_keyword("class name")?;
            return self.fail_unexpected();
        }

        let mut constructor_kind = ConstructorKind::Base;
        if self.consume(TokenKind::Extends) {
            let Some(parent) = self.parse_member_expression(b) else {
                return self.fail("Cannot parse the parent class name");
            };
            class.heritage = Some(parent);
            constructor_kind = ConstructorKind::Derived;
        }

        if !self.consume(TokenKind::OpenBrace) {
            return self.fail("Expected opening '{' at the start of a class body");
        }
        while !self.at(TokenKind::CloseBrace) {
            if self.consume(TokenKind::Semicolon) {
                continue;
            }
            self.parse_class_member(b, &mut class, constructor_kind)?;
        }

        self.scopes.pop(B::NEEDS_FREE_VARIABLE_INFO);
        self.next();
        Some(class)
    }

    fn parse_class_member<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        class: &mut ParserClassInfo<B>,
        constructor_kind: ConstructorKind,
    ) -> Option<()> {
        let start = self.token.location.start;
        let is_static = self.at(TokenKind::ReservedIfStrict) && self.token.ident() == self.names.static_;
        if is_static {
            self.next();
        }

        let kind = self.token.kind;
        match kind {
            TokenKind::Identifier | TokenKind::String | TokenKind::ReservedIfStrict => {}
            TokenKind::Number => {
                let key = PropertyName::Number(self.token.number());
                self.next();
                return self.parse_class_method(b, class, start, key, is_static, ConstructorKind::None);
            }
            TokenKind::OpenBracket => {
                self.next();
                let Some(key) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse computed property name");
                };
                self.expect_production(TokenKind::CloseBracket, "end", "computed property name")?;
                return self.parse_class_method(
                    b,
                    class,
                    start,
                    PropertyName::Computed(key),
                    is_static,
                    ConstructorKind::None,
                );
            }
            _ if kind.is_keyword() => {}
            _ => return self.fail_unexpected(),
        }

        let name = if kind == TokenKind::String {
            self.token.string()
        } else {
            self.token.ident()
        };
        self.next_with(LexerFlags::IGNORE_RESERVED_WORDS);

        if kind == TokenKind::Identifier
            && !self.at(TokenKind::OpenParen)
            && (name == self.names.get || name == self.names.set)
        {
            let accessor = if name == self.names.get {
                PropertyKind::Getter
            } else {
                PropertyKind::Setter
            };
            let property =
                self.parse_getter_setter(b, start, accessor, SuperBinding::Needed, is_static)?;
            if is_static {
                b.append(&mut class.static_methods, property);
            } else {
                b.append(&mut class.methods, property);
            }
            return Some(());
        }

        let is_constructor = !is_static && name == self.names.constructor;
        let member_constructor_kind = if is_constructor {
            constructor_kind
        } else {
            ConstructorKind::None
        };
        self.parse_class_method(
            b,
            class,
            start,
            PropertyName::Name(name),
            is_static,
            member_constructor_kind,
        )
    }

    /// A method once its key has been read; the current token is `(`.
    fn parse_class_method<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        class: &mut ParserClassInfo<B>,
        start: u32,
        key: PropertyName<B::Node>,
        is_static: bool,
        constructor_kind: ConstructorKind,
    ) -> Option<()> {
        let is_constructor = constructor_kind != ConstructorKind::None;
        let mut info = ParserFunctionInfo::new(FunctionMode::Method);
        if self
            .parse_function_info(
                b,
                FunctionRequirements::None,
                false,
                constructor_kind,
                SuperBinding::Needed,
                &mut info,
            )
            .is_none()
        {
            return self.fail("Cannot parse this method");
        }

        if is_constructor {
            if class.constructor.is_some() {
                return self.semantic_fail("Cannot declare multiple constructors in a single class");
            }
            info.name = class.name;
            class.constructor = Some(b.create_function_expr(self.span_from(start), info));
            return Some(());
        }
        if let PropertyName::Name(name) = key {
            if is_static && name == self.names.prototype {
                return self.semantic_fail("Cannot declare a static method named 'prototype'");
            }
            info.name = name;
        }
        let method = b.create_function_expr(self.span_from(start), info);
        let property = b.create_property(self.span_from(start), key, method, PropertyKind::Method);
        if is_static {
            b.append(&mut class.static_methods, property);
        } else {
            b.append(&mut class.methods, property);
        }
        Some(())
    }
}
