//! Parser state - expressions, literals and operators

use sable_common::Atom;
use sable_lexer::{LexerFlags, TokenData, TokenKind};
use smallvec::SmallVec;

use super::state_functions::FunctionRequirements;
use super::{DestructuringKind, Parser};
use crate::ast::{
    AssignOp, BinaryOp, ConstructorKind, FunctionMode, PropertyKind, PropertyName, SuperBinding,
    UnaryOp, UpdateOp,
};
use crate::builder::{BinaryStack, ParserFunctionInfo, TreeBuilder};

impl<'a> Parser<'a> {
    // =========================================================================
    // Comma and assignment
    // =========================================================================

    /// `a, b, c`
    pub(crate) fn parse_expression<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        let Some(first) = self.parse_assignment_expression(b) else {
            return self.fail("Cannot parse expression");
        };
        if !self.at(TokenKind::Comma) {
            return Some(first);
        }
        self.non_trivial_expression_count += 1;
        let mut expressions = B::List::default();
        b.append(&mut expressions, first);
        while self.consume_with(TokenKind::Comma, B::DONT_BUILD_STRINGS) {
            let Some(next) = self.parse_assignment_expression(b) else {
                return self.fail("Cannot parse expression in a comma expression");
            };
            b.append(&mut expressions, next);
        }
        Some(b.create_sequence(self.span_from(start), expressions))
    }

    pub(crate) fn parse_assignment_expression<B: TreeBuilder>(
        &mut self,
        b: &mut B,
    ) -> Option<B::Node> {
        self.with_depth(|p| p.parse_assignment_inner(b))
    }

    /// Assignments are right associative: targets and operators are stacked
    /// until the final value is parsed, then folded from the right.
    fn parse_assignment_inner<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let mut targets: SmallVec<[(B::Node, AssignOp, u32); 4]> = SmallVec::new();
        let mut start = self.token.location.start;

        let mut value = loop {
            if (self.at(TokenKind::OpenBrace) || self.at(TokenKind::OpenBracket))
                && let Some(assignment) = self.try_parse_destructuring_assignment(b)?
            {
                break assignment;
            }
            if self.is_arrow_function_start(b) {
                break self.parse_arrow_function_expression(b)?;
            }

            let lhs = self.parse_conditional_expression(b)?;
            let Some(op) = AssignOp::from_token(self.token.kind) else {
                break lhs;
            };
            if !b.is_location(lhs) {
                return self.semantic_fail(&format!(
                    "Left hand side of operator '{}' must be a reference",
                    op.as_str()
                ));
            }
            self.non_trivial_expression_count += 1;
            if b.is_resolve(lhs) {
                self.check_strict_modification()?;
                self.scopes.declare_write(self.last_identifier);
            }
            targets.push((lhs, op, start));
            self.next_with(B::DONT_BUILD_STRINGS);
            start = self.token.location.start;
        };

        while let Some((target, op, target_start)) = targets.pop() {
            value = b.create_assign(self.span_from(target_start), op, target, value);
        }
        Some(value)
    }

    /// `eval` and `arguments` may not be assigned in strict code. Relies on
    /// `last_identifier` naming the reference just parsed.
    fn check_strict_modification(&mut self) -> Option<()> {
        if !self.scopes.strict() {
            return Some(());
        }
        if self.last_identifier == self.names.eval {
            return self.semantic_fail("Cannot modify 'eval' in strict mode");
        }
        if self.last_identifier == self.names.arguments {
            return self.semantic_fail("Cannot modify 'arguments' in strict mode");
        }
        Some(())
    }

    /// `[a, b] = value` or `{a, b} = value`. The outer `None` is a committed
    /// failure; `Some(None)` means the input is not a destructuring
    /// assignment and nothing was consumed.
    fn try_parse_destructuring_assignment<B: TreeBuilder>(
        &mut self,
        b: &mut B,
    ) -> Option<Option<B::Node>> {
        let start = self.token.location.start;
        let save = self.save_point(b);
        let mark = self.pattern_writes.len();
        if let Some(pattern) =
            self.parse_destructuring_pattern(b, DestructuringKind::Expressions, 0)
            && self.at(TokenKind::Equal)
        {
            self.commit_pattern_writes(mark)?;
            self.next_with(B::DONT_BUILD_STRINGS);
            self.non_trivial_expression_count += 1;
            let Some(value) = self.parse_assignment_expression(b) else {
                return self.fail("Cannot parse the right hand side of an assignment expression");
            };
            return Some(Some(b.create_destructuring_assign(
                self.span_from(start),
                pattern,
                value,
            )));
        }
        self.pattern_writes.truncate(mark);
        self.restore(b, save);
        Some(None)
    }

    // =========================================================================
    // Conditional and binary
    // =========================================================================

    fn parse_conditional_expression<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        let test = self.parse_binary_expression(b)?;
        if !self.consume_with(TokenKind::Question, B::DONT_BUILD_STRINGS) {
            return Some(test);
        }
        self.non_trivial_expression_count += 1;

        let saved_allows_in = self.allows_in;
        self.allows_in = true;
        let consequent = self.parse_assignment_expression(b);
        self.allows_in = saved_allows_in;
        let Some(consequent) = consequent else {
            return self.fail("Cannot parse left hand side of ternary operator");
        };
        if !self.consume_with(TokenKind::Colon, B::DONT_BUILD_STRINGS) {
            return self.fail("Expected ':' in ternary operator");
        }
        let Some(alternate) = self.parse_assignment_expression(b) else {
            return self.fail("Cannot parse right hand side of ternary operator");
        };
        Some(b.create_conditional(self.span_from(start), test, consequent, alternate))
    }

    /// Operator precedence parsing over unary operands.
    fn parse_binary_expression<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let mut stack = BinaryStack::new();
        loop {
            let start = self.token.location.start;
            let (operand, prefixed) = self.parse_unary_expression(b)?;
            stack.push_operand(operand, self.span_from(start));

            let kind = self.token.kind;
            let precedence = kind.binary_precedence(self.allows_in);
            let Some(op) = BinaryOp::from_token(kind).filter(|_| precedence > 0) else {
                break;
            };
            if kind == TokenKind::Pow && prefixed {
                return self.fail(
                    "Ambiguous unary expression in the left hand side of the exponentiation expression; parentheses must be used to disambiguate the expression",
                );
            }
            self.non_trivial_expression_count += 1;
            self.next_with(B::DONT_BUILD_STRINGS);
            stack.reduce_for(b, precedence, kind.is_right_associative());
            stack.push_operator(op, precedence);
        }
        stack.finish(b).map(|(node, _)| node)
    }

    // =========================================================================
    // Unary and update
    // =========================================================================

    /// Returns the expression and whether it starts with a non-update prefix
    /// operator (`-x`, `typeof x`, ...).
    fn parse_unary_expression<B: TreeBuilder>(&mut self, b: &mut B) -> Option<(B::Node, bool)> {
        let saved_allows_in = self.allows_in;
        self.allows_in = true;
        let result = self.with_depth(|p| p.parse_unary_inner(b));
        self.allows_in = saved_allows_in;
        result
    }

    fn parse_unary_inner<B: TreeBuilder>(&mut self, b: &mut B) -> Option<(B::Node, bool)> {
        let mut operators: SmallVec<[(TokenKind, u32); 4]> = SmallVec::new();
        while self.token.kind.is_unary_operator() {
            operators.push((self.token.kind, self.token.location.start));
            self.non_trivial_expression_count += 1;
            self.next_with(B::DONT_BUILD_STRINGS);
        }
        let modifies = operators
            .last()
            .is_some_and(|&(kind, _)| matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus));
        let prefixed = operators
            .iter()
            .any(|&(kind, _)| !matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus));

        let start = self.token.location.start;
        let Some(mut expression) = self.parse_member_expression(b) else {
            return match operators.last() {
                Some(&(kind, _)) => self.fail(&format!(
                    "Cannot parse subexpression of {} operator",
                    kind.as_str()
                )),
                None => self.fail("Cannot parse member expression"),
            };
        };
        let names_eval_or_arguments = b.is_resolve(expression)
            && self.names.is_eval_or_arguments(self.last_identifier);
        if modifies && names_eval_or_arguments {
            self.check_strict_modification()?;
        }

        if matches!(self.token.kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.lexer.prev_terminator()
        {
            let op = if self.at(TokenKind::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            if !b.is_location(expression) {
                return self.semantic_fail(&format!(
                    "The {} operator requires a reference expression",
                    Self::update_operator_name(op, false)
                ));
            }
            if names_eval_or_arguments {
                self.check_strict_modification()?;
            }
            if b.is_resolve(expression) {
                self.scopes.declare_write(self.last_identifier);
            }
            self.non_trivial_expression_count += 1;
            self.next();
            expression = b.create_update(self.span_from(start), op, false, expression);
        }

        let resolved_name = self.last_identifier;
        for &(kind, op_start) in operators.iter().rev() {
            let span = self.span_from(op_start);
            expression = match kind {
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if kind == TokenKind::PlusPlus {
                        UpdateOp::Increment
                    } else {
                        UpdateOp::Decrement
                    };
                    if !b.is_location(expression) {
                        return self.semantic_fail(&format!(
                            "The {} operator requires a reference expression",
                            Self::update_operator_name(op, true)
                        ));
                    }
                    if b.is_resolve(expression) {
                        self.scopes.declare_write(resolved_name);
                    }
                    b.create_update(span, op, true, expression)
                }
                TokenKind::Delete => {
                    if self.scopes.strict() && b.is_resolve(expression) {
                        return self.semantic_fail(&format!(
                            "Cannot delete unqualified property '{}' in strict mode",
                            self.text(resolved_name)
                        ));
                    }
                    b.create_unary(span, UnaryOp::Delete, expression)
                }
                TokenKind::Plus => b.create_unary(span, UnaryOp::Plus, expression),
                TokenKind::Minus => b.create_unary(span, UnaryOp::Minus, expression),
                TokenKind::Exclamation => b.create_unary(span, UnaryOp::Not, expression),
                TokenKind::Tilde => b.create_unary(span, UnaryOp::BitNot, expression),
                TokenKind::TypeOf => b.create_unary(span, UnaryOp::TypeOf, expression),
                _ => b.create_unary(span, UnaryOp::Void, expression),
            };
        }
        Some((expression, prefixed))
    }

    fn update_operator_name(op: UpdateOp, prefix: bool) -> &'static str {
        match (op, prefix) {
            (UpdateOp::Increment, true) => "prefix-increment",
            (UpdateOp::Decrement, true) => "prefix-decrement",
            (UpdateOp::Increment, false) => "increment",
            (UpdateOp::Decrement, false) => "decrement",
        }
    }

    // =========================================================================
    // Member, call and new
    // =========================================================================

    pub(crate) fn parse_member_expression<B: TreeBuilder>(
        &mut self,
        b: &mut B,
    ) -> Option<B::Node> {
        self.with_depth(|p| p.parse_member_inner(b))
    }

    fn parse_member_inner<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        let mut new_count = 0u32;
        while self.at(TokenKind::New) {
            new_count += 1;
            self.next();
        }

        let mut base_is_super = self.at(TokenKind::Super);
        let mut base = if base_is_super {
            if new_count > 0 {
                return self.semantic_fail("Cannot use new with super");
            }
            let node = b.create_super(self.token.span());
            self.next();
            node
        } else {
            match self.parse_primary_expression(b) {
                Some(node) => node,
                None => return self.fail("Cannot parse base expression"),
            }
        };

        loop {
            match self.token.kind {
                TokenKind::OpenBracket => {
                    if base_is_super {
                        self.check_super_property()?;
                    }
                    self.non_trivial_expression_count += 1;
                    self.next();
                    let Some(property) = self.parse_expression(b) else {
                        return self.fail("Cannot parse subscript expression");
                    };
                    self.expect_production(TokenKind::CloseBracket, "end", "subscript expression")?;
                    base = b.create_bracket(self.span_from(start), base, property);
                }
                TokenKind::OpenParen => {
                    self.non_trivial_expression_count += 1;
                    if new_count > 0 {
                        new_count -= 1;
                        let arguments = self.parse_arguments(b)?;
                        base = b.create_new(self.span_from(start), base, Some(arguments));
                    } else {
                        if base_is_super {
                            self.check_super_call()?;
                        }
                        let arguments = self.parse_arguments(b)?;
                        base = b.create_call(self.span_from(start), base, arguments);
                    }
                }
                TokenKind::Dot => {
                    if base_is_super {
                        self.check_super_property()?;
                    }
                    self.non_trivial_expression_count += 1;
                    let object_is_arguments =
                        b.is_resolve(base) && self.last_identifier == self.names.arguments;
                    self.next_with(LexerFlags::IGNORE_RESERVED_WORDS | B::DONT_BUILD_KEYWORDS);
                    if !self.at(TokenKind::Identifier) {
                        return self.fail("Expected a property name after '.'");
                    }
                    let name = self.token.ident();
                    if object_is_arguments
                        && self.scopes.strict()
                        && (name == self.names.callee || name == self.names.caller)
                    {
                        return self.semantic_fail(&format!(
                            "Cannot access '{}' on 'arguments' in strict mode",
                            self.text(name)
                        ));
                    }
                    self.next();
                    base = b.create_dot(self.span_from(start), base, name);
                }
                TokenKind::Template => {
                    if base_is_super {
                        return self.semantic_fail("Cannot use super as tag for tagged templates");
                    }
                    self.non_trivial_expression_count += 1;
                    let quasi = self.parse_template_literal(b)?;
                    base = b.create_tagged_template(self.span_from(start), base, quasi);
                }
                _ => break,
            }
            base_is_super = false;
        }

        if base_is_super {
            return self.semantic_fail("Cannot reference super");
        }
        while new_count > 0 {
            new_count -= 1;
            base = b.create_new(self.span_from(start), base, None);
        }
        Some(base)
    }

    /// `super.x` and `super[x]` need a method-like function around them.
    fn check_super_property(&mut self) -> Option<()> {
        let index = self.scopes.closest_non_arrow_function_index();
        let scope = self.scopes.get_mut(index);
        scope.needs_super_binding = true;
        if scope.expected_super_binding == SuperBinding::NotNeeded {
            return self.semantic_fail("super is not valid in this context");
        }
        Some(())
    }

    /// `super(...)` is only allowed in a derived class constructor.
    fn check_super_call(&mut self) -> Option<()> {
        let index = self.scopes.closest_non_arrow_function_index();
        let scope = self.scopes.get_mut(index);
        if scope.constructor_kind != ConstructorKind::Derived {
            return self.semantic_fail("super is not valid in this context");
        }
        scope.has_direct_super = true;
        Some(())
    }

    /// `(a, ...b)`
    fn parse_arguments<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::List> {
        if !self.consume_with(TokenKind::OpenParen, B::DONT_BUILD_STRINGS) {
            return self.fail("Expected opening '(' at start of argument list");
        }
        let mut arguments = B::List::default();
        if self.consume(TokenKind::CloseParen) {
            return Some(arguments);
        }
        loop {
            let argument = if self.at(TokenKind::DotDotDot) {
                let start = self.token.location.start;
                self.next();
                let Some(argument) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse spread expression");
                };
                b.create_spread(self.span_from(start), argument)
            } else {
                let Some(argument) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse function argument");
                };
                argument
            };
            b.append(&mut arguments, argument);
            if !self.consume_with(TokenKind::Comma, B::DONT_BUILD_STRINGS) {
                break;
            }
        }
        if self.at(TokenKind::DotDotDot) {
            return self.semantic_fail("The '...' operator should come before the target expression");
        }
        self.expect_production(TokenKind::CloseParen, "end", "argument list")?;
        Some(arguments)
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        self.with_depth(|p| p.parse_primary_inner(b))
    }

    fn parse_primary_inner<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let span = self.token.span();
        match self.token.kind {
            TokenKind::Function => {
                self.next();
                let mut info = ParserFunctionInfo::new(FunctionMode::Normal);
                if self
                    .parse_function_info(
                        b,
                        FunctionRequirements::None,
                        false,
                        ConstructorKind::None,
                        SuperBinding::NotNeeded,
                        &mut info,
                    )
                    .is_none()
                {
                    return self.fail("Cannot parse function expression");
                }
                Some(b.create_function_expr(self.span_from(span.start), info))
            }
            TokenKind::Class => {
                let info = self.parse_class(b, FunctionRequirements::None)?;
                Some(b.create_class_expr(self.span_from(span.start), info))
            }
            TokenKind::OpenBrace => self.parse_object_literal(b),
            TokenKind::OpenBracket => self.parse_array_literal(b),
            TokenKind::OpenParen => {
                self.next();
                let expression = self.parse_expression(b)?;
                self.expect_production(TokenKind::CloseParen, "end", "compound expression")?;
                Some(expression)
            }
            TokenKind::This => {
                self.next();
                Some(b.create_this(span))
            }
            TokenKind::Identifier => {
                let name = self.token.ident();
                self.next();
                self.scopes.use_variable(name);
                self.last_identifier = name;
                Some(b.create_resolve(span, name))
            }
            TokenKind::String => {
                let value = self.token.string();
                self.next();
                Some(b.create_string(span, value))
            }
            TokenKind::Number => {
                let value = self.token.number();
                self.next();
                Some(b.create_number(span, value))
            }
            TokenKind::Null => {
                self.next();
                Some(b.create_null(span))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at(TokenKind::True);
                self.next();
                Some(b.create_boolean(span, value))
            }
            TokenKind::Divide | TokenKind::DivideEqual => self.parse_regex_literal(b),
            TokenKind::Template => self.parse_template_literal(b),
            _ => self.fail_unexpected(),
        }
    }

    /// Re-scan the current `/` or `/=` as a regular expression literal.
    fn parse_regex_literal<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let prefix_eq = self.at(TokenKind::DivideEqual);
        let (pattern, flags) = match self.lexer.scan_regex(prefix_eq) {
            Ok(scanned) => scanned,
            Err(err) => return self.lex_fail(&err),
        };
        let mut location = self.token.location;
        location.end = self.lexer.current_offset();
        self.token.location = location;
        self.non_trivial_expression_count += 1;

        let interner = self.lexer.interner();
        let node = b.create_regex(
            location.span(),
            pattern,
            flags,
            interner.resolve(pattern),
            interner.resolve(flags),
        );
        self.next();
        match node {
            Ok(node) => Some(node),
            Err(error) => self.regex_fail(&error, location),
        }
    }

    /// `` `a${b}c` `` starting at the head element.
    fn parse_template_literal<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        let mut quasis = B::List::default();
        let mut expressions = B::List::default();
        loop {
            let (true, TokenData::Template { cooked, raw, tail }) =
                (self.at(TokenKind::Template), self.token.data)
            else {
                return self.fail("Expected a template element");
            };
            let element = b.create_template_element(self.token.span(), cooked, raw);
            b.append(&mut quasis, element);
            self.next();
            if tail {
                break;
            }
            if self.at(TokenKind::CloseBrace) {
                return self.fail("Template literal expression cannot be empty");
            }
            let Some(expression) = self.parse_expression(b) else {
                return self.fail("Cannot parse expression in template literal");
            };
            b.append(&mut expressions, expression);
            if !self.at(TokenKind::CloseBrace) {
                return self
                    .fail("Expected a closing '}' following an expression in template literal");
            }
            self.token = self.lexer.scan_template_continuation();
        }
        Some(b.create_template_literal(self.span_from(start), quasis, expressions))
    }

    // =========================================================================
    // Array and object literals
    // =========================================================================

    fn parse_array_literal<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next_with(B::DONT_BUILD_STRINGS);
        let mut elements = B::List::default();
        loop {
            while self.at(TokenKind::Comma) {
                b.append_hole(&mut elements);
                self.next_with(B::DONT_BUILD_STRINGS);
            }
            if self.at(TokenKind::CloseBracket) {
                break;
            }
            let element = if self.at(TokenKind::DotDotDot) {
                let spread_start = self.token.location.start;
                self.next();
                let Some(argument) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse subject of a spread operation");
                };
                b.create_spread(self.span_from(spread_start), argument)
            } else {
                let Some(element) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse array literal element");
                };
                element
            };
            b.append(&mut elements, element);
            if !self.consume_with(TokenKind::Comma, B::DONT_BUILD_STRINGS) {
                break;
            }
        }
        if !self.at(TokenKind::CloseBracket) {
            if self.at(TokenKind::DotDotDot) {
                return self
                    .semantic_fail("The '...' operator should come before a target expression");
            }
            return self.fail("Expected either a closing ']' or a ',' following an array element");
        }
        self.next();
        Some(b.create_array(self.span_from(start), elements))
    }

    fn parse_object_literal<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        // Keys are lexed with strings built even in check-only mode: the
        // duplicate `__proto__` check reads them.
        self.next();
        let mut properties = B::List::default();
        let mut seen_proto = false;
        while !self.at(TokenKind::CloseBrace) {
            let Some(property) = self.parse_property(b, &mut seen_proto) else {
                return self.fail("Cannot parse object literal property");
            };
            b.append(&mut properties, property);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect_production(TokenKind::CloseBrace, "end", "object literal")?;
        Some(b.create_object(self.span_from(start), properties))
    }

    fn parse_property<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        seen_proto: &mut bool,
    ) -> Option<B::Node> {
        let start = self.token.location.start;
        let kind = self.token.kind;
        match kind {
            TokenKind::Identifier | TokenKind::String => {}
            TokenKind::Number => {
                let key = PropertyName::Number(self.token.number());
                self.next();
                return self.parse_property_value(b, start, key, "Expected ':' after property name");
            }
            TokenKind::OpenBracket => {
                self.next();
                let Some(key) = self.parse_assignment_expression(b) else {
                    return self.fail("Cannot parse computed property name");
                };
                self.expect_production(TokenKind::CloseBracket, "end", "computed property name")?;
                return self.parse_property_value(
                    b,
                    start,
                    PropertyName::Computed(key),
                    "Expected ':' after property name",
                );
            }
            _ if kind.is_keyword() => {}
            _ => return self.fail("Expected a property name"),
        }

        let name_location = self.token.location;
        let name = if kind == TokenKind::String {
            self.token.string()
        } else {
            self.token.ident()
        };
        self.next_with(LexerFlags::IGNORE_RESERVED_WORDS);

        if self.consume(TokenKind::Colon) {
            let Some(value) = self.parse_assignment_expression(b) else {
                return self.fail("Cannot parse expression for property declaration");
            };
            if name == self.names.proto {
                if *seen_proto {
                    return self.semantic_fail("Attempted to redefine __proto__ property");
                }
                *seen_proto = true;
            }
            return Some(b.create_property(
                self.span_from(start),
                PropertyName::Name(name),
                value,
                PropertyKind::Init,
            ));
        }
        if self.at(TokenKind::OpenParen) {
            let method = self.parse_method(b, start, name, FunctionMode::Method)?;
            return Some(b.create_property(
                self.span_from(start),
                PropertyName::Name(name),
                method,
                PropertyKind::Method,
            ));
        }
        if kind != TokenKind::Identifier {
            return self.fail("Expected an identifier as property name");
        }
        if self.at(TokenKind::Comma) || self.at(TokenKind::CloseBrace) {
            self.scopes.use_variable(name);
            self.last_identifier = name;
            let value = b.create_resolve(name_location.span(), name);
            return Some(b.create_property(
                self.span_from(start),
                PropertyName::Name(name),
                value,
                PropertyKind::Shorthand,
            ));
        }
        let accessor = if name == self.names.get {
            PropertyKind::Getter
        } else if name == self.names.set {
            PropertyKind::Setter
        } else {
            return self.fail(&format!(
                "Expected a ':' following the property name '{}'",
                self.text(name)
            ));
        };
        self.parse_getter_setter(
            b,
            start,
            accessor,
            SuperBinding::NotNeeded,
            false,
        )
    }

    /// `: value` or `(params) { body }` after a number or computed key.
    fn parse_property_value<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        start: u32,
        key: PropertyName<B::Node>,
        missing_colon: &str,
    ) -> Option<B::Node> {
        if self.at(TokenKind::OpenParen) {
            let method = self.parse_method(b, start, Atom::NONE, FunctionMode::Method)?;
            return Some(b.create_property(self.span_from(start), key, method, PropertyKind::Method));
        }
        if !self.consume(TokenKind::Colon) {
            return self.fail(missing_colon);
        }
        let Some(value) = self.parse_assignment_expression(b) else {
            return self.fail("Cannot parse expression for property declaration");
        };
        Some(b.create_property(self.span_from(start), key, value, PropertyKind::Init))
    }

    /// An object literal method: the key has been consumed and the current
    /// token is `(`.
    fn parse_method<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        start: u32,
        name: Atom,
        mode: FunctionMode,
    ) -> Option<B::Node> {
        let mut info = ParserFunctionInfo::new(mode);
        if self
            .parse_function_info(
                b,
                FunctionRequirements::None,
                false,
                ConstructorKind::None,
                SuperBinding::NotNeeded,
                &mut info,
            )
            .is_none()
        {
            return self.fail("Cannot parse this method");
        }
        info.name = name;
        Some(b.create_function_expr(self.span_from(start), info))
    }

    /// `get name() {}` / `set name(v) {}` after the `get`/`set` word. In a
    /// class body (`super_binding` is `Needed`), `constructor` is not a valid
    /// accessor name and static accessors may not be named `prototype`.
    pub(crate) fn parse_getter_setter<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        start: u32,
        kind: PropertyKind,
        super_binding: SuperBinding,
        is_static: bool,
    ) -> Option<B::Node> {
        let key = match self.token.kind {
            TokenKind::Identifier => PropertyName::Name(self.token.ident()),
            TokenKind::String => PropertyName::Name(self.token.string()),
            TokenKind::Number => PropertyName::Number(self.token.number()),
            _ => return self.fail_unexpected(),
        };
        if super_binding == SuperBinding::Needed
            && let PropertyName::Name(name) = key
        {
            if name == self.names.constructor {
                return self.semantic_fail("Cannot declare a getter or setter named 'constructor'");
            }
            if is_static && name == self.names.prototype {
                return self.semantic_fail("Cannot declare a static method named 'prototype'");
            }
        }
        self.next();

        let (mode, what) = if kind == PropertyKind::Getter {
            (FunctionMode::Getter, "getter")
        } else {
            (FunctionMode::Setter, "setter")
        };
        if !self.at(TokenKind::OpenParen) {
            return self.fail(&format!("Expected a parameter list for {what} definition"));
        }
        let mut info = ParserFunctionInfo::new(mode);
        if self
            .parse_function_info(
                b,
                FunctionRequirements::None,
                false,
                ConstructorKind::None,
                super_binding,
                &mut info,
            )
            .is_none()
        {
            return self.fail(&format!("Cannot parse {what} definition"));
        }
        if let PropertyName::Name(name) = key {
            info.name = name;
        }
        let function = b.create_function_expr(self.span_from(start), info);
        Some(b.create_property(self.span_from(start), key, function, kind))
    }
}
