//! Parser state - statement lists, directives and statements

use sable_common::{Atom, SourceSpan};
use sable_lexer::TokenKind;
use smallvec::SmallVec;
use tracing::trace;

use super::{DestructuringKind, Parser};
use crate::ast::VarKind;
use crate::builder::TreeBuilder;

/// Declarators of one `var`/`let`/`const` list, plus what a `for` head
/// needs to know about the last one.
pub(crate) struct DeclarationList<B: TreeBuilder> {
    pub list: B::List,
    pub count: u32,
    pub last_is_binding: bool,
    pub last_has_initializer: bool,
}

const USE_STRICT_LENGTH: u32 = "\"use strict\"".len() as u32;

impl<'a> Parser<'a> {
    // =========================================================================
    // Statement lists and directives
    // =========================================================================

    /// Parse statements until the end of the enclosing list. With
    /// `check_directives`, a leading `"use strict"` switches the current
    /// scope to strict mode and the list is parsed again from its start.
    pub(crate) fn parse_source_elements<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        check_directives: bool,
    ) -> Option<B::List> {
        let list_start = self.save_point(b);
        let mut statements = B::List::default();
        let mut in_prologue = check_directives;
        let mut switched_to_strict = false;

        loop {
            let mut directive = None;
            let Some(statement) = self.parse_statement_list_item(b, &mut directive) else {
                break;
            };
            if in_prologue {
                match directive {
                    Some(span) if !switched_to_strict && self.is_use_strict(span) => {
                        self.scopes.current_mut().strict = true;
                        switched_to_strict = true;
                        if !self.scopes.current().is_valid_strict_mode {
                            return self.fail_retroactive_strict_mode();
                        }
                        trace!(offset = span.start, "strict directive, reparsing list");
                        self.restore(b, list_start);
                        statements = B::List::default();
                        continue;
                    }
                    Some(_) => {}
                    None => in_prologue = false,
                }
            }
            b.append(&mut statements, statement);
        }

        if self.error.is_some() {
            return None;
        }
        Some(statements)
    }

    fn is_use_strict(&self, span: SourceSpan) -> bool {
        if span.len() != USE_STRICT_LENGTH {
            return false;
        }
        let text = self.lexer.source_slice(span);
        text.get(1..text.len() - 1) == Some("use strict")
    }

    /// Names declared before a `"use strict"` directive that strict code
    /// does not allow.
    fn fail_retroactive_strict_mode<T>(&mut self) -> Option<T> {
        let names = self.names;
        if self.last_function_name == names.arguments {
            return self.semantic_fail("Cannot name a function 'arguments' in strict mode");
        }
        if self.last_function_name == names.eval {
            return self.semantic_fail("Cannot name a function 'eval' in strict mode");
        }
        if self.scopes.has_declared_variable(names.arguments) {
            return self.semantic_fail("Cannot declare a variable named 'arguments' in strict mode");
        }
        if self.scopes.has_declared_variable(names.eval) {
            return self.semantic_fail("Cannot declare a variable named 'eval' in strict mode");
        }
        self.semantic_fail("Invalid parameters or function name in strict mode")
    }

    /// A statement, or one of the declarations only allowed directly in a
    /// statement list.
    fn parse_statement_list_item<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        directive: &mut Option<SourceSpan>,
    ) -> Option<B::Node> {
        match self.token.kind {
            TokenKind::Const => self.parse_variable_statement(b, VarKind::Const),
            TokenKind::Class => self.parse_class_declaration(b),
            _ if self.at_let_declaration() => self.parse_variable_statement(b, VarKind::Let),
            _ => self.parse_statement(b, directive),
        }
    }

    /// `let` followed by something that can start a binding.
    pub(crate) fn at_let_declaration(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::Identifier | TokenKind::ReservedIfStrict
        ) && self.token.ident() == self.names.let_
            && matches!(
                self.lexer.peek_significant_byte(),
                Some(b'[' | b'{' | b'_' | b'$' | b'\\' | b'a'..=b'z' | b'A'..=b'Z' | 0x80..=0xff)
            )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse one statement. Returns `None` without an error at a token that
    /// ends a statement list (`}`, `case`, `default`, end of script).
    pub(crate) fn parse_statement<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        directive: &mut Option<SourceSpan>,
    ) -> Option<B::Node> {
        *directive = None;
        self.statement_depth += 1;
        let result = self.with_depth(|p| p.parse_statement_inner(b, directive));
        self.statement_depth -= 1;
        result
    }

    fn parse_statement_inner<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        directive: &mut Option<SourceSpan>,
    ) -> Option<B::Node> {
        match self.token.kind {
            TokenKind::OpenBrace => self.parse_block_statement(b),
            TokenKind::Var => self.parse_variable_statement(b, VarKind::Var),
            TokenKind::Function => {
                if self.scopes.strict() && self.statement_depth != 1 {
                    return self.semantic_fail(
                        "Strict mode does not allow function declarations in a lexically nested statement",
                    );
                }
                self.parse_function_declaration(b)
            }
            TokenKind::Semicolon => {
                let span = self.token.span();
                self.next();
                Some(b.create_empty(span))
            }
            TokenKind::If => self.parse_if_statement(b),
            TokenKind::Do => self.parse_do_while_statement(b),
            TokenKind::While => self.parse_while_statement(b),
            TokenKind::For => self.parse_for_statement(b),
            TokenKind::Continue => self.parse_continue_statement(b),
            TokenKind::Break => self.parse_break_statement(b),
            TokenKind::Return => self.parse_return_statement(b),
            TokenKind::With => self.parse_with_statement(b),
            TokenKind::Switch => self.parse_switch_statement(b),
            TokenKind::Throw => self.parse_throw_statement(b),
            TokenKind::Try => self.parse_try_statement(b),
            TokenKind::Debugger => self.parse_debugger_statement(b),
            TokenKind::Eof | TokenKind::Case | TokenKind::CloseBrace | TokenKind::Default => None,
            TokenKind::Identifier => self.parse_expression_or_label_statement(b),
            TokenKind::String => {
                let span = self.token.span();
                let before = self.non_trivial_expression_count;
                let statement = self.parse_expression_statement(b)?;
                if self.non_trivial_expression_count == before {
                    *directive = Some(span);
                }
                Some(statement)
            }
            _ => self.parse_expression_statement(b),
        }
    }

    fn parse_block_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        if self.at(TokenKind::CloseBrace) {
            self.next();
            return Some(b.create_block(self.span_from(start), B::List::default()));
        }
        let Some(body) = self.parse_source_elements(b, false) else {
            return self.fail("Cannot parse the body of the block statement");
        };
        if !self.at(TokenKind::CloseBrace) {
            return self.fail("Expected a closing '}' at the end of a block statement");
        }
        self.next();
        Some(b.create_block(self.span_from(start), body))
    }

    fn parse_expression_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        if self.at(TokenKind::Class) {
            return self.fail("'class' declaration is not directly within a block statement");
        }
        let start = self.token.location.start;
        let Some(expression) = self.parse_expression(b) else {
            return self.fail("Cannot parse expression statement");
        };
        if !self.auto_semicolon() {
            return self.fail_unexpected();
        }
        Some(b.create_expression_statement(self.span_from(start), expression))
    }

    /// `label: label2: statement`, or an expression statement starting with
    /// an identifier.
    fn parse_expression_or_label_statement<B: TreeBuilder>(
        &mut self,
        b: &mut B,
    ) -> Option<B::Node> {
        let mut labels: SmallVec<[(Atom, u32); 2]> = SmallVec::new();
        while self.at(TokenKind::Identifier) && self.lexer.peek_is_colon() {
            let name = self.token.ident();
            let start = self.token.location.start;
            if labels.iter().any(|&(label, _)| label == name) || self.scopes.label(name).is_some()
            {
                return self.fail(&format!(
                    "Attempted to redeclare the label '{}'",
                    self.text(name)
                ));
            }
            self.next();
            if !self.consume(TokenKind::Colon) {
                return self.fail("Labels must be followed by a ':'");
            }
            labels.push((name, start));
        }

        let statement = if labels.is_empty() {
            self.parse_expression_statement(b)?
        } else {
            let is_loop = matches!(
                self.token.kind,
                TokenKind::For | TokenKind::While | TokenKind::Do
            );
            let scope = self.scopes.current_index();
            for &(name, _) in &labels {
                self.scopes.get_mut(scope).push_label(name, is_loop);
            }
            let statement = self.parse_statement(b, &mut None);
            for _ in &labels {
                self.scopes.get_mut(scope).pop_label();
            }
            match statement {
                Some(statement) => statement,
                None => return self.fail("Cannot parse statement"),
            }
        };

        let mut result = statement;
        for &(name, start) in labels.iter().rev() {
            result = b.create_labeled(self.span_from(start), name, result);
        }
        Some(result)
    }

    fn parse_if_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        self.expect_production(TokenKind::OpenParen, "start", "'if' condition")?;
        let Some(test) = self.parse_expression(b) else {
            return self.fail("Expected a expression as the condition for an if statement");
        };
        self.expect_production(TokenKind::CloseParen, "end", "'if' condition")?;

        let Some(consequent) = self.parse_statement(b, &mut None) else {
            return self.fail("Expected a statement as the body of an if block");
        };
        let alternate = if self.consume(TokenKind::Else) {
            match self.parse_statement(b, &mut None) {
                Some(alternate) => Some(alternate),
                None => return self.fail("Expected a statement as the body of an else block"),
            }
        } else {
            None
        };
        Some(b.create_if(self.span_from(start), test, consequent, alternate))
    }

    /// Body of a loop statement, with `break` and `continue` enabled.
    fn parse_loop_body<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let scope = self.scopes.current_index();
        self.scopes.get_mut(scope).start_loop();
        let body = self.parse_statement(b, &mut None);
        self.scopes.get_mut(scope).end_loop();
        body
    }

    fn parse_do_while_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        let Some(body) = self.parse_loop_body(b) else {
            return self.fail("Expected a statement following 'do'");
        };
        self.expect_production(TokenKind::While, "end", "do-while loop")?;
        self.expect_production(TokenKind::OpenParen, "start", "do-while loop condition")?;
        if self.at(TokenKind::CloseParen) {
            return self.semantic_fail("Must provide an expression as a do-while loop condition");
        }
        let Some(test) = self.parse_expression(b) else {
            return self.fail("Unable to parse do-while loop condition");
        };
        self.expect_production(TokenKind::CloseParen, "end", "do-while loop condition")?;
        // The `;` after `do ... while (x)` is optional even on one line.
        self.consume(TokenKind::Semicolon);
        Some(b.create_do_while(self.span_from(start), body, test))
    }

    fn parse_while_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        self.expect_production(TokenKind::OpenParen, "start", "while loop condition")?;
        if self.at(TokenKind::CloseParen) {
            return self.semantic_fail("Must provide an expression as a while loop condition");
        }
        let Some(test) = self.parse_expression(b) else {
            return self.fail("Unable to parse while loop condition");
        };
        self.expect_production(TokenKind::CloseParen, "end", "while loop condition")?;
        let Some(body) = self.parse_loop_body(b) else {
            return self.fail("Expected a statement as the body of a while loop");
        };
        Some(b.create_while(self.span_from(start), test, body))
    }

    // =========================================================================
    // Variable declarations
    // =========================================================================

    fn parse_variable_statement<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: VarKind,
    ) -> Option<B::Node> {
        let start = self.token.location.start;
        let declarations = self.parse_variable_declaration_list(b, kind, false)?;
        if !self.auto_semicolon() {
            return self.fail(&format!("Expected ';' after {} declaration", kind.as_str()));
        }
        Some(b.create_var_declaration(self.span_from(start), kind, declarations.list))
    }

    /// Parse `kind a = 1, [b] = c, ...`, starting at the `var`/`let`/`const`
    /// token. Inside a `for` head, initializers are optional for patterns
    /// and constants that are followed by `in` or `of`.
    pub(crate) fn parse_variable_declaration_list<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: VarKind,
        in_for_head: bool,
    ) -> Option<DeclarationList<B>> {
        let mut declarations = DeclarationList {
            list: B::List::default(),
            count: 0,
            last_is_binding: false,
            last_has_initializer: false,
        };
        loop {
            self.next();
            let start = self.token.location.start;
            declarations.count += 1;

            let (target, init) = if self.at(TokenKind::Identifier) {
                let name = self.token.ident();
                let name_span = self.token.span();
                self.next();
                if !self.scopes.declare_variable(name) && self.scopes.strict() {
                    return self.semantic_fail(&format!(
                        "Cannot declare a variable named '{}' in strict mode",
                        self.text(name)
                    ));
                }
                b.add_var(name);
                let target = b.create_binding(name_span, name);
                let init = if self.consume_with(TokenKind::Equal, B::DONT_BUILD_STRINGS) {
                    match self.parse_assignment_expression(b) {
                        Some(init) => Some(init),
                        None => {
                            return self.fail(&format!(
                                "Expected expression as the intializer for the variable '{}'",
                                self.text(name)
                            ));
                        }
                    }
                } else {
                    if kind == VarKind::Const && !(in_for_head && self.at_enumeration_keyword())
                    {
                        return self.fail(&format!(
                            "const declared variable '{}' must have an initializer",
                            self.text(name)
                        ));
                    }
                    None
                };
                declarations.last_is_binding = true;
                (target, init)
            } else {
                let Some(pattern) =
                    self.parse_destructuring_pattern(b, DestructuringKind::Variables, 0)
                else {
                    return self.fail("Cannot parse this destructuring pattern");
                };
                let init = if self.consume_with(TokenKind::Equal, B::DONT_BUILD_STRINGS) {
                    match self.parse_assignment_expression(b) {
                        Some(init) => Some(init),
                        None => return self.fail("Unable to parse initializer"),
                    }
                } else {
                    if !(in_for_head && self.at_enumeration_keyword()) {
                        return self
                            .fail("Expected an initializer in destructuring variable declaration");
                    }
                    None
                };
                declarations.last_is_binding = false;
                (pattern, init)
            };

            declarations.last_has_initializer = init.is_some();
            let declarator = b.create_declarator(self.span_from(start), target, init);
            b.append(&mut declarations.list, declarator);
            if !self.at(TokenKind::Comma) {
                break;
            }
        }
        Some(declarations)
    }

    fn at_enumeration_keyword(&self) -> bool {
        self.at(TokenKind::In) || self.at_of()
    }

    // =========================================================================
    // For statements
    // =========================================================================

    fn parse_for_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        self.expect_production(TokenKind::OpenParen, "start", "for-loop header")?;

        let declaration_kind = match self.token.kind {
            TokenKind::Var => Some(VarKind::Var),
            TokenKind::Const => Some(VarKind::Const),
            _ if self.at_let_declaration() => Some(VarKind::Let),
            _ => None,
        };

        if let Some(kind) = declaration_kind {
            let head_start = self.token.location.start;
            let saved_allows_in = self.allows_in;
            self.allows_in = false;
            let declarations = self.parse_variable_declaration_list(b, kind, true);
            self.allows_in = saved_allows_in;
            let declarations = declarations?;
            let head = b.create_var_declaration(self.span_from(head_start), kind, declarations.list);

            if self.at(TokenKind::Semicolon) {
                return self.parse_for_loop_rest(b, start, Some(head));
            }
            if declarations.count != 1 {
                return self.fail("can only declare a single variable in an enumeration");
            }
            if declarations.last_has_initializer {
                if self.scopes.strict() {
                    return self
                        .semantic_fail("Cannot use initialiser syntax in a strict mode enumeration");
                }
                if !declarations.last_is_binding {
                    return self.fail(
                        "Cannot use initialiser syntax when binding to a pattern during enumeration",
                    );
                }
            }
            let is_of = if self.consume(TokenKind::In) {
                false
            } else if self.at_of() {
                if declarations.last_has_initializer {
                    return self.fail("Cannot use initialiser syntax in a for-of enumeration");
                }
                self.next();
                true
            } else {
                return self.fail("Expected either 'in' or 'of' in enumeration syntax");
            };
            let Some(right) = self.parse_expression(b) else {
                return self.fail("Expected expression to enumerate");
            };
            let header = if is_of { "for-of header" } else { "for-in header" };
            self.expect_production(TokenKind::CloseParen, "end", header)?;
            let Some(body) = self.parse_loop_body(b) else {
                return self.fail(&format!(
                    "Expected statement as body of {} statement",
                    if is_of { "for-of" } else { "for-in" }
                ));
            };
            let span = self.span_from(start);
            return Some(if is_of {
                b.create_for_of(span, head, right, body)
            } else {
                b.create_for_in(span, head, right, body)
            });
        }

        if self.at(TokenKind::Semicolon) {
            return self.parse_for_loop_rest(b, start, None);
        }

        if self.at(TokenKind::OpenBrace) || self.at(TokenKind::OpenBracket) {
            let save = self.save_point(b);
            let mark = self.pattern_writes.len();
            if let Some(pattern) =
                self.parse_destructuring_pattern(b, DestructuringKind::Expressions, 0)
                && self.at_enumeration_keyword()
            {
                self.commit_pattern_writes(mark)?;
                return self.parse_for_enumeration_rest(b, start, pattern);
            }
            self.pattern_writes.truncate(mark);
            self.restore(b, save);
        }

        let saved_allows_in = self.allows_in;
        self.allows_in = false;
        let init = self.parse_expression(b);
        self.allows_in = saved_allows_in;
        let Some(init) = init else {
            return self.fail("Cannot parse for loop declarations");
        };

        if self.at(TokenKind::Semicolon) {
            return self.parse_for_loop_rest(b, start, Some(init));
        }
        if !b.is_location(init) {
            return self.fail("Expected a reference on the left hand side of an enumeration statement");
        }
        self.parse_for_enumeration_rest(b, start, init)
    }

    /// `in expr) body` or `of expr) body` after an expression or pattern
    /// head.
    fn parse_for_enumeration_rest<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        start: u32,
        left: B::Node,
    ) -> Option<B::Node> {
        let is_of = if self.consume(TokenKind::In) {
            false
        } else if self.at_of() {
            self.next();
            true
        } else {
            return self.fail("Expected either 'in' or 'of' in enumeration syntax");
        };
        let name = if is_of { "for-of" } else { "for-in" };
        let Some(right) = self.parse_expression(b) else {
            return self.fail(&format!("Cannot parse subject for {name} statement"));
        };
        self.expect_production(TokenKind::CloseParen, "end", &format!("{name} header"))?;
        let Some(body) = self.parse_loop_body(b) else {
            return self.fail(&format!("Expected a statement as the body of a {name} loop"));
        };
        let span = self.span_from(start);
        Some(if is_of {
            b.create_for_of(span, left, right, body)
        } else {
            b.create_for_in(span, left, right, body)
        })
    }

    /// `; test; update) body`, starting at the first `;`.
    fn parse_for_loop_rest<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        start: u32,
        init: Option<B::Node>,
    ) -> Option<B::Node> {
        self.next();
        let test = if self.at(TokenKind::Semicolon) {
            None
        } else {
            match self.parse_expression(b) {
                Some(test) => Some(test),
                None => return self.fail("Cannot parse for loop condition expression"),
            }
        };
        if !self.consume(TokenKind::Semicolon) {
            return self.fail("Expected a ';' after the for loop condition expression");
        }
        let update = if self.at(TokenKind::CloseParen) {
            None
        } else {
            match self.parse_expression(b) {
                Some(update) => Some(update),
                None => return self.fail("Cannot parse for loop iteration expression"),
            }
        };
        self.expect_production(TokenKind::CloseParen, "end", "for-loop header")?;
        let Some(body) = self.parse_loop_body(b) else {
            return self.fail("Expected a statement as the body of a for loop");
        };
        Some(b.create_for(self.span_from(start), init, test, update, body))
    }

    // =========================================================================
    // Jumps
    // =========================================================================

    fn parse_break_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        if self.auto_semicolon() {
            if !self.scopes.break_is_valid() {
                return self.semantic_fail("'break' is only valid inside a switch or loop statement");
            }
            return Some(b.create_break(self.span_from(start), Atom::NONE));
        }
        if !self.at(TokenKind::Identifier) {
            return self.fail("Expected an identifier as the target for a break statement");
        }
        let label = self.token.ident();
        if self.scopes.label(label).is_none() {
            return self.semantic_fail(&format!(
                "Cannot use the undeclared label '{}'",
                self.text(label)
            ));
        }
        self.next();
        if !self.auto_semicolon() {
            return self.fail("Expected a ';' following a targeted break statement");
        }
        Some(b.create_break(self.span_from(start), label))
    }

    fn parse_continue_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        if self.auto_semicolon() {
            if !self.scopes.continue_is_valid() {
                return self.semantic_fail("'continue' is only valid inside a loop statement");
            }
            return Some(b.create_continue(self.span_from(start), Atom::NONE));
        }
        if !self.at(TokenKind::Identifier) {
            return self.fail("Expected an identifier as the target for a continue statement");
        }
        let label = self.token.ident();
        match self.scopes.label(label) {
            None => {
                return self.semantic_fail(&format!(
                    "Cannot use the undeclared label '{}'",
                    self.text(label)
                ));
            }
            Some(target) if !target.is_loop => {
                return self.semantic_fail(&format!(
                    "Cannot continue to the label '{}' as it is not targeting a loop",
                    self.text(label)
                ));
            }
            Some(_) => {}
        }
        self.next();
        if !self.auto_semicolon() {
            return self.fail("Expected a ';' following a targeted continue statement");
        }
        Some(b.create_continue(self.span_from(start), label))
    }

    fn parse_return_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        if !self.scopes.current().is_function {
            return self.semantic_fail("Return statements are only valid inside functions");
        }
        let start = self.token.location.start;
        self.next();
        if self.auto_semicolon() {
            return Some(b.create_return(self.span_from(start), None));
        }
        let Some(argument) = self.parse_expression(b) else {
            return self.fail("Cannot parse the return expression");
        };
        if !self.auto_semicolon() {
            return self.fail("Expected a ';' following a return statement");
        }
        Some(b.create_return(self.span_from(start), Some(argument)))
    }

    fn parse_throw_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        if self.at(TokenKind::Semicolon) {
            return self.fail("Expected expression after 'throw'");
        }
        if self.allows_automatic_semicolon() {
            return self.semantic_fail("Cannot have a newline after 'throw'");
        }
        let Some(argument) = self.parse_expression(b) else {
            return self.fail("Cannot parse expression for throw statement");
        };
        if !self.auto_semicolon() {
            return self.fail("Expected a ';' after a throw statement");
        }
        Some(b.create_throw(self.span_from(start), argument))
    }

    // =========================================================================
    // With, switch, try, debugger
    // =========================================================================

    fn parse_with_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        if self.scopes.strict() {
            return self.semantic_fail("'with' statements are not valid in strict mode");
        }
        self.scopes.current_mut().needs_full_activation = true;
        let start = self.token.location.start;
        self.next();
        self.expect_production(TokenKind::OpenParen, "start", "subject of a 'with' statement")?;
        let Some(object) = self.parse_expression(b) else {
            return self.fail("Cannot parse 'with' subject expression");
        };
        self.expect_production(TokenKind::CloseParen, "end", "subject of a 'with' statement")?;
        let Some(body) = self.parse_statement(b, &mut None) else {
            return self.fail("A 'with' statement must have a body");
        };
        Some(b.create_with(self.span_from(start), object, body))
    }

    fn parse_switch_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        self.expect_production(TokenKind::OpenParen, "start", "subject of a 'switch'")?;
        let Some(discriminant) = self.parse_expression(b) else {
            return self.fail("Cannot parse switch subject expression");
        };
        self.expect_production(TokenKind::CloseParen, "end", "subject of a 'switch'")?;
        self.expect_production(TokenKind::OpenBrace, "start", "body of a 'switch'")?;

        let scope = self.scopes.current_index();
        self.scopes.get_mut(scope).start_switch();
        let cases = self.parse_switch_clauses(b);
        self.scopes.get_mut(scope).end_switch();
        let cases = cases?;

        self.expect_production(TokenKind::CloseBrace, "end", "body of a 'switch'")?;
        Some(b.create_switch(self.span_from(start), discriminant, cases))
    }

    /// `case` clauses, at most one `default`, then more `case` clauses.
    fn parse_switch_clauses<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::List> {
        let mut cases = B::List::default();
        self.parse_case_clauses(b, &mut cases)?;
        if self.at(TokenKind::Default) {
            let start = self.token.location.start;
            self.next();
            if !self.consume(TokenKind::Colon) {
                return self.fail("Expected a ':' after switch default clause");
            }
            let Some(body) = self.parse_source_elements(b, false) else {
                return self.fail("Cannot parse the body of a switch default clause");
            };
            let clause = b.create_case(self.span_from(start), None, body);
            b.append(&mut cases, clause);
            self.parse_case_clauses(b, &mut cases)?;
        }
        Some(cases)
    }

    fn parse_case_clauses<B: TreeBuilder>(&mut self, b: &mut B, cases: &mut B::List) -> Option<()> {
        while self.at(TokenKind::Case) {
            let start = self.token.location.start;
            self.next();
            let Some(test) = self.parse_expression(b) else {
                return self.fail("Cannot parse switch case expression");
            };
            if !self.consume(TokenKind::Colon) {
                return self.fail("Expected a ':' after switch clause expression");
            }
            let Some(body) = self.parse_source_elements(b, false) else {
                return self.fail("Cannot parse the body of a switch clause");
            };
            let clause = b.create_case(self.span_from(start), Some(test), body);
            b.append(cases, clause);
        }
        Some(())
    }

    fn parse_try_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        if !self.at(TokenKind::OpenBrace) {
            return self.fail("Expected a block statement as body of a try statement");
        }
        let Some(block) = self.parse_block_statement(b) else {
            return self.fail("Cannot parse the body of try block");
        };

        let mut param = Atom::NONE;
        let mut handler = None;
        if self.at(TokenKind::Catch) {
            self.scopes.current_mut().needs_full_activation = true;
            self.next();
            self.expect_production(TokenKind::OpenParen, "start", "'catch' target")?;
            if !self.at(TokenKind::Identifier) {
                self.fail_if_keyword("catch variable name")?;
                return self.fail("Expected identifier name as catch target");
            }
            param = self.token.ident();
            self.next();
            handler = Some(self.with_scope_rollback(|p| p.parse_catch_clause(b, param))?);
        }

        let mut finalizer = None;
        if self.consume(TokenKind::Finally) {
            if !self.at(TokenKind::OpenBrace) {
                return self.fail("Expected block statement for finally body");
            }
            let Some(body) = self.parse_block_statement(b) else {
                return self.fail("Cannot parse finally body");
            };
            finalizer = Some(body);
        }

        if handler.is_none() && finalizer.is_none() {
            return self.fail("Try statements must have at least a catch or finally block");
        }
        Some(b.create_try(self.span_from(start), block, param, handler, finalizer))
    }

    /// From the `)` after the catch target through the handler block, in the
    /// handler's own sealed scope.
    fn parse_catch_clause<B: TreeBuilder>(&mut self, b: &mut B, param: Atom) -> Option<B::Node> {
        self.scopes.push();
        if !self.scopes.declare_variable(param) && self.scopes.strict() {
            return self.semantic_fail(&format!(
                "Cannot declare a catch variable named '{}' in strict mode",
                self.text(param)
            ));
        }
        self.scopes.current_mut().allows_new_decls = false;
        self.expect_production(TokenKind::CloseParen, "end", "'catch' target")?;
        if !self.at(TokenKind::OpenBrace) {
            return self.fail("Expected exception handler to be a block statement");
        }
        let Some(body) = self.parse_block_statement(b) else {
            return self.fail("Unable to parse 'catch' block");
        };
        self.scopes.pop(B::NEEDS_FREE_VARIABLE_INFO);
        Some(body)
    }

    fn parse_debugger_statement<B: TreeBuilder>(&mut self, b: &mut B) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        if !self.auto_semicolon() {
            return self.fail("Debugger keyword must be followed by a ';'");
        }
        Some(b.create_debugger(self.span_from(start)))
    }
}
