//! Parser state - binding and assignment patterns

use sable_common::{Atom, SourceSpan};
use sable_lexer::TokenKind;

use super::Parser;
use crate::ast::PropertyName;
use crate::builder::TreeBuilder;
use crate::scope::BindingResult;

/// What the names in a pattern bind to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DestructuringKind {
    /// `var`/`let`/`const` declarations.
    Variables,
    /// Function parameters.
    Parameters,
    /// The left side of an assignment or `for-in`/`for-of` head. Parsed
    /// speculatively: failures return `None` and the caller restores.
    Expressions,
}

impl<'a> Parser<'a> {
    /// A pattern leaf, array pattern or object pattern. `depth` is 0 for a
    /// whole declaration or parameter and grows inside nested patterns.
    pub(crate) fn parse_destructuring_pattern<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: DestructuringKind,
        depth: u32,
    ) -> Option<B::Node> {
        self.with_depth(|p| match p.token.kind {
            TokenKind::OpenBracket => p.parse_array_pattern(b, kind, depth),
            TokenKind::OpenBrace => p.parse_object_pattern(b, kind, depth),
            TokenKind::Identifier => {
                let name = p.token.ident();
                let span = p.token.span();
                p.next();
                p.create_binding_pattern(b, kind, depth, name, span)
            }
            _ => {
                if kind == DestructuringKind::Expressions {
                    return None;
                }
                p.fail_if_keyword("variable name")?;
                p.fail("Expected a parameter pattern or a ')' in parameter list")
            }
        })
    }

    fn parse_array_pattern<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: DestructuringKind,
        depth: u32,
    ) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        let mut elements = B::List::default();
        let mut rest = None;
        loop {
            while self.at(TokenKind::Comma) {
                b.append_hole(&mut elements);
                self.next();
            }
            if self.at(TokenKind::CloseBracket) {
                break;
            }
            if self.at(TokenKind::DotDotDot) {
                self.next();
                if kind != DestructuringKind::Expressions && !self.at(TokenKind::Identifier) {
                    return self.fail("Expected identifier for a rest element destructuring pattern");
                }
                rest = Some(self.parse_destructuring_pattern(b, kind, depth + 1)?);
                break;
            }

            let element_start = self.token.location.start;
            let mut element = self.parse_destructuring_pattern(b, kind, depth + 1)?;
            if let Some(default) = self.parse_pattern_initializer(b, kind)? {
                element = b.create_pattern_default(self.span_from(element_start), element, default);
            }
            b.append(&mut elements, element);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        if !self.at(TokenKind::CloseBracket) {
            if kind == DestructuringKind::Expressions {
                return None;
            }
            if rest.is_some() {
                return self.fail("Expected a closing ']' following a rest element destructuring pattern");
            }
            return self
                .fail("Expected either a closing ']' or a ',' following an element destructuring pattern");
        }
        self.next();
        Some(b.create_array_pattern(self.span_from(start), elements, rest))
    }

    fn parse_object_pattern<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: DestructuringKind,
        depth: u32,
    ) -> Option<B::Node> {
        let start = self.token.location.start;
        self.next();
        let mut properties = B::List::default();
        while !self.at(TokenKind::CloseBrace) {
            let property_start = self.token.location.start;
            let (key, target) = match self.token.kind {
                TokenKind::Identifier => {
                    let name = self.token.ident();
                    let span = self.token.span();
                    self.next();
                    let target = if self.consume(TokenKind::Colon) {
                        self.parse_destructuring_pattern(b, kind, depth + 1)?
                    } else {
                        self.create_binding_pattern(b, kind, depth + 1, name, span)?
                    };
                    (PropertyName::Name(name), target)
                }
                TokenKind::OpenBracket => {
                    self.next();
                    let Some(key) = self.parse_assignment_expression(b) else {
                        return self.soft_fail(kind, "Cannot parse computed property name");
                    };
                    if !self.consume(TokenKind::CloseBracket) {
                        return self.soft_fail(
                            kind,
                            "Expected ']' to end a computed property name",
                        );
                    }
                    let target = self.parse_named_property_target(b, kind, depth, "")?;
                    (PropertyName::Computed(key), target)
                }
                TokenKind::Number => {
                    let key = PropertyName::Number(self.token.number());
                    self.next();
                    (key, self.parse_named_property_target(b, kind, depth, "")?)
                }
                TokenKind::String => {
                    let key = PropertyName::Name(self.token.string());
                    self.next();
                    (key, self.parse_named_property_target(b, kind, depth, "")?)
                }
                token_kind if token_kind.is_keyword() => {
                    let key = PropertyName::Name(self.token.ident());
                    let text = self.token_text();
                    let abbreviation_error = match token_kind {
                        TokenKind::ReservedIfStrict => format!(
                            "Cannot use abbreviated destructuring syntax for reserved name '{text}' in strict mode"
                        ),
                        TokenKind::Reserved => format!(
                            "Cannot use abbreviated destructuring syntax for reserved name '{text}'"
                        ),
                        _ => format!(
                            "Cannot use abbreviated destructuring syntax for keyword '{text}'"
                        ),
                    };
                    self.next();
                    let target =
                        self.parse_named_property_target(b, kind, depth, &abbreviation_error)?;
                    (key, target)
                }
                _ => return self.soft_fail(kind, "Expected a property name"),
            };
            let default = self.parse_pattern_initializer(b, kind)?;
            let property =
                b.create_pattern_property(self.span_from(property_start), key, target, default);
            b.append(&mut properties, property);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        if !self.at(TokenKind::CloseBrace) {
            return self.soft_fail(
                kind,
                "Expected either a closing '}' or an ',' after a property destructuring pattern",
            );
        }
        self.next();
        Some(b.create_object_pattern(self.span_from(start), properties))
    }

    /// `: target` after a key that cannot stand alone.
    fn parse_named_property_target<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: DestructuringKind,
        depth: u32,
        abbreviation_error: &str,
    ) -> Option<B::Node> {
        if !self.consume(TokenKind::Colon) {
            if kind == DestructuringKind::Expressions {
                return None;
            }
            if !abbreviation_error.is_empty() {
                return self.semantic_fail(abbreviation_error);
            }
            return self.fail("Expected a ':' prior to a named destructuring property");
        }
        self.parse_destructuring_pattern(b, kind, depth + 1)
    }

    /// `= default` after a pattern element. The outer `None` is a failure.
    fn parse_pattern_initializer<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: DestructuringKind,
    ) -> Option<Option<B::Node>> {
        if !self.at(TokenKind::Equal) {
            return Some(None);
        }
        if kind == DestructuringKind::Parameters && !self.parameter_defaults_allowed() {
            return self
                .semantic_fail("Default values in destructuring parameters are currently not supported");
        }
        self.next_with(B::DONT_BUILD_STRINGS);
        let Some(default) = self.parse_assignment_expression(b) else {
            return self.soft_fail(kind, "Cannot parse the default value of a destructuring pattern");
        };
        Some(Some(default))
    }

    fn soft_fail<T>(&mut self, kind: DestructuringKind, message: &str) -> Option<T> {
        if kind == DestructuringKind::Expressions {
            return None;
        }
        self.fail(message)
    }

    /// Bind one name found in a pattern.
    fn create_binding_pattern<B: TreeBuilder>(
        &mut self,
        b: &mut B,
        kind: DestructuringKind,
        depth: u32,
        name: Atom,
        span: SourceSpan,
    ) -> Option<B::Node> {
        let strict = self.scopes.strict();
        match kind {
            DestructuringKind::Variables => {
                if !self.scopes.declare_variable(name) && strict {
                    let message = if depth > 0 {
                        format!("Cannot destructure to a variable named '{}' in strict mode", self.text(name))
                    } else {
                        format!("Cannot declare a variable named '{}' in strict mode", self.text(name))
                    };
                    return self.semantic_fail(&message);
                }
                b.add_var(name);
            }
            DestructuringKind::Parameters if depth > 0 => match self.scopes.declare_bound_parameter(name) {
                BindingResult::Valid => {}
                BindingResult::InvalidStrictMode => {
                    if strict {
                        return self.semantic_fail(&format!(
                            "Cannot destructure to a parameter name '{}' in strict mode",
                            self.text(name)
                        ));
                    }
                }
                BindingResult::InvalidDuplicate => {
                    if strict && self.last_function_name == name {
                        return self.semantic_fail(&format!(
                            "Cannot destructure to '{}' as it shadows the name of a strict mode function",
                            self.text(name)
                        ));
                    }
                    return self.semantic_fail(&format!(
                        "Cannot destructure to '{}' as it has already been declared",
                        self.text(name)
                    ));
                }
            },
            DestructuringKind::Parameters => {
                if !self.scopes.declare_parameter(name) && strict {
                    let text = self.text(name);
                    let message = if self.names.is_eval_or_arguments(name) {
                        format!("Cannot declare a parameter named '{text}' in strict mode")
                    } else if self.last_function_name == name {
                        format!(
                            "Cannot declare a parameter named '{text}' as it shadows the name of a strict mode function"
                        )
                    } else {
                        format!(
                            "Cannot declare a parameter named '{text}' in strict mode as it has already been declared"
                        )
                    };
                    return self.semantic_fail(&message);
                }
            }
            DestructuringKind::Expressions => {
                self.scopes.use_variable(name);
                self.pattern_writes.push(name);
            }
        }
        Some(b.create_binding(span, name))
    }

    /// Record the writes of an assignment pattern once it is known not to
    /// be an array or object literal. `mark` is the length of
    /// `pattern_writes` before the pattern was parsed.
    pub(crate) fn commit_pattern_writes(&mut self, mark: usize) -> Option<()> {
        let mark = mark.min(self.pattern_writes.len());
        if self.scopes.strict() {
            let names = self.names;
            if let Some(&name) = self.pattern_writes[mark..]
                .iter()
                .find(|&&name| names.is_eval_or_arguments(name))
            {
                self.pattern_writes.truncate(mark);
                return self.semantic_fail(&format!(
                    "Cannot modify '{}' in strict mode",
                    self.text(name)
                ));
            }
        }
        for name in self.pattern_writes.drain(mark..) {
            self.scopes.declare_write(name);
        }
        Some(())
    }
}
