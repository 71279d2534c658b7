//! S-expression rendering of a parsed tree.
//!
//! The output is compact and stable, so tests compare structure with plain
//! string equality: `1 + 2 * 3` prints as `(+ 1 (* 2 3))`.

use super::arena::NodeArena;
use super::node::{NodeData, NodeIndex, PropertyKey, PropertyKind, PropertyName};

/// Print `root` and everything below it.
pub fn print_tree(arena: &NodeArena, root: NodeIndex) -> String {
    let mut printer = AstPrinter::new(arena);
    printer.node(root);
    printer.finish()
}

pub struct AstPrinter<'a> {
    arena: &'a NodeArena,
    out: String,
}

impl<'a> AstPrinter<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        AstPrinter {
            arena,
            out: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn text(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn open(&mut self, head: &str) {
        self.out.push('(');
        self.out.push_str(head);
    }

    fn close(&mut self) {
        self.out.push(')');
    }

    /// ` child` for every entry; holes print as `_`.
    fn children(&mut self, list: &[NodeIndex]) {
        for &child in list {
            self.out.push(' ');
            self.node_or_hole(child);
        }
    }

    fn node_or_hole(&mut self, index: NodeIndex) {
        if index.is_none() {
            self.out.push('_');
        } else {
            self.node(index);
        }
    }

    /// ` child` when present.
    fn optional(&mut self, index: NodeIndex) {
        if index.is_some() {
            self.out.push(' ');
            self.node(index);
        }
    }

    fn unary(&mut self, head: &str, operand: NodeIndex) {
        self.open(head);
        self.out.push(' ');
        self.node_or_hole(operand);
        self.close();
    }

    fn binary(&mut self, head: &str, left: NodeIndex, right: NodeIndex) {
        self.open(head);
        self.out.push(' ');
        self.node_or_hole(left);
        self.out.push(' ');
        self.node_or_hole(right);
        self.close();
    }

    fn key(&mut self, key: &PropertyKey) {
        match *key {
            PropertyName::Name(atom) => {
                let name = self.arena.resolve(atom);
                self.out.push_str(name);
            }
            PropertyName::Number(value) => self.out.push_str(&value.to_string()),
            PropertyName::Computed(expr) => {
                self.out.push('[');
                self.node_or_hole(expr);
                self.out.push(']');
            }
        }
    }

    fn atom(&mut self, atom: sable_common::Atom) {
        let name = self.arena.resolve(atom);
        self.out.push_str(name);
    }

    pub fn node(&mut self, index: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(index) else {
            self.text("<missing>");
            return;
        };
        match &node.data {
            NodeData::Program { body, strict, .. } => {
                self.open("program");
                if *strict {
                    self.text(" :strict");
                }
                self.children(body);
                self.close();
            }
            NodeData::FunctionBody(body) => {
                self.open("body");
                if body.strict {
                    self.text(" :strict");
                }
                self.children(&body.statements);
                self.close();
            }
            NodeData::LazyFunctionBody(lazy) => {
                self.text(&format!(
                    "(lazy-body {}..{} params={}",
                    lazy.parameters_start.offset, lazy.end_offset, lazy.parameter_count
                ));
                if lazy.strict {
                    self.text(" :strict");
                }
                self.close();
            }

            NodeData::Empty => self.text("(empty)"),
            NodeData::Debugger => self.text("(debugger)"),
            NodeData::Block { body } => {
                self.open("block");
                self.children(body);
                self.close();
            }
            NodeData::Expression { expression } => self.unary("expr", *expression),
            NodeData::VarDeclaration { kind, declarations } => {
                self.open(kind.as_str());
                self.children(declarations);
                self.close();
            }
            NodeData::Declarator { target, init } => {
                if init.is_some() {
                    self.binary("=", *target, *init);
                } else {
                    self.node(*target);
                }
            }
            NodeData::If {
                test,
                consequent,
                alternate,
            } => {
                self.open("if");
                self.children(&[*test, *consequent]);
                self.optional(*alternate);
                self.close();
            }
            NodeData::DoWhile { body, test } => self.binary("do", *body, *test),
            NodeData::While { test, body } => self.binary("while", *test, *body),
            NodeData::For {
                init,
                test,
                update,
                body,
            } => {
                self.open("for");
                self.children(&[*init, *test, *update, *body]);
                self.close();
            }
            NodeData::ForIn { left, right, body } => {
                self.open("for-in");
                self.children(&[*left, *right, *body]);
                self.close();
            }
            NodeData::ForOf { left, right, body } => {
                self.open("for-of");
                self.children(&[*left, *right, *body]);
                self.close();
            }
            NodeData::Continue { label } | NodeData::Break { label } => {
                let head = if matches!(node.data, NodeData::Continue { .. }) {
                    "continue"
                } else {
                    "break"
                };
                self.open(head);
                if label.is_some() {
                    self.out.push(' ');
                    self.atom(*label);
                }
                self.close();
            }
            NodeData::Return { argument } => {
                self.open("return");
                self.optional(*argument);
                self.close();
            }
            NodeData::With { object, body } => self.binary("with", *object, *body),
            NodeData::Labeled { label, body } => {
                self.open("label ");
                self.atom(*label);
                self.out.push(' ');
                self.node(*body);
                self.close();
            }
            NodeData::Switch {
                discriminant,
                cases,
            } => {
                self.open("switch ");
                self.node(*discriminant);
                self.children(cases);
                self.close();
            }
            NodeData::Case { test, body } => {
                if test.is_some() {
                    self.open("case ");
                    self.node(*test);
                } else {
                    self.open("default");
                }
                self.children(body);
                self.close();
            }
            NodeData::Throw { argument } => self.unary("throw", *argument),
            NodeData::Try {
                block,
                param,
                handler,
                finalizer,
            } => {
                self.open("try ");
                self.node(*block);
                if handler.is_some() {
                    self.text(" (catch ");
                    self.atom(*param);
                    self.out.push(' ');
                    self.node(*handler);
                    self.close();
                }
                if finalizer.is_some() {
                    self.text(" (finally ");
                    self.node(*finalizer);
                    self.close();
                }
                self.close();
            }
            NodeData::FunctionDeclaration { function } => self.node(*function),
            NodeData::ClassDeclaration { class } => self.node(*class),

            NodeData::Null => self.text("null"),
            NodeData::Boolean(value) => self.text(if *value { "true" } else { "false" }),
            NodeData::Number(value) => self.text(&value.to_string()),
            NodeData::String(atom) => {
                let value = arena.resolve(*atom);
                self.text(&format!("{value:?}"));
            }
            NodeData::RegExp { pattern, flags } => {
                let pattern = arena.resolve(*pattern);
                let flags = arena.resolve(*flags);
                self.text(&format!("/{pattern}/{flags}"));
            }
            NodeData::TemplateLiteral {
                quasis,
                expressions,
            } => {
                self.open("template");
                for (i, &quasi) in quasis.iter().enumerate() {
                    self.out.push(' ');
                    self.node(quasi);
                    if let Some(&expr) = expressions.get(i) {
                        self.out.push(' ');
                        self.node(expr);
                    }
                }
                self.close();
            }
            NodeData::TemplateElement { cooked, .. } => {
                let value = arena.resolve(*cooked);
                self.text(&format!("{value:?}"));
            }
            NodeData::TaggedTemplate { tag, quasi } => self.binary("tag", *tag, *quasi),
            NodeData::This => self.text("this"),
            NodeData::Super => self.text("super"),
            NodeData::Identifier(atom) | NodeData::BindingIdentifier(atom) => self.atom(*atom),
            NodeData::Array { elements } => {
                self.open("array");
                self.children(elements);
                self.close();
            }
            NodeData::Spread { argument } => self.unary("...", *argument),
            NodeData::Object { properties } => {
                self.open("object");
                self.children(properties);
                self.close();
            }
            NodeData::Property { key, value, kind } => {
                let head = match kind {
                    PropertyKind::Init => ":",
                    PropertyKind::Shorthand => "shorthand",
                    PropertyKind::Method => "method",
                    PropertyKind::Getter => "get",
                    PropertyKind::Setter => "set",
                };
                self.open(head);
                self.out.push(' ');
                self.key(key);
                if *kind != PropertyKind::Shorthand {
                    self.out.push(' ');
                    self.node(*value);
                }
                self.close();
            }
            NodeData::Function(function) => {
                if function.is_arrow() {
                    self.open("=>");
                } else {
                    self.open("function");
                    if function.name.is_some() {
                        self.out.push(' ');
                        self.atom(function.name);
                    }
                }
                self.text(" (");
                for (i, &param) in function.params.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.node(param);
                }
                self.close();
                self.optional(function.body);
                self.close();
            }
            NodeData::Class(class) => {
                self.open("class");
                if class.name.is_some() {
                    self.out.push(' ');
                    self.atom(class.name);
                }
                if class.heritage.is_some() {
                    self.text(" (extends ");
                    self.node(class.heritage);
                    self.close();
                }
                if class.constructor.is_some() {
                    self.text(" (constructor ");
                    self.node(class.constructor);
                    self.close();
                }
                self.children(&class.methods);
                for &method in &class.static_methods {
                    self.text(" (static ");
                    self.node(method);
                    self.close();
                }
                self.close();
            }

            NodeData::Unary { op, operand } => self.unary(op.as_str(), *operand),
            NodeData::Update {
                op,
                prefix,
                operand,
            } => {
                let head = if *prefix {
                    op.as_str().to_string()
                } else {
                    format!("post{}", op.as_str())
                };
                self.unary(&head, *operand);
            }
            NodeData::Binary { op, left, right } => self.binary(op.as_str(), *left, *right),
            NodeData::Assign { op, target, value } => self.binary(op.as_str(), *target, *value),
            NodeData::DestructuringAssign { pattern, value } => {
                self.binary("=", *pattern, *value)
            }
            NodeData::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.open("?");
                self.children(&[*test, *consequent, *alternate]);
                self.close();
            }
            NodeData::Sequence { expressions } => {
                self.open(",");
                self.children(expressions);
                self.close();
            }
            NodeData::Call { callee, arguments } => {
                self.unary("call", *callee);
                self.out.pop();
                self.children(arguments);
                self.close();
            }
            NodeData::New { callee, arguments } => {
                self.unary("new", *callee);
                if let Some(arguments) = arguments {
                    self.out.pop();
                    self.children(arguments);
                    self.close();
                }
            }
            NodeData::Dot { object, property } => {
                self.open(". ");
                self.node(*object);
                self.out.push(' ');
                self.atom(*property);
                self.close();
            }
            NodeData::Bracket { object, property } => self.binary("[]", *object, *property),

            NodeData::ArrayPattern { elements, rest } => {
                self.open("array-pattern");
                self.children(elements);
                if rest.is_some() {
                    self.out.push(' ');
                    self.unary("...", *rest);
                }
                self.close();
            }
            NodeData::ObjectPattern { properties } => {
                self.open("object-pattern");
                self.children(properties);
                self.close();
            }
            NodeData::PatternProperty {
                key,
                target,
                default,
            } => {
                self.open(": ");
                self.key(key);
                self.out.push(' ');
                if default.is_some() {
                    self.binary("=", *target, *default);
                } else {
                    self.node(*target);
                }
                self.close();
            }
            NodeData::PatternDefault { target, default } => {
                self.binary("=", *target, *default)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::BinaryOp;
    use sable_common::SourceSpan;

    #[test]
    fn test_prints_nested_binary() {
        let mut arena = NodeArena::new();
        let span = SourceSpan::default();
        let one = arena.add(span, NodeData::Number(1.0));
        let two = arena.add(span, NodeData::Number(2.0));
        let half = arena.add(span, NodeData::Number(0.5));
        let mul = arena.add(
            span,
            NodeData::Binary {
                op: BinaryOp::Multiply,
                left: two,
                right: half,
            },
        );
        let add = arena.add(
            span,
            NodeData::Binary {
                op: BinaryOp::Add,
                left: one,
                right: mul,
            },
        );
        assert_eq!(print_tree(&arena, add), "(+ 1 (* 2 0.5))");
    }

    #[test]
    fn test_prints_holes_and_calls() {
        let mut arena = NodeArena::new();
        let span = SourceSpan::default();
        let null = arena.add(span, NodeData::Null);
        let array = arena.add(
            span,
            NodeData::Array {
                elements: vec![null, NodeIndex::NONE],
            },
        );
        let call = arena.add(
            span,
            NodeData::Call {
                callee: null,
                arguments: vec![array],
            },
        );
        assert_eq!(print_tree(&arena, call), "(call null (array null _))");
    }
}
