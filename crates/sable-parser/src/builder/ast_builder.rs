//! Full tree builder.

use rustc_hash::FxHashSet;
use sable_common::{Atom, Interner, KnownNames, SourceSpan};
use sable_lexer::{LexerFlags, RegexError};

use super::{ParserClassInfo, ParserFunctionInfo, TreeBuilder, check_regex};
use crate::ast::{
    AssignOp, BinaryOp, ClassData, CodeFeatures, FunctionBodyData, FunctionData, LazyFunction,
    NodeArena, NodeData, NodeIndex, NodeList, PropertyKind, PropertyName, UnaryOp, UpdateOp,
    VarKind,
};
use crate::options::CodeType;

/// Declarations and features collected for one body while it is built.
#[derive(Debug, Default)]
pub struct DeclarationFrame {
    pub var_declarations: Vec<Atom>,
    declared: FxHashSet<Atom>,
    pub function_declarations: NodeList,
    pub features: CodeFeatures,
    pub constant_count: u32,
}

impl DeclarationFrame {
    fn add_var(&mut self, name: Atom) {
        if self.declared.insert(name) {
            self.var_declarations.push(name);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AstCheckpoint {
    nodes: usize,
    vars: usize,
    functions: usize,
    features: CodeFeatures,
    constant_count: u32,
    frame_depth: usize,
}

/// Builds `NodeArena` trees.
///
/// Each body being built in full has a `DeclarationFrame`; the innermost
/// one receives `add_var`, function declarations, feature bits and
/// constant counts.
pub struct AstBuilder {
    arena: NodeArena,
    names: KnownNames,
    fold_constants: bool,
    current: DeclarationFrame,
    saved: Vec<DeclarationFrame>,
}

impl AstBuilder {
    pub fn new(names: KnownNames, source_len: usize, fold_constants: bool) -> Self {
        AstBuilder {
            arena: NodeArena::for_source_len(source_len),
            names,
            fold_constants,
            current: DeclarationFrame::default(),
            saved: Vec::new(),
        }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Hand the arena over, together with the program-level frame.
    pub fn finish(mut self, interner: Interner) -> (NodeArena, DeclarationFrame) {
        while let Some(outer) = self.saved.pop() {
            self.current = outer;
        }
        self.arena.set_interner(interner);
        (self.arena, self.current)
    }

    #[inline]
    fn add(&mut self, span: SourceSpan, data: NodeData) -> NodeIndex {
        self.arena.add(span, data)
    }

    #[inline]
    fn opt(node: Option<NodeIndex>) -> NodeIndex {
        node.unwrap_or(NodeIndex::NONE)
    }

    fn number_value(&self, node: NodeIndex) -> Option<f64> {
        match self.arena.data(node) {
            Some(NodeData::Number(value)) => Some(*value),
            _ => None,
        }
    }

    fn function_data(&mut self, info: ParserFunctionInfo<Self>) -> FunctionData {
        FunctionData {
            name: info.name,
            mode: info.mode,
            params: info.params,
            body: Self::opt(info.body),
            parameter_count: info.parameter_count,
            constructor_kind: info.constructor_kind,
            start_line: info.start_line,
            end_line: info.end_line,
        }
    }

    fn class_data(info: ParserClassInfo<Self>) -> ClassData {
        ClassData {
            name: info.name,
            heritage: Self::opt(info.heritage),
            constructor: Self::opt(info.constructor),
            methods: info.methods,
            static_methods: info.static_methods,
        }
    }
}

impl TreeBuilder for AstBuilder {
    type Node = NodeIndex;
    type List = NodeList;
    type Checkpoint = AstCheckpoint;

    const CREATES_AST: bool = true;
    const NEEDS_FREE_VARIABLE_INFO: bool = true;
    const CAN_USE_FUNCTION_CACHE: bool = true;
    const DONT_BUILD_STRINGS: LexerFlags = LexerFlags::empty();
    const DONT_BUILD_KEYWORDS: LexerFlags = LexerFlags::empty();

    fn checkpoint(&self) -> AstCheckpoint {
        AstCheckpoint {
            nodes: self.arena.len(),
            vars: self.current.var_declarations.len(),
            functions: self.current.function_declarations.len(),
            features: self.current.features,
            constant_count: self.current.constant_count,
            frame_depth: self.saved.len(),
        }
    }

    fn rollback(&mut self, checkpoint: AstCheckpoint) {
        // A body abandoned half way leaves its frame open.
        while self.saved.len() > checkpoint.frame_depth {
            if let Some(outer) = self.saved.pop() {
                self.current = outer;
            }
        }
        self.arena.truncate(checkpoint.nodes);
        let frame = &mut self.current;
        for name in frame.var_declarations.drain(checkpoint.vars..) {
            frame.declared.remove(&name);
        }
        frame.function_declarations.truncate(checkpoint.functions);
        frame.features = checkpoint.features;
        frame.constant_count = checkpoint.constant_count;
    }

    #[inline]
    fn append(&mut self, list: &mut NodeList, node: NodeIndex) {
        list.push(node);
    }

    #[inline]
    fn append_hole(&mut self, list: &mut NodeList) {
        list.push(NodeIndex::NONE);
    }

    // ---- Literals and primaries ----

    fn create_this(&mut self, span: SourceSpan) -> NodeIndex {
        self.current.features |= CodeFeatures::THIS;
        self.add(span, NodeData::This)
    }

    fn create_super(&mut self, span: SourceSpan) -> NodeIndex {
        self.add(span, NodeData::Super)
    }

    fn create_resolve(&mut self, span: SourceSpan, name: Atom) -> NodeIndex {
        if name == self.names.arguments {
            self.current.features |= CodeFeatures::ARGUMENTS;
        }
        self.add(span, NodeData::Identifier(name))
    }

    fn create_null(&mut self, span: SourceSpan) -> NodeIndex {
        self.add(span, NodeData::Null)
    }

    fn create_boolean(&mut self, span: SourceSpan, value: bool) -> NodeIndex {
        self.add(span, NodeData::Boolean(value))
    }

    fn create_number(&mut self, span: SourceSpan, value: f64) -> NodeIndex {
        self.current.constant_count += 1;
        self.add(span, NodeData::Number(value))
    }

    fn create_string(&mut self, span: SourceSpan, value: Atom) -> NodeIndex {
        self.current.constant_count += 1;
        self.add(span, NodeData::String(value))
    }

    fn create_regex(
        &mut self,
        span: SourceSpan,
        pattern: Atom,
        flags: Atom,
        pattern_text: &str,
        flags_text: &str,
    ) -> Result<NodeIndex, RegexError> {
        check_regex(pattern_text, flags_text)?;
        self.current.constant_count += 1;
        Ok(self.add(span, NodeData::RegExp { pattern, flags }))
    }

    fn create_template_element(&mut self, span: SourceSpan, cooked: Atom, raw: Atom) -> NodeIndex {
        self.add(span, NodeData::TemplateElement { cooked, raw })
    }

    fn create_template_literal(
        &mut self,
        span: SourceSpan,
        quasis: NodeList,
        expressions: NodeList,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::TemplateLiteral {
                quasis,
                expressions,
            },
        )
    }

    fn create_tagged_template(
        &mut self,
        span: SourceSpan,
        tag: NodeIndex,
        quasi: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::TaggedTemplate { tag, quasi })
    }

    fn create_array(&mut self, span: SourceSpan, elements: NodeList) -> NodeIndex {
        self.add(span, NodeData::Array { elements })
    }

    fn create_spread(&mut self, span: SourceSpan, argument: NodeIndex) -> NodeIndex {
        self.add(span, NodeData::Spread { argument })
    }

    fn create_object(&mut self, span: SourceSpan, properties: NodeList) -> NodeIndex {
        self.add(span, NodeData::Object { properties })
    }

    fn create_property(
        &mut self,
        span: SourceSpan,
        key: PropertyName<NodeIndex>,
        value: NodeIndex,
        kind: PropertyKind,
    ) -> NodeIndex {
        self.add(span, NodeData::Property { key, value, kind })
    }

    fn create_function_expr(
        &mut self,
        span: SourceSpan,
        info: ParserFunctionInfo<Self>,
    ) -> NodeIndex {
        let data = self.function_data(info);
        self.add(span, NodeData::Function(Box::new(data)))
    }

    fn create_class_expr(&mut self, span: SourceSpan, info: ParserClassInfo<Self>) -> NodeIndex {
        self.add(span, NodeData::Class(Box::new(Self::class_data(info))))
    }

    // ---- Operators and access ----

    fn create_unary(&mut self, span: SourceSpan, op: UnaryOp, operand: NodeIndex) -> NodeIndex {
        if self.fold_constants
            && op == UnaryOp::Minus
            && let Some(value) = self.number_value(operand)
            && let Some(node) = self.arena.get_mut(operand)
        {
            node.span = span;
            node.data = NodeData::Number(-value);
            return operand;
        }
        self.add(span, NodeData::Unary { op, operand })
    }

    fn create_update(
        &mut self,
        span: SourceSpan,
        op: UpdateOp,
        prefix: bool,
        operand: NodeIndex,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::Update {
                op,
                prefix,
                operand,
            },
        )
    }

    fn create_binary(
        &mut self,
        span: SourceSpan,
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
    ) -> NodeIndex {
        if self.fold_constants
            && let (Some(l), Some(r)) = (self.number_value(left), self.number_value(right))
        {
            let folded = match op {
                BinaryOp::Add => Some(l + r),
                BinaryOp::Subtract => Some(l - r),
                BinaryOp::Multiply => Some(l * r),
                BinaryOp::Divide => Some(l / r),
                _ => None,
            };
            if let Some(value) = folded
                && let Some(node) = self.arena.get_mut(left)
            {
                node.span = span;
                node.data = NodeData::Number(value);
                return left;
            }
        }
        self.add(span, NodeData::Binary { op, left, right })
    }

    fn create_assign(
        &mut self,
        span: SourceSpan,
        op: AssignOp,
        target: NodeIndex,
        value: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::Assign { op, target, value })
    }

    fn create_destructuring_assign(
        &mut self,
        span: SourceSpan,
        pattern: NodeIndex,
        value: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::DestructuringAssign { pattern, value })
    }

    fn create_conditional(
        &mut self,
        span: SourceSpan,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::Conditional {
                test,
                consequent,
                alternate,
            },
        )
    }

    fn create_sequence(&mut self, span: SourceSpan, expressions: NodeList) -> NodeIndex {
        self.add(span, NodeData::Sequence { expressions })
    }

    fn create_call(&mut self, span: SourceSpan, callee: NodeIndex, arguments: NodeList) -> NodeIndex {
        if matches!(self.arena.data(callee), Some(NodeData::Identifier(name)) if *name == self.names.eval)
        {
            self.current.features |= CodeFeatures::EVAL;
        }
        self.add(span, NodeData::Call { callee, arguments })
    }

    fn create_new(
        &mut self,
        span: SourceSpan,
        callee: NodeIndex,
        arguments: Option<NodeList>,
    ) -> NodeIndex {
        self.add(span, NodeData::New { callee, arguments })
    }

    fn create_dot(&mut self, span: SourceSpan, object: NodeIndex, property: Atom) -> NodeIndex {
        self.add(span, NodeData::Dot { object, property })
    }

    fn create_bracket(
        &mut self,
        span: SourceSpan,
        object: NodeIndex,
        property: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::Bracket { object, property })
    }

    fn is_location(&self, node: NodeIndex) -> bool {
        self.arena.data(node).is_some_and(NodeData::is_location)
    }

    fn is_resolve(&self, node: NodeIndex) -> bool {
        matches!(self.arena.data(node), Some(NodeData::Identifier(_)))
    }

    // ---- Patterns ----

    fn create_binding(&mut self, span: SourceSpan, name: Atom) -> NodeIndex {
        self.add(span, NodeData::BindingIdentifier(name))
    }

    fn create_array_pattern(
        &mut self,
        span: SourceSpan,
        elements: NodeList,
        rest: Option<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::ArrayPattern {
                elements,
                rest: Self::opt(rest),
            },
        )
    }

    fn create_object_pattern(&mut self, span: SourceSpan, properties: NodeList) -> NodeIndex {
        self.add(span, NodeData::ObjectPattern { properties })
    }

    fn create_pattern_property(
        &mut self,
        span: SourceSpan,
        key: PropertyName<NodeIndex>,
        target: NodeIndex,
        default: Option<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::PatternProperty {
                key,
                target,
                default: Self::opt(default),
            },
        )
    }

    fn create_pattern_default(
        &mut self,
        span: SourceSpan,
        target: NodeIndex,
        default: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::PatternDefault { target, default })
    }

    // ---- Statements ----

    fn create_expression_statement(&mut self, span: SourceSpan, expr: NodeIndex) -> NodeIndex {
        self.add(span, NodeData::Expression { expression: expr })
    }

    fn create_var_declaration(
        &mut self,
        span: SourceSpan,
        kind: VarKind,
        declarations: NodeList,
    ) -> NodeIndex {
        self.add(span, NodeData::VarDeclaration { kind, declarations })
    }

    fn create_declarator(
        &mut self,
        span: SourceSpan,
        target: NodeIndex,
        init: Option<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::Declarator {
                target,
                init: Self::opt(init),
            },
        )
    }

    fn create_empty(&mut self, span: SourceSpan) -> NodeIndex {
        self.add(span, NodeData::Empty)
    }

    fn create_debugger(&mut self, span: SourceSpan) -> NodeIndex {
        self.add(span, NodeData::Debugger)
    }

    fn create_block(&mut self, span: SourceSpan, body: NodeList) -> NodeIndex {
        self.add(span, NodeData::Block { body })
    }

    fn create_if(
        &mut self,
        span: SourceSpan,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: Option<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::If {
                test,
                consequent,
                alternate: Self::opt(alternate),
            },
        )
    }

    fn create_do_while(&mut self, span: SourceSpan, body: NodeIndex, test: NodeIndex) -> NodeIndex {
        self.add(span, NodeData::DoWhile { body, test })
    }

    fn create_while(&mut self, span: SourceSpan, test: NodeIndex, body: NodeIndex) -> NodeIndex {
        self.add(span, NodeData::While { test, body })
    }

    fn create_for(
        &mut self,
        span: SourceSpan,
        init: Option<NodeIndex>,
        test: Option<NodeIndex>,
        update: Option<NodeIndex>,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::For {
                init: Self::opt(init),
                test: Self::opt(test),
                update: Self::opt(update),
                body,
            },
        )
    }

    fn create_for_in(
        &mut self,
        span: SourceSpan,
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::ForIn { left, right, body })
    }

    fn create_for_of(
        &mut self,
        span: SourceSpan,
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(span, NodeData::ForOf { left, right, body })
    }

    fn create_continue(&mut self, span: SourceSpan, label: Atom) -> NodeIndex {
        self.add(span, NodeData::Continue { label })
    }

    fn create_break(&mut self, span: SourceSpan, label: Atom) -> NodeIndex {
        self.add(span, NodeData::Break { label })
    }

    fn create_return(&mut self, span: SourceSpan, argument: Option<NodeIndex>) -> NodeIndex {
        self.add(
            span,
            NodeData::Return {
                argument: Self::opt(argument),
            },
        )
    }

    fn create_with(&mut self, span: SourceSpan, object: NodeIndex, body: NodeIndex) -> NodeIndex {
        self.current.features |= CodeFeatures::WITH;
        self.add(span, NodeData::With { object, body })
    }

    fn create_labeled(&mut self, span: SourceSpan, label: Atom, body: NodeIndex) -> NodeIndex {
        self.add(span, NodeData::Labeled { label, body })
    }

    fn create_switch(
        &mut self,
        span: SourceSpan,
        discriminant: NodeIndex,
        cases: NodeList,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::Switch {
                discriminant,
                cases,
            },
        )
    }

    fn create_case(
        &mut self,
        span: SourceSpan,
        test: Option<NodeIndex>,
        body: NodeList,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::Case {
                test: Self::opt(test),
                body,
            },
        )
    }

    fn create_throw(&mut self, span: SourceSpan, argument: NodeIndex) -> NodeIndex {
        self.add(span, NodeData::Throw { argument })
    }

    fn create_try(
        &mut self,
        span: SourceSpan,
        block: NodeIndex,
        param: Atom,
        handler: Option<NodeIndex>,
        finalizer: Option<NodeIndex>,
    ) -> NodeIndex {
        if handler.is_some() {
            self.current.features |= CodeFeatures::CATCH;
        }
        self.add(
            span,
            NodeData::Try {
                block,
                param,
                handler: Self::opt(handler),
                finalizer: Self::opt(finalizer),
            },
        )
    }

    fn create_function_declaration(
        &mut self,
        span: SourceSpan,
        info: ParserFunctionInfo<Self>,
    ) -> NodeIndex {
        let data = self.function_data(info);
        let function = self.add(span, NodeData::Function(Box::new(data)));
        self.current.function_declarations.push(function);
        self.add(span, NodeData::FunctionDeclaration { function })
    }

    fn create_class_declaration(
        &mut self,
        span: SourceSpan,
        info: ParserClassInfo<Self>,
    ) -> NodeIndex {
        let class = self.add(span, NodeData::Class(Box::new(Self::class_data(info))));
        self.add(span, NodeData::ClassDeclaration { class })
    }

    // ---- Declarations and bodies ----

    fn add_var(&mut self, name: Atom) {
        self.current.add_var(name);
    }

    fn begin_function_body(&mut self) {
        let outer = std::mem::take(&mut self.current);
        self.saved.push(outer);
    }

    fn create_function_body(
        &mut self,
        span: SourceSpan,
        statements: NodeList,
        strict: bool,
    ) -> NodeIndex {
        let outer = self.saved.pop().unwrap_or_default();
        let frame = std::mem::replace(&mut self.current, outer);
        let mut features = frame.features;
        if strict {
            features |= CodeFeatures::STRICT_MODE;
        }
        self.add(
            span,
            NodeData::FunctionBody(Box::new(FunctionBodyData {
                statements,
                strict,
                var_declarations: frame.var_declarations,
                function_declarations: frame.function_declarations,
                features,
                constant_count: frame.constant_count,
            })),
        )
    }

    fn create_lazy_function_body(&mut self, span: SourceSpan, lazy: LazyFunction) -> NodeIndex {
        self.add(span, NodeData::LazyFunctionBody(Box::new(lazy)))
    }

    fn create_program(
        &mut self,
        span: SourceSpan,
        body: NodeList,
        strict: bool,
        code_type: CodeType,
    ) -> NodeIndex {
        self.add(
            span,
            NodeData::Program {
                body,
                strict,
                code_type,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(fold: bool) -> (AstBuilder, Interner) {
        let mut interner = Interner::new();
        let names = KnownNames::new(&mut interner);
        (AstBuilder::new(names, 0, fold), interner)
    }

    #[test]
    fn test_eval_call_sets_feature() {
        let (mut b, mut interner) = builder(false);
        let eval = interner.intern("eval");
        let callee = b.create_resolve(SourceSpan::new(0, 4), eval);
        b.create_call(SourceSpan::new(0, 6), callee, Vec::new());
        let (_, frame) = b.finish(interner);
        assert!(frame.features.contains(CodeFeatures::EVAL));
        assert!(!frame.features.contains(CodeFeatures::ARGUMENTS));
    }

    #[test]
    fn test_folding_reuses_left_operand() {
        let (mut b, _interner) = builder(true);
        let one = b.create_number(SourceSpan::new(0, 1), 1.0);
        let two = b.create_number(SourceSpan::new(4, 5), 2.0);
        let sum = b.create_binary(SourceSpan::new(0, 5), BinaryOp::Add, one, two);
        assert_eq!(sum, one);
        assert_eq!(b.arena().data(sum), Some(&NodeData::Number(3.0)));
        let negated = b.create_unary(SourceSpan::new(0, 6), UnaryOp::Minus, sum);
        assert_eq!(b.arena().data(negated), Some(&NodeData::Number(-3.0)));
    }

    #[test]
    fn test_without_folding_builds_binary_node() {
        let (mut b, _) = builder(false);
        let one = b.create_number(SourceSpan::new(0, 1), 1.0);
        let two = b.create_number(SourceSpan::new(4, 5), 2.0);
        let sum = b.create_binary(SourceSpan::new(0, 5), BinaryOp::Add, one, two);
        assert_ne!(sum, one);
        assert_eq!(b.arena().data(sum).map(NodeData::kind_name), Some("Binary"));
    }

    #[test]
    fn test_function_body_frames_are_separate() {
        let (mut b, mut interner) = builder(false);
        let outer = interner.intern("outer");
        let inner = interner.intern("inner");
        b.add_var(outer);
        b.begin_function_body();
        b.add_var(inner);
        b.add_var(inner);
        let body = b.create_function_body(SourceSpan::new(0, 2), Vec::new(), true);
        let Some(NodeData::FunctionBody(data)) = b.arena().data(body) else {
            panic!("expected a function body");
        };
        assert_eq!(data.var_declarations, vec![inner]);
        assert!(data.features.contains(CodeFeatures::STRICT_MODE));
        let (_, frame) = b.finish(interner);
        assert_eq!(frame.var_declarations, vec![outer]);
    }

    #[test]
    fn test_rollback_forgets_speculative_work() {
        let (mut b, mut interner) = builder(false);
        let x = interner.intern("x");
        b.create_number(SourceSpan::new(0, 1), 1.0);
        let checkpoint = b.checkpoint();
        b.create_this(SourceSpan::new(2, 6));
        b.create_string(SourceSpan::new(7, 9), x);
        b.add_var(x);
        b.rollback(checkpoint);
        assert_eq!(b.arena().len(), 1);
        b.add_var(x);
        let (_, frame) = b.finish(interner);
        assert_eq!(frame.constant_count, 1);
        assert!(frame.features.is_empty());
        assert_eq!(frame.var_declarations, vec![x]);
    }
}
