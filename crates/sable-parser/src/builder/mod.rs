//! Tree builders.
//!
//! The grammar in `crate::parser` is written once, generic over a
//! `TreeBuilder`. Every construct it recognizes is reported through a
//! `create_*` call, and the builder decides what a "node" is:
//!
//! - [`AstBuilder`] allocates real nodes in a `NodeArena`.
//! - [`SyntaxChecker`] returns small tags and allocates nothing; it is used
//!   for check-only parses and for skipping nested function bodies.
//!
//! Legality checks that need to look at a sub-result (is this a valid
//! assignment target? is this regex well formed?) go through the builder
//! too, so both backends accept exactly the same inputs.

use std::fmt::Debug;

use sable_common::{Atom, SourceSpan};
use sable_lexer::{LexerFlags, RegexError, check_regex_flags, check_regex_syntax};
use smallvec::SmallVec;

use crate::ast::{
    AssignOp, BinaryOp, ConstructorKind, FunctionMode, LazyFunction, PropertyKind, PropertyName,
    UnaryOp, UpdateOp, VarKind,
};
use crate::options::CodeType;

pub mod ast_builder;
pub use ast_builder::AstBuilder;

pub mod syntax_checker;
pub use syntax_checker::{SyntaxChecker, SyntaxTag};

/// Everything the grammar collected about one function.
pub struct ParserFunctionInfo<B: TreeBuilder + ?Sized> {
    /// `Atom::NONE` for anonymous functions, methods and arrows.
    pub name: Atom,
    pub mode: FunctionMode,
    pub params: B::List,
    pub parameter_count: u32,
    pub body: Option<B::Node>,
    /// Offset of the first token of the parameter list.
    pub start_offset: u32,
    /// Offset just past the last token of the body.
    pub end_offset: u32,
    pub start_line: u32,
    pub end_line: u32,
    pub body_start_column: u32,
    pub constructor_kind: ConstructorKind,
}

impl<B: TreeBuilder + ?Sized> ParserFunctionInfo<B> {
    pub fn new(mode: FunctionMode) -> Self {
        ParserFunctionInfo {
            name: Atom::NONE,
            mode,
            params: B::List::default(),
            parameter_count: 0,
            body: None,
            start_offset: 0,
            end_offset: 0,
            start_line: 0,
            end_line: 0,
            body_start_column: 0,
            constructor_kind: ConstructorKind::None,
        }
    }
}

/// Everything the grammar collected about one class.
pub struct ParserClassInfo<B: TreeBuilder + ?Sized> {
    pub name: Atom,
    pub heritage: Option<B::Node>,
    pub constructor: Option<B::Node>,
    pub methods: B::List,
    pub static_methods: B::List,
}

impl<B: TreeBuilder + ?Sized> Default for ParserClassInfo<B> {
    fn default() -> Self {
        ParserClassInfo {
            name: Atom::NONE,
            heritage: None,
            constructor: None,
            methods: B::List::default(),
            static_methods: B::List::default(),
        }
    }
}

/// Regex literals are checked the same way by every builder.
pub fn check_regex(pattern: &str, flags: &str) -> Result<(), RegexError> {
    check_regex_flags(flags)?;
    check_regex_syntax(pattern)
}

pub trait TreeBuilder {
    /// Handle for a built expression, statement or pattern.
    type Node: Copy + Debug;
    /// Growable list of nodes (arguments, statements, elements, ...).
    type List: Default;
    /// Builder state captured before speculative parsing.
    type Checkpoint: Copy;

    /// Produces a tree a code generator can consume.
    const CREATES_AST: bool;
    /// Wants closed-over variable tracking when scopes are popped.
    const NEEDS_FREE_VARIABLE_INFO: bool;
    /// May skip bodies recorded in a `FunctionCache`.
    const CAN_USE_FUNCTION_CACHE: bool;
    /// Extra lexer flags for tokens whose string value the builder never
    /// reads (the operand after an operator or a comma).
    const DONT_BUILD_STRINGS: LexerFlags;
    /// Extra lexer flags for property names after `.`.
    const DONT_BUILD_KEYWORDS: LexerFlags;

    fn checkpoint(&self) -> Self::Checkpoint;
    /// Forget everything created since `checkpoint`.
    fn rollback(&mut self, checkpoint: Self::Checkpoint);

    // ---- Lists ----
    fn append(&mut self, list: &mut Self::List, node: Self::Node);
    /// An elision in an array literal or array pattern.
    fn append_hole(&mut self, list: &mut Self::List);

    // ---- Literals and primaries ----
    fn create_this(&mut self, span: SourceSpan) -> Self::Node;
    fn create_super(&mut self, span: SourceSpan) -> Self::Node;
    fn create_resolve(&mut self, span: SourceSpan, name: Atom) -> Self::Node;
    fn create_null(&mut self, span: SourceSpan) -> Self::Node;
    fn create_boolean(&mut self, span: SourceSpan, value: bool) -> Self::Node;
    fn create_number(&mut self, span: SourceSpan, value: f64) -> Self::Node;
    fn create_string(&mut self, span: SourceSpan, value: Atom) -> Self::Node;
    fn create_regex(
        &mut self,
        span: SourceSpan,
        pattern: Atom,
        flags: Atom,
        pattern_text: &str,
        flags_text: &str,
    ) -> Result<Self::Node, RegexError>;
    fn create_template_element(&mut self, span: SourceSpan, cooked: Atom, raw: Atom)
    -> Self::Node;
    fn create_template_literal(
        &mut self,
        span: SourceSpan,
        quasis: Self::List,
        expressions: Self::List,
    ) -> Self::Node;
    fn create_tagged_template(
        &mut self,
        span: SourceSpan,
        tag: Self::Node,
        quasi: Self::Node,
    ) -> Self::Node;
    fn create_array(&mut self, span: SourceSpan, elements: Self::List) -> Self::Node;
    fn create_spread(&mut self, span: SourceSpan, argument: Self::Node) -> Self::Node;
    fn create_object(&mut self, span: SourceSpan, properties: Self::List) -> Self::Node;
    fn create_property(
        &mut self,
        span: SourceSpan,
        key: PropertyName<Self::Node>,
        value: Self::Node,
        kind: PropertyKind,
    ) -> Self::Node;
    fn create_function_expr(
        &mut self,
        span: SourceSpan,
        info: ParserFunctionInfo<Self>,
    ) -> Self::Node;
    fn create_class_expr(&mut self, span: SourceSpan, info: ParserClassInfo<Self>) -> Self::Node;

    // ---- Operators and access ----
    fn create_unary(&mut self, span: SourceSpan, op: UnaryOp, operand: Self::Node) -> Self::Node;
    fn create_update(
        &mut self,
        span: SourceSpan,
        op: UpdateOp,
        prefix: bool,
        operand: Self::Node,
    ) -> Self::Node;
    fn create_binary(
        &mut self,
        span: SourceSpan,
        op: BinaryOp,
        left: Self::Node,
        right: Self::Node,
    ) -> Self::Node;
    fn create_assign(
        &mut self,
        span: SourceSpan,
        op: AssignOp,
        target: Self::Node,
        value: Self::Node,
    ) -> Self::Node;
    fn create_destructuring_assign(
        &mut self,
        span: SourceSpan,
        pattern: Self::Node,
        value: Self::Node,
    ) -> Self::Node;
    fn create_conditional(
        &mut self,
        span: SourceSpan,
        test: Self::Node,
        consequent: Self::Node,
        alternate: Self::Node,
    ) -> Self::Node;
    fn create_sequence(&mut self, span: SourceSpan, expressions: Self::List) -> Self::Node;
    fn create_call(
        &mut self,
        span: SourceSpan,
        callee: Self::Node,
        arguments: Self::List,
    ) -> Self::Node;
    fn create_new(
        &mut self,
        span: SourceSpan,
        callee: Self::Node,
        arguments: Option<Self::List>,
    ) -> Self::Node;
    fn create_dot(&mut self, span: SourceSpan, object: Self::Node, property: Atom) -> Self::Node;
    fn create_bracket(
        &mut self,
        span: SourceSpan,
        object: Self::Node,
        property: Self::Node,
    ) -> Self::Node;

    /// Resolve, dot and bracket expressions.
    fn is_location(&self, node: Self::Node) -> bool;
    /// A plain identifier reference.
    fn is_resolve(&self, node: Self::Node) -> bool;

    // ---- Patterns ----
    fn create_binding(&mut self, span: SourceSpan, name: Atom) -> Self::Node;
    fn create_array_pattern(
        &mut self,
        span: SourceSpan,
        elements: Self::List,
        rest: Option<Self::Node>,
    ) -> Self::Node;
    fn create_object_pattern(&mut self, span: SourceSpan, properties: Self::List) -> Self::Node;
    fn create_pattern_property(
        &mut self,
        span: SourceSpan,
        key: PropertyName<Self::Node>,
        target: Self::Node,
        default: Option<Self::Node>,
    ) -> Self::Node;
    fn create_pattern_default(
        &mut self,
        span: SourceSpan,
        target: Self::Node,
        default: Self::Node,
    ) -> Self::Node;

    // ---- Statements ----
    fn create_expression_statement(&mut self, span: SourceSpan, expr: Self::Node) -> Self::Node;
    fn create_var_declaration(
        &mut self,
        span: SourceSpan,
        kind: VarKind,
        declarations: Self::List,
    ) -> Self::Node;
    fn create_declarator(
        &mut self,
        span: SourceSpan,
        target: Self::Node,
        init: Option<Self::Node>,
    ) -> Self::Node;
    fn create_empty(&mut self, span: SourceSpan) -> Self::Node;
    fn create_debugger(&mut self, span: SourceSpan) -> Self::Node;
    fn create_block(&mut self, span: SourceSpan, body: Self::List) -> Self::Node;
    fn create_if(
        &mut self,
        span: SourceSpan,
        test: Self::Node,
        consequent: Self::Node,
        alternate: Option<Self::Node>,
    ) -> Self::Node;
    fn create_do_while(&mut self, span: SourceSpan, body: Self::Node, test: Self::Node)
    -> Self::Node;
    fn create_while(&mut self, span: SourceSpan, test: Self::Node, body: Self::Node) -> Self::Node;
    fn create_for(
        &mut self,
        span: SourceSpan,
        init: Option<Self::Node>,
        test: Option<Self::Node>,
        update: Option<Self::Node>,
        body: Self::Node,
    ) -> Self::Node;
    fn create_for_in(
        &mut self,
        span: SourceSpan,
        left: Self::Node,
        right: Self::Node,
        body: Self::Node,
    ) -> Self::Node;
    fn create_for_of(
        &mut self,
        span: SourceSpan,
        left: Self::Node,
        right: Self::Node,
        body: Self::Node,
    ) -> Self::Node;
    fn create_continue(&mut self, span: SourceSpan, label: Atom) -> Self::Node;
    fn create_break(&mut self, span: SourceSpan, label: Atom) -> Self::Node;
    fn create_return(&mut self, span: SourceSpan, argument: Option<Self::Node>) -> Self::Node;
    fn create_with(&mut self, span: SourceSpan, object: Self::Node, body: Self::Node)
    -> Self::Node;
    fn create_labeled(&mut self, span: SourceSpan, label: Atom, body: Self::Node) -> Self::Node;
    fn create_switch(
        &mut self,
        span: SourceSpan,
        discriminant: Self::Node,
        cases: Self::List,
    ) -> Self::Node;
    fn create_case(
        &mut self,
        span: SourceSpan,
        test: Option<Self::Node>,
        body: Self::List,
    ) -> Self::Node;
    fn create_throw(&mut self, span: SourceSpan, argument: Self::Node) -> Self::Node;
    fn create_try(
        &mut self,
        span: SourceSpan,
        block: Self::Node,
        param: Atom,
        handler: Option<Self::Node>,
        finalizer: Option<Self::Node>,
    ) -> Self::Node;
    fn create_function_declaration(
        &mut self,
        span: SourceSpan,
        info: ParserFunctionInfo<Self>,
    ) -> Self::Node;
    fn create_class_declaration(
        &mut self,
        span: SourceSpan,
        info: ParserClassInfo<Self>,
    ) -> Self::Node;

    // ---- Declarations and bodies ----
    /// Record a hoisted `var`/`let`/`const` name in the current body.
    fn add_var(&mut self, name: Atom);
    /// Open a body that will be built in full; pairs with
    /// `create_function_body`.
    fn begin_function_body(&mut self);
    fn create_function_body(
        &mut self,
        span: SourceSpan,
        statements: Self::List,
        strict: bool,
    ) -> Self::Node;
    fn create_lazy_function_body(&mut self, span: SourceSpan, lazy: LazyFunction) -> Self::Node;
    fn create_program(
        &mut self,
        span: SourceSpan,
        body: Self::List,
        strict: bool,
        code_type: CodeType,
    ) -> Self::Node;
}

// =============================================================================
// Binary expression stacks
// =============================================================================

/// Operand and operator stacks for precedence climbing.
///
/// One stack lives per binary-expression parse, so backtracking out of a
/// speculative parse never leaves stale entries behind.
pub struct BinaryStack<N> {
    operands: SmallVec<[(N, SourceSpan); 8]>,
    operators: SmallVec<[(BinaryOp, u8); 8]>,
}

impl<N: Copy> BinaryStack<N> {
    pub fn new() -> Self {
        BinaryStack {
            operands: SmallVec::new(),
            operators: SmallVec::new(),
        }
    }

    pub fn push_operand(&mut self, node: N, span: SourceSpan) {
        self.operands.push((node, span));
    }

    /// Reduce every stacked operator that binds at least as tightly as an
    /// incoming operator of `precedence`. A right-associative incoming
    /// operator only reduces strictly tighter ones.
    pub fn reduce_for<B: TreeBuilder<Node = N>>(
        &mut self,
        builder: &mut B,
        precedence: u8,
        right_associative: bool,
    ) {
        while let Some(&(_, top)) = self.operators.last() {
            let reduce = if right_associative {
                top > precedence
            } else {
                top >= precedence
            };
            if !reduce {
                break;
            }
            self.reduce_one(builder);
        }
    }

    pub fn push_operator(&mut self, op: BinaryOp, precedence: u8) {
        self.operators.push((op, precedence));
    }

    /// Fold everything that is left into one operand.
    pub fn finish<B: TreeBuilder<Node = N>>(mut self, builder: &mut B) -> Option<(N, SourceSpan)> {
        while !self.operators.is_empty() {
            self.reduce_one(builder);
        }
        self.operands.pop()
    }

    fn reduce_one<B: TreeBuilder<Node = N>>(&mut self, builder: &mut B) {
        let (Some((op, _)), Some((right, right_span)), Some((left, left_span))) =
            (self.operators.pop(), self.operands.pop(), self.operands.pop())
        else {
            return;
        };
        let span = left_span.cover(right_span);
        let node = builder.create_binary(span, op, left, right);
        self.operands.push((node, span));
    }
}

impl<N: Copy> Default for BinaryStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_stack_left_associates_equal_precedence() {
        let mut checker = SyntaxChecker::new();
        let mut stack = BinaryStack::new();
        let span = SourceSpan::new(0, 1);
        stack.push_operand(SyntaxTag::Literal, span);
        stack.reduce_for(&mut checker, 9, false);
        stack.push_operator(BinaryOp::Subtract, 9);
        stack.push_operand(SyntaxTag::Literal, SourceSpan::new(2, 3));
        stack.reduce_for(&mut checker, 9, false);
        assert_eq!(stack.operators.len(), 0);
        stack.push_operator(BinaryOp::Subtract, 9);
        stack.push_operand(SyntaxTag::Literal, SourceSpan::new(4, 5));
        let (tag, span) = stack.finish(&mut checker).unwrap();
        assert_eq!(tag, SyntaxTag::Binary);
        assert_eq!(span, SourceSpan::new(0, 5));
    }

    #[test]
    fn test_binary_stack_right_associative_keeps_operator() {
        let mut checker = SyntaxChecker::new();
        let mut stack = BinaryStack::new();
        stack.push_operand(SyntaxTag::Literal, SourceSpan::new(0, 1));
        stack.push_operator(BinaryOp::Exponent, 11);
        stack.push_operand(SyntaxTag::Literal, SourceSpan::new(2, 3));
        stack.reduce_for(&mut checker, 11, true);
        assert_eq!(stack.operators.len(), 1);
    }

    #[test]
    fn test_check_regex_reports_flags_first() {
        assert_eq!(check_regex("(", "q"), Err(RegexError::InvalidFlags));
        assert_eq!(check_regex("(", "g"), Err(RegexError::MissingParentheses));
        assert_eq!(check_regex("a+", "gi"), Ok(()));
    }
}
