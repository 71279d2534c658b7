//! Check-only tree builder.
//!
//! Nodes are one-word tags, lists are element counts. Nothing is allocated
//! per node, which is what makes skipping nested function bodies cheap.

use sable_common::{Atom, SourceSpan};
use sable_lexer::{LexerFlags, RegexError};

use super::{ParserClassInfo, ParserFunctionInfo, TreeBuilder, check_regex};
use crate::ast::{
    AssignOp, BinaryOp, LazyFunction, PropertyKind, PropertyName, UnaryOp, UpdateOp, VarKind,
};
use crate::options::CodeType;

/// What the check-only parse remembers about a sub-result: just enough to
/// answer `is_location` and `is_resolve`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntaxTag {
    Resolve,
    Dot,
    Bracket,
    Call,
    New,
    This,
    Super,
    Literal,
    Regex,
    Template,
    Array,
    Object,
    Property,
    Function,
    Class,
    Unary,
    Update,
    Binary,
    Assign,
    Conditional,
    Sequence,
    Spread,
    Binding,
    Pattern,
    Statement,
    FunctionBody,
    Program,
}

#[derive(Debug, Default)]
pub struct SyntaxChecker {
    created: u32,
}

impl SyntaxChecker {
    pub fn new() -> Self {
        SyntaxChecker::default()
    }

    /// Number of tags handed out, reported in trace logs.
    pub fn created(&self) -> u32 {
        self.created
    }

    #[inline]
    fn tag(&mut self, tag: SyntaxTag) -> SyntaxTag {
        self.created = self.created.wrapping_add(1);
        tag
    }
}

impl TreeBuilder for SyntaxChecker {
    type Node = SyntaxTag;
    type List = u32;
    type Checkpoint = ();

    const CREATES_AST: bool = false;
    const NEEDS_FREE_VARIABLE_INFO: bool = false;
    const CAN_USE_FUNCTION_CACHE: bool = true;
    const DONT_BUILD_STRINGS: LexerFlags = LexerFlags::DONT_BUILD_STRINGS;
    const DONT_BUILD_KEYWORDS: LexerFlags = LexerFlags::DONT_BUILD_KEYWORDS;

    fn checkpoint(&self) {}

    fn rollback(&mut self, _checkpoint: ()) {}

    #[inline]
    fn append(&mut self, list: &mut u32, _node: SyntaxTag) {
        *list += 1;
    }

    #[inline]
    fn append_hole(&mut self, list: &mut u32) {
        *list += 1;
    }

    fn create_this(&mut self, _span: SourceSpan) -> SyntaxTag {
        self.tag(SyntaxTag::This)
    }

    fn create_super(&mut self, _span: SourceSpan) -> SyntaxTag {
        self.tag(SyntaxTag::Super)
    }

    fn create_resolve(&mut self, _span: SourceSpan, _name: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Resolve)
    }

    fn create_null(&mut self, _span: SourceSpan) -> SyntaxTag {
        self.tag(SyntaxTag::Literal)
    }

    fn create_boolean(&mut self, _span: SourceSpan, _value: bool) -> SyntaxTag {
        self.tag(SyntaxTag::Literal)
    }

    fn create_number(&mut self, _span: SourceSpan, _value: f64) -> SyntaxTag {
        self.tag(SyntaxTag::Literal)
    }

    fn create_string(&mut self, _span: SourceSpan, _value: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Literal)
    }

    fn create_regex(
        &mut self,
        _span: SourceSpan,
        _pattern: Atom,
        _flags: Atom,
        pattern_text: &str,
        flags_text: &str,
    ) -> Result<SyntaxTag, RegexError> {
        check_regex(pattern_text, flags_text)?;
        Ok(self.tag(SyntaxTag::Regex))
    }

    fn create_template_element(&mut self, _span: SourceSpan, _cooked: Atom, _raw: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Template)
    }

    fn create_template_literal(&mut self, _span: SourceSpan, _quasis: u32, _exprs: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Template)
    }

    fn create_tagged_template(
        &mut self,
        _span: SourceSpan,
        _tag: SyntaxTag,
        _quasi: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Call)
    }

    fn create_array(&mut self, _span: SourceSpan, _elements: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Array)
    }

    fn create_spread(&mut self, _span: SourceSpan, _argument: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Spread)
    }

    fn create_object(&mut self, _span: SourceSpan, _properties: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Object)
    }

    fn create_property(
        &mut self,
        _span: SourceSpan,
        _key: PropertyName<SyntaxTag>,
        _value: SyntaxTag,
        _kind: PropertyKind,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Property)
    }

    fn create_function_expr(&mut self, _span: SourceSpan, _info: ParserFunctionInfo<Self>) -> SyntaxTag {
        self.tag(SyntaxTag::Function)
    }

    fn create_class_expr(&mut self, _span: SourceSpan, _info: ParserClassInfo<Self>) -> SyntaxTag {
        self.tag(SyntaxTag::Class)
    }

    fn create_unary(&mut self, _span: SourceSpan, _op: UnaryOp, _operand: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Unary)
    }

    fn create_update(
        &mut self,
        _span: SourceSpan,
        _op: UpdateOp,
        _prefix: bool,
        _operand: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Update)
    }

    fn create_binary(
        &mut self,
        _span: SourceSpan,
        _op: BinaryOp,
        _left: SyntaxTag,
        _right: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Binary)
    }

    fn create_assign(
        &mut self,
        _span: SourceSpan,
        _op: AssignOp,
        _target: SyntaxTag,
        _value: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Assign)
    }

    fn create_destructuring_assign(
        &mut self,
        _span: SourceSpan,
        _pattern: SyntaxTag,
        _value: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Assign)
    }

    fn create_conditional(
        &mut self,
        _span: SourceSpan,
        _test: SyntaxTag,
        _consequent: SyntaxTag,
        _alternate: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Conditional)
    }

    fn create_sequence(&mut self, _span: SourceSpan, _expressions: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Sequence)
    }

    fn create_call(&mut self, _span: SourceSpan, _callee: SyntaxTag, _arguments: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Call)
    }

    fn create_new(&mut self, _span: SourceSpan, _callee: SyntaxTag, _arguments: Option<u32>) -> SyntaxTag {
        self.tag(SyntaxTag::New)
    }

    fn create_dot(&mut self, _span: SourceSpan, _object: SyntaxTag, _property: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Dot)
    }

    fn create_bracket(&mut self, _span: SourceSpan, _object: SyntaxTag, _property: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Bracket)
    }

    #[inline]
    fn is_location(&self, node: SyntaxTag) -> bool {
        matches!(node, SyntaxTag::Resolve | SyntaxTag::Dot | SyntaxTag::Bracket)
    }

    #[inline]
    fn is_resolve(&self, node: SyntaxTag) -> bool {
        node == SyntaxTag::Resolve
    }

    fn create_binding(&mut self, _span: SourceSpan, _name: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Binding)
    }

    fn create_array_pattern(&mut self, _span: SourceSpan, _elements: u32, _rest: Option<SyntaxTag>) -> SyntaxTag {
        self.tag(SyntaxTag::Pattern)
    }

    fn create_object_pattern(&mut self, _span: SourceSpan, _properties: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Pattern)
    }

    fn create_pattern_property(
        &mut self,
        _span: SourceSpan,
        _key: PropertyName<SyntaxTag>,
        _target: SyntaxTag,
        _default: Option<SyntaxTag>,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Pattern)
    }

    fn create_pattern_default(&mut self, _span: SourceSpan, _target: SyntaxTag, _default: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Pattern)
    }

    fn create_expression_statement(&mut self, _span: SourceSpan, _expr: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_var_declaration(&mut self, _span: SourceSpan, _kind: VarKind, _declarations: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_declarator(&mut self, _span: SourceSpan, _target: SyntaxTag, _init: Option<SyntaxTag>) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_empty(&mut self, _span: SourceSpan) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_debugger(&mut self, _span: SourceSpan) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_block(&mut self, _span: SourceSpan, _body: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_if(
        &mut self,
        _span: SourceSpan,
        _test: SyntaxTag,
        _consequent: SyntaxTag,
        _alternate: Option<SyntaxTag>,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_do_while(&mut self, _span: SourceSpan, _body: SyntaxTag, _test: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_while(&mut self, _span: SourceSpan, _test: SyntaxTag, _body: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_for(
        &mut self,
        _span: SourceSpan,
        _init: Option<SyntaxTag>,
        _test: Option<SyntaxTag>,
        _update: Option<SyntaxTag>,
        _body: SyntaxTag,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_for_in(&mut self, _span: SourceSpan, _left: SyntaxTag, _right: SyntaxTag, _body: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_for_of(&mut self, _span: SourceSpan, _left: SyntaxTag, _right: SyntaxTag, _body: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_continue(&mut self, _span: SourceSpan, _label: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_break(&mut self, _span: SourceSpan, _label: Atom) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_return(&mut self, _span: SourceSpan, _argument: Option<SyntaxTag>) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_with(&mut self, _span: SourceSpan, _object: SyntaxTag, _body: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_labeled(&mut self, _span: SourceSpan, _label: Atom, _body: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_switch(&mut self, _span: SourceSpan, _discriminant: SyntaxTag, _cases: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_case(&mut self, _span: SourceSpan, _test: Option<SyntaxTag>, _body: u32) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_throw(&mut self, _span: SourceSpan, _argument: SyntaxTag) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_try(
        &mut self,
        _span: SourceSpan,
        _block: SyntaxTag,
        _param: Atom,
        _handler: Option<SyntaxTag>,
        _finalizer: Option<SyntaxTag>,
    ) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_function_declaration(&mut self, _span: SourceSpan, _info: ParserFunctionInfo<Self>) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn create_class_declaration(&mut self, _span: SourceSpan, _info: ParserClassInfo<Self>) -> SyntaxTag {
        self.tag(SyntaxTag::Statement)
    }

    fn add_var(&mut self, _name: Atom) {}

    fn begin_function_body(&mut self) {}

    fn create_function_body(&mut self, _span: SourceSpan, _statements: u32, _strict: bool) -> SyntaxTag {
        self.tag(SyntaxTag::FunctionBody)
    }

    fn create_lazy_function_body(&mut self, _span: SourceSpan, _lazy: LazyFunction) -> SyntaxTag {
        self.tag(SyntaxTag::FunctionBody)
    }

    fn create_program(&mut self, _span: SourceSpan, _body: u32, _strict: bool, _code_type: CodeType) -> SyntaxTag {
        self.tag(SyntaxTag::Program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations() {
        let mut checker = SyntaxChecker::new();
        let span = SourceSpan::new(0, 1);
        let resolve = checker.create_resolve(span, Atom::NONE);
        let dot = checker.create_dot(span, resolve, Atom::NONE);
        let call = checker.create_call(span, dot, 0);
        assert!(checker.is_location(resolve));
        assert!(checker.is_resolve(resolve));
        assert!(checker.is_location(dot));
        assert!(!checker.is_resolve(dot));
        assert!(!checker.is_location(call));
        assert_eq!(checker.created(), 3);
    }

    #[test]
    fn test_lists_count_holes() {
        let mut checker = SyntaxChecker::new();
        let mut list = u32::default();
        checker.append(&mut list, SyntaxTag::Literal);
        checker.append_hole(&mut list);
        assert_eq!(list, 2);
    }

    #[test]
    fn test_regex_is_still_checked() {
        let mut checker = SyntaxChecker::new();
        let span = SourceSpan::new(0, 4);
        assert!(checker.create_regex(span, Atom::NONE, Atom::NONE, "a**", "").is_err());
        assert!(checker.create_regex(span, Atom::NONE, Atom::NONE, "a*", "g").is_ok());
    }
}
