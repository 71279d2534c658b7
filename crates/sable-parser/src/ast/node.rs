//! AST node definitions.
//!
//! Nodes live in a `NodeArena` and refer to each other by `NodeIndex`.
//! Child lists are plain `Vec<NodeIndex>`; optional children use
//! `NodeIndex::NONE`.

use bitflags::bitflags;
use sable_common::{Atom, SourceSpan, TextPosition};
use sable_lexer::TokenKind;
use serde::Serialize;

use crate::options::CodeType;

/// Index of a node in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::NONE
    }
}

pub type NodeList = Vec<NodeIndex>;

/// A node: its source extent and its payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub span: SourceSpan,
    pub data: NodeData,
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    InstanceOf,
    In,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        use TokenKind as T;
        Some(match kind {
            T::OrOr => BinaryOp::LogicalOr,
            T::AndAnd => BinaryOp::LogicalAnd,
            T::BitOr => BinaryOp::BitOr,
            T::BitXor => BinaryOp::BitXor,
            T::BitAnd => BinaryOp::BitAnd,
            T::EqEq => BinaryOp::Equal,
            T::NotEq => BinaryOp::NotEqual,
            T::EqEqEq => BinaryOp::StrictEqual,
            T::NotEqEq => BinaryOp::StrictNotEqual,
            T::Lt => BinaryOp::Less,
            T::Gt => BinaryOp::Greater,
            T::LtEq => BinaryOp::LessEqual,
            T::GtEq => BinaryOp::GreaterEqual,
            T::InstanceOf => BinaryOp::InstanceOf,
            T::In => BinaryOp::In,
            T::LShift => BinaryOp::LeftShift,
            T::RShift => BinaryOp::RightShift,
            T::URShift => BinaryOp::UnsignedRightShift,
            T::Plus => BinaryOp::Add,
            T::Minus => BinaryOp::Subtract,
            T::Multiply => BinaryOp::Multiply,
            T::Divide => BinaryOp::Divide,
            T::Mod => BinaryOp::Modulo,
            T::Pow => BinaryOp::Exponent,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::InstanceOf => "instanceof",
            BinaryOp::In => "in",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Exponent => "**",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    BitAnd,
    BitXor,
    BitOr,
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<AssignOp> {
        use TokenKind as T;
        Some(match kind {
            T::Equal => AssignOp::Assign,
            T::PlusEqual => AssignOp::Add,
            T::MinusEqual => AssignOp::Subtract,
            T::MultiplyEqual => AssignOp::Multiply,
            T::DivideEqual => AssignOp::Divide,
            T::ModEqual => AssignOp::Modulo,
            T::PowEqual => AssignOp::Exponent,
            T::LShiftEqual => AssignOp::LeftShift,
            T::RShiftEqual => AssignOp::RightShift,
            T::URShiftEqual => AssignOp::UnsignedRightShift,
            T::AndEqual => AssignOp::BitAnd,
            T::XorEqual => AssignOp::BitXor,
            T::OrEqual => AssignOp::BitOr,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
            AssignOp::Modulo => "%=",
            AssignOp::Exponent => "**=",
            AssignOp::LeftShift => "<<=",
            AssignOp::RightShift => ">>=",
            AssignOp::UnsignedRightShift => ">>>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitXor => "^=",
            AssignOp::BitOr => "|=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

// =============================================================================
// Functions and classes
// =============================================================================

/// Which production introduced a function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum FunctionMode {
    #[default]
    Normal,
    Getter,
    Setter,
    Method,
    Arrow,
}

impl FunctionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionMode::Normal => "function",
            FunctionMode::Getter => "getter",
            FunctionMode::Setter => "setter",
            FunctionMode::Method => "method",
            FunctionMode::Arrow => "arrow function",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ConstructorKind {
    #[default]
    None,
    Base,
    Derived,
}

/// Whether a function may reference `super` properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SuperBinding {
    #[default]
    NotNeeded,
    Needed,
}

bitflags! {
    /// Facts about a function or program body a code generator needs.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct CodeFeatures: u16 {
        const EVAL = 1 << 0;
        const ARGUMENTS = 1 << 1;
        const WITH = 1 << 2;
        const CATCH = 1 << 3;
        const THIS = 1 << 4;
        const STRICT_MODE = 1 << 5;
        const SHADOWS_ARGUMENTS = 1 << 6;
        const MODIFIED_PARAMETER = 1 << 7;
        const MODIFIED_ARGUMENTS = 1 << 8;
    }
}

/// A fully built function body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionBodyData {
    pub statements: NodeList,
    pub strict: bool,
    /// `var`/`let`/`const` names hoisted to this body, in declaration order.
    pub var_declarations: Vec<Atom>,
    /// Function declarations directly in this body.
    pub function_declarations: NodeList,
    pub features: CodeFeatures,
    pub constant_count: u32,
}

/// A body that was only syntax-checked. Carries what a later
/// `parse_function_body` needs to rebuild it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LazyFunction {
    /// Position of the first token of the parameter list.
    pub parameters_start: TextPosition,
    /// Offset just past the last token of the body.
    pub end_offset: u32,
    pub end_line: u32,
    pub parameter_count: u32,
    pub strict: bool,
    pub mode: FunctionMode,
    pub constructor_kind: ConstructorKind,
    pub super_binding: SuperBinding,
    /// Arrow function whose body is a single expression.
    pub expression_body: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionData {
    /// `Atom::NONE` for anonymous functions.
    pub name: Atom,
    pub mode: FunctionMode,
    pub params: NodeList,
    /// `FunctionBody` or `LazyFunctionBody`.
    pub body: NodeIndex,
    pub parameter_count: u32,
    pub constructor_kind: ConstructorKind,
    pub start_line: u32,
    pub end_line: u32,
}

impl FunctionData {
    #[inline]
    pub fn is_arrow(&self) -> bool {
        self.mode == FunctionMode::Arrow
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassData {
    pub name: Atom,
    pub heritage: NodeIndex,
    /// Explicit constructor `Function` node, or `NONE`.
    pub constructor: NodeIndex,
    /// `Property` nodes with `Method`/`Getter`/`Setter` kinds.
    pub methods: NodeList,
    pub static_methods: NodeList,
}

// =============================================================================
// Properties and patterns
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    Init,
    Shorthand,
    Method,
    Getter,
    Setter,
}

/// Key of an object literal property, class member or object pattern
/// entry. Generic so both tree builders can share it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum PropertyName<N> {
    Name(Atom),
    Number(f64),
    Computed(N),
}

pub type PropertyKey = PropertyName<NodeIndex>;

// =============================================================================
// Node payloads
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NodeData {
    // ---- Units and bodies ----
    Program {
        body: NodeList,
        strict: bool,
        code_type: CodeType,
    },
    FunctionBody(Box<FunctionBodyData>),
    LazyFunctionBody(Box<LazyFunction>),

    // ---- Statements ----
    Empty,
    Debugger,
    Block {
        body: NodeList,
    },
    Expression {
        expression: NodeIndex,
    },
    VarDeclaration {
        kind: VarKind,
        declarations: NodeList,
    },
    /// `target` is a `BindingIdentifier` or a pattern; `init` may be `NONE`.
    Declarator {
        target: NodeIndex,
        init: NodeIndex,
    },
    If {
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    },
    DoWhile {
        body: NodeIndex,
        test: NodeIndex,
    },
    While {
        test: NodeIndex,
        body: NodeIndex,
    },
    For {
        init: NodeIndex,
        test: NodeIndex,
        update: NodeIndex,
        body: NodeIndex,
    },
    ForIn {
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    },
    ForOf {
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    },
    Continue {
        label: Atom,
    },
    Break {
        label: Atom,
    },
    Return {
        argument: NodeIndex,
    },
    With {
        object: NodeIndex,
        body: NodeIndex,
    },
    Labeled {
        label: Atom,
        body: NodeIndex,
    },
    Switch {
        discriminant: NodeIndex,
        cases: NodeList,
    },
    /// `test` is `NONE` for `default:`.
    Case {
        test: NodeIndex,
        body: NodeList,
    },
    Throw {
        argument: NodeIndex,
    },
    Try {
        block: NodeIndex,
        param: Atom,
        handler: NodeIndex,
        finalizer: NodeIndex,
    },
    FunctionDeclaration {
        function: NodeIndex,
    },
    ClassDeclaration {
        class: NodeIndex,
    },

    // ---- Literals and primaries ----
    Null,
    Boolean(bool),
    Number(f64),
    String(Atom),
    RegExp {
        pattern: Atom,
        flags: Atom,
    },
    TemplateLiteral {
        quasis: NodeList,
        expressions: NodeList,
    },
    TemplateElement {
        cooked: Atom,
        raw: Atom,
    },
    TaggedTemplate {
        tag: NodeIndex,
        quasi: NodeIndex,
    },
    This,
    Super,
    Identifier(Atom),
    /// Holes are `NONE`.
    Array {
        elements: NodeList,
    },
    Spread {
        argument: NodeIndex,
    },
    Object {
        properties: NodeList,
    },
    Property {
        key: PropertyKey,
        value: NodeIndex,
        kind: PropertyKind,
    },
    Function(Box<FunctionData>),
    Class(Box<ClassData>),

    // ---- Operators and access ----
    Unary {
        op: UnaryOp,
        operand: NodeIndex,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: NodeIndex,
    },
    Binary {
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Assign {
        op: AssignOp,
        target: NodeIndex,
        value: NodeIndex,
    },
    DestructuringAssign {
        pattern: NodeIndex,
        value: NodeIndex,
    },
    Conditional {
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    },
    Sequence {
        expressions: NodeList,
    },
    Call {
        callee: NodeIndex,
        arguments: NodeList,
    },
    /// `arguments` is `None` for `new C` without a parenthesized list.
    New {
        callee: NodeIndex,
        arguments: Option<NodeList>,
    },
    Dot {
        object: NodeIndex,
        property: Atom,
    },
    Bracket {
        object: NodeIndex,
        property: NodeIndex,
    },

    // ---- Patterns ----
    BindingIdentifier(Atom),
    /// Holes are `NONE`; `rest` may be `NONE`.
    ArrayPattern {
        elements: NodeList,
        rest: NodeIndex,
    },
    ObjectPattern {
        properties: NodeList,
    },
    PatternProperty {
        key: PropertyKey,
        target: NodeIndex,
        default: NodeIndex,
    },
    /// Array pattern element or parameter with an initializer.
    PatternDefault {
        target: NodeIndex,
        default: NodeIndex,
    },
}

impl NodeData {
    /// Short name of the variant, used in logs and test failures.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::Program { .. } => "Program",
            NodeData::FunctionBody(_) => "FunctionBody",
            NodeData::LazyFunctionBody(_) => "LazyFunctionBody",
            NodeData::Empty => "Empty",
            NodeData::Debugger => "Debugger",
            NodeData::Block { .. } => "Block",
            NodeData::Expression { .. } => "Expression",
            NodeData::VarDeclaration { .. } => "VarDeclaration",
            NodeData::Declarator { .. } => "Declarator",
            NodeData::If { .. } => "If",
            NodeData::DoWhile { .. } => "DoWhile",
            NodeData::While { .. } => "While",
            NodeData::For { .. } => "For",
            NodeData::ForIn { .. } => "ForIn",
            NodeData::ForOf { .. } => "ForOf",
            NodeData::Continue { .. } => "Continue",
            NodeData::Break { .. } => "Break",
            NodeData::Return { .. } => "Return",
            NodeData::With { .. } => "With",
            NodeData::Labeled { .. } => "Labeled",
            NodeData::Switch { .. } => "Switch",
            NodeData::Case { .. } => "Case",
            NodeData::Throw { .. } => "Throw",
            NodeData::Try { .. } => "Try",
            NodeData::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeData::ClassDeclaration { .. } => "ClassDeclaration",
            NodeData::Null => "Null",
            NodeData::Boolean(_) => "Boolean",
            NodeData::Number(_) => "Number",
            NodeData::String(_) => "String",
            NodeData::RegExp { .. } => "RegExp",
            NodeData::TemplateLiteral { .. } => "TemplateLiteral",
            NodeData::TemplateElement { .. } => "TemplateElement",
            NodeData::TaggedTemplate { .. } => "TaggedTemplate",
            NodeData::This => "This",
            NodeData::Super => "Super",
            NodeData::Identifier(_) => "Identifier",
            NodeData::Array { .. } => "Array",
            NodeData::Spread { .. } => "Spread",
            NodeData::Object { .. } => "Object",
            NodeData::Property { .. } => "Property",
            NodeData::Function(_) => "Function",
            NodeData::Class(_) => "Class",
            NodeData::Unary { .. } => "Unary",
            NodeData::Update { .. } => "Update",
            NodeData::Binary { .. } => "Binary",
            NodeData::Assign { .. } => "Assign",
            NodeData::DestructuringAssign { .. } => "DestructuringAssign",
            NodeData::Conditional { .. } => "Conditional",
            NodeData::Sequence { .. } => "Sequence",
            NodeData::Call { .. } => "Call",
            NodeData::New { .. } => "New",
            NodeData::Dot { .. } => "Dot",
            NodeData::Bracket { .. } => "Bracket",
            NodeData::BindingIdentifier(_) => "BindingIdentifier",
            NodeData::ArrayPattern { .. } => "ArrayPattern",
            NodeData::ObjectPattern { .. } => "ObjectPattern",
            NodeData::PatternProperty { .. } => "PatternProperty",
            NodeData::PatternDefault { .. } => "PatternDefault",
        }
    }

    /// Resolve, dot and bracket expressions can be assigned to.
    #[inline]
    pub fn is_location(&self) -> bool {
        matches!(
            self,
            NodeData::Identifier(_) | NodeData::Dot { .. } | NodeData::Bracket { .. }
        )
    }
}
