//! Token kinds, token payloads and lexer flags.

use bitflags::bitflags;
use sable_common::{Atom, SourceSpan, TokenLocation};
use serde::Serialize;

/// Kind of a lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ==================== Special ====================
    Eof,
    /// Malformed input; the lexer's `last_error()` describes it.
    Error,

    // ==================== Literals ====================
    Identifier,
    String,
    Number,
    /// A template segment. Produced for `` `...` ``/`` `...${ `` and, on
    /// request, for the `}...` continuation after a substitution.
    Template,

    // ==================== Keywords ====================
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    In,
    InstanceOf,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    TypeOf,
    Var,
    Void,
    While,
    With,
    /// `enum`, `export`, `import`.
    Reserved,
    /// `implements`, `interface`, `let`, `package`, `private`, `protected`,
    /// `public`, `static`, `yield` when lexed in strict code.
    ReservedIfStrict,

    // ==================== Punctuators ====================
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    Question,
    Colon,
    Semicolon,
    Dot,
    DotDotDot,
    Arrow,

    // ==================== Assignment ====================
    Equal,
    PlusEqual,
    MinusEqual,
    MultiplyEqual,
    DivideEqual,
    ModEqual,
    PowEqual,
    LShiftEqual,
    RShiftEqual,
    URShiftEqual,
    AndEqual,
    XorEqual,
    OrEqual,

    // ==================== Unary / update ====================
    PlusPlus,
    MinusMinus,
    Exclamation,
    Tilde,

    // ==================== Binary ====================
    OrOr,
    AndAnd,
    BitOr,
    BitXor,
    BitAnd,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    LShift,
    RShift,
    URShift,
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
    Pow,
}

impl TokenKind {
    /// Keyword kind for a word, ignoring strict-only reserved words.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "catch" => TokenKind::Catch,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "debugger" => TokenKind::Debugger,
            "default" => TokenKind::Default,
            "delete" => TokenKind::Delete,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "extends" => TokenKind::Extends,
            "false" => TokenKind::False,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::InstanceOf,
            "new" => TokenKind::New,
            "null" => TokenKind::Null,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "switch" => TokenKind::Switch,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "true" => TokenKind::True,
            "try" => TokenKind::Try,
            "typeof" => TokenKind::TypeOf,
            "var" => TokenKind::Var,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "enum" | "export" | "import" => TokenKind::Reserved,
            _ => return None,
        })
    }

    /// Words that are identifiers in sloppy code and reserved in strict code.
    pub fn is_strict_reserved_word(word: &str) -> bool {
        matches!(
            word,
            "implements"
                | "interface"
                | "let"
                | "package"
                | "private"
                | "protected"
                | "public"
                | "static"
                | "yield"
        )
    }

    /// Keywords and reserved words: anything a property name may use after
    /// `.` or in an object literal key position.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Break
                | Case
                | Catch
                | Class
                | Const
                | Continue
                | Debugger
                | Default
                | Delete
                | Do
                | Else
                | Extends
                | False
                | Finally
                | For
                | Function
                | If
                | In
                | InstanceOf
                | New
                | Null
                | Return
                | Super
                | Switch
                | This
                | Throw
                | True
                | Try
                | TypeOf
                | Var
                | Void
                | While
                | With
                | Reserved
                | ReservedIfStrict
        )
    }

    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Equal
                | PlusEqual
                | MinusEqual
                | MultiplyEqual
                | DivideEqual
                | ModEqual
                | PowEqual
                | LShiftEqual
                | RShiftEqual
                | URShiftEqual
                | AndEqual
                | XorEqual
                | OrEqual
        )
    }

    /// Prefix operators handled by the unary-expression production.
    #[inline]
    pub fn is_unary_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Plus | Minus | Exclamation | Tilde | PlusPlus | MinusMinus | TypeOf | Void | Delete
        )
    }

    /// Binary operator precedence, or 0 when the token is not a binary
    /// operator here. `in` only counts when `allows_in` is set, so the head of
    /// a `for (... in ...)` can be parsed with the same machinery.
    #[inline]
    pub fn binary_precedence(self, allows_in: bool) -> u8 {
        use TokenKind::*;
        match self {
            OrOr => 1,
            AndAnd => 2,
            BitOr => 3,
            BitXor => 4,
            BitAnd => 5,
            EqEq | NotEq | EqEqEq | NotEqEq => 6,
            Lt | Gt | LtEq | GtEq | InstanceOf => 7,
            In if allows_in => 7,
            LShift | RShift | URShift => 8,
            Plus | Minus => 9,
            Multiply | Divide | Mod => 10,
            Pow => 11,
            _ => 0,
        }
    }

    /// `**` is the only right-associative binary operator.
    #[inline]
    pub fn is_right_associative(self) -> bool {
        self == TokenKind::Pow
    }

    /// Source spelling for punctuators and keywords, used in messages.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "end of script",
            Error => "error",
            Identifier => "identifier",
            String => "string",
            Number => "number",
            Template => "template",
            Break => "break",
            Case => "case",
            Catch => "catch",
            Class => "class",
            Const => "const",
            Continue => "continue",
            Debugger => "debugger",
            Default => "default",
            Delete => "delete",
            Do => "do",
            Else => "else",
            Extends => "extends",
            False => "false",
            Finally => "finally",
            For => "for",
            Function => "function",
            If => "if",
            In => "in",
            InstanceOf => "instanceof",
            New => "new",
            Null => "null",
            Return => "return",
            Super => "super",
            Switch => "switch",
            This => "this",
            Throw => "throw",
            True => "true",
            Try => "try",
            TypeOf => "typeof",
            Var => "var",
            Void => "void",
            While => "while",
            With => "with",
            Reserved => "reserved word",
            ReservedIfStrict => "reserved word",
            OpenBrace => "{",
            CloseBrace => "}",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            Comma => ",",
            Question => "?",
            Colon => ":",
            Semicolon => ";",
            Dot => ".",
            DotDotDot => "...",
            Arrow => "=>",
            Equal => "=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            MultiplyEqual => "*=",
            DivideEqual => "/=",
            ModEqual => "%=",
            PowEqual => "**=",
            LShiftEqual => "<<=",
            RShiftEqual => ">>=",
            URShiftEqual => ">>>=",
            AndEqual => "&=",
            XorEqual => "^=",
            OrEqual => "|=",
            PlusPlus => "++",
            MinusMinus => "--",
            Exclamation => "!",
            Tilde => "~",
            OrOr => "||",
            AndAnd => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            EqEq => "==",
            NotEq => "!=",
            EqEqEq => "===",
            NotEqEq => "!==",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            LShift => "<<",
            RShift => ">>",
            URShift => ">>>",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Mod => "%",
            Pow => "**",
        }
    }
}

/// Literal payload of a token.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum TokenData {
    #[default]
    None,
    /// Identifier, keyword or reserved word spelling.
    Ident(Atom),
    Number(f64),
    /// Cooked string value; `Atom::NONE` when lexed with `DONT_BUILD_STRINGS`.
    Str(Atom),
    Template {
        cooked: Atom,
        raw: Atom,
        tail: bool,
    },
}

/// A lexed token. Tokens are small and `Copy`; the parser keeps only the
/// current one.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Token {
    pub kind: TokenKind,
    pub location: TokenLocation,
    pub data: TokenData,
}

impl Default for TokenKind {
    fn default() -> Self {
        TokenKind::Eof
    }
}

impl Token {
    #[inline]
    pub fn span(&self) -> SourceSpan {
        self.location.span()
    }

    /// Identifier atom for identifiers, keywords and reserved words.
    #[inline]
    pub fn ident(&self) -> Atom {
        match self.data {
            TokenData::Ident(atom) => atom,
            _ => Atom::NONE,
        }
    }

    #[inline]
    pub fn number(&self) -> f64 {
        match self.data {
            TokenData::Number(value) => value,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn string(&self) -> Atom {
        match self.data {
            TokenData::Str(atom) => atom,
            _ => Atom::NONE,
        }
    }
}

bitflags! {
    /// Per-call lexing switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct LexerFlags: u8 {
        /// Lex every word as an identifier (property names after `.`, object
        /// literal keys, getter/setter names).
        const IGNORE_RESERVED_WORDS = 1 << 0;
        /// Validate string literals but do not intern their cooked value.
        const DONT_BUILD_STRINGS = 1 << 1;
        /// Keyword tokens carry no identifier payload.
        const DONT_BUILD_KEYWORDS = 1 << 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("typeof"), Some(TokenKind::TypeOf));
        assert_eq!(TokenKind::keyword("import"), Some(TokenKind::Reserved));
        assert_eq!(TokenKind::keyword("let"), None);
        assert!(TokenKind::is_strict_reserved_word("let"));
        assert!(!TokenKind::is_strict_reserved_word("of"));
    }

    #[test]
    fn test_precedence_table() {
        assert!(
            TokenKind::Multiply.binary_precedence(true) > TokenKind::Plus.binary_precedence(true)
        );
        assert!(TokenKind::Pow.binary_precedence(true) > TokenKind::Mod.binary_precedence(true));
        assert_eq!(TokenKind::In.binary_precedence(false), 0);
        assert_eq!(TokenKind::In.binary_precedence(true), 7);
        assert_eq!(TokenKind::Comma.binary_precedence(true), 0);
        assert!(TokenKind::Pow.is_right_associative());
    }
}
