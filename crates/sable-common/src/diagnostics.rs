//! Parse error taxonomy.
//!
//! A parse reports at most one error: the first one latched on the committed
//! parse path. Both the full-build and the check-only parser produce the same
//! `ParseError` for the same input.

use crate::span::SourceSpan;
use serde::Serialize;
use thiserror::Error;

/// What kind of failure stopped the parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    /// Malformed token: bad escape, bad numeric literal, stray character.
    Lex,
    /// A string, template, comment or regex literal ran into end of input
    /// or a line terminator.
    UnterminatedLiteral,
    /// Syntax error at a clean end of input; more input could complete it.
    Recoverable,
    /// Any other syntax error.
    Irrecoverable,
    /// Early errors: strict-mode legality, labels, duplicate constructors, ...
    Semantic,
    /// The recursion-depth guard tripped.
    StackOverflow,
    /// A regular expression literal failed the pattern syntax check.
    RegexSyntax,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Lex => "lex",
            ErrorCategory::UnterminatedLiteral => "unterminated-literal",
            ErrorCategory::Recoverable => "recoverable",
            ErrorCategory::Irrecoverable => "irrecoverable",
            ErrorCategory::Semantic => "semantic",
            ErrorCategory::StackOverflow => "stack-overflow",
            ErrorCategory::RegexSyntax => "regex-syntax",
        }
    }

    /// True for the three syntax-error flavours.
    pub fn is_syntax_error(self) -> bool {
        matches!(
            self,
            ErrorCategory::UnterminatedLiteral
                | ErrorCategory::Recoverable
                | ErrorCategory::Irrecoverable
        )
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single user-visible failure of a parse.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub category: ErrorCategory,
    pub message: String,
    /// Offending token span.
    pub span: SourceSpan,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 0-based byte column of the offending token.
    pub column: u32,
}

impl ParseError {
    pub fn new(
        category: ErrorCategory,
        message: impl Into<String>,
        span: SourceSpan,
        line: u32,
        column: u32,
    ) -> Self {
        ParseError {
            category,
            message: message.into(),
            span,
            line,
            column,
        }
    }
}
