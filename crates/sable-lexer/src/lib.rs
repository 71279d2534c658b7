//! JavaScript lexer for the sable parser.
//!
//! The lexer is pull-based: the parser asks for one token at a time and may
//! re-scan the current token under different rules (a `/` as a regular
//! expression, a `}` as a template continuation). It never looks ahead on
//! its own, so its position is always the end of the last token it produced.

pub mod token;
pub use token::{LexerFlags, Token, TokenData, TokenKind};

pub mod lexer;
pub use lexer::{LexError, Lexer, LexerState};

pub mod regexp;
pub use regexp::{RegexError, check_regex_flags, check_regex_syntax};
