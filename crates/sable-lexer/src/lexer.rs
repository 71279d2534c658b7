//! Pull-based JavaScript lexer.
//!
//! The lexer owns the interner for the parse: identifiers, string literals,
//! template segments and regular expressions are interned as they are lexed.
//! Positions are byte offsets; `line` is 1-based and `line_start` is the
//! offset of the first byte of the current line.

use crate::token::{LexerFlags, Token, TokenData, TokenKind};
use memchr::{memchr3, memmem};
use sable_common::{Atom, ErrorCategory, Interner, SourceSpan, TokenLocation};
use thiserror::Error;
use tracing::trace;

/// A malformed token.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexError {
    /// `Lex` or `UnterminatedLiteral`.
    pub category: ErrorCategory,
    pub message: String,
    pub span: SourceSpan,
    pub line: u32,
    pub line_start: u32,
}

impl LexError {
    #[inline]
    pub fn column(&self) -> u32 {
        self.span.start.saturating_sub(self.line_start)
    }
}

/// Everything needed to resume lexing at an earlier point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LexerState {
    pub offset: u32,
    pub line: u32,
    pub line_start: u32,
    pub prev_terminator: bool,
}

type ScanResult = Result<(TokenKind, TokenData), LexError>;

// =============================================================================
// Character classification
// =============================================================================

#[inline]
fn is_whitespace_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\u{0B}'
            | '\u{0C}'
            | ' '
            | '\u{A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

#[inline]
fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

#[inline]
fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200C}' || c == '\u{200D}' || c.is_alphanumeric()
}

#[inline]
fn is_ascii_id_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'$' || b == b'_'
}

/// Line separator / paragraph separator in UTF-8.
#[inline]
fn is_unicode_line_terminator(bytes: &[u8]) -> bool {
    matches!(bytes, [0xE2, 0x80, 0xA8 | 0xA9, ..])
}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    line_start: usize,
    prev_terminator: bool,

    // Start of the token being scanned, for error spans.
    token_start: usize,
    token_line: u32,
    token_line_start: usize,

    interner: Interner,
    buffer: String,
    last_error: Option<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        Self::with_interner(source, interner)
    }

    /// Lex with an existing interner, so atoms stay comparable with an
    /// earlier parse of the same source.
    pub fn with_interner(source: &'a str, interner: Interner) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            prev_terminator: false,
            token_start: 0,
            token_line: 1,
            token_line_start: 0,
            interner,
            buffer: String::new(),
            last_error: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub fn source_slice(&self, span: SourceSpan) -> &'a str {
        span.slice(self.source)
    }

    #[inline]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    pub fn into_interner(self) -> Interner {
        self.interner
    }

    #[inline]
    pub fn current_offset(&self) -> u32 {
        self.pos as u32
    }

    #[inline]
    pub fn line_number(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn line_start(&self) -> u32 {
        self.line_start as u32
    }

    /// Whether a line terminator preceded the last lexed token.
    #[inline]
    pub fn prev_terminator(&self) -> bool {
        self.prev_terminator
    }

    /// The error behind the last `TokenKind::Error` token.
    #[inline]
    pub fn last_error(&self) -> Option<&LexError> {
        self.last_error.as_ref()
    }

    pub fn state(&self) -> LexerState {
        LexerState {
            offset: self.pos as u32,
            line: self.line,
            line_start: self.line_start as u32,
            prev_terminator: self.prev_terminator,
        }
    }

    pub fn restore(&mut self, state: LexerState) {
        self.pos = (state.offset as usize).min(self.bytes.len());
        self.line = state.line;
        self.line_start = state.line_start as usize;
        self.prev_terminator = state.prev_terminator;
        self.last_error = None;
    }

    /// Reposition the lexer; the next `lex` starts scanning at `offset`.
    pub fn set_offset(&mut self, offset: u32, line: u32, line_start: u32) {
        self.restore(LexerState {
            offset,
            line,
            line_start,
            prev_terminator: false,
        });
    }

    /// First significant byte after the current position, skipping
    /// whitespace and comments without moving the lexer.
    pub fn peek_significant_byte(&self) -> Option<u8> {
        let mut pos = self.pos;
        loop {
            let b = *self.bytes.get(pos)?;
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C => pos += 1,
                b'/' => match self.bytes.get(pos + 1) {
                    Some(b'/') => {
                        let rest = &self.bytes[pos..];
                        pos += memchr::memchr2(b'\n', b'\r', rest)?;
                    }
                    Some(b'*') => {
                        let rest = &self.bytes[pos + 2..];
                        pos += 2 + memmem::find(rest, b"*/")? + 2;
                    }
                    _ => return Some(b),
                },
                b if b < 0x80 => return Some(b),
                _ => {
                    let c = self.source.get(pos..)?.chars().next()?;
                    if is_whitespace_char(c) || is_unicode_line_terminator(&self.bytes[pos..]) {
                        pos += c.len_utf8();
                    } else {
                        return Some(b);
                    }
                }
            }
        }
    }

    #[inline]
    pub fn peek_is_colon(&self) -> bool {
        self.peek_significant_byte() == Some(b':')
    }

    // =========================================================================
    // Low-level cursor
    // =========================================================================

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    #[inline]
    fn starts_with(&self, pat: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(pat)
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..)?.chars().next()
    }

    #[inline]
    fn advance_char(&mut self) -> Option<char> {
        let c = self.current_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    #[inline]
    fn at_line_terminator(&self) -> bool {
        match self.peek() {
            Some(b'\n' | b'\r') => true,
            Some(0xE2) => is_unicode_line_terminator(&self.bytes[self.pos..]),
            _ => false,
        }
    }

    /// Consume one line terminator (`\r\n` counts as one).
    fn consume_line_terminator(&mut self) {
        match self.peek() {
            Some(b'\r') => {
                self.pos += 1;
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            Some(b'\n') => self.pos += 1,
            _ => self.pos += 3,
        }
        self.line += 1;
        self.line_start = self.pos;
    }

    fn error(&self, category: ErrorCategory, message: impl Into<String>) -> LexError {
        let end = self.pos.max(self.token_start + 1).min(self.bytes.len());
        LexError {
            category,
            message: message.into(),
            span: SourceSpan::new(self.token_start as u32, end.max(self.token_start) as u32),
            line: self.token_line,
            line_start: self.token_line_start as u32,
        }
    }

    fn begin_token(&mut self) {
        self.token_start = self.pos;
        self.token_line = self.line;
        self.token_line_start = self.line_start;
    }

    fn finish_token(&self, kind: TokenKind, data: TokenData) -> Token {
        Token {
            kind,
            location: TokenLocation {
                start: self.token_start as u32,
                end: self.pos as u32,
                line: self.token_line,
                line_start: self.token_line_start as u32,
            },
            data,
        }
    }

    fn fail(&mut self, err: LexError) -> Token {
        trace!(category = %err.category, offset = err.span.start, message = %err.message, "lex error");
        let token = Token {
            kind: TokenKind::Error,
            location: TokenLocation {
                start: err.span.start,
                end: err.span.end,
                line: err.line,
                line_start: err.line_start,
            },
            data: TokenData::None,
        };
        self.last_error = Some(err);
        token
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            let Some(b) = self.peek() else {
                return Ok(());
            };
            match b {
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'\n' | b'\r' => {
                    self.consume_line_terminator();
                    self.prev_terminator = true;
                }
                b'/' => match self.peek_at(1) {
                    Some(b'/') => self.skip_line_comment(),
                    Some(b'*') => self.skip_block_comment()?,
                    _ => return Ok(()),
                },
                b if b < 0x80 => return Ok(()),
                _ => {
                    if self.at_line_terminator() {
                        self.consume_line_terminator();
                        self.prev_terminator = true;
                    } else {
                        match self.current_char() {
                            Some(c) if is_whitespace_char(c) => self.pos += c.len_utf8(),
                            _ => return Ok(()),
                        }
                    }
                }
            }
        }
    }

    /// Stops at the terminating line terminator, which `skip_trivia` counts.
    fn skip_line_comment(&mut self) {
        self.pos += 2;
        loop {
            match memchr3(b'\n', b'\r', 0xE2, &self.bytes[self.pos..]) {
                None => {
                    self.pos = self.bytes.len();
                    return;
                }
                Some(i) => {
                    self.pos += i;
                    if self.at_line_terminator() {
                        return;
                    }
                    self.pos += 1;
                }
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        self.begin_token();
        self.pos += 2;
        let Some(len) = memmem::find(&self.bytes[self.pos..], b"*/") else {
            self.pos = self.bytes.len();
            return Err(self.error(
                ErrorCategory::UnterminatedLiteral,
                "Multiline comment was not closed properly",
            ));
        };
        let end = self.pos + len;
        while let Some(i) = memchr3(b'\n', b'\r', 0xE2, &self.bytes[self.pos..end]) {
            self.pos += i;
            if self.at_line_terminator() {
                self.consume_line_terminator();
                self.prev_terminator = true;
            } else {
                self.pos += 1;
            }
        }
        self.pos = end + 2;
        Ok(())
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Lex the next token. Errors produce a `TokenKind::Error` token and are
    /// available from `last_error()`.
    pub fn lex(&mut self, flags: LexerFlags, strict: bool) -> Token {
        self.prev_terminator = false;
        if let Err(err) = self.skip_trivia() {
            return self.fail(err);
        }
        self.begin_token();
        let Some(b) = self.peek() else {
            return self.finish_token(TokenKind::Eof, TokenData::None);
        };
        match self.scan_token(b, flags, strict) {
            Ok((kind, data)) => self.finish_token(kind, data),
            Err(err) => self.fail(err),
        }
    }

    /// Re-scan after a `/` or `/=` token as a regular expression literal.
    /// Returns the interned pattern and flags; the lexer ends up after the
    /// flags.
    pub fn scan_regex(&mut self, prefix_eq: bool) -> Result<(Atom, Atom), LexError> {
        let body_start = if prefix_eq {
            self.pos.saturating_sub(1)
        } else {
            self.pos
        };
        self.token_start = body_start.saturating_sub(1);
        self.token_line = self.line;
        self.token_line_start = self.line_start;

        let mut in_class = false;
        loop {
            let Some(b) = self.peek() else {
                return Err(self.unterminated_regex());
            };
            if self.at_line_terminator() {
                return Err(self.unterminated_regex());
            }
            match b {
                b'\\' => {
                    self.pos += 1;
                    if self.peek().is_none() || self.at_line_terminator() {
                        return Err(self.unterminated_regex());
                    }
                    self.advance_char();
                }
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => break,
                _ => {
                    self.advance_char();
                }
            }
        }
        let body_end = self.pos;
        self.pos += 1;

        let flags_start = self.pos;
        while let Some(c) = self.current_char() {
            if !is_id_continue(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.peek() == Some(b'\\') {
            return Err(self.error(
                ErrorCategory::Lex,
                "Invalid escape in regular expression flags",
            ));
        }

        let pattern = self.interner.intern(&self.source[body_start..body_end]);
        let flags = self.interner.intern(&self.source[flags_start..self.pos]);
        Ok((pattern, flags))
    }

    fn unterminated_regex(&self) -> LexError {
        self.error(
            ErrorCategory::UnterminatedLiteral,
            "Unterminated regular expression literal",
        )
    }

    /// Re-scan from just after a `}` that closes a template substitution.
    pub fn scan_template_continuation(&mut self) -> Token {
        self.token_start = self.pos.saturating_sub(1);
        self.token_line = self.line;
        self.token_line_start = self.line_start;
        match self.scan_template_segment() {
            Ok((kind, data)) => self.finish_token(kind, data),
            Err(err) => self.fail(err),
        }
    }

    // =========================================================================
    // Token dispatch
    // =========================================================================

    #[inline]
    fn punct(&mut self, len: usize, kind: TokenKind) -> ScanResult {
        self.pos += len;
        Ok((kind, TokenData::None))
    }

    fn scan_token(&mut self, b: u8, flags: LexerFlags, strict: bool) -> ScanResult {
        use TokenKind as T;
        match b {
            b'{' => self.punct(1, T::OpenBrace),
            b'}' => self.punct(1, T::CloseBrace),
            b'(' => self.punct(1, T::OpenParen),
            b')' => self.punct(1, T::CloseParen),
            b'[' => self.punct(1, T::OpenBracket),
            b']' => self.punct(1, T::CloseBracket),
            b',' => self.punct(1, T::Comma),
            b';' => self.punct(1, T::Semicolon),
            b':' => self.punct(1, T::Colon),
            b'?' => self.punct(1, T::Question),
            b'~' => self.punct(1, T::Tilde),
            b'.' => {
                if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
                    self.scan_number(strict)
                } else if self.starts_with(b"...") {
                    self.punct(3, T::DotDotDot)
                } else {
                    self.punct(1, T::Dot)
                }
            }
            b'=' => {
                if self.starts_with(b"===") {
                    self.punct(3, T::EqEqEq)
                } else if self.starts_with(b"==") {
                    self.punct(2, T::EqEq)
                } else if self.starts_with(b"=>") {
                    self.punct(2, T::Arrow)
                } else {
                    self.punct(1, T::Equal)
                }
            }
            b'!' => {
                if self.starts_with(b"!==") {
                    self.punct(3, T::NotEqEq)
                } else if self.starts_with(b"!=") {
                    self.punct(2, T::NotEq)
                } else {
                    self.punct(1, T::Exclamation)
                }
            }
            b'<' => {
                if self.starts_with(b"<<=") {
                    self.punct(3, T::LShiftEqual)
                } else if self.starts_with(b"<<") {
                    self.punct(2, T::LShift)
                } else if self.starts_with(b"<=") {
                    self.punct(2, T::LtEq)
                } else {
                    self.punct(1, T::Lt)
                }
            }
            b'>' => {
                if self.starts_with(b">>>=") {
                    self.punct(4, T::URShiftEqual)
                } else if self.starts_with(b">>>") {
                    self.punct(3, T::URShift)
                } else if self.starts_with(b">>=") {
                    self.punct(3, T::RShiftEqual)
                } else if self.starts_with(b">>") {
                    self.punct(2, T::RShift)
                } else if self.starts_with(b">=") {
                    self.punct(2, T::GtEq)
                } else {
                    self.punct(1, T::Gt)
                }
            }
            b'+' => match self.peek_at(1) {
                Some(b'+') => self.punct(2, T::PlusPlus),
                Some(b'=') => self.punct(2, T::PlusEqual),
                _ => self.punct(1, T::Plus),
            },
            b'-' => match self.peek_at(1) {
                Some(b'-') => self.punct(2, T::MinusMinus),
                Some(b'=') => self.punct(2, T::MinusEqual),
                _ => self.punct(1, T::Minus),
            },
            b'*' => {
                if self.starts_with(b"**=") {
                    self.punct(3, T::PowEqual)
                } else if self.starts_with(b"**") {
                    self.punct(2, T::Pow)
                } else if self.starts_with(b"*=") {
                    self.punct(2, T::MultiplyEqual)
                } else {
                    self.punct(1, T::Multiply)
                }
            }
            b'/' => match self.peek_at(1) {
                Some(b'=') => self.punct(2, T::DivideEqual),
                _ => self.punct(1, T::Divide),
            },
            b'%' => match self.peek_at(1) {
                Some(b'=') => self.punct(2, T::ModEqual),
                _ => self.punct(1, T::Mod),
            },
            b'&' => match self.peek_at(1) {
                Some(b'&') => self.punct(2, T::AndAnd),
                Some(b'=') => self.punct(2, T::AndEqual),
                _ => self.punct(1, T::BitAnd),
            },
            b'|' => match self.peek_at(1) {
                Some(b'|') => self.punct(2, T::OrOr),
                Some(b'=') => self.punct(2, T::OrEqual),
                _ => self.punct(1, T::BitOr),
            },
            b'^' => match self.peek_at(1) {
                Some(b'=') => self.punct(2, T::XorEqual),
                _ => self.punct(1, T::BitXor),
            },
            b'"' | b'\'' => self.scan_string(b, flags, strict),
            b'`' => {
                self.pos += 1;
                self.scan_template_segment()
            }
            b'0'..=b'9' => self.scan_number(strict),
            b'\\' => self.scan_identifier(flags, strict),
            b if is_ascii_id_continue(b) => self.scan_identifier(flags, strict),
            b if b >= 0x80 => match self.current_char() {
                Some(c) if is_id_start(c) => self.scan_identifier(flags, strict),
                Some(c) => {
                    self.pos += c.len_utf8();
                    Err(self.error(
                        ErrorCategory::Lex,
                        format!("Invalid character '\\u{:04x}'", c as u32),
                    ))
                }
                None => {
                    self.pos += 1;
                    Err(self.error(ErrorCategory::Lex, "Invalid UTF-8 sequence"))
                }
            },
            _ => {
                self.pos += 1;
                Err(self.error(
                    ErrorCategory::Lex,
                    format!("Invalid character: '{}'", b as char),
                ))
            }
        }
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    fn scan_identifier(&mut self, flags: LexerFlags, strict: bool) -> ScanResult {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_ascii_id_continue(b)) {
            self.pos += 1;
        }

        let needs_slow_path = match self.peek() {
            Some(b'\\') => true,
            Some(b) if b >= 0x80 => self.current_char().is_some_and(is_id_continue),
            _ => false,
        };

        let mut has_escape = false;
        if needs_slow_path {
            self.buffer.clear();
            self.buffer.push_str(&self.source[start..self.pos]);
            loop {
                match self.peek() {
                    Some(b'\\') => {
                        if self.peek_at(1) != Some(b'u') {
                            self.pos += 1;
                            return Err(self.error(
                                ErrorCategory::Lex,
                                "Invalid unicode escape in identifier",
                            ));
                        }
                        self.pos += 2;
                        let valid = self
                            .read_unicode_escape()
                            .and_then(char::from_u32)
                            .filter(|&c| {
                                if self.buffer.is_empty() {
                                    is_id_start(c)
                                } else {
                                    is_id_continue(c)
                                }
                            });
                        let Some(c) = valid else {
                            return Err(self.error(
                                ErrorCategory::Lex,
                                "Invalid unicode escape in identifier",
                            ));
                        };
                        self.buffer.push(c);
                        has_escape = true;
                    }
                    Some(b) if is_ascii_id_continue(b) => {
                        self.buffer.push(b as char);
                        self.pos += 1;
                    }
                    Some(b) if b >= 0x80 => match self.current_char() {
                        Some(c) if is_id_continue(c) => {
                            self.buffer.push(c);
                            self.pos += c.len_utf8();
                        }
                        _ => break,
                    },
                    _ => break,
                }
            }
        }

        let word: &str = if needs_slow_path {
            &self.buffer
        } else {
            &self.source[start..self.pos]
        };

        if !has_escape && !flags.contains(LexerFlags::IGNORE_RESERVED_WORDS) {
            if let Some(kind) = TokenKind::keyword(word) {
                let data = if flags.contains(LexerFlags::DONT_BUILD_KEYWORDS) {
                    TokenData::None
                } else {
                    TokenData::Ident(self.interner.intern(word))
                };
                return Ok((kind, data));
            }
            if strict && TokenKind::is_strict_reserved_word(word) {
                return Ok((
                    TokenKind::ReservedIfStrict,
                    TokenData::Ident(self.interner.intern(word)),
                ));
            }
        }
        Ok((
            TokenKind::Identifier,
            TokenData::Ident(self.interner.intern(word)),
        ))
    }

    /// Read `XXXX` or `{X...}` after `\u`.
    fn read_unicode_escape(&mut self) -> Option<u32> {
        if self.peek() == Some(b'{') {
            self.pos += 1;
            let mut value: u32 = 0;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(|b| (b as char).to_digit(16)) {
                value = value.checked_mul(16)?.checked_add(d)?;
                if value > 0x10FFFF {
                    return None;
                }
                digits += 1;
                self.pos += 1;
            }
            if digits == 0 || self.peek() != Some(b'}') {
                return None;
            }
            self.pos += 1;
            Some(value)
        } else {
            self.read_hex_digits(4)
        }
    }

    fn read_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut value = 0;
        for i in 0..count {
            let d = (self.peek_at(i)? as char).to_digit(16)?;
            value = value * 16 + d;
        }
        self.pos += count;
        Some(value)
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    fn scan_number(&mut self, strict: bool) -> ScanResult {
        let start = self.pos;
        let radix = match (self.peek(), self.peek_at(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some((16, "No hexadecimal digits after '0x'")),
            (Some(b'0'), Some(b'b' | b'B')) => Some((2, "No binary digits after '0b'")),
            (Some(b'0'), Some(b'o' | b'O')) => Some((8, "No octal digits after '0o'")),
            _ => None,
        };

        let value = if let Some((radix, message)) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            let value = self.accumulate_digits(radix);
            if self.pos == digits_start {
                return Err(self.error(ErrorCategory::Lex, message));
            }
            value
        } else if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit())
        {
            self.pos += 1;
            let digits_start = self.pos;
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                self.pos += 1;
            }
            let bytes = self.bytes;
            let digits = &bytes[digits_start..self.pos];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                if strict {
                    return Err(self.error(
                        ErrorCategory::Lex,
                        "Octal literals are not allowed in strict mode",
                    ));
                }
                digits
                    .iter()
                    .fold(0.0, |acc, d| acc * 8.0 + f64::from(d - b'0'))
            } else {
                if strict {
                    return Err(self.error(
                        ErrorCategory::Lex,
                        "Decimal integer literals with a leading zero are forbidden in strict mode",
                    ));
                }
                self.scan_decimal_tail(start)?
            }
        } else {
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                self.pos += 1;
            }
            self.scan_decimal_tail(start)?
        };

        match self.current_char() {
            Some(c) if c.is_ascii_digit() || c == '\\' || is_id_start(c) => {
                self.advance_char();
                Err(self.error(
                    ErrorCategory::Lex,
                    "No identifiers allowed directly after numeric literal",
                ))
            }
            _ => Ok((TokenKind::Number, TokenData::Number(value))),
        }
    }

    fn accumulate_digits(&mut self, radix: u32) -> f64 {
        let mut value = 0.0;
        while let Some(d) = self.peek().and_then(|b| (b as char).to_digit(radix)) {
            value = value * f64::from(radix) + f64::from(d);
            self.pos += 1;
        }
        value
    }

    /// Fraction and exponent after the integer digits; parses `start..pos`.
    fn scan_decimal_tail(&mut self, start: usize) -> Result<f64, LexError> {
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                return Err(self.error(
                    ErrorCategory::Lex,
                    "Non-number found after exponent indicator",
                ));
            }
        }
        self.source[start..self.pos]
            .parse::<f64>()
            .map_err(|_| self.error(ErrorCategory::Lex, "Invalid numeric literal"))
    }

    // =========================================================================
    // Strings and templates
    // =========================================================================

    fn scan_string(&mut self, quote: u8, flags: LexerFlags, strict: bool) -> ScanResult {
        self.pos += 1;
        let content_start = self.pos;
        let build = !flags.contains(LexerFlags::DONT_BUILD_STRINGS);

        // Fast path: no escapes.
        loop {
            match self.peek() {
                Some(b) if b == quote => {
                    let atom = if build {
                        self.interner.intern(&self.source[content_start..self.pos])
                    } else {
                        Atom::NONE
                    };
                    self.pos += 1;
                    return Ok((TokenKind::String, TokenData::Str(atom)));
                }
                Some(b'\\') => break,
                None | Some(b'\n' | b'\r') => return Err(self.unterminated_string()),
                Some(_) => self.pos += 1,
            }
        }

        self.buffer.clear();
        self.buffer.push_str(&self.source[content_start..self.pos]);
        loop {
            match self.peek() {
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.scan_escape(strict, false)?;
                }
                None | Some(b'\n' | b'\r') => return Err(self.unterminated_string()),
                Some(_) => {
                    if let Some(c) = self.advance_char() {
                        self.buffer.push(c);
                    }
                }
            }
        }
        let atom = if build {
            self.interner.intern(&self.buffer)
        } else {
            Atom::NONE
        };
        Ok((TokenKind::String, TokenData::Str(atom)))
    }

    fn unterminated_string(&self) -> LexError {
        self.error(
            ErrorCategory::UnterminatedLiteral,
            "Unterminated string literal",
        )
    }

    /// Scan one template segment starting right after `` ` `` or `}`.
    fn scan_template_segment(&mut self) -> ScanResult {
        let raw_start = self.pos;
        self.buffer.clear();
        let (raw_end, tail) = loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCategory::UnterminatedLiteral,
                        "Unterminated template literal",
                    ));
                }
                Some(b'`') => {
                    let end = self.pos;
                    self.pos += 1;
                    break (end, true);
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    let end = self.pos;
                    self.pos += 2;
                    break (end, false);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.scan_escape(true, true)?;
                }
                Some(b'\n' | b'\r') => {
                    self.buffer.push('\n');
                    self.consume_line_terminator();
                }
                Some(_) => {
                    if self.at_line_terminator() {
                        if let Some(c) = self.current_char() {
                            self.buffer.push(c);
                        }
                        self.consume_line_terminator();
                    } else if let Some(c) = self.advance_char() {
                        self.buffer.push(c);
                    }
                }
            }
        };

        let raw_text = &self.source[raw_start..raw_end];
        let raw = if raw_text.contains('\r') {
            let normalized = raw_text.replace("\r\n", "\n").replace('\r', "\n");
            self.interner.intern_owned(normalized)
        } else {
            self.interner.intern(raw_text)
        };
        let cooked = self.interner.intern(&self.buffer);
        Ok((TokenKind::Template, TokenData::Template { cooked, raw, tail }))
    }

    /// Cook one escape sequence into `buffer`; the backslash is consumed.
    fn scan_escape(&mut self, strict: bool, in_template: bool) -> Result<(), LexError> {
        let Some(b) = self.peek() else {
            return Err(if in_template {
                self.error(
                    ErrorCategory::UnterminatedLiteral,
                    "Unterminated template literal",
                )
            } else {
                self.unterminated_string()
            });
        };
        let simple = match b {
            b'b' => Some('\u{08}'),
            b'f' => Some('\u{0C}'),
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'v' => Some('\u{0B}'),
            b'0' if !matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => Some('\0'),
            _ => None,
        };
        if let Some(c) = simple {
            self.buffer.push(c);
            self.pos += 1;
            return Ok(());
        }

        match b {
            b'\n' | b'\r' => self.consume_line_terminator(),
            b'0'..=b'9' => {
                if in_template {
                    self.pos += 1;
                    return Err(self.error(
                        ErrorCategory::Lex,
                        "Octal escapes are not allowed in template strings",
                    ));
                }
                if strict {
                    self.pos += 1;
                    return Err(self.error(
                        ErrorCategory::Lex,
                        "The only valid numeric escape in strict mode is '\\0'",
                    ));
                }
                if b >= b'8' {
                    self.buffer.push(b as char);
                    self.pos += 1;
                } else {
                    self.scan_legacy_octal_escape(b);
                }
            }
            b'x' => {
                self.pos += 1;
                let Some(value) = self.read_hex_digits(2) else {
                    return Err(self.error(
                        ErrorCategory::Lex,
                        "\\x can only be followed by a hex character sequence",
                    ));
                };
                self.buffer.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            b'u' => {
                self.pos += 1;
                let Some(value) = self.read_unicode_escape() else {
                    return Err(self.error(
                        ErrorCategory::Lex,
                        "\\u can only be followed by a Unicode character sequence",
                    ));
                };
                let value = self.combine_surrogate_pair(value);
                self.buffer.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            _ => {
                if self.at_line_terminator() {
                    self.consume_line_terminator();
                } else if let Some(c) = self.advance_char() {
                    self.buffer.push(c);
                }
            }
        }
        Ok(())
    }

    fn scan_legacy_octal_escape(&mut self, first: u8) {
        let mut value = u32::from(first - b'0');
        self.pos += 1;
        let max_digits = if first <= b'3' { 2 } else { 1 };
        for _ in 0..max_digits {
            match self.peek() {
                Some(d @ b'0'..=b'7') => {
                    value = value * 8 + u32::from(d - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.buffer.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
    }

    /// Joins a `\uD83D\uDE00` style escape pair into one code point.
    fn combine_surrogate_pair(&mut self, high: u32) -> u32 {
        if !(0xD800..=0xDBFF).contains(&high) || !self.starts_with(b"\\u") {
            return high;
        }
        let saved = self.pos;
        self.pos += 2;
        match self.read_unicode_escape() {
            Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => {
                self.pos = saved;
                high
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.lex(LexerFlags::empty(), false);
            kinds.push(token.kind);
            if matches!(token.kind, TokenKind::Eof | TokenKind::Error) {
                return kinds;
            }
        }
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            lex_all(">>>= **= ... =>"),
            vec![
                TokenKind::URShiftEqual,
                TokenKind::PowEqual,
                TokenKind::DotDotDot,
                TokenKind::Arrow,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_block_comment_sets_terminator() {
        let mut lexer = Lexer::new("a /*\n*/ b");
        lexer.lex(LexerFlags::empty(), false);
        let b = lexer.lex(LexerFlags::empty(), false);
        assert!(lexer.prev_terminator());
        assert_eq!(b.location.line, 2);
        assert_eq!(b.location.column(), 3);
    }

    #[test]
    fn test_peek_significant_byte_skips_comments() {
        let lexer = Lexer::new("  // note\n /* x */ : 1");
        assert!(lexer.peek_is_colon());
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let mut lexer = Lexer::new(r#""\uD83D\uDE00""#);
        let token = lexer.lex(LexerFlags::empty(), false);
        assert_eq!(lexer.interner().resolve(token.string()), "\u{1F600}");
    }
}
