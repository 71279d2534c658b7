//! Source positions.
//!
//! All offsets are byte offsets into the UTF-8 source. Lines are 1-based;
//! columns are derived as `offset - line_start`.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        SourceSpan { start, end }
    }

    #[inline]
    pub const fn at(offset: u32) -> Self {
        SourceSpan {
            start: offset,
            end: offset,
        }
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Smallest span covering both.
    #[inline]
    pub fn cover(self, other: SourceSpan) -> SourceSpan {
        SourceSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slice `source` by this span, returning "" when out of bounds.
    pub fn slice(self, source: &str) -> &str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

/// A point in the source with enough context to compute a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPosition {
    pub line: u32,
    pub offset: u32,
    pub line_start: u32,
}

impl TextPosition {
    #[inline]
    pub const fn new(line: u32, offset: u32, line_start: u32) -> Self {
        TextPosition {
            line,
            offset,
            line_start,
        }
    }

    /// 0-based column in bytes.
    #[inline]
    pub fn column(self) -> u32 {
        self.offset.saturating_sub(self.line_start)
    }
}

/// Where a token sits: its byte range, the line it starts on, and the
/// offset at which that line starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLocation {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub line_start: u32,
}

impl TokenLocation {
    #[inline]
    pub fn span(self) -> SourceSpan {
        SourceSpan::new(self.start, self.end)
    }

    #[inline]
    pub fn start_position(self) -> TextPosition {
        TextPosition::new(self.line, self.start, self.line_start)
    }

    /// End position; tokens never span lines except templates and block
    /// comments, whose end line is tracked by the lexer instead.
    #[inline]
    pub fn end_position(self) -> TextPosition {
        TextPosition::new(self.line, self.end, self.line_start)
    }

    #[inline]
    pub fn column(self) -> u32 {
        self.start.saturating_sub(self.line_start)
    }
}
