//! Common types and utilities for the sable JavaScript parser.
//!
//! This crate provides foundational types used across all sable crates:
//! - String interning (`Atom`, `Interner`) and the per-parse `KnownNames` table
//! - Source positions and spans (`TextPosition`, `TokenLocation`, `SourceSpan`)
//! - The parse error taxonomy (`ParseError`, `ErrorCategory`)
//! - Parser limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Names the grammar compares against (eval, arguments, constructor, ...)
pub mod known_names;
pub use known_names::KnownNames;

// Span - Source location tracking (byte offsets + lines)
pub mod span;
pub use span::{SourceSpan, TextPosition, TokenLocation};

// Error taxonomy shared by the lexer and the parser
pub mod diagnostics;
pub use diagnostics::{ErrorCategory, ParseError};

// Centralized limits and thresholds
pub mod limits;
