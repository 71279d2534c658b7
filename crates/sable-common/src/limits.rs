//! Centralized limits and thresholds for the parser.
//!
//! Keeping these values in one place lets the lexer, the parser, the CLI and
//! the tests agree on them.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Default maximum grammar recursion depth.
///
/// The counter is bumped on entry to statements, assignment, unary, member
/// and primary expressions, and by `FUNCTION_BODY_DEPTH_COST` on entry to a
/// function body. Exceeding the limit reports a `StackOverflow` error
/// instead of crashing the thread.
///
/// The default is sized for the 2 MiB stack of a spawned thread in a debug
/// build. Callers that raise it should parse on a thread with a larger
/// stack, such as `PARSER_THREAD_STACK_SIZE`.
///
/// ```javascript
/// // Each '(' costs an assignment, a unary, a member and a primary level:
/// x = ((((((((((((((((((((((1))))))))))))))))))))));
///
/// // Each nested function costs a statement level plus a body:
/// function a() { function b() { function c() { /* ... */ } } }
/// ```
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 400;

/// Depth units spent on entering a function body. A body nests many more
/// grammar frames than one statement does.
pub const FUNCTION_BODY_DEPTH_COST: u32 = 2;

/// Stack size for the CLI's parser threads. Leaves room for a
/// `--max-depth` well above the default.
pub const PARSER_THREAD_STACK_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// Function-Body Cache Thresholds
// =============================================================================

/// Standard function bodies at most this many bytes long are not cached.
///
/// `function(){}` plus a few characters: skipping such a body again is as
/// cheap as looking it up.
pub const MIN_CACHED_FUNCTION_LENGTH: u32 = 16;

/// Arrow functions with an expression body at most this many bytes long are
/// not cached (`x=>x` plus a few characters).
pub const MIN_CACHED_ARROW_FUNCTION_LENGTH: u32 = 8;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Initial node capacity per source byte for the AST arena.
///
/// Roughly one node per eight bytes of typical minified or hand-written code.
pub const ARENA_NODES_PER_SOURCE_BYTE_DIVISOR: usize = 8;
