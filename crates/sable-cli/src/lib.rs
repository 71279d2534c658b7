//! Command-line driver for the sable parser: argument handling, source
//! discovery, the parallel parse loop and terminal reporting.

pub mod args;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
