use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sable_parser::{CodeType, ParserOptions};

/// CLI arguments for the `sable` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "sable", version, about = "Parse and validate JavaScript sources")]
pub struct CliArgs {
    /// Files to parse. Directories are searched recursively for `*.js`.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Build a tree (`parse`) or only check syntax (`validate`).
    #[arg(long, value_enum, default_value_t = Mode::Parse)]
    pub mode: Mode,

    /// What to print for each successfully parsed file.
    #[arg(long, value_enum, default_value_t = PrintFormat::None)]
    pub print: PrintFormat,

    /// Parse as strict-mode code.
    #[arg(long)]
    pub strict: bool,

    /// Parse as code passed to `eval`.
    #[arg(long)]
    pub eval: bool,

    /// Build full trees for nested function bodies.
    #[arg(long)]
    pub eager: bool,

    /// Accept default values in destructuring parameters.
    #[arg(long = "allow-parameter-defaults")]
    pub allow_parameter_defaults: bool,

    /// Fold arithmetic on numeric literals.
    #[arg(long = "fold-constants")]
    pub fold_constants: bool,

    /// Recursion budget for nested statements and expressions.
    #[arg(long = "max-depth")]
    pub max_depth: Option<u32>,

    /// JSON file with parser options; command-line flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print a JSON summary instead of status lines.
    #[arg(long)]
    pub json: bool,

    /// Number of worker threads (default: one per core).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Parse,
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrintFormat {
    /// S-expression tree.
    Tree,
    /// Node arena as JSON.
    Json,
    None,
}

impl CliArgs {
    /// Options from `--config` (or defaults), with flags applied on top.
    pub fn parser_options(&self) -> Result<ParserOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)?,
            None => ParserOptions::default(),
        };
        options.strict |= self.strict;
        options.eager_function_bodies |= self.eager;
        options.allow_parameter_defaults |= self.allow_parameter_defaults;
        options.fold_constants |= self.fold_constants;
        if self.eval {
            options.code_type = CodeType::Eval;
        }
        if let Some(depth) = self.max_depth {
            options.max_recursion_depth = depth;
        }
        Ok(options)
    }
}

pub fn load_options(path: &Path) -> Result<ParserOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod tests;
