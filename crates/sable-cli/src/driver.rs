//! Source discovery and the parallel parse loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use sable_common::limits::PARSER_THREAD_STACK_SIZE;
use sable_parser::{ParseError, ParserOptions, parse, validate};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::args::{CliArgs, Mode, PrintFormat};

/// Outcome of one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub bytes: usize,
    pub elapsed_us: u64,
    /// Tree size, when a tree was built.
    pub nodes: Option<usize>,
    pub captured_variables: Vec<Arc<str>>,
    pub error: Option<ParseError>,
    /// Rendered tree or JSON, when printing was requested.
    #[serde(skip)]
    pub printed: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub failed: usize,
}

/// Expand directories into the `*.js` files below them, sorted. Files named
/// explicitly are kept whatever their extension.
pub fn discover_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            bail!("no such file or directory: {}", path.display());
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
            let entry_path = entry.path();
            if entry.file_type().is_file() && entry_path.extension().is_some_and(|ext| ext == "js")
            {
                found.push(entry_path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Parse or validate one file.
pub fn process_file(
    path: &Path,
    options: &ParserOptions,
    mode: Mode,
    print: PrintFormat,
) -> Result<FileReport> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let start = Instant::now();
    let mut report = FileReport {
        path: path.to_path_buf(),
        bytes: source.len(),
        elapsed_us: 0,
        nodes: None,
        captured_variables: Vec::new(),
        error: None,
        printed: None,
    };

    match mode {
        Mode::Validate => {
            report.error = validate(&source, options).err();
        }
        Mode::Parse => match parse(&source, options) {
            Ok(output) => {
                report.nodes = Some(output.arena.len());
                report.printed = match print {
                    PrintFormat::Tree => Some(output.print()),
                    PrintFormat::Json => Some(
                        serde_json::to_string_pretty(&serde_json::json!({
                            "root": output.root,
                            "features": output.features,
                            "nodes": &output.arena,
                        }))
                        .context("failed to serialize tree")?,
                    ),
                    PrintFormat::None => None,
                };
                report.captured_variables = output.captured_variables;
            }
            Err(error) => report.error = Some(error),
        },
    }
    report.elapsed_us = start.elapsed().as_micros() as u64;
    debug!(path = %path.display(), ok = report.is_ok(), elapsed_us = report.elapsed_us, "processed");
    Ok(report)
}

/// Process every source named by `args` on a pool of large-stack threads.
/// Reports come back in discovery order.
pub fn run(args: &CliArgs) -> Result<RunSummary> {
    let options = args.parser_options()?;
    let files = discover_sources(&args.paths)?;
    info!(files = files.len(), "parsing");

    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(PARSER_THREAD_STACK_SIZE);
    if let Some(jobs) = args.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build().context("failed to start worker threads")?;

    let reports = pool.install(|| {
        files
            .par_iter()
            .map(|path| process_file(path, &options, args.mode, args.print))
            .collect::<Result<Vec<_>>>()
    })?;
    let failed = reports.iter().filter(|report| !report.is_ok()).count();
    Ok(RunSummary {
        files: reports,
        failed,
    })
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
