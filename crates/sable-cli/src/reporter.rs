use colored::Colorize;

use crate::driver::{FileReport, RunSummary};

/// Renders per-file status lines and the closing summary.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// `ok   path (N nodes, T us)` or `error path:line:col: [category] message`.
    pub fn status_line(&self, report: &FileReport) -> String {
        let path = report.path.display();
        match &report.error {
            None => {
                let detail = match report.nodes {
                    Some(nodes) => format!("{nodes} nodes, {} us", report.elapsed_us),
                    None => format!("{} us", report.elapsed_us),
                };
                format!("{} {path} ({detail})", self.paint("ok   ", |s| s.green()))
            }
            Some(error) => format!(
                "{} {path}:{}:{}: [{}] {}",
                self.paint("error", |s| s.red().bold()),
                error.line,
                error.column,
                error.category.as_str(),
                error.message
            ),
        }
    }

    pub fn summary_line(&self, summary: &RunSummary) -> String {
        let total = summary.files.len();
        let bytes: usize = summary.files.iter().map(|report| report.bytes).sum();
        let text = format!("{total} files, {bytes} bytes, {} failed", summary.failed);
        if summary.failed == 0 {
            self.paint(&text, |s| s.green().bold())
        } else {
            self.paint(&text, |s| s.red().bold())
        }
    }

    /// Everything the binary writes to stdout for a run.
    pub fn render(&self, summary: &RunSummary) -> String {
        let mut out = String::new();
        for report in &summary.files {
            out.push_str(&self.status_line(report));
            out.push('\n');
            if let Some(printed) = &report.printed {
                out.push_str(printed);
                out.push('\n');
            }
        }
        out.push_str(&self.summary_line(summary));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_parser::{ErrorCategory, ParseError};
    use std::path::PathBuf;

    fn report(error: Option<ParseError>) -> FileReport {
        FileReport {
            path: PathBuf::from("a.js"),
            bytes: 10,
            elapsed_us: 5,
            nodes: error.is_none().then_some(3),
            captured_variables: Vec::new(),
            error,
            printed: None,
        }
    }

    #[test]
    fn test_plain_status_lines() {
        let reporter = Reporter::new(false);
        assert_eq!(reporter.status_line(&report(None)), "ok    a.js (3 nodes, 5 us)");

        let error = ParseError::new(
            ErrorCategory::Irrecoverable,
            "Unexpected identifier 'b'",
            sable_common::SourceSpan::new(2, 3),
            1,
            2,
        );
        assert_eq!(
            reporter.status_line(&report(Some(error))),
            "error a.js:1:2: [irrecoverable] Unexpected identifier 'b'"
        );
    }

    #[test]
    fn test_summary_counts_failures() {
        let reporter = Reporter::new(false);
        let summary = RunSummary {
            files: vec![report(None), report(None)],
            failed: 1,
        };
        assert_eq!(reporter.summary_line(&summary), "2 files, 20 bytes, 1 failed");
    }
}
