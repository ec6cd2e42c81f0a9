//! Build progress reporting on stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use folio_site::{BuildReport, PipelineError};

/// Status lines printed while `folio build` runs.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Site title followed by the directories the build reads and writes.
    pub(crate) fn build_started(&self, title: &str, source: &Path, output: &Path) {
        self.line(Style::new().cyan().bold().apply_to(format!("Building {title}")));
        self.line(format!("  source  {}", source.display()));
        self.line(format!("  output  {}", output.display()));
    }

    /// One page dropped from the build.
    pub(crate) fn page_skipped(&self, error: &PipelineError) {
        self.line(Style::new().yellow().apply_to(skipped_line(error)));
    }

    /// Final counts; yellow when any page failed.
    pub(crate) fn build_finished(&self, report: &BuildReport, output: &Path) {
        let style = if report.failed == 0 {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        self.line(style.apply_to(summary_line(report, output)));
    }

    pub(crate) fn error(&self, error: &dyn Display) {
        self.line(Style::new().red().apply_to(format!("Error: {error}")));
    }

    fn line(&self, text: impl Display) {
        let _ = self.term.write_line(&text.to_string());
    }
}

fn skipped_line(error: &PipelineError) -> String {
    format!(
        "  skipped {} ({}): {}",
        error.path.display(),
        error.stage,
        error.source
    )
}

fn summary_line(report: &BuildReport, output: &Path) -> String {
    let pages = count(report.written, "page", "pages");
    if report.failed == 0 {
        format!(
            "Built {pages} and {} to {}",
            count(report.feed_items, "feed item", "feed items"),
            output.display()
        )
    } else {
        format!(
            "Built {pages} to {}, {} failed",
            output.display(),
            report.failed
        )
    }
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}
