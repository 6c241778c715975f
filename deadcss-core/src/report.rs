//! Output formatting - plaintext and JSON.
//!
//! A [`Report`] maps each stylesheet to its [`AnalysisResult`]. Sets are
//! serialized as sorted arrays, so the JSON export is deterministic.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{DeadcssError, DeadcssResult, IoResultExt};
use crate::pipeline::AnalysisResult;

const BANNER_WIDTH: usize = 80;

/// Aggregated results of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Per stylesheet results, keyed by stylesheet path
    pub stylesheets: BTreeMap<String, AnalysisResult>,
    /// Stylesheets that could not be analysed, with the reason
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub failed: BTreeMap<String, String>,
}

/// Totals over every analysed stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub stylesheets: usize,
    pub failed: usize,
    pub selectors: usize,
    pub unused: usize,
    pub unused_percentage: f64,
}

/// Collect per-stylesheet results into a report. Later duplicates win.
pub fn aggregate<I>(results: I) -> Report
where
    I: IntoIterator<Item = AnalysisResult>,
{
    Report {
        stylesheets: results
            .into_iter()
            .map(|result| (result.stylesheet.clone(), result))
            .collect(),
        failed: BTreeMap::new(),
    }
}

impl Report {
    pub fn summary(&self) -> ReportSummary {
        let selectors: usize = self.stylesheets.values().map(|r| r.selectors.len()).sum();
        let unused: usize = self.stylesheets.values().map(|r| r.unused_count()).sum();
        ReportSummary {
            stylesheets: self.stylesheets.len(),
            failed: self.failed.len(),
            selectors,
            unused,
            unused_percentage: if selectors == 0 {
                0.0
            } else {
                100.0 * unused as f64 / selectors as f64
            },
        }
    }

    /// Whether any stylesheet still has unused selectors.
    pub fn has_unused(&self) -> bool {
        self.stylesheets.values().any(|r| !r.unused_selectors.is_empty())
    }

    pub fn to_json(&self) -> DeadcssResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DeadcssError::report(e.to_string()))
    }

    /// Write the JSON report to `path`.
    pub fn write_json(&self, path: &Path) -> DeadcssResult<()> {
        let json = self.to_json()?;
        info!(path = %path.display(), "writing JSON report");
        fs::write(path, json).with_path(path)
    }
}

fn banner(title: &str) -> String {
    format!("{:-<width$}", format!("{} ", title), width = BANNER_WIDTH)
}

/// Render the human-readable report.
pub fn render_plain(report: &Report) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (stylesheet, result) in &report.stylesheets {
        lines.push(banner(stylesheet));
        if result.selectors.is_empty() {
            lines.push("No selectors".to_string());
            continue;
        }
        lines.push(format!(
            "Could not determine usage of the following {} CSS selectors (from {} in total: {:.2}%):",
            result.unused_count(),
            result.selectors.len(),
            result.unused_percentage()
        ));
        lines.extend(result.unused_selectors.iter().cloned());
    }

    for (stylesheet, reason) in &report.failed {
        lines.push(banner(stylesheet));
        lines.push(format!("Failed: {}", reason));
    }

    let summary = report.summary();
    lines.push(String::new());
    lines.push(format!(
        "{} unused selectors from {} in {} stylesheet(s): {:.2}%",
        summary.unused, summary.selectors, summary.stylesheets, summary.unused_percentage
    ));
    if summary.failed > 0 {
        lines.push(format!("{} stylesheet(s) could not be analysed", summary.failed));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Prints the report in plain text format.
pub fn print_plain(report: &Report) {
    print!("{}", render_plain(report));
}

/// Prints the report in JSON format.
pub fn print_json(report: &Report) -> DeadcssResult<()> {
    println!("{}", report.to_json()?);
    Ok(())
}
