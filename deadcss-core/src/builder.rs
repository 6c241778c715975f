//! Builder pattern API for deadcss analysis.
//!
//! Provides a fluent interface for configuring and running the analysis:
//!
//! ```rust,ignore
//! use deadcss_core::prelude::*;
//!
//! let report = Deadcss::new()
//!     .with_html_files(html_files)
//!     .with_src_files(src_files)
//!     .fail_fast(true)
//!     .analyze(&css_files)?;
//!
//! print_plain(&report);
//! ```
//!
//! Stylesheets are independent of each other and analysed in parallel. The
//! evidence scan for one stylesheet stays sequential.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::DeadcssConfig;
use crate::error::DeadcssResult;
use crate::evidence::read_text;
use crate::pipeline::{analyze_stylesheet, AnalysisResult, EvidencePolicy};
use crate::report::{aggregate, Report};

/// Builder for configuring a dead selector analysis.
#[derive(Debug, Clone, Default)]
pub struct Deadcss {
    /// HTML documents used for DOM matching
    html_files: Vec<PathBuf>,

    /// Source files searched for ids and classes
    src_files: Vec<PathBuf>,

    /// What to do with unreadable files
    policy: EvidencePolicy,
}

impl Deadcss {
    /// Create a builder without any evidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder honouring the configured failure policy.
    pub fn from_config(config: &DeadcssConfig) -> Self {
        Self::new().evidence_policy(config.evidence_policy())
    }

    /// Set the HTML documents used for DOM matching.
    pub fn with_html_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.html_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Set the source files searched for ids and classes.
    pub fn with_src_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.src_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn html_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.html_files.push(file.into());
        self
    }

    pub fn src_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.src_files.push(file.into());
        self
    }

    pub fn evidence_policy(mut self, policy: EvidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort on the first unreadable file instead of skipping it.
    pub fn fail_fast(self, enabled: bool) -> Self {
        self.evidence_policy(if enabled {
            EvidencePolicy::Abort
        } else {
            EvidencePolicy::Skip
        })
    }

    pub fn html_files(&self) -> &[PathBuf] {
        &self.html_files
    }

    pub fn src_files(&self) -> &[PathBuf] {
        &self.src_files
    }

    pub fn policy(&self) -> EvidencePolicy {
        self.policy
    }

    /// Analyse CSS text that did not come from a file.
    pub fn analyze_css(&self, name: &str, css: &str) -> DeadcssResult<AnalysisResult> {
        analyze_stylesheet(name, css, &self.html_files, &self.src_files, self.policy)
    }

    /// Analyse a single stylesheet file.
    pub fn analyze_stylesheet(&self, path: &Path) -> DeadcssResult<AnalysisResult> {
        info!(stylesheet = %path.display(), "analysing CSS selectors");
        let css = read_text(path)?;
        self.analyze_css(&path.display().to_string(), &css)
    }

    /// Analyse every stylesheet and aggregate the results.
    ///
    /// Under [`EvidencePolicy::Skip`] a failing stylesheet is recorded in
    /// [`Report::failed`]; under [`EvidencePolicy::Abort`] the first failure
    /// in stylesheet order is returned.
    pub fn analyze<P>(&self, stylesheets: &[P]) -> DeadcssResult<Report>
    where
        P: AsRef<Path> + Sync,
    {
        info!(
            stylesheets = stylesheets.len(),
            html_files = self.html_files.len(),
            src_files = self.src_files.len(),
            "starting analysis"
        );

        let outcomes: Vec<_> = stylesheets
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                (path.display().to_string(), self.analyze_stylesheet(path))
            })
            .collect();

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failed = BTreeMap::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) if self.policy == EvidencePolicy::Skip => {
                    warn!(stylesheet = %name, error = %e, "stylesheet analysis failed");
                    failed.insert(name, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        let mut report = aggregate(results);
        report.failed = failed;

        let summary = report.summary();
        info!(
            stylesheets = summary.stylesheets,
            failed = summary.failed,
            selectors = summary.selectors,
            unused = summary.unused,
            "analysis finished"
        );
        Ok(report)
    }
}
