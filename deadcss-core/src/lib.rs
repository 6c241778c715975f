//! deadcss-core: dead CSS selector detection library
//!
//! Determines which selectors of a stylesheet have no evidence of use in a
//! set of HTML documents and source files.
//!
//! # Features
//!
//! - **Selector extraction**: brace-depth scan of stylesheet text, at-rules
//!   are transparent containers
//! - **DOM matching**: selectors evaluated against parsed HTML, with state
//!   pseudo-classes always matching and pseudo-elements ignored
//! - **Id/class grepping**: remaining selectors eliminated when one of their
//!   ids or classes occurs as a word in a source file
//! - **Parallel analysis**: independent stylesheets are analysed on Rayon
//!   workers
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use deadcss_core::prelude::*;
//!
//! let css = collect_files(&["."], &ExtensionFilter::of(&[".css"]))?;
//! let html = collect_files(&["."], &ExtensionFilter::of(&[".html"]))?;
//!
//! let report = Deadcss::new()
//!     .with_html_files(html)
//!     .analyze(&css.into_iter().collect::<Vec<_>>())?;
//!
//! print_plain(&report);
//! ```
//!
//! # Module Organization
//!
//! - [`extract`]: selector extraction from stylesheet text
//! - [`tokens`]: id/class decomposition and the origin index
//! - [`dom`]: selector parsing and DOM matching
//! - [`grep`]: whole-word search of tokens in text
//! - [`evidence`]: evidence sources and file reading
//! - [`pipeline`]: per-stylesheet elimination pipeline
//! - [`builder`]: fluent builder API running the pipeline over many stylesheets
//! - [`report`]: aggregation, plain text and JSON output
//! - [`scan`]: parallel file discovery
//! - [`error`]: typed error handling

pub mod builder;
pub mod config;
pub mod dom;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod grep;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod tokens;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DeadcssError, DeadcssResult, IoResultExt};

// Builder API
pub use builder::Deadcss;

// Configuration
pub use config::{load_config, load_config_file, DeadcssConfig, OutputConfig};

// Selector extraction
pub use extract::{
    extract_selectors, extract_selectors_with_warnings, normalize_selector, CssExtraction,
    SelectorSet,
};

// Token decomposition
pub use tokens::{decompose_selectors, OriginIndex, TokenDecomposition, TokenKind};

// DOM matching
pub use dom::{
    classify_pseudo, compile_selector, match_selectors, match_selectors_in_html, parse_document,
    selector_matches, DomMatchOutcome, PseudoKind, SelectorBatch, SelectorFailure,
};

// Text evidence
pub use grep::occurring_words;

// Evidence sources
pub use evidence::{read_text, EvidenceSource, InlineEvidence};

// Elimination pipeline
pub use pipeline::{
    analyze_stylesheet, eliminate_by_dom, eliminate_by_text, AnalysisResult, DomPhaseResult,
    EvidencePolicy, EvidenceState, SkippedFile, Stage, TextPhaseResult,
};

// Logging
pub use logging::{init_structured_logging, LogFormat};

// Reporting
pub use report::{aggregate, print_json, print_plain, render_plain, Report, ReportSummary};

// File scanning
pub use scan::{collect_files, collect_files_with_excludes, parse_extension_list, ExtensionFilter};

#[cfg(test)]
mod tests;
