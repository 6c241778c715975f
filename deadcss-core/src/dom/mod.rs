//! Structural DOM matching of CSS selectors.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │    selector.rs      │     │     matcher.rs      │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  `selectors` parse  │ ──▶ │  Evaluate against   │
//! │  with static hooks  │     │  the HTML tree      │
//! └──────────┬──────────┘     └─────────────────────┘
//!            │
//! ┌──────────┴──────────┐
//! │     pseudo.rs       │
//! │  classify_pseudo()  │
//! └─────────────────────┘
//! ```
//!
//! A selector that fails to parse is recorded as a failure and treated as
//! not matched; the rest of the batch is unaffected.

pub mod matcher;
pub mod pseudo;
pub mod selector;

use scraper::Html;
use serde::Serialize;
use tracing::warn;

use crate::error::DeadcssResult;
use crate::extract::SelectorSet;

pub use matcher::{query_matches, DomElement};
pub use pseudo::{classify_pseudo, PseudoKind};
pub use selector::{parse_selector_list, StaticSelectorList};

/// A selector that could not be turned into a DOM query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorFailure {
    pub selector: String,
    pub error: String,
}

/// Outcome of matching a batch of selectors against one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomMatchOutcome {
    /// Selectors matching at least one element
    pub matched: SelectorSet,
    /// Selectors skipped because they could not be compiled
    pub failures: Vec<SelectorFailure>,
}

/// Parse an HTML document. Parsing is error tolerant and never fails.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Compile selector text, a comma separated list included.
pub fn compile_selector(text: &str) -> DeadcssResult<StaticSelectorList> {
    parse_selector_list(text)
}

/// Whether `selector` matches at least one element of `document`.
pub fn selector_matches(selector: &str, document: &Html) -> DeadcssResult<bool> {
    let compiled = compile_selector(selector)?;
    Ok(query_matches(&compiled, document))
}

/// Selectors compiled once and matched against any number of documents.
#[derive(Debug, Clone, Default)]
pub struct SelectorBatch {
    compiled: Vec<(String, StaticSelectorList)>,
    /// Selectors that failed to compile; they never match
    pub failures: Vec<SelectorFailure>,
}

impl SelectorBatch {
    /// Compile every selector, isolating per-selector failures.
    pub fn compile<'a, I>(selectors: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut batch = Self::default();
        for selector in selectors {
            match compile_selector(selector) {
                Ok(compiled) => batch.compiled.push((selector.clone(), compiled)),
                Err(e) => {
                    warn!(selector = %selector, error = %e, "DOM selector matching failed");
                    batch.failures.push(SelectorFailure {
                        selector: selector.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        batch
    }

    /// Number of successfully compiled selectors.
    pub(crate) fn len(&self) -> usize {
        self.compiled.len()
    }

    /// Compiled selectors matching at least one element of `document`.
    pub fn matching(&self, document: &Html) -> SelectorSet {
        self.compiled
            .iter()
            .filter(|(_, compiled)| query_matches(compiled, document))
            .map(|(selector, _)| selector.clone())
            .collect()
    }

    /// Like [`matching`](Self::matching), restricted to `candidates`.
    pub fn matching_among(&self, document: &Html, candidates: &SelectorSet) -> SelectorSet {
        self.compiled
            .iter()
            .filter(|(selector, _)| candidates.contains(selector))
            .filter(|(_, compiled)| query_matches(compiled, document))
            .map(|(selector, _)| selector.clone())
            .collect()
    }
}

/// Match every selector against `document`, isolating per-selector failures.
pub fn match_selectors<'a, I>(selectors: I, document: &Html) -> DomMatchOutcome
where
    I: IntoIterator<Item = &'a String>,
{
    let batch = SelectorBatch::compile(selectors);
    DomMatchOutcome {
        matched: batch.matching(document),
        failures: batch.failures,
    }
}

/// Convenience wrapper parsing `html` before matching.
pub fn match_selectors_in_html<'a, I>(selectors: I, html: &str) -> DomMatchOutcome
where
    I: IntoIterator<Item = &'a String>,
{
    match_selectors(selectors, &parse_document(html))
}
