//! Elimination pipeline for one stylesheet.
//!
//! ```text
//! Initial ──▶ DomEliminated (optional) ──▶ TextEliminated (optional) ──▶ Done
//! ```
//!
//! Every selector starts out unused. The DOM phase removes selectors
//! matching an evidence document; the text phase removes selectors whose id
//! or class occurs as a word in an evidence file. Both phases only ever
//! shrink the unused set, so the final set does not depend on the order in
//! which evidence is processed.
//!
//! The [`EvidenceState`] is owned by a single run and mutated sequentially:
//! a token found in one file is never searched for again in later files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dom::{parse_document, SelectorBatch, SelectorFailure};
use crate::error::DeadcssResult;
use crate::evidence::EvidenceSource;
use crate::extract::{extract_selectors_with_warnings, SelectorSet};
use crate::grep::occurring_words;
use crate::tokens::{decompose_selectors, OriginIndex};

/// What to do when an evidence file cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidencePolicy {
    /// Record the file as skipped and continue with the remaining evidence.
    #[default]
    Skip,
    /// Stop and return the I/O error.
    Abort,
}

/// Pipeline stage reached by an [`EvidenceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initial,
    DomEliminated,
    TextEliminated,
    Done,
}

/// Mutable state of one stylesheet analysis.
#[derive(Debug, Clone)]
pub struct EvidenceState {
    /// Selectors with no evidence of use yet; only ever shrinks
    pub unused: SelectorSet,
    /// Ids found as words so far; only ever grows
    pub found_ids: BTreeSet<String>,
    /// Classes found as words so far; only ever grows
    pub found_classes: BTreeSet<String>,
    stage: Stage,
}

impl EvidenceState {
    /// Start with every selector flagged as unused.
    pub fn new(selectors: &SelectorSet) -> Self {
        Self {
            unused: selectors.clone(),
            found_ids: BTreeSet::new(),
            found_classes: BTreeSet::new(),
            stage: Stage::Initial,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, unused = self.unused.len(), "pipeline stage");
        self.stage = stage;
    }

    /// Remove `used` from the unused set, returning how many were removed.
    fn eliminate(&mut self, used: &SelectorSet) -> usize {
        let before = self.unused.len();
        self.unused.retain(|selector| !used.contains(selector));
        before - self.unused.len()
    }
}

/// An evidence file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub error: String,
}

/// Intermediate data of the DOM matching phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomPhaseResult {
    /// Documents successfully matched against
    pub documents: usize,
    /// Selectors eliminated by this phase
    pub matched: usize,
    /// Selectors that could not be compiled into a DOM query
    pub failures: Vec<SelectorFailure>,
    pub skipped_files: Vec<SkippedFile>,
    pub unused_selectors: Vec<String>,
}

/// Intermediate data of the id/class grepping phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextPhaseResult {
    /// Ids referenced by the selectors entering this phase
    pub ids: BTreeSet<String>,
    /// Classes referenced by the selectors entering this phase
    pub classes: BTreeSet<String>,
    pub origins: OriginIndex,
    pub unfindable_ids: BTreeSet<String>,
    pub unfindable_classes: BTreeSet<String>,
    /// Source files successfully scanned
    pub files: usize,
    /// Selectors eliminated by this phase
    pub possibly_used: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub unused_selectors: Vec<String>,
}

/// Result of analysing one stylesheet. Immutable once the pipeline is done.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    pub stylesheet: String,
    pub selectors: SelectorSet,
    pub ids: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_matching: Option<DomPhaseResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idclass_elimination: Option<TextPhaseResult>,
    pub unused_selectors: Vec<String>,
    /// Malformed CSS recovered from during extraction
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    pub fn unused_count(&self) -> usize {
        self.unused_selectors.len()
    }

    /// Percentage of selectors left unused, 0 when there are no selectors.
    pub fn unused_percentage(&self) -> f64 {
        if self.selectors.is_empty() {
            0.0
        } else {
            100.0 * self.unused_selectors.len() as f64 / self.selectors.len() as f64
        }
    }
}

/// Load a source, or record it as skipped under [`EvidencePolicy::Skip`].
fn load_evidence<S: EvidenceSource>(
    source: &S,
    policy: EvidencePolicy,
    skipped: &mut Vec<SkippedFile>,
) -> DeadcssResult<Option<String>> {
    match source.load() {
        Ok(text) => Ok(Some(text)),
        Err(e) if policy == EvidencePolicy::Skip => {
            warn!(file = %source.name(), error = %e, "skipping unreadable evidence file");
            skipped.push(SkippedFile {
                path: source.name(),
                error: e.to_string(),
            });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Remove selectors matching any element of the evidence documents.
pub fn eliminate_by_dom<S: EvidenceSource>(
    state: &mut EvidenceState,
    documents: &[S],
    policy: EvidencePolicy,
) -> DeadcssResult<DomPhaseResult> {
    let mut result = DomPhaseResult::default();
    let batch = SelectorBatch::compile(&state.unused);
    result.failures = batch.failures.clone();
    debug!(
        compiled = batch.len(),
        failed = batch.failures.len(),
        "Compiled selectors for DOM matching"
    );

    for source in documents {
        let Some(html) = load_evidence(source, policy, &mut result.skipped_files)? else {
            continue;
        };
        let document = parse_document(&html);
        let total = state.unused.len();

        let found = batch.matching_among(&document, &state.unused);
        let removed = state.eliminate(&found);
        result.matched += removed;
        result.documents += 1;

        info!(
            document = %source.name(),
            selectors = total,
            matched = removed,
            unmatched = state.unused.len(),
            "DOM matching"
        );
    }

    result.unused_selectors = state.unused.iter().cloned().collect();
    state.advance(Stage::DomEliminated);
    Ok(result)
}

/// Remove selectors whose ids or classes occur as words in the sources.
///
/// Tokens come from the selectors still unused when the phase starts, so
/// selectors eliminated earlier cannot come back.
pub fn eliminate_by_text<S: EvidenceSource>(
    state: &mut EvidenceState,
    sources: &[S],
    policy: EvidencePolicy,
) -> DeadcssResult<TextPhaseResult> {
    let tokens = decompose_selectors(&state.unused);
    info!(
        selectors = state.unused.len(),
        ids = tokens.ids.len(),
        classes = tokens.classes.len(),
        "id/class extraction for source matching"
    );

    let mut result = TextPhaseResult::default();

    for source in sources {
        let Some(content) = load_evidence(source, policy, &mut result.skipped_files)? else {
            continue;
        };
        result.files += 1;

        let pending_ids: BTreeSet<&String> = tokens.ids.difference(&state.found_ids).collect();
        debug!(file = %source.name(), remaining = pending_ids.len(), "searching ids");
        let found_ids = occurring_words(pending_ids, &content);
        state.found_ids.extend(found_ids);

        let pending_classes: BTreeSet<&String> =
            tokens.classes.difference(&state.found_classes).collect();
        debug!(file = %source.name(), remaining = pending_classes.len(), "searching classes");
        let found_classes = occurring_words(pending_classes, &content);
        state.found_classes.extend(found_classes);
    }

    let used = tokens.selectors_using(&state.found_ids, &state.found_classes);
    let total = state.unused.len();
    result.possibly_used = state.eliminate(&used);
    info!(
        selectors = total,
        sources = result.files,
        possibly_used = result.possibly_used,
        unused = state.unused.len(),
        "id/class based elimination"
    );

    result.unfindable_ids = tokens.ids.difference(&state.found_ids).cloned().collect();
    result.unfindable_classes = tokens
        .classes
        .difference(&state.found_classes)
        .cloned()
        .collect();
    result.unused_selectors = state.unused.iter().cloned().collect();
    result.ids = tokens.ids;
    result.classes = tokens.classes;
    result.origins = tokens.origins;

    state.advance(Stage::TextEliminated);
    Ok(result)
}

/// Run the full pipeline for one stylesheet's text.
///
/// Each phase only runs when evidence for it is supplied.
pub fn analyze_stylesheet<D, T>(
    name: &str,
    css: &str,
    documents: &[D],
    sources: &[T],
    policy: EvidencePolicy,
) -> DeadcssResult<AnalysisResult>
where
    D: EvidenceSource,
    T: EvidenceSource,
{
    let extraction = extract_selectors_with_warnings(css);
    for warning in &extraction.warnings {
        warn!(stylesheet = %name, warning = %warning, "malformed CSS");
    }
    info!(stylesheet = %name, selectors = extraction.selectors.len(), "extracted CSS selectors");

    let all_tokens = decompose_selectors(&extraction.selectors);
    let mut state = EvidenceState::new(&extraction.selectors);

    let dom_matching = if documents.is_empty() {
        None
    } else {
        Some(eliminate_by_dom(&mut state, documents, policy)?)
    };

    let idclass_elimination = if sources.is_empty() {
        None
    } else {
        Some(eliminate_by_text(&mut state, sources, policy)?)
    };

    state.advance(Stage::Done);

    Ok(AnalysisResult {
        stylesheet: name.to_string(),
        ids: all_tokens.ids,
        classes: all_tokens.classes,
        dom_matching,
        idclass_elimination,
        unused_selectors: state.unused.into_iter().collect(),
        warnings: extraction.warnings.iter().map(|w| w.to_string()).collect(),
        selectors: extraction.selectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::InlineEvidence;
    use std::path::PathBuf;

    const CSS: &str = r#"
        p { color: red }
        div#content h1 { font-size: 10pt }
        ul.menu li { margin: 0 }
        .footer { padding: 1em }
        #sidebar .widget { border: 0 }
        a:hover { color: blue }
        table { width: 100% }
    "#;

    fn set(items: &[&str]) -> SelectorSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn page(name: &str, html: &str) -> InlineEvidence {
        InlineEvidence::new(name, html)
    }

    fn no_evidence() -> Vec<InlineEvidence> {
        Vec::new()
    }

    #[test]
    fn test_no_evidence_everything_unused() {
        let result =
            analyze_stylesheet("site.css", CSS, &no_evidence(), &no_evidence(), EvidencePolicy::Skip)
                .unwrap();
        assert_eq!(result.selectors.len(), 7);
        assert_eq!(result.unused_count(), 7);
        assert!(result.dom_matching.is_none());
        assert!(result.idclass_elimination.is_none());
        assert_eq!(result.ids, set(&["content", "sidebar"]));
        assert_eq!(result.classes, set(&["menu", "footer", "widget"]));
    }

    #[test]
    fn test_dom_phase() {
        let docs = vec![page("index.html", "<p>hi <a href=\"/\">home</a></p>")];
        let result =
            analyze_stylesheet("site.css", CSS, &docs, &no_evidence(), EvidencePolicy::Skip).unwrap();

        let dom = result.dom_matching.as_ref().unwrap();
        assert_eq!(dom.documents, 1);
        assert_eq!(dom.matched, 2);
        assert!(!result.unused_selectors.contains(&"p".to_string()));
        assert!(!result.unused_selectors.contains(&"a:hover".to_string()));
        assert!(result.unused_selectors.contains(&"table".to_string()));
    }

    #[test]
    fn test_text_phase() {
        let sources = vec![
            page("app.js", "document.getElementById('content').show();"),
            page("footer.php", "<div class=\"footer\"></div>"),
        ];
        let result =
            analyze_stylesheet("site.css", CSS, &no_evidence(), &sources, EvidencePolicy::Skip)
                .unwrap();

        let text = result.idclass_elimination.as_ref().unwrap();
        assert_eq!(text.files, 2);
        assert_eq!(text.possibly_used, 2);
        assert_eq!(text.unfindable_ids, set(&["sidebar"]));
        assert_eq!(text.unfindable_classes, set(&["menu", "widget"]));
        assert_eq!(
            result.unused_selectors,
            vec!["#sidebar .widget", "a:hover", "p", "table", "ul.menu li"]
        );
    }

    #[test]
    fn test_text_phase_only_sees_selectors_left_by_dom_phase() {
        let docs = vec![page("index.html", "<ul class=\"menu\"><li>x</li></ul>")];
        let sources = vec![page("menu.js", "var menu;")];
        let result = analyze_stylesheet("site.css", CSS, &docs, &sources, EvidencePolicy::Skip)
            .unwrap();

        let text = result.idclass_elimination.as_ref().unwrap();
        assert!(!text.classes.contains("menu"));
        assert_eq!(text.possibly_used, 0);
        assert!(!result.unused_selectors.contains(&"ul.menu li".to_string()));
    }

    #[test]
    fn test_phases_are_monotonic() {
        let selectors = set(&["p", "div", ".nav a", "#main"]);
        let mut state = EvidenceState::new(&selectors);
        assert_eq!(state.stage(), Stage::Initial);

        let before = state.unused.clone();
        eliminate_by_dom(&mut state, &[page("a.html", "<p></p>")], EvidencePolicy::Skip).unwrap();
        assert!(state.unused.is_subset(&before));
        assert_eq!(state.stage(), Stage::DomEliminated);

        let before = state.unused.clone();
        eliminate_by_text(&mut state, &[page("a.js", "nav main")], EvidencePolicy::Skip).unwrap();
        assert!(state.unused.is_subset(&before));
        assert_eq!(state.unused, set(&["div"]));
        assert_eq!(state.stage(), Stage::TextEliminated);
    }

    #[test]
    fn test_order_independence() {
        let docs = vec![
            page("a.html", "<div id=\"content\"><h1>t</h1></div>"),
            page("b.html", "<table></table>"),
        ];
        let sources = vec![
            page("a.js", "sidebar"),
            page("b.js", "widget footer"),
            page("c.js", "nothing relevant"),
        ];
        let forward =
            analyze_stylesheet("s.css", CSS, &docs, &sources, EvidencePolicy::Skip).unwrap();

        let mut docs_rev = docs.clone();
        docs_rev.reverse();
        let mut sources_rev = sources.clone();
        sources_rev.reverse();
        let backward =
            analyze_stylesheet("s.css", CSS, &docs_rev, &sources_rev, EvidencePolicy::Skip)
                .unwrap();

        assert_eq!(forward.unused_selectors, backward.unused_selectors);
        assert_eq!(forward.unused_selectors, vec!["a:hover", "p", "ul.menu li"]);
    }

    #[test]
    fn test_found_tokens_persist_across_files() {
        let selectors = set(&[".nav", ".footer"]);
        let mut state = EvidenceState::new(&selectors);
        let sources = vec![page("a.js", "nav"), page("b.js", "footer")];
        eliminate_by_text(&mut state, &sources, EvidencePolicy::Skip).unwrap();
        assert_eq!(state.found_classes, set(&["nav", "footer"]));
        assert!(state.unused.is_empty());
    }

    #[test]
    fn test_unparseable_selector_stays_unused() {
        let mut state = EvidenceState::new(&set(&["p", "p[", "a:-moz-focusring"]));
        let result =
            eliminate_by_dom(&mut state, &[page("x.html", "<p><a>x</a></p>")], EvidencePolicy::Skip)
                .unwrap();
        assert_eq!(result.failures.len(), 2);
        assert_eq!(state.unused, set(&["a:-moz-focusring", "p["]));
    }

    #[test]
    fn test_unreadable_evidence_skip_and_abort() {
        let missing = vec![PathBuf::from("/nonexistent/deadcss/app.js")];

        let result = analyze_stylesheet("s.css", CSS, &no_evidence(), &missing, EvidencePolicy::Skip)
            .unwrap();
        let text = result.idclass_elimination.unwrap();
        assert_eq!(text.files, 0);
        assert_eq!(text.skipped_files.len(), 1);
        assert_eq!(text.skipped_files[0].path, "/nonexistent/deadcss/app.js");

        let err = analyze_stylesheet("s.css", CSS, &no_evidence(), &missing, EvidencePolicy::Abort)
            .unwrap_err();
        assert!(matches!(err, crate::DeadcssError::Io { .. }));
    }

    #[test]
    fn test_unused_percentage() {
        let result =
            analyze_stylesheet("empty.css", "", &no_evidence(), &no_evidence(), EvidencePolicy::Skip)
                .unwrap();
        assert_eq!(result.unused_percentage(), 0.0);

        let result = analyze_stylesheet(
            "two.css",
            "a {} b {}",
            &[page("x.html", "<a></a>")],
            &no_evidence(),
            EvidencePolicy::Skip,
        )
        .unwrap();
        assert!((result.unused_percentage() - 50.0).abs() < f64::EPSILON);
    }
}
