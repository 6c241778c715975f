//! Selector extraction from stylesheet text.
//!
//! This is deliberately not a CSS grammar. A brace-depth scanner walks the
//! comment-stripped text and takes whatever precedes each `{` as a selector
//! group. At-rule preludes (`@media ...`) are skipped but their bodies are
//! scanned by the same pass, so nested rules still yield selectors.
//!
//! Known unsupported constructs:
//! - braces inside string literals (`content: "{"`, `[title="{"]`)
//! - commas inside `:not(a, b)` or attribute values (the group is split anyway)
//! - declarations preceding a nested rule inside an at-rule body

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::DeadcssError;

/// Set of normalized selector strings, sorted for deterministic reporting.
pub type SelectorSet = BTreeSet<String>;

/// Selectors extracted from one stylesheet plus any recovery warnings.
#[derive(Debug, Default)]
pub struct CssExtraction {
    pub selectors: SelectorSet,
    /// Each entry is a [`DeadcssError::MalformedCss`]
    pub warnings: Vec<DeadcssError>,
}

fn comment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("Hardcoded regex pattern is valid"))
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn normalize_selector(candidate: &str) -> String {
    candidate.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `/* ... */` comments. An unterminated comment swallows the rest
/// of the input; its offset is returned so callers can warn about it.
fn strip_comments(css: &str) -> (String, Option<usize>) {
    let stripped = comment_regex().replace_all(css, "").into_owned();
    match stripped.find("/*") {
        Some(offset) => (stripped[..offset].to_string(), Some(offset)),
        None => (stripped, None),
    }
}

/// Extract the selectors of a stylesheet, discarding recovery warnings.
pub fn extract_selectors(css: &str) -> SelectorSet {
    extract_selectors_with_warnings(css).selectors
}

/// Extract the selectors of a stylesheet.
///
/// Malformed input never fails: unbalanced braces, unterminated comments and
/// empty selector candidates are reported as warnings and scanning continues.
pub fn extract_selectors_with_warnings(css: &str) -> CssExtraction {
    let mut extraction = CssExtraction::default();
    let (text, unterminated) = strip_comments(css);

    if let Some(offset) = unterminated {
        extraction.warnings.push(DeadcssError::malformed_css(
            "unterminated comment, ignoring the rest of the stylesheet",
            offset,
        ));
    }

    let mut depth: usize = 0;
    let mut segment_start = 0;

    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => {
                collect_group(&text[segment_start..offset], offset, &mut extraction);
                depth += 1;
                segment_start = offset + 1;
            }
            '}' => {
                if depth == 0 {
                    extraction
                        .warnings
                        .push(DeadcssError::malformed_css("unexpected '}'", offset));
                } else {
                    depth -= 1;
                }
                segment_start = offset + 1;
            }
            _ => {}
        }
    }

    if depth > 0 {
        extraction.warnings.push(DeadcssError::malformed_css(
            format!("{} unclosed block(s) at end of stylesheet", depth),
            text.len(),
        ));
    }

    extraction
}

/// Byte offset of the last `;` outside quotes, brackets and parentheses.
fn last_statement_end(group: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut nesting: usize = 0;
    let mut escaped = false;
    let mut last = None;

    for (offset, ch) in group.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '(') => nesting += 1,
            (None, ']' | ')') => nesting = nesting.saturating_sub(1),
            (None, ';') if nesting == 0 => last = Some(offset),
            _ => {}
        }
    }
    last
}

/// Turn the text in front of a `{` into selectors.
fn collect_group(group: &str, offset: usize, extraction: &mut CssExtraction) {
    // Statement at-rules (`@import ...;`) and declarations end at ';'.
    let group = match last_statement_end(group) {
        Some(pos) => &group[pos + 1..],
        None => group,
    };
    let group = group.trim();

    if group.starts_with('@') {
        return;
    }

    for candidate in group.split(',') {
        let selector = normalize_selector(candidate);
        if selector.is_empty() {
            extraction.warnings.push(DeadcssError::malformed_css(
                "empty selector in selector group",
                offset,
            ));
            continue;
        }
        extraction.selectors.insert(selector);
    }
}
