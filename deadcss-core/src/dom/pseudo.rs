//! Pseudo-class policy for static DOM matching.
//!
//! Static analysis has no runtime state, so user-interaction and form-state
//! pseudo-classes impose no constraint. Pseudo-elements never correspond to
//! a real node and are cleared. Structural pseudo-classes, `:lang()` and
//! `:contains()` keep their exact tree semantics.

/// How static matching treats a pseudo-class or pseudo-element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoKind {
    /// Matches regardless of element state (`:hover`, `:checked`, ...).
    AlwaysMatches,
    /// Evaluated against the document structure (`:first-child`, ...).
    Structural,
    /// `:lang()`, evaluated against inherited `lang` attributes.
    Language,
    /// `:contains()`, evaluated against the element's descendant text.
    TextContent,
    /// Generated content with no DOM node (`::before`, `:first-line`, ...).
    PseudoElement,
    /// Not understood; the selector is rejected.
    Unsupported,
}

const ALWAYS_MATCHES: &[&str] = &[
    "link",
    "visited",
    "hover",
    "active",
    "focus",
    "focus-within",
    "focus-visible",
    "target",
    "enabled",
    "disabled",
    "checked",
];

const STRUCTURAL: &[&str] = &[
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
    "empty",
    "root",
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "nth-last-of-type",
];

/// Legacy pseudo-elements that may be written with a single colon.
const PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Classify a pseudo name (without colons). Matching is ASCII case-insensitive.
pub fn classify_pseudo(name: &str) -> PseudoKind {
    let name = name.to_ascii_lowercase();
    let name = name.as_str();
    if ALWAYS_MATCHES.contains(&name) {
        PseudoKind::AlwaysMatches
    } else if STRUCTURAL.contains(&name) {
        PseudoKind::Structural
    } else if name == "lang" {
        PseudoKind::Language
    } else if name == "contains" {
        PseudoKind::TextContent
    } else if PSEUDO_ELEMENTS.contains(&name) {
        PseudoKind::PseudoElement
    } else {
        PseudoKind::Unsupported
    }
}
