//! Id and class token decomposition of selectors.
//!
//! Only alphanumeric names are recognized (`#[a-zA-Z0-9]+`, `.[a-zA-Z0-9]+`).
//! A hyphenated class such as `.nav-bar` yields the token `nav`, and escaped
//! or non-ASCII names are cut at the first unsupported character.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::extract::SelectorSet;

fn id_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"#([a-zA-Z0-9]+)").expect("Hardcoded regex pattern is valid"))
}

fn class_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\.([a-zA-Z0-9]+)").expect("Hardcoded regex pattern is valid"))
}

/// Kind of token referenced by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenKind {
    Id,
    Class,
}

impl TokenKind {
    /// Prefix used for origin index keys.
    pub fn prefix(self) -> char {
        match self {
            Self::Id => '#',
            Self::Class => '.',
        }
    }

    /// Origin index key for a bare token name (`#name` or `.name`).
    pub fn key(self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Class => write!(f, "class"),
        }
    }
}

/// Reverse mapping from `#name` / `.name` keys to the selectors using them.
pub type OriginIndex = BTreeMap<String, Vec<String>>;

/// Ids, classes and origins extracted from a selector set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenDecomposition {
    pub ids: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub origins: OriginIndex,
}

impl TokenDecomposition {
    /// Selectors referencing the given token, empty if unknown.
    pub fn origins_of(&self, kind: TokenKind, name: &str) -> &[String] {
        self.origins
            .get(&kind.key(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Union of the selectors referencing any of the found ids or classes.
    pub fn selectors_using(
        &self,
        found_ids: &BTreeSet<String>,
        found_classes: &BTreeSet<String>,
    ) -> SelectorSet {
        let ids = found_ids
            .iter()
            .flat_map(|id| self.origins_of(TokenKind::Id, id));
        let classes = found_classes
            .iter()
            .flat_map(|class| self.origins_of(TokenKind::Class, class));
        ids.chain(classes).cloned().collect()
    }
}

/// Decompose selectors into the ids and classes they reference.
///
/// A selector contributing several tokens appears under every matching
/// origin key, once per occurrence.
pub fn decompose_selectors<'a, I>(selectors: I) -> TokenDecomposition
where
    I: IntoIterator<Item = &'a String>,
{
    let mut result = TokenDecomposition::default();

    for selector in selectors {
        for cap in id_regex().captures_iter(selector) {
            let name = &cap[1];
            result.ids.insert(name.to_string());
            result
                .origins
                .entry(TokenKind::Id.key(name))
                .or_default()
                .push(selector.clone());
        }
        for cap in class_regex().captures_iter(selector) {
            let name = &cap[1];
            result.classes.insert(name.to_string());
            result
                .origins
                .entry(TokenKind::Class.key(name))
                .or_default()
                .push(selector.clone());
        }
    }

    result
}
