//! Whole-word search of id/class tokens in arbitrary source text.
//!
//! A token occurs when it appears delimited by word boundaries, the same
//! boundaries as regex `\b`. Tokens made only of word characters are matched
//! by splitting the text into maximal `\w+` runs once and probing the token
//! set, so the cost is linear in the text regardless of how many tokens are
//! pending. Any other token falls back to an escaped `\b...\b` regex.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;

fn word_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\w+").expect("Hardcoded regex pattern is valid"))
}

fn is_word_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Return the subset of `tokens` occurring in `text` as a whole word.
pub fn occurring_words<'a, I>(tokens: I, text: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let (plain, other): (Vec<&String>, Vec<&String>) =
        tokens.into_iter().partition(|t| is_word_token(t));

    let mut found = BTreeSet::new();

    if !plain.is_empty() {
        let words: HashSet<&str> = word_regex().find_iter(text).map(|m| m.as_str()).collect();
        found.extend(
            plain
                .into_iter()
                .filter(|t| words.contains(t.as_str()))
                .cloned(),
        );
    }

    for token in other {
        if token.is_empty() {
            continue;
        }
        let pattern = format!(r"\b{}\b", regex::escape(token));
        match Regex::new(&pattern) {
            Ok(re) if re.is_match(text) => {
                found.insert(token.clone());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(token = %token, error = %e, "token search pattern rejected"),
        }
    }

    found
}
