//! Lexical (keyword) scoring for hybrid search.
//!
//! The score is a coverage fraction: how many of the query terms occur
//! anywhere in the entry text. How often a term occurs in the bookmark
//! doesn't matter, only whether it does.

use crate::semantic::entry::Entry;

/// Tokenize a query into lowercase terms.
///
/// Splits on whitespace and drops terms shorter than two characters.
/// Duplicates are kept, in query order.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|s| s.to_lowercase())
        .filter(|s| s.chars().count() >= 2)
        .collect()
}

/// Fraction of `terms` found as substrings of the entry's text fields, in [0.0, 1.0].
pub fn keyword_score(entry: &Entry, terms: &[String]) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }

    let haystack = haystack(entry);
    let matched = terms
        .iter()
        .filter(|term| haystack.contains(term.as_str()))
        .count();

    matched as f32 / terms.len() as f32
}

/// Title, description, tags and highlights joined into one lowercase string.
fn haystack(entry: &Entry) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(2 + entry.tags.len() + entry.highlights.len());
    parts.push(&entry.title);
    parts.push(&entry.description);
    parts.extend(entry.tags.iter().map(String::as_str));
    parts.extend(entry.highlights.iter().map(String::as_str));

    parts.join(" ").to_lowercase()
}
