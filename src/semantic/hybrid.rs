//! Ranking over the full entry list.
//!
//! Two modes:
//! - hybrid: `0.7 * cosine + 0.3 * keyword coverage`
//! - vector only: plain cosine, with one id excluded (the "find similar" path)
//!
//! Both are exact linear scans. Scores are computed in parallel with rayon,
//! then sorted descending with a stable sort, so equal scores keep insertion
//! order. Only the top `limit` entries are cloned into results.

use rayon::prelude::*;

use crate::semantic::entry::Entry;
use crate::semantic::lexical::{keyword_score, tokenize};
use crate::semantic::similarity::cosine_similarity;

/// Weight of the cosine similarity in the hybrid score.
pub const SEMANTIC_WEIGHT: f32 = 0.7;

/// Weight of the keyword coverage in the hybrid score.
pub const KEYWORD_WEIGHT: f32 = 0.3;

/// Result count for hybrid search when the caller passes 0.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Result count for similarity search when the caller passes 0.
pub const DEFAULT_SIMILAR_LIMIT: usize = 10;

/// A scored entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub entry: Entry,
    pub score: f32,
}

/// Hybrid score of one entry.
pub fn hybrid_score(query_vec: &[f32], terms: &[String], entry: &Entry) -> f32 {
    SEMANTIC_WEIGHT * cosine_similarity(query_vec, &entry.embedding)
        + KEYWORD_WEIGHT * keyword_score(entry, terms)
}

/// Rank `entries` by hybrid score against the query vector and text.
pub fn rank_hybrid(
    entries: &[Entry],
    query_vec: &[f32],
    query: &str,
    limit: usize,
) -> Vec<SearchResult> {
    let limit = resolve_limit(limit, DEFAULT_SEARCH_LIMIT);
    let terms = tokenize(query);

    let scored: Vec<(usize, f32)> = entries
        .par_iter()
        .enumerate()
        .map(|(idx, entry)| (idx, hybrid_score(query_vec, &terms, entry)))
        .collect();

    top_k(entries, scored, limit)
}

/// Rank `entries` by cosine similarity only, skipping `exclude_id`.
pub fn rank_by_vector(
    entries: &[Entry],
    vector: &[f32],
    limit: usize,
    exclude_id: u64,
) -> Vec<SearchResult> {
    let limit = resolve_limit(limit, DEFAULT_SIMILAR_LIMIT);

    let scored: Vec<(usize, f32)> = entries
        .par_iter()
        .enumerate()
        .filter(|(_, entry)| entry.id != exclude_id)
        .map(|(idx, entry)| (idx, cosine_similarity(vector, &entry.embedding)))
        .collect();

    top_k(entries, scored, limit)
}

/// Zero means "use the default".
pub fn resolve_limit(limit: usize, default: usize) -> usize {
    if limit == 0 {
        default
    } else {
        limit
    }
}

/// Signed limits from users: anything ≤ 0 becomes 0, "use the default".
pub fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn top_k(entries: &[Entry], mut scored: Vec<(usize, f32)>, limit: usize) -> Vec<SearchResult> {
    // stable: ties stay in insertion order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(idx, score)| SearchResult {
            entry: entries[idx].clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: u64, title: &str, embedding: Vec<f32>) -> Entry {
        Entry {
            id,
            title: title.to_string(),
            url: format!("https://example.com/{id}"),
            highlights: vec![],
            tags: vec![],
            description: String::new(),
            created_at: Utc::now(),
            embedding,
        }
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry(1, "Rust async", vec![1.0, 0.0]),
            entry(2, "Go channels", vec![0.0, 1.0]),
            entry(3, "Go Rust comparison", vec![0.7, 0.7]),
        ]
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((SEMANTIC_WEIGHT + KEYWORD_WEIGHT - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hybrid_empty_entries() {
        assert!(rank_hybrid(&[], &[1.0, 0.0], "rust", 5).is_empty());
    }

    #[test]
    fn test_hybrid_scores() {
        let entries = sample();
        let results = rank_hybrid(&entries, &[1.0, 0.0], "rust", 3);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.id, 1);
        assert!((results[0].score - 1.0).abs() < 1e-6);

        // cos([1,0],[0.7,0.7]) = 1/sqrt(2)
        let third = results.iter().find(|r| r.entry.id == 3).unwrap();
        let expected = 0.7 * std::f32::consts::FRAC_1_SQRT_2 + 0.3;
        assert!((third.score - expected).abs() < 1e-5);

        let second = results.iter().find(|r| r.entry.id == 2).unwrap();
        assert!(second.score.abs() < 1e-6);
    }

    #[test]
    fn test_keyword_can_reorder_close_semantic_scores() {
        let entries = vec![
            entry(1, "Cooking pasta", vec![1.0, 0.05]),
            entry(2, "Rust ownership", vec![1.0, 0.1]),
        ];
        let results = rank_hybrid(&entries, &[1.0, 0.0], "rust", 2);
        assert_eq!(results[0].entry.id, 2);
    }

    #[test]
    fn test_hybrid_ties_keep_insertion_order() {
        let entries = vec![
            entry(10, "same", vec![1.0, 0.0]),
            entry(11, "same", vec![1.0, 0.0]),
            entry(12, "same", vec![1.0, 0.0]),
        ];
        let ids: Vec<u64> = rank_hybrid(&entries, &[1.0, 0.0], "", 3)
            .into_iter()
            .map(|r| r.entry.id)
            .collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_hybrid_default_limit() {
        let entries: Vec<Entry> = (0..30)
            .map(|i| entry(i, "x", vec![1.0, i as f32]))
            .collect();
        assert_eq!(rank_hybrid(&entries, &[1.0, 0.0], "", 0).len(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(rank_hybrid(&entries[..3], &[1.0, 0.0], "", 0).len(), 3);
    }

    #[test]
    fn test_vector_excludes_id() {
        let entries = sample();
        let results = rank_by_vector(&entries, &[1.0, 0.0], 10, 1);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.entry.id != 1));
        assert_eq!(results[0].entry.id, 3);
    }

    #[test]
    fn test_vector_default_limit() {
        let entries: Vec<Entry> = (0..25)
            .map(|i| entry(i, "x", vec![1.0, i as f32]))
            .collect();
        assert_eq!(rank_by_vector(&entries, &[1.0, 0.0], 0, 999).len(), DEFAULT_SIMILAR_LIMIT);
        assert_eq!(rank_by_vector(&entries, &[1.0, 0.0], 3, 999).len(), 3);
    }

    #[test]
    fn test_dimension_mismatch_degrades_to_zero() {
        let entries = vec![
            entry(1, "ok", vec![1.0, 0.0]),
            entry(2, "odd", vec![1.0, 0.0, 0.0]),
        ];
        let results = rank_by_vector(&entries, &[1.0, 0.0], 10, 0);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.id, 1);
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(-1), 0);
        assert_eq!(clamp_limit(0), 0);
        assert_eq!(clamp_limit(7), 7);
        assert_eq!(resolve_limit(clamp_limit(-5), DEFAULT_SEARCH_LIMIT), 20);
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(0, 20), 20);
        assert_eq!(resolve_limit(5, 20), 5);
    }
}
