//! Semantic search service for bookmarks.
//!
//! Ties the index store to an embedding provider:
//! - text search: embed the query, then hybrid-rank the store
//! - find similar: reuse a stored embedding, vector-rank everything else
//! - ingest: build the embedding text, embed, append

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bookmarks::Bookmark;
use crate::semantic::embeddings::{Embedder, EmbeddingError};
use crate::semantic::entry::Entry;
use crate::semantic::hybrid::SearchResult;
use crate::semantic::preprocess::build_embedding_text;
use crate::semantic::store::IndexStore;

/// Snippets longer than this are cut and suffixed with "...".
const SNIPPET_MAX_CHARS: usize = 200;

/// Errors that can occur during semantic search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("bookmark {0} not found")]
    NotFound(u64),

    #[error("embed query: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// A search result as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkHit {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub score: f32,
    pub snippet: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
    pub created_at: String,
}

impl From<SearchResult> for BookmarkHit {
    fn from(result: SearchResult) -> Self {
        let snippet = snippet(&result.entry);
        let Entry {
            id,
            title,
            url,
            highlights,
            tags,
            created_at,
            ..
        } = result.entry;

        Self {
            id,
            title,
            url,
            score: result.score,
            snippet,
            tags,
            highlights,
            created_at: created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Description if present, otherwise the highlights.
fn snippet(entry: &Entry) -> String {
    let text = if !entry.description.is_empty() {
        entry.description.clone()
    } else if !entry.highlights.is_empty() {
        entry.highlights.join(" ")
    } else {
        return String::new();
    };

    if text.chars().count() > SNIPPET_MAX_CHARS {
        let mut cut: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        text
    }
}

/// Index size and provider health.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub index_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
    pub embedder_ok: bool,
}

/// Service for performing semantic search on bookmarks.
#[derive(Clone)]
pub struct SemanticSearchService {
    store: Arc<IndexStore>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticSearchService {
    pub fn new(store: Arc<IndexStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Embed `query` and hybrid-rank the whole index. `limit == 0` means 20.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let query_vec = self.embedder.embed(query)?;
        Ok(self.store.search(&query_vec, query, limit))
    }

    /// Bookmarks closest to bookmark `id`, never including `id`. `limit == 0` means 10.
    pub fn find_similar(&self, id: u64, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let entry = self.store.get_by_id(id).ok_or(SearchError::NotFound(id))?;
        Ok(self.store.search_by_vector(&entry.embedding, limit, id))
    }

    /// Embed one bookmark and append it to the index.
    ///
    /// Doesn't check `has`: callers decide what is new.
    pub fn ingest_one(&self, bookmark: Bookmark) -> Result<(), EmbeddingError> {
        let text = build_embedding_text(&bookmark);
        // no store lock is held while the provider works
        let embedding = self.embedder.embed(&text)?;

        self.store.add(Entry::from_bookmark(bookmark, embedding));
        Ok(())
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            index_count: self.store.count(),
            updated_at: self.store.updated_at(),
            embedder_ok: self.embedder.is_healthy(),
        }
    }
}
