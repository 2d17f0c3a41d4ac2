//! Semantic index for bookmark embeddings.
//!
//! Embeddings come from an external provider; everything else (storage,
//! ranking, keyword overlap) lives here.
//!
//! # Architecture
//!
//! - `entry`: indexed bookmark + snapshot types
//! - `similarity`: cosine similarity
//! - `lexical`: query tokenizer and keyword coverage score
//! - `hybrid`: hybrid and vector-only ranking over all entries
//! - `preprocess`: text sent to the embedding provider
//! - `storage`: JSON snapshot I/O for index.json
//! - `store`: locked in-memory index with load/save
//! - `embeddings`: embedding providers (Ollama, local fastembed)
//! - `service`: high-level search/ingest service

pub mod embeddings;
mod entry;
mod hybrid;
mod lexical;
mod preprocess;
mod service;
mod similarity;
mod storage;
mod store;

pub use embeddings::EmbeddingError;
pub use hybrid::{clamp_limit, SearchResult};
pub use service::{BookmarkHit, SearchError, SemanticSearchService};
pub use storage::IndexError;
pub use store::IndexStore;

#[cfg(test)]
pub use embeddings::Embedder;
#[cfg(test)]
pub use entry::Entry;
#[cfg(test)]
pub use hybrid::{DEFAULT_SEARCH_LIMIT, DEFAULT_SIMILAR_LIMIT, KEYWORD_WEIGHT, SEMANTIC_WEIGHT};
#[cfg(test)]
pub use lexical::{keyword_score, tokenize};
#[cfg(test)]
pub use similarity::cosine_similarity;
#[cfg(test)]
pub use storage::SNAPSHOT_FILE_NAME;
