//! Embedding providers.
//!
//! - `ollama`: HTTP client for an Ollama server (`/api/embed`)
//! - `local`: in-process fastembed model (behind the `local-embeddings` feature)

#[cfg(feature = "local-embeddings")]
pub mod local;
pub mod ollama;

use std::path::Path;
use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProvider};

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use ollama::OllamaEmbedder;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("embedding provider returned an empty vector")]
    EmptyResponse,

    #[error("model initialization failed: {0}")]
    InitFailed(String),

    #[error("invalid model name: {0}")]
    InvalidModel(String),
}

/// Something that turns text into a fixed-length vector.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Cheap reachability check, used only for status reporting.
    fn is_healthy(&self) -> bool;

    /// Provider/model name for logging.
    fn name(&self) -> String;
}

/// Build the embedder selected by `config`.
pub fn from_config(
    config: &EmbeddingConfig,
    data_dir: &Path,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.provider {
        EmbeddingProvider::Ollama => Ok(Arc::new(OllamaEmbedder::new(
            &config.host,
            &config.model,
            config.timeout(),
        )?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingProvider::Local => Ok(Arc::new(LocalEmbedder::new(
            &config.model,
            data_dir.to_path_buf(),
        )?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProvider::Local => {
            let _ = data_dir;
            Err(EmbeddingError::InitFailed(
                "built without the local-embeddings feature".to_string(),
            ))
        }
    }
}
