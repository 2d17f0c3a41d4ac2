use crate::curius::SourceError;
use crate::semantic::{EmbeddingError, IndexError, SearchError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("bookmark {0} not found")]
    NotFound(u64),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("an index run is already in progress")]
    IndexInProgress,

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("bookmark source error: {0}")]
    Source(#[from] SourceError),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotFound(id) => AppError::NotFound(id),
            SearchError::Embedding(err) => AppError::Embedding(err),
        }
    }
}
