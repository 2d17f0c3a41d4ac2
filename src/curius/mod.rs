//! Client for the Curius bookmarking service.

mod client;
mod types;

pub use client::CuriusClient;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("curius user id is not configured (set CURIUS_USER_ID)")]
    MissingUserId,

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("fetch page {page}: {source}")]
    Http {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch page {page}: status {status}")]
    Status {
        page: u32,
        status: reqwest::StatusCode,
    },
}
