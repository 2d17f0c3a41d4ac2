use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Embedder, EmbeddingError};

/// Health checks shouldn't hang the status endpoint for the full embed timeout.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

/// Client for Ollama's `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    embed_url: Url,
    tags_url: Url,
    model: String,
}

impl OllamaEmbedder {
    /// Must be called outside of an async context (blocking reqwest client).
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<Self, EmbeddingError> {
        let embed_url = endpoint(host, "api/embed")?;
        let tags_url = endpoint(host, "api/tags")?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self {
            client,
            embed_url,
            tags_url,
            model: model.to_string(),
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let resp = self
            .client
            .post(self.embed_url.clone())
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .map_err(|e| EmbeddingError::Unavailable(format!("ollama embed request: {e}")))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(EmbeddingError::Unavailable(format!(
                "ollama embed: status {status}"
            )));
        }

        let body: EmbedResponse = resp
            .json()
            .map_err(|e| EmbeddingError::Unavailable(format!("decode embed response: {e}")))?;

        match body.embeddings.into_iter().next() {
            Some(vector) if !vector.is_empty() => Ok(vector),
            _ => Err(EmbeddingError::EmptyResponse),
        }
    }

    fn is_healthy(&self) -> bool {
        self.client
            .get(self.tags_url.clone())
            .timeout(HEALTH_TIMEOUT)
            .send()
            .map(|resp| resp.status() == StatusCode::OK)
            .unwrap_or(false)
    }

    fn name(&self) -> String {
        format!("ollama/{}", self.model)
    }
}

fn endpoint(host: &str, path: &str) -> Result<Url, EmbeddingError> {
    let raw = format!("{}/{path}", host.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| EmbeddingError::InitFailed(format!("invalid host {host:?}: {e}")))
}
