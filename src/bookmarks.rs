use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookmark as delivered by a bookmark source, already normalized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: u64,

    pub title: String,
    pub url: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,

    /// Full page text, when the source has it. Only feeds the embedding text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub trait BookmarkSource: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Bookmark>, crate::curius::SourceError>;
}
