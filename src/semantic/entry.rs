use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bookmarks::Bookmark;

/// An indexed bookmark together with its embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Display only. Never used for ranking.
    pub created_at: DateTime<Utc>,
    pub embedding: Vec<f32>,
}

impl Entry {
    pub fn from_bookmark(bookmark: Bookmark, embedding: Vec<f32>) -> Self {
        Self {
            id: bookmark.id,
            title: bookmark.title,
            url: bookmark.url,
            highlights: bookmark.highlights,
            tags: bookmark.tags,
            description: bookmark.description,
            created_at: bookmark.created_at,
            embedding,
        }
    }
}

/// Persisted form of the index: `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub updated_at: DateTime<Utc>,
}

/// Borrowed variant used when writing, so saving doesn't clone every embedding.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotRef<'a> {
    pub entries: &'a [Entry],
    pub updated_at: DateTime<Utc>,
}
