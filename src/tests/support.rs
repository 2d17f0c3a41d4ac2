//! Fakes shared by unit and scenario tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::bookmarks::{Bookmark, BookmarkSource};
use crate::curius::SourceError;
use crate::semantic::{Embedder, EmbeddingError};

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 20, 15, 53, 23).unwrap()
}

pub fn bookmark(id: u64, title: &str) -> Bookmark {
    Bookmark {
        id,
        title: title.to_string(),
        url: format!("https://example.com/{id}"),
        created_at: created_at(),
        ..Default::default()
    }
}

/// Bag-of-words embedder over a tiny fixed vocabulary.
///
/// Every vector carries a constant bias component so no text embeds to the
/// zero vector. Text containing "fail" is rejected.
#[derive(Debug, Default)]
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    const VOCABULARY: [&'static str; 7] =
        ["rust", "go", "async", "channels", "ownership", "python", "cooking"];

    pub const DIMENSIONS: usize = Self::VOCABULARY.len() + 1;
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.to_lowercase();
        if text.contains("fail") {
            return Err(EmbeddingError::Unavailable("provider refused".to_string()));
        }

        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut vector: Vec<f32> = Self::VOCABULARY
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect();
        vector.push(1.0);

        Ok(vector)
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn name(&self) -> String {
        "keyword".to_string()
    }
}

/// In-memory bookmark source; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    bookmarks: Arc<Mutex<Vec<Bookmark>>>,
    failing: bool,
}

impl FakeSource {
    pub fn new(bookmarks: Vec<Bookmark>) -> Self {
        Self {
            bookmarks: Arc::new(Mutex::new(bookmarks)),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn push(&self, bookmark: Bookmark) {
        self.bookmarks.lock().unwrap().push(bookmark);
    }
}

impl BookmarkSource for FakeSource {
    fn fetch_all(&self) -> Result<Vec<Bookmark>, SourceError> {
        if self.failing {
            return Err(SourceError::MissingUserId);
        }
        Ok(self.bookmarks.lock().unwrap().clone())
    }
}
