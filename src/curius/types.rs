use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::bookmarks::Bookmark;

/// One page of `/api/users/{id}/links`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LinksPage {
    #[serde(default)]
    pub user_saved: Vec<ApiLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiLink {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub highlights: Vec<ApiHighlight>,
    #[serde(default)]
    pub topics: Vec<ApiTopic>,
    #[serde(default)]
    pub metadata: Option<ApiMetadata>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiHighlight {
    #[serde(default)]
    pub highlight: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiTopic {
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiMetadata {
    #[serde(default)]
    pub full_text: Option<String>,
}

impl From<ApiLink> for Bookmark {
    fn from(link: ApiLink) -> Self {
        let created_at = link
            .created_date
            .as_deref()
            .and_then(parse_created_date)
            .unwrap_or_default();

        let highlights = link
            .highlights
            .into_iter()
            .filter_map(|h| h.highlight)
            .filter(|h| !h.is_empty())
            .collect();

        let tags = link
            .topics
            .into_iter()
            .filter_map(|t| t.topic)
            .filter(|t| !t.is_empty())
            .collect();

        Bookmark {
            id: link.id,
            title: link.title.unwrap_or_default(),
            url: link.link.unwrap_or_default(),
            description: link.snippet.unwrap_or_default(),
            highlights,
            tags,
            created_at,
            content: link
                .metadata
                .and_then(|m| m.full_text)
                .filter(|c| !c.is_empty()),
        }
    }
}

/// Curius sends `2026-02-20T15:53:23.083Z`; any RFC 3339 form is accepted.
fn parse_created_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| log::debug!("unparsable createdDate {raw:?}: {err}"))
        .ok()
}
