use std::time::Duration;

use crate::bookmarks::{Bookmark, BookmarkSource};

use super::types::LinksPage;
use super::SourceError;

pub const CURIUS_API_BASE: &str = "https://curius.app/api/users";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches every saved link of one Curius user.
pub struct CuriusClient {
    user_id: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl CuriusClient {
    pub fn new(user_id: &str) -> Result<Self, SourceError> {
        Self::with_base_url(user_id, CURIUS_API_BASE)
    }

    pub fn with_base_url(user_id: &str, base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            user_id: user_id.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}/{}/links?page={page}", self.base_url, self.user_id)
    }

    fn fetch_page(&self, page: u32) -> Result<LinksPage, SourceError> {
        let url = self.page_url(page);
        log::info!("fetching page {page}: {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|source| SourceError::Http { page, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status { page, status });
        }

        resp.json::<LinksPage>()
            .map_err(|source| SourceError::Http { page, source })
    }
}

impl BookmarkSource for CuriusClient {
    /// Pages from 0 until an empty page comes back.
    fn fetch_all(&self) -> Result<Vec<Bookmark>, SourceError> {
        if self.user_id.is_empty() {
            return Err(SourceError::MissingUserId);
        }

        let mut all = Vec::new();
        let mut page = 0;

        loop {
            let links = self.fetch_page(page)?.user_saved;
            if links.is_empty() {
                break;
            }

            let got = links.len();
            all.extend(links.into_iter().map(Bookmark::from));
            log::info!("got {got} links (total: {})", all.len());
            page += 1;
        }

        Ok(all)
    }
}
