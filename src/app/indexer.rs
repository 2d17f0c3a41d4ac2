//! Pulls bookmarks from the source and embeds the ones the index lacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::app::AppError;
use crate::bookmarks::BookmarkSource;
use crate::semantic::SemanticSearchService;

const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Bookmarks returned by the source
    pub fetched: usize,
    pub embedded: usize,
    pub failed: usize,
    /// Index size after the run
    pub total: usize,
}

pub struct Indexer {
    service: SemanticSearchService,
    source: Arc<dyn BookmarkSource>,
    running: AtomicBool,
}

/// Clears the running flag however the run ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Indexer {
    pub fn new(service: SemanticSearchService, source: Arc<dyn BookmarkSource>) -> Self {
        Self {
            service,
            source,
            running: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &SemanticSearchService {
        &self.service
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<RunGuard<'_>, AppError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::IndexInProgress)?;
        Ok(RunGuard(&self.running))
    }

    /// Embed every fetched bookmark that isn't indexed yet.
    ///
    /// A bookmark that fails to embed is logged and skipped. The snapshot is
    /// saved only when at least one bookmark was embedded, so a run where the
    /// provider is down never replaces it.
    pub fn run(&self) -> Result<IndexReport, AppError> {
        let _guard = self.acquire()?;
        self.run_locked()
    }

    /// Drop the whole index and embed everything again.
    pub fn rebuild(&self) -> Result<IndexReport, AppError> {
        let _guard = self.acquire()?;
        self.service.store().clear();
        log::info!("cleared existing index for full re-index");
        self.run_locked()
    }

    fn run_locked(&self) -> Result<IndexReport, AppError> {
        let store = self.service.store();

        log::info!("fetching bookmarks");
        let bookmarks = self.source.fetch_all()?;
        let fetched = bookmarks.len();
        log::info!("fetched {fetched} bookmarks");

        let pending: Vec<_> = bookmarks.into_iter().filter(|b| !store.has(b.id)).collect();

        let mut report = IndexReport {
            fetched,
            ..Default::default()
        };

        if pending.is_empty() {
            log::info!("index is up to date, no new bookmarks to embed");
            report.total = store.count();
            return Ok(report);
        }

        let todo = pending.len();
        log::info!("embedding {todo} new bookmarks with {}", self.service.embedder().name());

        for (i, bookmark) in pending.into_iter().enumerate() {
            let (id, title) = (bookmark.id, bookmark.title.clone());

            match self.service.ingest_one(bookmark) {
                Ok(()) => report.embedded += 1,
                Err(err) => {
                    log::warn!("failed to embed bookmark {id} ({title}): {err}");
                    report.failed += 1;
                }
            }

            let done = i + 1;
            if done % PROGRESS_EVERY == 0 || done == todo {
                log::info!("embedded {done}/{todo}");
            }
        }

        report.total = store.count();
        if report.embedded == 0 {
            log::warn!("nothing embedded, keeping the existing snapshot");
            return Ok(report);
        }

        store.save()?;
        log::info!("index saved: {} total entries", report.total);

        Ok(report)
    }
}
