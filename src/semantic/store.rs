//! Concurrency-safe index store.
//!
//! Holds the entry list and the set of known ids behind one `RwLock`, so the
//! two can never drift apart. Reads (`has`, `count`, `get_by_id`, searches,
//! `save`) share the lock; `add`, `clear` and `load` take it exclusively.
//!
//! Callers must not hold anything from here across an embedding request:
//! embed first, then `add`.
//!
//! After a failed `load` the file on disk stays authoritative: `save` refuses
//! to write until a successful `load` or an explicit `clear`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::semantic::entry::Entry;
use crate::semantic::hybrid::{self, SearchResult};
use crate::semantic::storage::{IndexError, SnapshotStorage};

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<Entry>,
    ids: HashSet<u64>,
    /// Last `load` failed; the snapshot must not be overwritten.
    unreadable_snapshot: bool,
}

impl Inner {
    fn from_entries(entries: Vec<Entry>) -> Self {
        let ids = entries.iter().map(|e| e.id).collect();
        Self {
            entries,
            ids,
            unreadable_snapshot: false,
        }
    }
}

/// The in-memory index plus its snapshot file.
#[derive(Debug)]
pub struct IndexStore {
    inner: RwLock<Inner>,
    storage: SnapshotStorage,
}

impl IndexStore {
    /// An empty store persisting to `storage`. Nothing is read until `load`.
    pub fn new(storage: SnapshotStorage) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            storage,
        }
    }

    /// An empty store persisting to `<data_dir>/index.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(SnapshotStorage::in_dir(data_dir))
    }

    pub fn storage(&self) -> &SnapshotStorage {
        &self.storage
    }

    /// Replace the in-memory state with the persisted snapshot.
    ///
    /// A missing snapshot yields an empty store. On error the current
    /// in-memory entries are kept as they were and `save` is blocked.
    pub fn load(&self) -> Result<(), IndexError> {
        let mut inner = self.write();

        let entries = match self.storage.load() {
            Ok(snapshot) => snapshot.map(|s| s.entries).unwrap_or_default(),
            Err(err) => {
                inner.unreadable_snapshot = true;
                return Err(err);
            }
        };

        log::info!(
            "loaded {} entries from {}",
            entries.len(),
            self.storage.path().display()
        );
        *inner = Inner::from_entries(entries);

        Ok(())
    }

    /// Persist the current entries.
    pub fn save(&self) -> Result<(), IndexError> {
        let inner = self.read();
        if inner.unreadable_snapshot {
            return Err(IndexError::UnreadableSnapshot {
                path: self.storage.path().to_path_buf(),
            });
        }
        self.storage.save(&inner.entries)
    }

    pub fn has(&self, id: u64) -> bool {
        self.read().ids.contains(&id)
    }

    /// Append an entry.
    ///
    /// No deduplication happens here: adding the same id twice stores two
    /// entries. Check `has` first.
    pub fn add(&self, entry: Entry) {
        let mut inner = self.write();
        inner.ids.insert(entry.id);
        inner.entries.push(entry);
    }

    /// Drop every entry. The snapshot on disk is untouched until the next `save`.
    ///
    /// Also lifts the block left by a failed `load`: clearing is an explicit
    /// request to replace the snapshot.
    pub fn clear(&self) {
        let mut inner = self.write();
        *inner = Inner::default();
    }

    pub fn count(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Linear lookup by id.
    pub fn get_by_id(&self, id: u64) -> Option<Entry> {
        self.read().entries.iter().find(|e| e.id == id).cloned()
    }

    /// When the snapshot file was last written, `None` if never.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.storage.updated_at()
    }

    /// Hybrid search: `0.7 * cosine + 0.3 * keyword coverage`.
    ///
    /// `limit == 0` returns up to 20 results.
    pub fn search(&self, query_vec: &[f32], query: &str, limit: usize) -> Vec<SearchResult> {
        let inner = self.read();
        hybrid::rank_hybrid(&inner.entries, query_vec, query, limit)
    }

    /// Cosine-only search that never returns `exclude_id`.
    ///
    /// `limit == 0` returns up to 10 results.
    pub fn search_by_vector(
        &self,
        vector: &[f32],
        limit: usize,
        exclude_id: u64,
    ) -> Vec<SearchResult> {
        let inner = self.read();
        hybrid::rank_by_vector(&inner.entries, vector, limit, exclude_id)
    }

    // Every mutation updates entries and ids together before the guard drops,
    // so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, title: &str, embedding: Vec<f32>) -> Entry {
        Entry {
            id,
            title: title.to_string(),
            url: format!("https://example.com/{id}"),
            highlights: vec![],
            tags: vec![],
            description: String::new(),
            created_at: Utc::now(),
            embedding,
        }
    }

    fn create_store() -> (IndexStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        (IndexStore::in_dir(tmp.path()), tmp)
    }

    #[test]
    fn test_new_store_is_empty() {
        let (store, _tmp) = create_store();
        assert_eq!(store.count(), 0);
        assert!(store.is_empty());
        assert!(!store.has(1));
        assert!(store.updated_at().is_none());
    }

    #[test]
    fn test_add_then_has() {
        let (store, _tmp) = create_store();
        store.add(entry(42, "x", vec![1.0]));

        assert!(store.has(42));
        assert!(!store.has(43));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_add_does_not_deduplicate() {
        let (store, _tmp) = create_store();
        store.add(entry(1, "first", vec![1.0]));
        store.add(entry(1, "second", vec![1.0]));

        assert_eq!(store.count(), 2);
        assert_eq!(store.get_by_id(1).unwrap().title, "first");
    }

    #[test]
    fn test_clear() {
        let (store, _tmp) = create_store();
        store.add(entry(1, "a", vec![1.0]));
        store.add(entry(2, "b", vec![1.0]));

        store.clear();
        assert_eq!(store.count(), 0);
        assert!(!store.has(1));
        assert!(!store.has(2));
    }

    #[test]
    fn test_get_by_id() {
        let (store, _tmp) = create_store();
        store.add(entry(1, "a", vec![1.0]));
        store.add(entry(2, "b", vec![0.5]));

        assert_eq!(store.get_by_id(2).unwrap().title, "b");
        assert!(store.get_by_id(3).is_none());
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let (store, _tmp) = create_store();
        store.load().unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_save_and_load_into_fresh_store() {
        let (store, tmp) = create_store();
        store.add(entry(3, "c", vec![0.0, 1.0]));
        store.add(entry(1, "a", vec![1.0, 0.0]));
        store.add(entry(2, "b", vec![0.5, 0.5]));
        store.save().unwrap();
        assert!(store.updated_at().is_some());

        let fresh = IndexStore::in_dir(tmp.path());
        fresh.load().unwrap();

        assert_eq!(fresh.count(), 3);
        for id in [1, 2, 3] {
            assert!(fresh.has(id));
            assert_eq!(fresh.get_by_id(id), store.get_by_id(id));
        }

        let snapshot = fresh.storage().load().unwrap().unwrap();
        let ids: Vec<u64> = snapshot.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_reload_replaces_memory() {
        let (store, _tmp) = create_store();
        store.add(entry(1, "a", vec![1.0]));
        store.save().unwrap();

        store.add(entry(2, "b", vec![1.0]));
        store.load().unwrap();

        assert_eq!(store.count(), 1);
        assert!(store.has(1));
        assert!(!store.has(2));
    }

    #[test]
    fn test_corrupt_reload_keeps_memory() {
        let (store, _tmp) = create_store();
        store.add(entry(1, "a", vec![1.0]));
        store.add(entry(2, "b", vec![1.0]));
        std::fs::write(store.storage().path(), b"not json").unwrap();

        let result = store.load();
        assert!(matches!(result, Err(IndexError::CorruptState { .. })));
        assert_eq!(store.count(), 2);
        assert!(store.has(1) && store.has(2));
    }

    #[test]
    fn test_failed_load_blocks_save() {
        let (store, _tmp) = create_store();
        store.add(entry(1, "a", vec![1.0]));
        store.save().unwrap();

        let mut bytes = std::fs::read(store.storage().path()).unwrap();
        bytes.push(b'}');
        std::fs::write(store.storage().path(), &bytes).unwrap();

        assert!(store.load().is_err());
        store.add(entry(2, "b", vec![1.0]));
        assert!(matches!(store.save(), Err(IndexError::UnreadableSnapshot { .. })));
        assert_eq!(std::fs::read(store.storage().path()).unwrap(), bytes);
    }

    #[test]
    fn test_clear_lifts_save_block() {
        let (store, tmp) = create_store();
        std::fs::write(store.storage().path(), b"not json").unwrap();
        assert!(store.load().is_err());

        store.clear();
        store.add(entry(1, "a", vec![1.0]));
        store.save().unwrap();

        let fresh = IndexStore::in_dir(tmp.path());
        fresh.load().unwrap();
        assert_eq!(fresh.count(), 1);
    }

    #[test]
    fn test_successful_load_lifts_save_block() {
        let (store, _tmp) = create_store();
        std::fs::write(store.storage().path(), b"not json").unwrap();
        assert!(store.load().is_err());

        std::fs::remove_file(store.storage().path()).unwrap();
        store.load().unwrap();
        store.save().unwrap();
    }

    #[test]
    fn test_clear_then_save_persists_empty() {
        let (store, tmp) = create_store();
        store.add(entry(1, "a", vec![1.0]));
        store.save().unwrap();
        store.clear();
        store.save().unwrap();

        let fresh = IndexStore::in_dir(tmp.path());
        fresh.load().unwrap();
        assert_eq!(fresh.count(), 0);
    }

    #[test]
    fn test_search_empty_store() {
        let (store, _tmp) = create_store();
        assert!(store.search(&[1.0, 0.0], "rust", 10).is_empty());
        assert!(store.search_by_vector(&[1.0, 0.0], 10, 1).is_empty());
    }

    #[test]
    fn test_concurrent_add_and_search() {
        use std::sync::Arc;

        let (store, _tmp) = create_store();
        let store = Arc::new(store);

        let writers: Vec<_> = (0..4u64)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..50u64 {
                        store.add(entry(t * 1000 + i, "x", vec![1.0, i as f32]));
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let results = store.search(&[1.0, 0.0], "x", 5);
                        assert!(results.len() <= 5);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(store.count(), 200);
        assert!(store.has(3049));
    }
}
