//! JSON snapshot storage for the index.
//!
//! File format: index.json
//!
//! ```json
//! { "entries": [ { "id": 1, "title": "...", "url": "...", "highlights": [...],
//!                  "tags": [...], "description": "...", "createdAt": "...",
//!                  "embedding": [0.1, ...] } ],
//!   "updatedAt": "2026-01-01T00:00:00Z" }
//! ```
//!
//! Writes go to a temp file in the same directory, are fsynced, then renamed
//! over the snapshot, so readers see either the old file or the new one.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::semantic::entry::{Entry, Snapshot, SnapshotRef};

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "index.json";

/// Errors that can occur while loading or saving the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index snapshot {path} is corrupt: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(serde_json::Error),

    #[error("refusing to overwrite unreadable snapshot {path}; rebuild the index to replace it")]
    UnreadableSnapshot { path: PathBuf },
}

/// Storage manager for the index snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    path: PathBuf,
}

impl SnapshotStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Storage for `<data_dir>/index.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SNAPSHOT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot. `Ok(None)` means there is no file yet.
    pub fn load(&self) -> Result<Option<Snapshot>, IndexError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                IndexError::Io(source.into())
            } else {
                IndexError::CorruptState {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        Ok(Some(snapshot))
    }

    /// Write `entries` with the current time as `updatedAt`.
    ///
    /// On failure the previous snapshot is left in place.
    pub fn save(&self, entries: &[Entry]) -> Result<(), IndexError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        // dropped (and removed) on any early return
        let temp = tempfile::NamedTempFile::new_in(dir)?;

        let snapshot = SnapshotRef {
            entries,
            updated_at: Utc::now(),
        };

        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, &snapshot).map_err(|err| {
            if err.is_io() {
                IndexError::Io(err.into())
            } else {
                IndexError::Encode(err)
            }
        })?;
        writer.flush()?;
        drop(writer);

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;

        Ok(())
    }

    /// Modification time of the snapshot file, `None` when it doesn't exist.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }
}
