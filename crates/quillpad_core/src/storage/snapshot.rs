//! Snapshot gateway implementations.
//!
//! # Responsibility
//! - Persist the four collections as one JSON document each under a data
//!   directory.
//! - Provide an in-memory gateway for tests and embedded callers.
//!
//! # Invariants
//! - A missing collection file loads as an empty collection (first boot).
//! - Each save rewrites every collection file in full; there is no
//!   incremental log.

use super::{PersistenceGateway, SnapshotData, SnapshotError, SnapshotResult};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

const USERS_FILE: &str = "users.json";
const NOTES_FILE: &str = "notes.json";
const TAGS_FILE: &str = "tags.json";
const REVOCATIONS_FILE: &str = "revocations.json";

/// File-backed gateway writing one JSON document per collection.
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    /// Creates a gateway rooted at the given data directory.
    ///
    /// The directory is created on first save/load if absent.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_collection<T: DeserializeOwned>(
        &self,
        file: &str,
        collection: &'static str,
    ) -> SnapshotResult<Vec<T>> {
        let path = self.dir.join(file);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&text).map_err(|source| SnapshotError::Decode { collection, source })
    }

    fn save_collection<T: Serialize>(&self, file: &str, rows: &[T]) -> SnapshotResult<()> {
        let text = serde_json::to_string_pretty(rows).map_err(SnapshotError::Encode)?;
        std::fs::write(self.dir.join(file), text)?;
        Ok(())
    }
}

impl PersistenceGateway for JsonSnapshotStore {
    fn load(&mut self) -> SnapshotResult<SnapshotData> {
        let started_at = Instant::now();
        std::fs::create_dir_all(&self.dir)?;

        let result: SnapshotResult<SnapshotData> = (|| {
            Ok(SnapshotData {
                users: self.load_collection(USERS_FILE, "users")?,
                notes: self.load_collection(NOTES_FILE, "notes")?,
                tags: self.load_collection(TAGS_FILE, "tags")?,
                revocations: self.load_collection(REVOCATIONS_FILE, "revocations")?,
            })
        })();

        match &result {
            Ok(data) => info!(
                "event=snapshot_load module=storage status=ok duration_ms={} users={} notes={} tags={} revocations={}",
                started_at.elapsed().as_millis(),
                data.users.len(),
                data.notes.len(),
                data.tags.len(),
                data.revocations.len()
            ),
            Err(err) => error!(
                "event=snapshot_load module=storage status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }

    fn save(&mut self, data: &SnapshotData) -> SnapshotResult<()> {
        let started_at = Instant::now();
        std::fs::create_dir_all(&self.dir)?;

        // Four independent rewrites; not atomic as a group. A crash between
        // files can leave the on-disk snapshot inconsistent.
        let result: SnapshotResult<()> = (|| {
            self.save_collection(USERS_FILE, &data.users)?;
            self.save_collection(NOTES_FILE, &data.notes)?;
            self.save_collection(TAGS_FILE, &data.tags)?;
            self.save_collection(REVOCATIONS_FILE, &data.revocations)?;
            Ok(())
        })();

        match &result {
            Ok(()) => info!(
                "event=snapshot_save module=storage status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=snapshot_save module=storage status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }
}

/// Volatile gateway holding the snapshot in memory.
///
/// Used by tests and callers that do not need durability.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    data: SnapshotData,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing working set, as if loaded from disk.
    pub fn with_data(data: SnapshotData) -> Self {
        Self { data }
    }

    /// Reads back the last saved working set.
    pub fn data(&self) -> &SnapshotData {
        &self.data
    }
}

impl PersistenceGateway for MemorySnapshotStore {
    fn load(&mut self) -> SnapshotResult<SnapshotData> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &SnapshotData) -> SnapshotResult<()> {
        self.data = data.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonSnapshotStore, PersistenceGateway, SnapshotData};
    use crate::model::note::Note;
    use crate::model::tag::Tag;
    use uuid::Uuid;

    #[test]
    fn empty_directory_loads_as_empty_working_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonSnapshotStore::new(dir.path());
        let data = store.load().unwrap();
        assert_eq!(data, SnapshotData::default());
    }

    #[test]
    fn save_then_load_roundtrips_all_collections() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Uuid::new_v4();
        let mut data = SnapshotData::default();
        data.notes
            .push(Note::new(owner, "title", "body", "#ffffff", 1_000));
        data.tags.push(Tag::new(owner, "work", 1_000));

        let mut store = JsonSnapshotStore::new(dir.path());
        store.save(&data).unwrap();

        let mut reopened = JsonSnapshotStore::new(dir.path());
        assert_eq!(reopened.load().unwrap(), data);
    }

    #[test]
    fn corrupt_collection_file_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.json"), "not json").unwrap();

        let mut store = JsonSnapshotStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("notes"));
    }
}
