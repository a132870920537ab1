//! Persistent record store: one JSON array per logical collection.
//!
//! `CollectionStore` is the raw backend seam (SQLite on disk, memory for
//! ephemeral use). `RecordStore` layers typed load/save on top of it.
//! Every mutation re-serializes the whole collection; there is no
//! partial-update API.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::memory::MemoryStore;
use super::sqlite::SqliteStore;
use super::DatabaseError;

/// Logical collections, keyed by fixed identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Prescriptions,
    Reminders,
    LabStudies,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Prescriptions,
        Collection::Reminders,
        Collection::LabStudies,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Prescriptions => "pastillas_recetas",
            Self::Reminders => "pastillas_alarmas",
            Self::LabStudies => "pastillas_estudios",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw key/value backend.
pub trait CollectionStore: Send + Sync {
    /// Raw JSON payload of a collection, `None` when never written.
    fn read(&self, collection: Collection) -> Result<Option<String>, DatabaseError>;

    /// Overwrite every listed collection atomically.
    fn write_all(&self, writes: &[(Collection, String)]) -> Result<(), DatabaseError>;
}

/// Typed access to the collections.
pub struct RecordStore {
    backend: Box<dyn CollectionStore>,
}

impl RecordStore {
    pub fn new(backend: impl CollectionStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Open (or create) the on-disk store.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Load a collection, distinguishing absent (empty) from corrupt (error).
    pub fn try_load<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, DatabaseError> {
        match self.backend.read(collection)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| DatabaseError::Corrupt {
                collection: collection.key().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load a collection. Absent, corrupt or unreadable data yields an empty vec.
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        match self.try_load(collection) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Falling back to empty collection");
                Vec::new()
            }
        }
    }

    /// Overwrite a whole collection.
    pub fn save<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<(), DatabaseError> {
        self.batch().put(collection, items)?.commit()
    }

    /// Start a multi-collection write committed in one transaction.
    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch {
            store: self,
            writes: Vec::new(),
        }
    }
}

/// Pending writes for several collections.
pub struct WriteBatch<'a> {
    store: &'a RecordStore,
    writes: Vec<(Collection, String)>,
}

impl<'a> WriteBatch<'a> {
    pub fn put<T: Serialize>(mut self, collection: Collection, items: &[T]) -> Result<Self, DatabaseError> {
        let payload = serde_json::to_string(items)?;
        self.writes.retain(|(c, _)| *c != collection);
        self.writes.push((collection, payload));
        Ok(self)
    }

    pub fn commit(self) -> Result<(), DatabaseError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        let collections: Vec<&str> = self.writes.iter().map(|(c, _)| c.key()).collect();
        self.store.backend.write_all(&self.writes)?;
        tracing::debug!(?collections, "Collections written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        count: u32,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { name: "b".into(), count: 2 },
            Item { name: "a".into(), count: 1 },
        ]
    }

    #[test]
    fn collection_keys_are_fixed() {
        assert_eq!(Collection::Prescriptions.key(), "pastillas_recetas");
        assert_eq!(Collection::Reminders.key(), "pastillas_alarmas");
        assert_eq!(Collection::LabStudies.key(), "pastillas_estudios");
    }

    #[test]
    fn load_absent_collection_is_empty() {
        let store = RecordStore::in_memory();
        let loaded: Vec<Item> = store.load(Collection::Reminders);
        assert!(loaded.is_empty());
        let tried: Vec<Item> = store.try_load(Collection::Reminders).unwrap();
        assert!(tried.is_empty());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let store = RecordStore::in_memory();
        store.save(Collection::Reminders, &items()).unwrap();
        let loaded: Vec<Item> = store.load(Collection::Reminders);
        assert_eq!(loaded, items());
    }

    #[test]
    fn corrupt_payload_falls_back_to_empty() {
        let store = RecordStore::new(MemoryStore::new().with_raw(Collection::Reminders, "{not json"));
        let loaded: Vec<Item> = store.load(Collection::Reminders);
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_payload_reported_by_try_load() {
        let store = RecordStore::new(MemoryStore::new().with_raw(Collection::Reminders, "42"));
        let err = store.try_load::<Item>(Collection::Reminders).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { .. }));
    }

    #[test]
    fn batch_commits_all_collections() {
        let store = RecordStore::in_memory();
        store
            .batch()
            .put(Collection::Prescriptions, &items())
            .unwrap()
            .put(Collection::Reminders, &items()[..1])
            .unwrap()
            .commit()
            .unwrap();
        assert_eq!(store.load::<Item>(Collection::Prescriptions).len(), 2);
        assert_eq!(store.load::<Item>(Collection::Reminders).len(), 1);
    }

    #[test]
    fn batch_put_twice_keeps_last() {
        let store = RecordStore::in_memory();
        store
            .batch()
            .put(Collection::LabStudies, &items())
            .unwrap()
            .put(Collection::LabStudies, &items()[..1])
            .unwrap()
            .commit()
            .unwrap();
        assert_eq!(store.load::<Item>(Collection::LabStudies).len(), 1);
    }

    #[test]
    fn sqlite_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        RecordStore::open(&path)
            .unwrap()
            .save(Collection::Reminders, &items())
            .unwrap();
        let reopened = RecordStore::open(&path).unwrap();
        assert_eq!(reopened.load::<Item>(Collection::Reminders), items());
    }
}
