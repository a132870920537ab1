use std::collections::HashMap;
use std::sync::Mutex;

use super::store::{Collection, CollectionStore};
use super::DatabaseError;

/// Ephemeral collection store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<Collection, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with a raw payload, bypassing serialization.
    pub fn with_raw(self, collection: Collection, payload: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(collection, payload.into());
        }
        self
    }
}

impl CollectionStore for MemoryStore {
    fn read(&self, collection: Collection) -> Result<Option<String>, DatabaseError> {
        let entries = self.entries.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(entries.get(&collection).cloned())
    }

    fn write_all(&self, writes: &[(Collection, String)]) -> Result<(), DatabaseError> {
        let mut entries = self.entries.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        for (collection, payload) in writes {
            entries.insert(*collection, payload.clone());
        }
        Ok(())
    }
}
