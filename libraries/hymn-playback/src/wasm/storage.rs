//! `localStorage` snapshot store

use crate::error::PersistenceError;
use crate::persistence::{PersistedSnapshot, SnapshotStore};
use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};

/// Default key the snapshot is stored under
pub const PLAYBACK_KEY: &str = "hymn-player.playback";

#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(PLAYBACK_KEY)
    }
}

impl SnapshotStore for LocalStorageStore {
    fn load(&self) -> Result<Option<PersistedSnapshot>, PersistenceError> {
        match LocalStorage::get(&self.key) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(PersistenceError::Storage(e.to_string())),
        }
    }

    fn save(&mut self, snapshot: &PersistedSnapshot) -> Result<(), PersistenceError> {
        LocalStorage::set(&self.key, snapshot).map_err(|e| PersistenceError::Storage(e.to_string()))
    }
}
