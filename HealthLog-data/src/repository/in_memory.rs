use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::RepositoryError;

/// In-memory key/value storage for serialized blobs
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    /// Blobs by key
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the blob stored under `key`
    pub fn get_item(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let store = self.items.lock()?;
        Ok(store.get(key).cloned())
    }

    /// Store `value` under `key`, replacing any previous blob
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let mut store = self.items.lock()?;
        store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Remove the blob stored under `key`
    pub fn remove_item(&self, key: &str) -> Result<(), RepositoryError> {
        let mut store = self.items.lock()?;
        store.remove(key);
        Ok(())
    }
}
