//! A keyed, ordered list of records persisted as one JSON array

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{KeyValueStorage, StorageError};

/// An in-memory list mirrored to a single storage key.
///
/// `load` replaces the in-memory list with what is stored; `save` replaces
/// what is stored with the in-memory list.
pub struct PersistedCollection<T> {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    items: Vec<T>,
}

impl<T> PersistedCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind to `key` and load whatever is stored there.
    pub fn open(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let mut collection = Self {
            storage,
            key: key.into(),
            items: Vec::new(),
        };
        collection.load();
        collection
    }

    /// Reload from storage.
    ///
    /// A missing entry, a read failure, or a value that does not deserialize
    /// all leave the collection empty.
    pub fn load(&mut self) -> &[T] {
        self.items = match self.storage.read(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Discarding unreadable collection {:?}: {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read collection {:?}: {}", self.key, e);
                Vec::new()
            }
        };
        &self.items
    }

    /// Overwrite the stored value with the current list.
    pub fn save(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.items)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.write(&self.key, &json)?;
        tracing::debug!("Saved {} records to {:?}", self.items.len(), self.key);
        Ok(())
    }

    /// Save, or on failure reload so the in-memory list matches storage again.
    pub fn commit(&mut self) -> Result<(), StorageError> {
        if let Err(e) = self.save() {
            tracing::warn!("Rolling back {:?} after failed save: {}", self.key, e);
            self.load();
            return Err(e);
        }
        Ok(())
    }
}

impl<T> PersistedCollection<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access to the in-memory list. Call `save` to persist.
    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    /// Swap in a whole new list. Call `save` to persist.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> fmt::Debug for PersistedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedCollection")
            .field("key", &self.key)
            .field("len", &self.items.len())
            .finish()
    }
}
