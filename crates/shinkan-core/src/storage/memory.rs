//! In-process storage backend

use std::collections::HashMap;
use std::sync::Mutex;

use super::{validate_key, KeyValueStorage, StorageError};

/// Storage backed by a map in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(format!("Mutex poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(format!("Mutex poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
