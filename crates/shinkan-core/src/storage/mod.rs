//! Durable key-value storage and the persisted collections built on it
//!
//! Every collection is one JSON array under one key. Saves overwrite the
//! whole value; there is no merge, so a single writer is assumed.

mod collection;
mod file;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use collection::PersistedCollection;
pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

use thiserror::Error;

/// The trait that all storage backends implement.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if there is none.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Keys are used as file names, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
