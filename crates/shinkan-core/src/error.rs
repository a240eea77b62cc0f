//! Error types for shinkan-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::HttpError;
use crate::library::LifecycleError;
use crate::sources::SourceError;
use crate::storage::StorageError;

/// Result type alias for shinkan operations
pub type Result<T> = std::result::Result<T, ShinkanError>;

/// Main error type for shinkan operations
///
/// Catalog and parse failures are absorbed inside `fetch_new` and collection
/// loads never fail, so in practice callers only see storage write failures
/// and configuration errors here.
#[derive(Error, Debug)]
pub enum ShinkanError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Transport-level errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Rejected user-driven lifecycle change
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
