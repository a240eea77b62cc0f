//! shinkan-core: new-release tracking for a personal book list
//!
//! This crate provides:
//! - **Catalog search**: one paced request per keyword filter against Rakuten Books
//! - **Date handling**: Japanese sales-date normalization and rolling windows
//! - **Deduplication**: ISBN-first identity matching
//! - **Library**: persisted collections (new arrivals, stateful books,
//!   bookshelf, wishlist, keyword filters) over pluggable key-value storage
//! - **Reconciliation**: merge new arrivals into stateful books, move
//!   released pre-orders to bought, shelve them, prune, and sort
//!
//! # Flow
//!
//! ```text
//! KeywordFilter ─▶ NewBookFetcher ─▶ NewArrivals ─▶ Reconciler ─▶ stateful-books
//!                                                              └▶ bookShelf
//! ```
//!
//! Current date is always passed in explicitly, so every date rule can be
//! tested against a fixed day.

pub mod config;
pub mod dates;
pub mod deduplication;
pub mod domain;
pub mod error;
pub mod http;
pub mod ingest;
pub mod library;
pub mod reconcile;
pub mod sources;
pub mod storage;
pub mod tracker;

pub use config::{CatalogConfig, ConfigError, RetentionConfig, ShinkanConfig, StorageConfig};
pub use dates::{normalize_date, passes_recency, RecencyVerdict};
pub use deduplication::{is_duplicate, BookIdentity};
pub use domain::{BookSize, FetchedBook, KeywordFilter, LifecycleState, TrackedBook};
pub use error::{Result, ShinkanError};
pub use http::{CatalogTransport, HttpClient, HttpError, HttpResponse};
pub use ingest::{FetchReport, FilterReport, NewBookFetcher};
pub use library::{
    BookCollection, InsertOutcome, KeywordList, Library, LifecycleError, NewArrivals, Wishlist,
};
pub use reconcile::{ReconcilePlan, ReconcileReport, Reconciler};
pub use sources::{RakutenBooksSource, SourceError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, PersistedCollection, StorageError};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
pub use tracker::Tracker;

/// Returns the version of shinkan-core
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
