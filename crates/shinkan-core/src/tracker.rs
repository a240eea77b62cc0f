//! Top-level entry points: check for new books, refresh on load

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::{ConfigError, ShinkanConfig};
use crate::error::Result;
use crate::http::{CatalogTransport, HttpClient};
use crate::ingest::{FetchReport, NewBookFetcher};
use crate::library::Library;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::storage::{FileStorage, KeyValueStorage};

/// Wires configuration, the catalog fetcher, and the library together.
pub struct Tracker<T = HttpClient> {
    fetcher: NewBookFetcher<T>,
    reconciler: Reconciler,
    library: Library,
}

impl Tracker<HttpClient> {
    /// Validate `config`, open file storage in its data directory, and build
    /// a real HTTP client.
    pub fn open(config: &ShinkanConfig) -> Result<Self> {
        config.validate()?;
        let dir = config.storage.resolved_data_dir().ok_or_else(|| {
            ConfigError::OutOfRange("no data directory configured or available".to_string())
        })?;
        tracing::info!("Using data directory {:?}", dir);

        let fetcher = NewBookFetcher::from_config(config)?;
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(dir));
        Ok(Self::from_parts(fetcher, config, storage))
    }
}

impl<T: CatalogTransport> Tracker<T> {
    pub fn from_parts(
        fetcher: NewBookFetcher<T>,
        config: &ShinkanConfig,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            fetcher,
            reconciler: Reconciler::from_config(&config.retention),
            library: Library::open(storage),
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    /// Fetch every stored keyword filter, then reconcile.
    pub async fn check_for_new_books(
        &mut self,
        today: NaiveDate,
        apply_lifecycle_rules: bool,
    ) -> Result<(FetchReport, ReconcileReport)> {
        let filters = self.library.keywords.filters().to_vec();
        if filters.is_empty() {
            tracing::info!("No keyword filters configured; skipping catalog fetch");
        }

        let fetch = self
            .fetcher
            .fetch_new(&filters, &mut self.library.new_arrivals, today)
            .await;
        let reconcile = self
            .reconciler
            .reconcile(&mut self.library, apply_lifecycle_rules, today)?;

        Ok((fetch, reconcile))
    }

    /// Reconcile with lifecycle rules and no catalog fetch.
    pub fn refresh(&mut self, today: NaiveDate) -> Result<ReconcileReport> {
        Ok(self.reconciler.reconcile(&mut self.library, true, today)?)
    }
}
