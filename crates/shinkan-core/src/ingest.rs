//! Fetching new releases for every keyword filter
//!
//! Filters run one at a time with a fixed pause between them; sequencing is
//! the whole rate limiter. A failing filter is logged and recorded in the
//! report, and the loop carries on with the next one.

use std::time::Duration;

use chrono::NaiveDate;

use crate::config::ShinkanConfig;
use crate::dates::{recency_verdict, RecencyVerdict};
use crate::domain::{FetchedBook, KeywordFilter};
use crate::error::Result;
use crate::http::{CatalogTransport, HttpClient};
use crate::library::{InsertOutcome, NewArrivals};
use crate::sources::RakutenBooksSource;

/// What happened to one keyword filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub filter_id: u64,
    /// Hits returned by the catalog
    pub fetched: usize,
    /// Hits released before the recency threshold
    pub rejected_stale: usize,
    /// Hits whose sales date did not normalize to a calendar date
    pub rejected_unparseable: usize,
    /// Ids assigned to newly accepted books
    pub inserted: Vec<u64>,
    /// Fresh hits already in new arrivals
    pub duplicates: usize,
    /// Request, parse, or write failure that ended this filter early
    pub error: Option<String>,
}

/// Outcome of a full `fetch_new` pass, in filter order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub filters: Vec<FilterReport>,
}

impl FetchReport {
    pub fn inserted_count(&self) -> usize {
        self.filters.iter().map(|f| f.inserted.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.filters.iter().filter(|f| f.error.is_some()).count()
    }
}

/// Runs keyword filters against the catalog and feeds new arrivals.
pub struct NewBookFetcher<T = HttpClient> {
    source: RakutenBooksSource<T>,
    request_delay: Duration,
    recency_window_months: u32,
}

impl NewBookFetcher<HttpClient> {
    /// Build a fetcher with a real HTTP client from configuration.
    pub fn from_config(config: &ShinkanConfig) -> Result<Self> {
        let client = HttpClient::new(
            &config.catalog.user_agent,
            Duration::from_secs(config.catalog.timeout_secs),
        )?;
        Ok(Self::with_transport(client, config))
    }
}

impl<T: CatalogTransport> NewBookFetcher<T> {
    pub fn with_transport(transport: T, config: &ShinkanConfig) -> Self {
        Self {
            source: RakutenBooksSource::new(transport, &config.catalog),
            request_delay: Duration::from_millis(config.catalog.request_delay_ms),
            recency_window_months: config.retention.recency_window_months,
        }
    }

    /// Query the catalog once per filter, in order, and add fresh, unseen
    /// books to `new_arrivals`.
    ///
    /// Never fails as a whole: per-filter errors end up in the report.
    pub async fn fetch_new(
        &self,
        filters: &[KeywordFilter],
        new_arrivals: &mut NewArrivals,
        today: NaiveDate,
    ) -> FetchReport {
        let mut report = FetchReport::default();

        for (index, filter) in filters.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.request_delay).await;
            }

            let filter_report = self.fetch_one(filter, new_arrivals, today).await;
            match &filter_report.error {
                Some(error) => tracing::warn!("Keyword filter {} failed: {}", filter.id, error),
                None => tracing::info!(
                    "Keyword filter {}: {} fetched, {} new, {} duplicate, {} stale, {} undated",
                    filter.id,
                    filter_report.fetched,
                    filter_report.inserted.len(),
                    filter_report.duplicates,
                    filter_report.rejected_stale,
                    filter_report.rejected_unparseable
                ),
            }
            report.filters.push(filter_report);
        }

        report
    }

    async fn fetch_one(
        &self,
        filter: &KeywordFilter,
        new_arrivals: &mut NewArrivals,
        today: NaiveDate,
    ) -> FilterReport {
        let mut report = FilterReport {
            filter_id: filter.id,
            ..Default::default()
        };

        let books = match self.source.search(filter).await {
            Ok(books) => books,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.fetched = books.len();

        let fresh = self.recent_only(books, &mut report, today);

        match new_arrivals.add_new(fresh) {
            Ok(outcomes) => {
                for outcome in outcomes {
                    match outcome {
                        InsertOutcome::Inserted { id } => report.inserted.push(id),
                        InsertOutcome::Duplicate => report.duplicates += 1,
                    }
                }
            }
            Err(e) => report.error = Some(e.to_string()),
        }

        report
    }

    fn recent_only(
        &self,
        books: Vec<FetchedBook>,
        report: &mut FilterReport,
        today: NaiveDate,
    ) -> Vec<FetchedBook> {
        books
            .into_iter()
            .filter(|book| {
                match recency_verdict(&book.release_date, today, self.recency_window_months) {
                    RecencyVerdict::Fresh => true,
                    RecencyVerdict::Stale => {
                        tracing::debug!("Skipping stale {:?} ({})", book.title, book.release_date);
                        report.rejected_stale += 1;
                        false
                    }
                    RecencyVerdict::UnparseableDate => {
                        tracing::debug!("Skipping undated {:?} ({:?})", book.title, book.sales_date);
                        report.rejected_unparseable += 1;
                        false
                    }
                }
            })
            .collect()
    }
}
