//! Reconciliation of new arrivals into the stateful collection
//!
//! Pipeline:
//! ```text
//! new arrivals ──merge (carry state by identity)──▶ merged
//!   merged ──[lifecycle rules]──▶ ordered→bought, bought→bookshelf, prune old
//!   result ──sort newest first──▶ stateful-books
//! ```
//!
//! [`Reconciler::plan`] is pure: it takes the current collections and a date
//! and returns the next ones. [`Reconciler::reconcile`] applies a plan to a
//! [`Library`] and persists it.

use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::config::RetentionConfig;
use crate::dates::{
    is_released_after, is_released_by, months_before, release_timestamp_millis,
    DEFAULT_WINDOW_MONTHS,
};
use crate::deduplication::{find_duplicate, is_duplicate};
use crate::domain::{LifecycleState, TrackedBook};
use crate::library::Library;
use crate::storage::StorageError;

/// What a reconciliation pass did, by book id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records produced by the merge step
    pub merged: usize,
    /// Merged records that inherited a lifecycle state
    pub carried_forward: usize,
    /// Moved from ordered to bought because the release date passed
    pub transitioned: Vec<u64>,
    /// Newly appended to the bookshelf
    pub promoted: Vec<u64>,
    /// Dropped from stateful-books by the retention window
    pub pruned: Vec<u64>,
}

/// Next state of the collections, before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Replacement stateful-books, newest release first
    pub stateful: Vec<TrackedBook>,
    /// Replacement bookshelf; `None` when lifecycle rules were not applied
    pub bookshelf: Option<Vec<TrackedBook>>,
    pub report: ReconcileReport,
}

/// Merges new arrivals into stateful-books and advances lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
    retention_window_months: u32,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MONTHS)
    }
}

impl Reconciler {
    pub fn new(retention_window_months: u32) -> Self {
        Self {
            retention_window_months,
        }
    }

    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(config.retention_window_months)
    }

    /// Compute the next stateful-books (and bookshelf, with lifecycle rules).
    pub fn plan(
        &self,
        new_arrivals: &[TrackedBook],
        stateful: &[TrackedBook],
        bookshelf: &[TrackedBook],
        apply_lifecycle_rules: bool,
        today: NaiveDate,
    ) -> ReconcilePlan {
        let mut report = ReconcileReport::default();
        let merged = merge(new_arrivals, stateful, &mut report);

        if !apply_lifecycle_rules {
            return ReconcilePlan {
                stateful: sort_newest_first(merged),
                bookshelf: None,
                report,
            };
        }

        let threshold = months_before(today, self.retention_window_months);
        let mut shelf = bookshelf.to_vec();
        let mut retained = Vec::with_capacity(merged.len());

        for mut book in merged {
            if book.state == Some(LifecycleState::Ordered)
                && is_released_by(&book.release_date, today)
            {
                book.state = Some(LifecycleState::Bought);
                report.transitioned.push(book.id);
            }

            if book.state == Some(LifecycleState::Bought) && !is_duplicate(&book, &shelf) {
                shelf.push(book.clone());
                report.promoted.push(book.id);
            }

            if is_released_after(&book.release_date, threshold) {
                retained.push(book);
            } else {
                report.pruned.push(book.id);
            }
        }

        ReconcilePlan {
            stateful: sort_newest_first(retained),
            bookshelf: Some(shelf),
            report,
        }
    }

    /// Reconcile the library's collections and persist the result.
    ///
    /// With lifecycle rules the bookshelf is written first, then
    /// stateful-books; without them only stateful-books is written.
    pub fn reconcile(
        &self,
        library: &mut Library,
        apply_lifecycle_rules: bool,
        today: NaiveDate,
    ) -> Result<ReconcileReport, StorageError> {
        let plan = self.plan(
            library.new_arrivals.books(),
            library.stateful.items(),
            library.bookshelf.items(),
            apply_lifecycle_rules,
            today,
        );

        if let Some(shelf) = plan.bookshelf {
            library.bookshelf.replace(shelf);
            library.bookshelf.commit()?;
        }

        library.stateful.replace(plan.stateful);
        library.stateful.commit()?;

        let report = plan.report;
        tracing::info!(
            "Reconciled {} books ({} with state): {} bought, {} shelved, {} pruned",
            report.merged,
            report.carried_forward,
            report.transitioned.len(),
            report.promoted.len(),
            report.pruned.len()
        );
        Ok(report)
    }
}

/// One record per new arrival, carrying the lifecycle state of the matching
/// stateful record (or none).
fn merge(
    new_arrivals: &[TrackedBook],
    stateful: &[TrackedBook],
    report: &mut ReconcileReport,
) -> Vec<TrackedBook> {
    let merged: Vec<TrackedBook> = new_arrivals
        .iter()
        .map(|book| {
            let state = find_duplicate(book, stateful).and_then(|existing| existing.state);
            if state.is_some() {
                report.carried_forward += 1;
            }
            book.clone().with_state(state)
        })
        .collect();

    report.merged = merged.len();
    merged
}

/// Stable sort by release date, newest first; undated records go last in
/// their existing order.
pub fn sort_newest_first(mut books: Vec<TrackedBook>) -> Vec<TrackedBook> {
    books.sort_by_key(|book| Reverse(release_timestamp_millis(&book.release_date)));
    books
}
