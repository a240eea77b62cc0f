//! shinkan-sync
//!
//! Fetches new releases for every stored keyword filter and reconciles the
//! library once. Reads its TOML config from `SHINKAN_CONFIG` if set.
//! Set `SHINKAN_SKIP_LIFECYCLE=1` to reconcile without date-based rules.

use shinkan_core::{ShinkanConfig, Tracker};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::var("SHINKAN_CONFIG") {
        Ok(path) => ShinkanConfig::load(path)?,
        Err(_) => ShinkanConfig::default().with_env_overrides(),
    };
    let apply_lifecycle_rules = std::env::var("SHINKAN_SKIP_LIFECYCLE").map_or(true, |v| v != "1");

    let mut tracker = Tracker::open(&config)?;
    let today = chrono::Local::now().date_naive();
    let (fetch, reconcile) = tracker
        .check_for_new_books(today, apply_lifecycle_rules)
        .await?;

    tracing::info!(
        "Done: {} new books from {} filters ({} failed); {} tracked, {} newly shelved",
        fetch.inserted_count(),
        fetch.filters.len(),
        fetch.failed_count(),
        tracker.library().stateful.len(),
        reconcile.promoted.len()
    );
    Ok(())
}
