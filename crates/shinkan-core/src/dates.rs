//! Sales-date normalization and the rolling date windows
//!
//! The catalog reports sales dates as free-form Japanese text
//! (`2024年03月15日`, `2024年03月上旬`, `近日発売`). They are normalized to
//! `YYYY-MM-DD`, with month-only dates pinned to the 1st, and everything
//! date-related downstream works on the normalized string.

use chrono::{Months, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::deduplication::BookIdentity;

/// Months of history the recency filter and retention pruning keep by default
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;

lazy_static! {
    static ref FULL_DATE: Regex = Regex::new(r"([0-9]{4})年([0-9]{2})月([0-9]{2})日").unwrap();
    static ref YEAR_MONTH: Regex = Regex::new(r"([0-9]{4})年([0-9]{2})月").unwrap();
}

/// Normalize a catalog sales date to `YYYY-MM-DD`.
///
/// Returns an empty string when neither a full nor a year-month date is found.
/// The result is not calendar-checked (`2024年02月30日` gives `2024-02-30`);
/// use [`parse_release_date`] for that.
pub fn normalize_date(raw: &str) -> String {
    if let Some(caps) = FULL_DATE.captures(raw) {
        return format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = YEAR_MONTH.captures(raw) {
        return format!("{}-{}-01", &caps[1], &caps[2]);
    }

    String::new()
}

/// Parse a normalized release date. Empty or invalid dates give `None`.
pub fn parse_release_date(normalized: &str) -> Option<NaiveDate> {
    if normalized.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(normalized, "%Y-%m-%d").ok()
}

/// `today` minus `months` calendar months, clamped to the end of shorter months.
pub fn months_before(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Millisecond timestamp (UTC midnight) of a normalized release date.
///
/// This is the sort key for tracked books.
pub fn release_timestamp_millis(normalized: &str) -> Option<i64> {
    parse_release_date(normalized)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

/// True if the release date is valid and on or before `today`.
///
/// An invalid date is never due.
pub fn is_released_by(normalized: &str, today: NaiveDate) -> bool {
    parse_release_date(normalized).is_some_and(|date| date <= today)
}

/// True if the release date is valid and strictly after `threshold`.
pub fn is_released_after(normalized: &str, threshold: NaiveDate) -> bool {
    parse_release_date(normalized).is_some_and(|date| date > threshold)
}

/// Why a fetched book was or was not accepted by the recency filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyVerdict {
    /// Released on or after the recency threshold
    Fresh,
    /// Released before the recency threshold
    Stale,
    /// Empty or not a calendar date
    UnparseableDate,
}

impl RecencyVerdict {
    pub fn passes(&self) -> bool {
        matches!(self, RecencyVerdict::Fresh)
    }
}

/// Classify a normalized release date against `today - window_months`.
pub fn recency_verdict(normalized: &str, today: NaiveDate, window_months: u32) -> RecencyVerdict {
    match parse_release_date(normalized) {
        None => RecencyVerdict::UnparseableDate,
        Some(date) if date >= months_before(today, window_months) => RecencyVerdict::Fresh,
        Some(_) => RecencyVerdict::Stale,
    }
}

/// Recency filter with the default three-month window.
pub fn passes_recency<B: BookIdentity + ?Sized>(book: &B, today: NaiveDate) -> bool {
    recency_verdict(book.release_date(), today, DEFAULT_WINDOW_MONTHS).passes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FetchedBook;
    use proptest::prelude::*;
    use rstest::rstest;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2024年03月15日", "2024-03-15")]
    #[case("2024年03月", "2024-03-01")]
    #[case("2024年03月15日頃", "2024-03-15")]
    #[case("2024年03月上旬", "2024-03-01")]
    #[case("TBD", "")]
    #[case("", "")]
    #[case("2024年3月15日", "")]
    fn test_normalize_date(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_date(raw), expected);
    }

    #[test]
    fn test_normalize_keeps_impossible_days() {
        assert_eq!(normalize_date("2024年02月30日"), "2024-02-30");
        assert_eq!(parse_release_date("2024-02-30"), None);
    }

    #[test]
    fn test_months_before_clamps() {
        assert_eq!(months_before(day(2024, 5, 31), 3), day(2024, 2, 29));
        assert_eq!(months_before(day(2024, 2, 1), 3), day(2023, 11, 1));
    }

    #[test]
    fn test_recency_boundary() {
        let today = day(2024, 6, 15);
        assert_eq!(
            recency_verdict("2024-03-15", today, 3),
            RecencyVerdict::Fresh
        );
        assert_eq!(
            recency_verdict("2024-03-14", today, 3),
            RecencyVerdict::Stale
        );
        assert_eq!(
            recency_verdict("2024-13-01", today, 3),
            RecencyVerdict::UnparseableDate
        );
        assert_eq!(recency_verdict("", today, 3), RecencyVerdict::UnparseableDate);
    }

    #[test]
    fn test_future_release_passes() {
        let book = FetchedBook {
            release_date: "2025-01-01".to_string(),
            ..Default::default()
        };
        assert!(passes_recency(&book, day(2024, 6, 15)));
    }

    #[test]
    fn test_due_and_retention_predicates() {
        let today = day(2024, 2, 1);
        assert!(is_released_by("2024-02-01", today));
        assert!(!is_released_by("2024-02-02", today));
        assert!(!is_released_by("", today));

        let threshold = months_before(today, 3);
        assert!(!is_released_after("2023-11-01", threshold));
        assert!(is_released_after("2023-11-02", threshold));
        assert!(!is_released_after("garbage", threshold));
    }

    #[test]
    fn test_timestamp_orders_dates() {
        let a = release_timestamp_millis("2024-01-01").unwrap();
        let b = release_timestamp_millis("2024-01-02").unwrap();
        assert_eq!(b - a, 86_400_000);
        assert_eq!(release_timestamp_millis("TBD"), None);
    }

    proptest! {
        #[test]
        fn unparseable_dates_never_pass(raw in "[^0-9]*") {
            let book = FetchedBook {
                release_date: normalize_date(&raw),
                ..Default::default()
            };
            prop_assert!(!passes_recency(&book, day(2024, 6, 15)));
        }

        #[test]
        fn full_dates_round_trip(y in 1900i32..2100, m in 1u32..=12, d in 1u32..=28) {
            let raw = format!("{:04}年{:02}月{:02}日", y, m, d);
            let normalized = normalize_date(&raw);
            prop_assert_eq!(parse_release_date(&normalized), Some(day(y, m, d)));
        }
    }
}
