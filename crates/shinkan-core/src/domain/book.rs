//! Book records and lifecycle state
//!
//! Lifecycle transitions:
//! ```text
//! (none) → Pending → Ordered → Bought
//!    └──────────────↗
//! ```
//! Only `Ordered → Bought` is driven by the engine (release date reached);
//! the rest are user actions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_release_date;

/// Where a tracked book is in the user's purchase lifecycle.
///
/// Absence of a state (`None` / JSON `null`) means "not tracked yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Marked for later consideration
    Pending,
    /// Pre-ordered, waiting for the release date
    Ordered,
    /// Owned
    Bought,
}

impl LifecycleState {
    /// Check if moving from `from` to `to` is a valid transition.
    ///
    /// Setting the same state again is a no-op and always allowed.
    pub fn can_transition(from: Option<LifecycleState>, to: Option<LifecycleState>) -> bool {
        use LifecycleState::*;

        if from == to {
            return true;
        }

        match (from, to) {
            (None, Some(Pending)) => true,
            (None | Some(Pending), Some(Ordered)) => true,
            (Some(Ordered), Some(Bought)) => true,
            // Dropping a mark the user set, before the book is owned
            (Some(Pending | Ordered), None) => true,
            _ => false,
        }
    }

    /// Lowercase name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Ordered => "ordered",
            LifecycleState::Bought => "bought",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog category code sent as the `size` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BookSize {
    /// All categories
    #[default]
    All,
    /// 単行本
    Tankobon,
    /// 文庫
    Bunko,
    /// 新書
    Shinsho,
    /// コミック
    Comic,
}

impl BookSize {
    /// Numeric code used by the catalog
    pub fn code(&self) -> u8 {
        match self {
            BookSize::All => 0,
            BookSize::Tankobon => 1,
            BookSize::Bunko => 2,
            BookSize::Shinsho => 3,
            BookSize::Comic => 9,
        }
    }

    pub fn all() -> [BookSize; 5] {
        [
            BookSize::All,
            BookSize::Tankobon,
            BookSize::Bunko,
            BookSize::Shinsho,
            BookSize::Comic,
        ]
    }
}

impl From<BookSize> for u8 {
    fn from(size: BookSize) -> Self {
        size.code()
    }
}

impl TryFrom<u8> for BookSize {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        BookSize::all()
            .into_iter()
            .find(|size| size.code() == code)
            .ok_or_else(|| format!("unsupported catalog category code: {}", code))
    }
}

/// A catalog search hit, normalized but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Free-form sales date as the catalog returned it, e.g. `2024年03月15日頃`
    #[serde(default)]
    pub sales_date: String,
    /// `YYYY-MM-DD`, or empty when the sales date could not be normalized
    #[serde(rename = "date", default)]
    pub release_date: String,
    #[serde(rename = "imageUrl", default)]
    pub cover_image_url: String,
    #[serde(rename = "itemUrl", default)]
    pub detail_url: String,
    /// ISBN, or empty when the catalog has none
    #[serde(default)]
    pub isbn: String,
    /// Category of the keyword filter that found this book
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<BookSize>,
}

/// A persisted book with a stable id and lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedBook {
    /// Assigned on first insertion into new arrivals; stable everywhere after
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub sales_date: String,
    #[serde(rename = "date", default)]
    pub release_date: String,
    #[serde(rename = "imageUrl", default)]
    pub cover_image_url: String,
    #[serde(rename = "itemUrl", default)]
    pub detail_url: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<BookSize>,
    #[serde(default)]
    pub state: Option<LifecycleState>,
}

impl TrackedBook {
    /// Give a fetched book an id; it starts untracked.
    pub fn from_fetched(id: u64, book: FetchedBook) -> Self {
        Self {
            id,
            title: book.title,
            author: book.author,
            sales_date: book.sales_date,
            release_date: book.release_date,
            cover_image_url: book.cover_image_url,
            detail_url: book.detail_url,
            isbn: book.isbn,
            size: book.size,
            state: None,
        }
    }

    /// Parsed release date, if the stored one is a valid calendar date
    pub fn release_day(&self) -> Option<NaiveDate> {
        parse_release_date(&self.release_date)
    }

    pub fn with_state(mut self, state: Option<LifecycleState>) -> Self {
        self.state = state;
        self
    }
}
