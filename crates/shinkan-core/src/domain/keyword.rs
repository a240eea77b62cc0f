//! Keyword filters

use serde::{Deserialize, Serialize};

use super::BookSize;

/// A user-authored catalog search criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFilter {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Category code the search is restricted to
    #[serde(default)]
    pub size: BookSize,
}

impl KeywordFilter {
    pub fn new(id: u64, title: Option<&str>, author: Option<&str>, size: BookSize) -> Self {
        Self {
            id,
            title: title.map(str::to_string),
            author: author.map(str::to_string),
            size,
        }
    }

    /// Title term, if present and non-blank
    pub fn title_term(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Author term, if present and non-blank
    pub fn author_term(&self) -> Option<&str> {
        non_blank(self.author.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
