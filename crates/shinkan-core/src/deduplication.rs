//! Duplicate detection for book records
//!
//! Two records are the same book when the candidate has an ISBN and it equals
//! the other record's ISBN. Without a candidate ISBN, title, author, and
//! normalized release date must all match exactly.

use crate::domain::{FetchedBook, TrackedBook};

/// The fields duplicate detection looks at
pub trait BookIdentity {
    fn isbn(&self) -> &str;
    fn title(&self) -> &str;
    fn author(&self) -> &str;
    /// Normalized `YYYY-MM-DD` release date, possibly empty
    fn release_date(&self) -> &str;
}

impl BookIdentity for FetchedBook {
    fn isbn(&self) -> &str {
        &self.isbn
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> &str {
        &self.author
    }
    fn release_date(&self) -> &str {
        &self.release_date
    }
}

impl BookIdentity for TrackedBook {
    fn isbn(&self) -> &str {
        &self.isbn
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> &str {
        &self.author
    }
    fn release_date(&self) -> &str {
        &self.release_date
    }
}

/// Check if `candidate` and `existing` describe the same book.
///
/// Not symmetric: only the candidate's ISBN decides which rule applies.
pub fn is_same_book<C, E>(candidate: &C, existing: &E) -> bool
where
    C: BookIdentity + ?Sized,
    E: BookIdentity + ?Sized,
{
    if !candidate.isbn().is_empty() {
        return candidate.isbn() == existing.isbn();
    }

    candidate.title() == existing.title()
        && candidate.author() == existing.author()
        && candidate.release_date() == existing.release_date()
}

/// First record in `collection` that `candidate` duplicates
pub fn find_duplicate<'a, C, E>(candidate: &C, collection: &'a [E]) -> Option<&'a E>
where
    C: BookIdentity + ?Sized,
    E: BookIdentity,
{
    collection
        .iter()
        .find(|existing| is_same_book(candidate, *existing))
}

/// Check if `candidate` already exists in `collection`
pub fn is_duplicate<C, E>(candidate: &C, collection: &[E]) -> bool
where
    C: BookIdentity + ?Sized,
    E: BookIdentity,
{
    find_duplicate(candidate, collection).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fetched(isbn: &str, title: &str, author: &str, date: &str) -> FetchedBook {
        FetchedBook {
            title: title.to_string(),
            author: author.to_string(),
            release_date: date.to_string(),
            isbn: isbn.to_string(),
            ..Default::default()
        }
    }

    fn tracked(id: u64, isbn: &str, title: &str, author: &str, date: &str) -> TrackedBook {
        TrackedBook::from_fetched(id, fetched(isbn, title, author, date))
    }

    #[test]
    fn test_isbn_match_ignores_other_fields() {
        let existing = vec![tracked(1, "978-1", "Old Title", "Someone", "2024-01-01")];
        let candidate = fetched("978-1", "New Title", "Someone Else", "2024-05-01");
        assert!(is_duplicate(&candidate, &existing));
    }

    #[test]
    fn test_isbn_mismatch_ignores_matching_fields() {
        let existing = vec![tracked(1, "978-1", "Same", "Same", "2024-01-01")];
        let candidate = fetched("978-2", "Same", "Same", "2024-01-01");
        assert!(!is_duplicate(&candidate, &existing));
    }

    #[test]
    fn test_empty_isbn_requires_all_fields() {
        let existing = vec![tracked(1, "", "Title", "Author", "2024-01-01")];

        assert!(is_duplicate(
            &fetched("", "Title", "Author", "2024-01-01"),
            &existing
        ));
        assert!(!is_duplicate(
            &fetched("", "Title", "Author", "2024-01-02"),
            &existing
        ));
        assert!(!is_duplicate(
            &fetched("", "Title", "Other", "2024-01-01"),
            &existing
        ));
    }

    #[test]
    fn test_empty_candidate_isbn_can_match_record_with_isbn() {
        let existing = vec![tracked(1, "978-1", "Title", "Author", "2024-01-01")];
        assert!(is_duplicate(
            &fetched("", "Title", "Author", "2024-01-01"),
            &existing
        ));
    }

    #[test]
    fn test_find_duplicate_returns_first_match() {
        let existing = vec![
            tracked(1, "978-9", "A", "A", "2024-01-01"),
            tracked(2, "978-1", "B", "B", "2024-01-01"),
            tracked(3, "978-1", "C", "C", "2024-01-01"),
        ];
        let found = find_duplicate(&fetched("978-1", "", "", ""), &existing).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn test_empty_collection() {
        let existing: Vec<TrackedBook> = Vec::new();
        assert!(!is_duplicate(&fetched("978-1", "A", "B", ""), &existing));
    }

    proptest! {
        #[test]
        fn isbn_decides_when_present(
            isbn in "[0-9]{13}",
            title_a in "\\PC{0,12}",
            title_b in "\\PC{0,12}",
        ) {
            let existing = vec![tracked(1, &isbn, &title_a, "x", "2024-01-01")];
            let candidate = fetched(&isbn, &title_b, "y", "2023-01-01");
            prop_assert!(is_duplicate(&candidate, &existing));
        }

        #[test]
        fn a_record_duplicates_itself(
            isbn in "([0-9]{13})?",
            title in "\\PC{0,12}",
            author in "\\PC{0,12}",
        ) {
            let record = tracked(1, &isbn, &title, &author, "2024-01-01");
            prop_assert!(is_same_book(&record, &record));
        }
    }
}
