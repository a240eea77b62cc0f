//! The user's persisted book collections
//!
//! | key              | contents                                        |
//! |------------------|-------------------------------------------------|
//! | `new-books`      | every fresh catalog hit ever accepted           |
//! | `stateful-books` | reconciled view carrying lifecycle state        |
//! | `bookShelf`      | append-only record of books that reached bought |
//! | `wishlist`       | books the user wants to remember                |
//! | `keyword`        | the keyword filters fetched against             |

use std::sync::Arc;

use thiserror::Error;

use crate::deduplication::is_duplicate;
use crate::domain::{BookSize, FetchedBook, KeywordFilter, LifecycleState, TrackedBook};
use crate::storage::{KeyValueStorage, PersistedCollection, StorageError};

pub const NEW_ARRIVALS_KEY: &str = "new-books";
pub const STATEFUL_BOOKS_KEY: &str = "stateful-books";
pub const BOOKSHELF_KEY: &str = "bookShelf";
pub const WISHLIST_KEY: &str = "wishlist";
pub const KEYWORDS_KEY: &str = "keyword";

/// A persisted list of tracked books
pub type BookCollection = PersistedCollection<TrackedBook>;

/// Result of offering one record to a deduplicating collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Appended under this id
    Inserted { id: u64 },
    /// Already present; nothing written
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Errors from user-driven lifecycle changes
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Book not found: {0}")]
    NotFound(u64),

    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: Option<LifecycleState>,
        to: Option<LifecycleState>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn next_id<I: IntoIterator<Item = u64>>(ids: I) -> u64 {
    ids.into_iter().max().map_or(1, |max| max + 1)
}

/// New-arrivals accumulator.
///
/// Ids are `max(existing) + 1`, so they stay unique and increasing as long as
/// this is the only writer.
#[derive(Debug)]
pub struct NewArrivals {
    books: BookCollection,
}

impl NewArrivals {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            books: PersistedCollection::open(storage, NEW_ARRIVALS_KEY),
        }
    }

    pub fn books(&self) -> &[TrackedBook] {
        self.books.items()
    }

    /// Id the next accepted record will get
    pub fn next_id(&self) -> u64 {
        next_id(self.books.iter().map(|b| b.id))
    }

    /// Append every candidate that is not already present.
    ///
    /// Each accepted record is persisted on its own before the next candidate
    /// is checked, so a batch can also dedup against itself. The collection
    /// is reloaded from storage once the batch is done, or as soon as a save
    /// fails, so an unsaved record never keeps its id.
    pub fn add_new<I>(&mut self, candidates: I) -> Result<Vec<InsertOutcome>, StorageError>
    where
        I: IntoIterator<Item = FetchedBook>,
    {
        let mut outcomes = Vec::new();

        for candidate in candidates {
            if is_duplicate(&candidate, self.books.items()) {
                tracing::debug!("Skipping duplicate {:?} ({})", candidate.title, candidate.isbn);
                outcomes.push(InsertOutcome::Duplicate);
                continue;
            }

            let id = self.next_id();
            self.books
                .items_mut()
                .push(TrackedBook::from_fetched(id, candidate));
            self.books.commit()?;
            outcomes.push(InsertOutcome::Inserted { id });
        }

        self.books.load();
        Ok(outcomes)
    }

    pub fn load(&mut self) -> &[TrackedBook] {
        self.books.load()
    }
}

/// The wishlist. Records keep the id they were given in new arrivals.
#[derive(Debug)]
pub struct Wishlist {
    books: BookCollection,
}

impl Wishlist {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            books: PersistedCollection::open(storage, WISHLIST_KEY),
        }
    }

    pub fn books(&self) -> &[TrackedBook] {
        self.books.items()
    }

    /// Add a book unless the wishlist already has it.
    pub fn add(&mut self, book: TrackedBook) -> Result<InsertOutcome, StorageError> {
        if is_duplicate(&book, self.books.items()) {
            return Ok(InsertOutcome::Duplicate);
        }

        let id = book.id;
        self.books.items_mut().push(book);
        self.books.commit()?;
        Ok(InsertOutcome::Inserted { id })
    }

    /// Remove the book with `id`, returning it if it was present.
    pub fn remove(&mut self, id: u64) -> Result<Option<TrackedBook>, StorageError> {
        let Some(pos) = self.books.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let removed = self.books.items_mut().remove(pos);
        self.books.commit()?;
        Ok(Some(removed))
    }

    pub fn load(&mut self) -> &[TrackedBook] {
        self.books.load()
    }
}

/// The list of keyword filters
#[derive(Debug)]
pub struct KeywordList {
    filters: PersistedCollection<KeywordFilter>,
}

impl KeywordList {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            filters: PersistedCollection::open(storage, KEYWORDS_KEY),
        }
    }

    pub fn filters(&self) -> &[KeywordFilter] {
        self.filters.items()
    }

    /// Append a new filter with the next free id.
    pub fn add(
        &mut self,
        title: Option<&str>,
        author: Option<&str>,
        size: BookSize,
    ) -> Result<KeywordFilter, StorageError> {
        let id = next_id(self.filters.iter().map(|f| f.id));
        let filter = KeywordFilter::new(id, title, author, size);
        self.filters.items_mut().push(filter.clone());
        self.filters.commit()?;
        Ok(filter)
    }

    /// Remove the filter with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: u64) -> Result<bool, StorageError> {
        let before = self.filters.len();
        self.filters.items_mut().retain(|f| f.id != id);
        if self.filters.len() == before {
            return Ok(false);
        }
        self.filters.commit()?;
        Ok(true)
    }

    pub fn load(&mut self) -> &[KeywordFilter] {
        self.filters.load()
    }
}

/// All collections, sharing one storage backend.
///
/// Owned by the caller and handed to the fetcher and reconciler explicitly.
#[derive(Debug)]
pub struct Library {
    pub new_arrivals: NewArrivals,
    pub stateful: BookCollection,
    pub bookshelf: BookCollection,
    pub wishlist: Wishlist,
    pub keywords: KeywordList,
}

impl Library {
    /// Open every collection, loading what is stored.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            new_arrivals: NewArrivals::open(storage.clone()),
            stateful: PersistedCollection::open(storage.clone(), STATEFUL_BOOKS_KEY),
            bookshelf: PersistedCollection::open(storage.clone(), BOOKSHELF_KEY),
            wishlist: Wishlist::open(storage.clone()),
            keywords: KeywordList::open(storage),
        }
    }

    /// Reload every collection from storage.
    pub fn reload(&mut self) {
        self.new_arrivals.load();
        self.stateful.load();
        self.bookshelf.load();
        self.wishlist.load();
        self.keywords.load();
    }

    /// Apply a user-driven lifecycle change to a tracked book and persist it.
    ///
    /// The engine itself only ever moves `ordered` to `bought`, during
    /// reconciliation.
    pub fn set_state(
        &mut self,
        id: u64,
        state: Option<LifecycleState>,
    ) -> Result<(), LifecycleError> {
        let book = self
            .stateful
            .items_mut()
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LifecycleError::NotFound(id))?;

        if !LifecycleState::can_transition(book.state, state) {
            return Err(LifecycleError::InvalidTransition {
                from: book.state,
                to: state,
            });
        }

        book.state = state;
        self.stateful.commit()?;
        Ok(())
    }
}
