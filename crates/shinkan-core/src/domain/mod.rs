//! Domain records for shinkan
//!
//! - `FetchedBook`: a catalog hit after normalization, before it has an id
//! - `TrackedBook`: a persisted book with a stable id and lifecycle state
//! - `KeywordFilter`: a user-authored search criterion
//!
//! Field names on the wire match the persisted collections
//! (`salesDate`, `itemUrl`, `imageUrl`, `date`, `state`, `size`).

pub mod book;
pub mod keyword;

pub use book::{BookSize, FetchedBook, LifecycleState, TrackedBook};
pub use keyword::KeywordFilter;
