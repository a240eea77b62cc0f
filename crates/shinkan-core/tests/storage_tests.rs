//! Persistence tests against real backends

mod common;

use std::fs;
use std::sync::Arc;

use common::*;
use shinkan_core::{
    BookSize, FileStorage, KeyValueStorage, Library, LifecycleState, Reconciler,
};

fn file_storage(dir: &std::path::Path) -> Arc<dyn KeyValueStorage> {
    Arc::new(FileStorage::new(dir))
}

#[test]
fn test_library_survives_reopen_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_storage(dir.path());

    {
        let mut library = Library::open(storage.clone());
        library
            .keywords
            .add(Some("ダンジョン飯"), None, BookSize::Comic)
            .unwrap();
        library
            .wishlist
            .add(tracked(5, "978-5", "2024-06-01"))
            .unwrap();
        library.stateful.replace(vec![
            tracked(1, "978-1", "2024-06-01").with_state(Some(LifecycleState::Pending)),
        ]);
        library.stateful.save().unwrap();
    }

    let library = Library::open(file_storage(dir.path()));
    assert_eq!(library.keywords.filters()[0].title.as_deref(), Some("ダンジョン飯"));
    assert_eq!(library.wishlist.books()[0].id, 5);
    assert_eq!(
        library.stateful.items()[0].state,
        Some(LifecycleState::Pending)
    );
    assert!(dir.path().join("keyword.json").exists());
    assert!(dir.path().join("stateful-books.json").exists());
}

#[test]
fn test_persisted_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = Library::open(file_storage(dir.path()));
    let mut book = tracked(1, "978-1", "2024-06-01").with_state(Some(LifecycleState::Ordered));
    book.cover_image_url = "https://img.test/1.jpg".to_string();
    library.stateful.replace(vec![book]);
    library.stateful.save().unwrap();

    let raw = fs::read_to_string(dir.path().join("stateful-books.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value[0];
    assert_eq!(record["id"], 1);
    assert_eq!(record["date"], "2024-06-01");
    assert_eq!(record["imageUrl"], "https://img.test/1.jpg");
    assert_eq!(record["state"], "ordered");
    assert!(record.get("itemUrl").is_some());
}

#[test]
fn test_malformed_file_loads_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("new-books.json"), "{ not json").unwrap();
    fs::write(
        dir.path().join("stateful-books.json"),
        r#"[{"id":1,"title":"x","state":"lost"}]"#,
    )
    .unwrap();

    let mut library = Library::open(file_storage(dir.path()));
    assert!(library.new_arrivals.books().is_empty());
    assert!(library.stateful.is_empty());

    Reconciler::default()
        .reconcile(&mut library, true, day(2024, 6, 1))
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("stateful-books.json")).unwrap();
    assert_eq!(raw.trim(), "[]");
}

#[test]
fn test_records_written_by_older_versions_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bookShelf.json"),
        r#"[{"id":3,"title":"旧","date":"2023-01-01","state":"bought"}]"#,
    )
    .unwrap();

    let library = Library::open(file_storage(dir.path()));
    let book = &library.bookshelf.items()[0];
    assert_eq!(book.id, 3);
    assert_eq!(book.isbn, "");
    assert_eq!(book.state, Some(LifecycleState::Bought));
}

#[cfg(feature = "sqlite")]
#[test]
fn test_library_on_sqlite() {
    use shinkan_core::SqliteStorage;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shinkan.db");

    {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(SqliteStorage::open(&path).unwrap());
        let mut library = Library::open(storage);
        library.keywords.add(None, Some("著者"), BookSize::Bunko).unwrap();
    }

    let storage: Arc<dyn KeyValueStorage> = Arc::new(SqliteStorage::open(&path).unwrap());
    let library = Library::open(storage);
    assert_eq!(library.keywords.filters()[0].size, BookSize::Bunko);
}
