//! Unit tests for the BookmarkManager public API.
//!
//! These tests exercise bookmark CRUD, folders, toggling and search through
//! the `BookmarkManagerTrait` interface.

use seabrowser::database::{Database, Store};
use seabrowser::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use seabrowser::types::bookmark::{Bookmark, BOOKMARKS_BAR, DEFAULT_FOLDER};
use seabrowser::types::errors::BookmarkError;

/// Helper: create a BookmarkManager backed by a fresh in-memory database.
fn setup() -> BookmarkManager {
    let db = Database::open_in_memory(Store::Bookmarks).expect("Failed to open in-memory database");
    BookmarkManager::new(db).expect("Failed to create BookmarkManager")
}

/// A bookmark without a folder lands in "Other Bookmarks".
#[test]
fn test_add_without_folder_uses_default_folder() {
    let mut mgr = setup();
    let bm = mgr
        .add_bookmark("Example", "https://example.com", None)
        .expect("add_bookmark failed");

    assert_eq!(bm.folder, DEFAULT_FOLDER);
    assert_eq!(mgr.get_in_folder(DEFAULT_FOLDER).len(), 1);
}

/// A blank folder name is treated as no folder.
#[test]
fn test_blank_folder_normalized() {
    let mut mgr = setup();
    let bm = mgr
        .add_bookmark("Example", "https://example.com", Some("   "))
        .expect("add_bookmark failed");
    assert_eq!(bm.folder, DEFAULT_FOLDER);
}

/// An empty title falls back to the URL.
#[test]
fn test_empty_title_uses_url() {
    let mut mgr = setup();
    let bm = mgr
        .add_bookmark("", "https://untitled.example", None)
        .expect("add_bookmark failed");
    assert_eq!(bm.title, "https://untitled.example");
}

#[test]
fn test_add_rejects_empty_url() {
    let mut mgr = setup();
    let result = mgr.add_bookmark("Nothing", "  ", None);
    assert!(matches!(result, Err(BookmarkError::InvalidUrl(_))));
    assert!(mgr.get_all().is_empty());
}

/// Newest bookmarks come first.
#[test]
fn test_newest_bookmark_first() {
    let mut mgr = setup();
    mgr.add_bookmark("First", "https://first.example", None).expect("add failed");
    mgr.add_bookmark("Second", "https://second.example", None).expect("add failed");

    let all = mgr.get_all();
    assert_eq!(all[0].url, "https://second.example");
    assert_eq!(all[1].url, "https://first.example");
}

/// update_bookmark keeps the id and the date it was added.
#[test]
fn test_update_keeps_id_and_date_added() {
    let mut mgr = setup();
    let bm = mgr
        .add_bookmark("Old", "https://old.example", None)
        .expect("add failed");

    mgr.update_bookmark(&bm.id, "New", "https://new.example", "Work")
        .expect("update failed");

    let updated = mgr.get(&bm.id).expect("bookmark missing");
    assert_eq!(updated.title, "New");
    assert_eq!(updated.url, "https://new.example");
    assert_eq!(updated.folder, "Work");
    assert_eq!(updated.date_added, bm.date_added);
}

#[test]
fn test_update_unknown_id_is_not_found() {
    let mut mgr = setup();
    let result = mgr.update_bookmark("missing", "T", "https://a.com", "Work");
    assert!(matches!(result, Err(BookmarkError::NotFound(_))));
}

/// Deleting removes the bookmark; a second delete reports NotFound.
#[test]
fn test_delete_bookmark() {
    let mut mgr = setup();
    let bm = mgr
        .add_bookmark("Doomed", "https://doomed.example", None)
        .expect("add failed");

    mgr.delete_bookmark(&bm.id).expect("delete failed");
    assert!(mgr.get(&bm.id).is_none());
    assert!(matches!(mgr.delete_bookmark(&bm.id), Err(BookmarkError::NotFound(_))));
}

/// toggle adds when absent and removes every copy when present.
#[test]
fn test_toggle_bookmark_round_trip() {
    let mut mgr = setup();
    let url = "https://toggle.example";

    assert!(mgr.toggle_bookmark(url, "Toggle").expect("toggle failed"));
    assert!(mgr.is_bookmarked(url));

    mgr.add_bookmark("Copy", url, Some("Work")).expect("add failed");
    assert!(!mgr.toggle_bookmark(url, "Toggle").expect("toggle failed"));
    assert!(!mgr.is_bookmarked(url));
    assert!(mgr.find_by_url(url).is_none());
}

/// With no bookmarks the two default folders are offered.
#[test]
fn test_get_folders_defaults_when_empty() {
    let mgr = setup();
    assert_eq!(
        mgr.get_folders(),
        vec![BOOKMARKS_BAR.to_string(), DEFAULT_FOLDER.to_string()]
    );
}

#[test]
fn test_get_folders_distinct() {
    let mut mgr = setup();
    mgr.add_bookmark("A", "https://a.com", Some("Work")).expect("add failed");
    mgr.add_bookmark("B", "https://b.com", Some("Work")).expect("add failed");
    mgr.add_bookmark("C", "https://c.com", Some("Reading")).expect("add failed");

    let folders = mgr.get_folders();
    assert_eq!(folders.len(), 2);
    assert!(folders.contains(&"Work".to_string()));
    assert!(folders.contains(&"Reading".to_string()));
}

/// search is case-insensitive over title and URL.
#[test]
fn test_search_title_and_url() {
    let mut mgr = setup();
    mgr.add_bookmark("Rust Book", "https://doc.rust-lang.org/book", None).expect("add failed");
    mgr.add_bookmark("Crates", "https://crates.io", None).expect("add failed");

    assert_eq!(mgr.search("rust book").len(), 1);
    assert_eq!(mgr.search("CRATES.IO").len(), 1);
    assert!(mgr.search("python").is_empty());
}

/// upsert writes a bookmark with a caller-chosen id.
#[test]
fn test_upsert_inserts_and_replaces() {
    let mut mgr = setup();
    let bm = Bookmark {
        id: "fixed-id".to_string(),
        title: "Fixed".to_string(),
        url: "https://fixed.example".to_string(),
        folder: "Imported".to_string(),
        date_added: 42,
    };
    mgr.upsert(bm.clone()).expect("upsert failed");
    mgr.upsert(Bookmark { title: "Renamed".to_string(), ..bm })
        .expect("upsert failed");

    assert_eq!(mgr.get_all().len(), 1);
    assert_eq!(mgr.get("fixed-id").map(|b| b.title.as_str()), Some("Renamed"));
}

/// Bookmarks survive reopening the database file.
#[test]
fn test_bookmarks_persist_across_reload() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let id = {
        let db = Database::open_in_dir(dir.path(), Store::Bookmarks).expect("open failed");
        let mut mgr = BookmarkManager::new(db).expect("manager failed");
        mgr.add_bookmark("Saved", "https://saved.example", Some("Work"))
            .expect("add failed")
            .id
    };

    let db = Database::open_in_dir(dir.path(), Store::Bookmarks).expect("reopen failed");
    let mgr = BookmarkManager::new(db).expect("manager failed");
    let bm = mgr.get(&id).expect("bookmark not reloaded");
    assert_eq!(bm.url, "https://saved.example");
    assert_eq!(bm.folder, "Work");
}
