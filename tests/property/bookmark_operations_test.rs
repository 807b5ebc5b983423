//! Property-based tests for Bookmark Manager operations.
//!
//! Adds and deletes keep the cache and the database in step, and toggling a
//! URL twice leaves the bookmark set as it was.

use std::collections::HashSet;

use proptest::prelude::*;
use seabrowser::database::{Database, Store};
use seabrowser::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use tempfile::TempDir;

/// Strategy for generating bookmark URLs.
fn arb_url() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9]{2,12}",
        prop_oneof![Just(".com"), Just(".org"), Just(".dev")],
        proptest::option::of("/[a-z0-9]{1,8}"),
    )
        .prop_map(|(host, tld, path)| format!("https://{}{}{}", host, tld, path.unwrap_or_default()))
}

fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{0,20}"
}

fn arb_folder() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just("Bookmarks Bar".to_string()),
        Just("Work".to_string()),
        Just("Reading".to_string()),
    ])
}

fn setup() -> BookmarkManager {
    let db = Database::open_in_memory(Store::Bookmarks).expect("Failed to open in-memory database");
    BookmarkManager::new(db).expect("Failed to create BookmarkManager")
}

// After any mix of adds and deletes the bookmark count is adds minus deletes,
// and the same set comes back when the store is reopened.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn bookmark_add_delete_consistency(
        entries in prop::collection::vec((arb_url(), arb_title(), arb_folder()), 1..15),
        delete_mask in prop::collection::vec(any::<bool>(), 15),
    ) {
        let dir = TempDir::new().expect("tempdir failed");
        let mut manager = BookmarkManager::new(
            Database::open_in_dir(dir.path(), Store::Bookmarks).expect("open failed"),
        )
        .expect("Failed to create BookmarkManager");

        let mut ids = Vec::new();
        for (url, title, folder) in &entries {
            let bm = manager.add_bookmark(title, url, folder.as_deref()).expect("add failed");
            ids.push(bm.id);
        }

        let mut kept: HashSet<String> = HashSet::new();
        for (id, delete) in ids.iter().zip(delete_mask.iter()) {
            if *delete {
                manager.delete_bookmark(id).expect("delete failed");
            } else {
                kept.insert(id.clone());
            }
        }

        prop_assert_eq!(manager.get_all().len(), kept.len());
        for id in &ids {
            prop_assert_eq!(manager.get(id).is_some(), kept.contains(id));
        }

        drop(manager);
        let reopened = BookmarkManager::new(
            Database::open_in_dir(dir.path(), Store::Bookmarks).expect("reopen failed"),
        )
        .expect("Failed to reload BookmarkManager");
        let reloaded: HashSet<String> = reopened.get_all().iter().map(|b| b.id.clone()).collect();
        prop_assert_eq!(reloaded, kept);
    }
}

// Toggling the same URL twice restores the previous bookmarked state.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn bookmark_toggle_twice_is_identity(
        url in arb_url(),
        title in arb_title(),
        others in prop::collection::vec(arb_url(), 0..5),
        pre_bookmarked in any::<bool>(),
    ) {
        let mut manager = setup();
        for other in others.iter().filter(|u| **u != url) {
            manager.add_bookmark("Other", other, None).expect("add failed");
        }
        if pre_bookmarked {
            manager.add_bookmark(&title, &url, None).expect("add failed");
        }
        let before = manager.is_bookmarked(&url);
        let count_before = manager.get_all().len();

        let first = manager.toggle_bookmark(&url, &title).expect("toggle failed");
        prop_assert_eq!(first, !before);
        let second = manager.toggle_bookmark(&url, &title).expect("toggle failed");
        prop_assert_eq!(second, before);

        prop_assert_eq!(manager.is_bookmarked(&url), before);
        prop_assert_eq!(manager.get_all().len(), count_before);
    }
}

// Search finds every bookmark whose title contains the query.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn bookmark_search_finds_title(url in arb_url(), title in "[a-zA-Z]{3,15}") {
        let mut manager = setup();
        let bm = manager.add_bookmark(&title, &url, None).expect("add failed");

        let query = title.to_lowercase();
        let found = manager.search(&query);
        prop_assert!(found.iter().any(|b| b.id == bm.id));
    }
}
