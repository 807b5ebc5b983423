//! Property-based tests for History Manager operations.
//!
//! Every web visit is stored as its own row, internal pages never are, and
//! deleting a URL removes all of its rows.

use proptest::prelude::*;
use seabrowser::database::{Database, Store};
use seabrowser::managers::history_manager::{HistoryManager, HistoryManagerTrait};

/// Strategy for generating web URLs.
fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,15}",
        prop_oneof![Just(".com"), Just(".org"), Just(".net"), Just(".io")],
        proptest::option::of("/[a-z0-9]{1,10}"),
    )
        .prop_map(|(scheme, host, tld, path)| {
            format!("{}://{}{}{}", scheme, host, tld, path.unwrap_or_default())
        })
}

/// Strategy for internal page URLs, which are never recorded.
fn arb_internal_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("sea"), Just("tsunami")],
        prop_oneof![Just("newtab"), Just("settings"), Just("history"), Just("setup")],
    )
        .prop_map(|(scheme, page)| format!("{}://{}", scheme, page))
}

/// Strategy for non-empty titles made of plain words.
fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{1,30}"
}

fn setup() -> HistoryManager {
    let db = Database::open_in_memory(Store::History).expect("Failed to open in-memory database");
    HistoryManager::new(db)
}

// Row count equals the number of web visits, whatever internal pages are
// mixed in.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn history_counts_only_web_visits(
        visits in prop::collection::vec((arb_url(), arb_title()), 0..25),
        internal in prop::collection::vec(arb_internal_url(), 0..10),
    ) {
        let manager = setup();
        for (url, title) in &visits {
            manager.add_visit(url, title).expect("add_visit failed");
        }
        for url in &internal {
            manager.add_visit(url, "Internal").expect("add_visit failed");
        }

        prop_assert_eq!(manager.count().expect("count failed"), visits.len());
        let recent = manager.get_recent(1000).expect("get_recent failed");
        prop_assert!(recent
            .iter()
            .all(|item| !item.url.starts_with("sea://") && !item.url.starts_with("tsunami://")));
    }
}

// A recorded visit is found again by searching for its title.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn history_record_then_search_returns_result(url in arb_url(), title in arb_title()) {
        let manager = setup();
        manager.add_visit(&url, &title).expect("add_visit failed");

        let results = manager.search(&title, 100).expect("search failed");
        prop_assert!(
            results.iter().any(|item| item.url == url && item.title == title),
            "Visit to {} titled {:?} not found by search",
            url,
            title
        );
    }
}

// Deleting a URL removes every visit to it and nothing else.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn history_delete_removes_all_visits_to_url(
        target in arb_url(),
        repeats in 1usize..6,
        others in prop::collection::vec(arb_url(), 0..10),
    ) {
        let manager = setup();
        for _ in 0..repeats {
            manager.add_visit(&target, "Target").expect("add_visit failed");
        }
        let others: Vec<String> = others.into_iter().filter(|u| *u != target).collect();
        for url in &others {
            manager.add_visit(url, "Other").expect("add_visit failed");
        }

        let removed = manager.delete_history_item(&target).expect("delete failed");
        prop_assert_eq!(removed, repeats);
        prop_assert_eq!(manager.count().expect("count failed"), others.len());

        let remaining = manager.get_recent(1000).expect("get_recent failed");
        prop_assert!(remaining.iter().all(|item| item.url != target));
    }
}
