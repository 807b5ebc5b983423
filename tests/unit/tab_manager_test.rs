//! Unit tests for the TabManager public API.
//!
//! Covers creation, closing with neighbour activation, reopening closed
//! tabs, keyboard-style navigation, pinning, duplication and zoom.

use rstest::rstest;
use seabrowser::managers::tab_manager::{
    display_title, window_title, TabManager, TabManagerTrait, DEFAULT_ZOOM, MAX_CLOSED_TABS, MAX_ZOOM, MIN_ZOOM,
};
use seabrowser::types::errors::TabError;
use seabrowser::types::tab::CloseOutcome;

/// Helper: manager with `n` tabs, the first one active.
fn setup(n: usize) -> (TabManager, Vec<String>) {
    let mut mgr = TabManager::new();
    let ids = (0..n)
        .map(|i| mgr.create_tab(&format!("https://site{}.example", i), i == 0))
        .collect();
    (mgr, ids)
}

/// The first tab becomes active even when not requested.
#[test]
fn test_first_tab_is_active() {
    let mut mgr = TabManager::new();
    let id = mgr.create_tab("sea://newtab", false);
    assert_eq!(mgr.get_active_tab().map(|t| t.id.clone()), Some(id));
    assert_eq!(mgr.get_active_tab().map(|t| t.title.as_str()), Some("New Tab"));
}

/// Closing the active tab activates its right neighbour.
#[test]
fn test_close_active_activates_right_neighbour() {
    let (mut mgr, ids) = setup(3);
    mgr.switch_tab(&ids[1]).expect("switch failed");

    assert_eq!(mgr.close_tab(&ids[1]).expect("close failed"), CloseOutcome::Closed);
    assert_eq!(mgr.get_active_tab().map(|t| t.id.clone()), Some(ids[2].clone()));
}

/// Closing the last tab in the strip activates the left neighbour.
#[test]
fn test_close_rightmost_activates_left_neighbour() {
    let (mut mgr, ids) = setup(3);
    mgr.switch_tab(&ids[2]).expect("switch failed");

    mgr.close_tab(&ids[2]).expect("close failed");
    assert_eq!(mgr.get_active_tab().map(|t| t.id.clone()), Some(ids[1].clone()));
}

/// Closing a background tab leaves the active tab alone.
#[test]
fn test_close_background_tab_keeps_active() {
    let (mut mgr, ids) = setup(3);
    mgr.close_tab(&ids[2]).expect("close failed");
    assert_eq!(mgr.get_active_tab().map(|t| t.id.clone()), Some(ids[0].clone()));
}

#[test]
fn test_close_last_tab_reports_window_close() {
    let (mut mgr, ids) = setup(1);
    assert_eq!(mgr.close_tab(&ids[0]).expect("close failed"), CloseOutcome::LastTabClosed);
    assert_eq!(mgr.tab_count(), 0);
    assert!(mgr.get_active_tab().is_none());
}

#[test]
fn test_close_unknown_tab_is_not_found() {
    let (mut mgr, _) = setup(1);
    assert!(matches!(mgr.close_tab("nope"), Err(TabError::NotFound(_))));
}

/// Reopen restores the most recent closed tab with its title.
#[test]
fn test_reopen_closed_tab_restores_url_and_title() {
    let (mut mgr, ids) = setup(2);
    mgr.update_tab_title(&ids[1], "Site One").expect("title failed");
    mgr.close_tab(&ids[1]).expect("close failed");

    let reopened = mgr.reopen_closed_tab().expect("reopen failed");
    let tab = mgr.get_tab(&reopened).expect("tab missing");
    assert_eq!(tab.url, "https://site1.example");
    assert_eq!(tab.title, "Site One");
    assert_eq!(mgr.get_active_tab().map(|t| t.id.clone()), Some(reopened));
}

#[test]
fn test_reopen_with_nothing_closed() {
    let (mut mgr, _) = setup(1);
    assert!(matches!(mgr.reopen_closed_tab(), Err(TabError::NothingToReopen)));
}

/// Only the most recent closed tabs are remembered.
#[test]
fn test_closed_tab_history_is_bounded() {
    let (mut mgr, _) = setup(1);
    for i in 0..(MAX_CLOSED_TABS + 5) {
        let id = mgr.create_tab(&format!("https://closed{}.example", i), false);
        mgr.close_tab(&id).expect("close failed");
    }
    assert_eq!(mgr.closed_tab_count(), MAX_CLOSED_TABS);
}

/// next/previous wrap around the strip.
#[test]
fn test_next_and_previous_wrap() {
    let (mut mgr, ids) = setup(3);

    assert_eq!(mgr.previous_tab(), Some(ids[2].clone()));
    assert_eq!(mgr.next_tab(), Some(ids[0].clone()));
    assert_eq!(mgr.next_tab(), Some(ids[1].clone()));
}

#[test]
fn test_select_index_and_last() {
    let (mut mgr, ids) = setup(4);

    assert_eq!(mgr.select_index(2).expect("select failed"), ids[2]);
    assert_eq!(mgr.select_last(), Some(ids[3].clone()));
    assert!(matches!(mgr.select_index(7), Err(TabError::InvalidIndex(7))));
}

#[test]
fn test_navigation_on_empty_manager() {
    let mut mgr = TabManager::new();
    assert!(mgr.next_tab().is_none());
    assert!(mgr.previous_tab().is_none());
    assert!(mgr.select_last().is_none());
}

/// Pinned tabs move to the left; unpinning puts them after the pinned block.
#[test]
fn test_pin_and_unpin_reorder_strip() {
    let (mut mgr, ids) = setup(3);

    mgr.pin_tab(&ids[2]).expect("pin failed");
    let order: Vec<String> = mgr.get_all_tabs().iter().map(|t| t.id.clone()).collect();
    assert_eq!(order, vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);
    assert!(mgr.get_tab(&ids[2]).map(|t| t.pinned).unwrap_or(false));

    mgr.unpin_tab(&ids[2]).expect("unpin failed");
    let order: Vec<String> = mgr.get_all_tabs().iter().map(|t| t.id.clone()).collect();
    assert_eq!(order[0], ids[2]);
    assert!(!mgr.get_tab(&ids[2]).map(|t| t.pinned).unwrap_or(true));
}

/// The duplicate sits right after its source.
#[test]
fn test_duplicate_tab_inserted_after_source() {
    let (mut mgr, ids) = setup(3);
    let dup = mgr.duplicate_tab(&ids[0]).expect("duplicate failed");

    let order: Vec<String> = mgr.get_all_tabs().iter().map(|t| t.id.clone()).collect();
    assert_eq!(order[1], dup);
    assert_eq!(mgr.get_tab(&dup).map(|t| t.url.clone()), Some("https://site0.example".to_string()));
}

#[test]
fn test_reorder_tab_bounds() {
    let (mut mgr, ids) = setup(3);
    mgr.reorder_tab(&ids[0], 2).expect("reorder failed");
    let order: Vec<String> = mgr.get_all_tabs().iter().map(|t| t.id.clone()).collect();
    assert_eq!(order[2], ids[0]);
    assert!(matches!(mgr.reorder_tab(&ids[0], 3), Err(TabError::InvalidIndex(3))));
}

/// Zoom steps are clamped to the supported range.
#[test]
fn test_zoom_is_clamped() {
    let (mut mgr, ids) = setup(1);
    let id = &ids[0];

    let z = mgr.zoom_in(id).expect("zoom failed");
    assert!((z - (DEFAULT_ZOOM + 0.1)).abs() < 1e-9);

    for _ in 0..100 {
        mgr.zoom_in(id).expect("zoom failed");
    }
    assert!((mgr.get_tab(id).map(|t| t.zoom_level).unwrap_or(0.0) - MAX_ZOOM).abs() < 1e-9);

    for _ in 0..100 {
        mgr.zoom_out(id).expect("zoom failed");
    }
    assert!((mgr.get_tab(id).map(|t| t.zoom_level).unwrap_or(0.0) - MIN_ZOOM).abs() < 1e-9);

    assert_eq!(mgr.zoom_reset(id).expect("reset failed"), DEFAULT_ZOOM);
}

#[rstest]
#[case("", "New Tab")]
#[case("  Short  ", "Short")]
#[case("Exactly twenty chars", "Exactly twenty chars")]
#[case("A title that is far too long", "A title that is f...")]
fn test_display_title(#[case] title: &str, #[case] expected: &str) {
    assert_eq!(display_title(title), expected);
}

#[rstest]
#[case("Example Domain", "Example Domain - Sea Browser")]
#[case("   ", "Sea Browser")]
fn test_window_title(#[case] page: &str, #[case] expected: &str) {
    assert_eq!(window_title(page, "Sea Browser"), expected);
}
