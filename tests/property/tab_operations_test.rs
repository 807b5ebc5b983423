//! Property-based tests for Tab Manager operations.
//!
//! For any sequence of tab operations the tab count is tracked exactly, an
//! open strip always has an active tab, and zoom stays within its bounds.

use proptest::prelude::*;
use seabrowser::managers::tab_manager::{TabManager, TabManagerTrait, MAX_ZOOM, MIN_ZOOM};
use seabrowser::types::tab::CloseOutcome;

/// Operations that can be performed on the TabManager.
#[derive(Debug, Clone)]
enum TabOp {
    Create,
    Close(usize), // index into the current tab order
    Switch(usize),
    Next,
    Reopen,
    ZoomIn,
    ZoomOut,
}

/// Strategy for generating a sequence of tab operations.
/// Biased toward creates so the strip has something to work with.
fn arb_tab_ops() -> impl Strategy<Value = Vec<TabOp>> {
    prop::collection::vec(
        prop_oneof![
            4 => Just(TabOp::Create),
            3 => (0..20usize).prop_map(TabOp::Close),
            2 => (0..20usize).prop_map(TabOp::Switch),
            1 => Just(TabOp::Next),
            1 => Just(TabOp::Reopen),
            2 => Just(TabOp::ZoomIn),
            2 => Just(TabOp::ZoomOut),
        ],
        1..60,
    )
}

fn pick(manager: &TabManager, idx: usize) -> Option<String> {
    let tabs = manager.get_all_tabs();
    if tabs.is_empty() {
        None
    } else {
        Some(tabs[idx % tabs.len()].id.clone())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn tab_operations_keep_invariants(ops in arb_tab_ops()) {
        let mut manager = TabManager::new();
        let mut expected_count: usize = 0;

        for op in &ops {
            match op {
                TabOp::Create => {
                    manager.create_tab("sea://newtab", true);
                    expected_count += 1;
                }
                TabOp::Close(idx) => {
                    if let Some(id) = pick(&manager, *idx) {
                        let outcome = manager.close_tab(&id).expect("close failed");
                        expected_count -= 1;
                        prop_assert_eq!(outcome == CloseOutcome::LastTabClosed, expected_count == 0);
                    }
                }
                TabOp::Switch(idx) => {
                    if let Some(id) = pick(&manager, *idx) {
                        manager.switch_tab(&id).expect("switch failed");
                        prop_assert_eq!(manager.get_active_tab().map(|t| t.id.clone()), Some(id));
                    }
                }
                TabOp::Next => {
                    let switched = manager.next_tab();
                    prop_assert_eq!(switched.is_some(), expected_count > 0);
                }
                TabOp::Reopen => {
                    if manager.reopen_closed_tab().is_ok() {
                        expected_count += 1;
                    }
                }
                TabOp::ZoomIn | TabOp::ZoomOut => {
                    if let Some(id) = manager.get_active_tab().map(|t| t.id.clone()) {
                        let level = if matches!(op, TabOp::ZoomIn) {
                            manager.zoom_in(&id)
                        } else {
                            manager.zoom_out(&id)
                        }
                        .expect("zoom failed");
                        prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&level));
                    }
                }
            }

            prop_assert_eq!(
                manager.tab_count(),
                expected_count,
                "After {:?}, expected {} tabs but got {}",
                op,
                expected_count,
                manager.tab_count()
            );
            prop_assert_eq!(manager.get_all_tabs().len(), expected_count);
            prop_assert_eq!(
                manager.get_active_tab().is_some(),
                expected_count > 0,
                "Active tab must exist exactly when tabs are open"
            );
        }
    }
}

// Zoom never leaves [MIN_ZOOM, MAX_ZOOM] however many steps are taken.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn zoom_stays_in_bounds(steps in prop::collection::vec(any::<bool>(), 1..120)) {
        let mut manager = TabManager::new();
        let id = manager.create_tab("https://example.com", true);

        for zoom_in in steps {
            let level = if zoom_in {
                manager.zoom_in(&id)
            } else {
                manager.zoom_out(&id)
            }
            .expect("zoom failed");
            prop_assert!(level >= MIN_ZOOM && level <= MAX_ZOOM, "zoom {} out of bounds", level);
        }
    }
}
