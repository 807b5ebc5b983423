use serde::{Deserialize, Serialize};

/// Represents a browser tab with its current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub url: String,
    pub title: String,
    pub pinned: bool,
    pub loading: bool,
    pub zoom_level: f64,
    pub created_at: i64,
}

/// A tab remembered after it was closed, for Ctrl+Shift+T.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTab {
    pub url: String,
    pub title: String,
}

/// Result of closing a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Other tabs remain open.
    Closed,
    /// The closed tab was the last one; the window should close.
    LastTabClosed,
}
