use serde::{Deserialize, Serialize};

/// A single recorded page visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryItem {
    pub id: i64,
    pub url: String,
    pub title: String,
    /// Visit time in UNIX seconds.
    pub timestamp: i64,
}
