use serde::{Deserialize, Serialize};

/// Folder used when a bookmark is saved without one.
pub const DEFAULT_FOLDER: &str = "Other Bookmarks";

/// Folder shown first in the bookmarks UI.
pub const BOOKMARKS_BAR: &str = "Bookmarks Bar";

/// Represents a saved bookmark.
///
/// `folder` is a plain label; there is no folder table behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub folder: String,
    pub date_added: i64,
}
