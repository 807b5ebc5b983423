//! Bookmark Manager for Sea Browser.
//!
//! Implements `BookmarkManagerTrait`: CRUD over `bookmarks.db` mirrored into an
//! in-memory list kept newest-first. Queries are answered from the cache.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::types::bookmark::{Bookmark, BOOKMARKS_BAR, DEFAULT_FOLDER};
use crate::types::errors::BookmarkError;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn load(&mut self) -> Result<(), BookmarkError>;
    fn add_bookmark(&mut self, title: &str, url: &str, folder: Option<&str>) -> Result<Bookmark, BookmarkError>;
    fn upsert(&mut self, bookmark: Bookmark) -> Result<(), BookmarkError>;
    fn update_bookmark(&mut self, id: &str, title: &str, url: &str, folder: &str) -> Result<(), BookmarkError>;
    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn get_all(&self) -> &[Bookmark];
    fn get(&self, id: &str) -> Option<&Bookmark>;
    fn find_by_url(&self, url: &str) -> Option<&Bookmark>;
    fn get_in_folder(&self, folder: &str) -> Vec<&Bookmark>;
    fn get_folders(&self) -> Vec<String>;
    fn is_bookmarked(&self, url: &str) -> bool;
    fn toggle_bookmark(&mut self, url: &str, title: &str) -> Result<bool, BookmarkError>;
    fn search(&self, query: &str) -> Vec<&Bookmark>;
}

/// Bookmark manager backed by SQLite with an in-memory cache.
pub struct BookmarkManager {
    db: Database,
    bookmarks: Vec<Bookmark>,
}

impl BookmarkManager {
    /// Creates the manager and loads every stored bookmark.
    pub fn new(db: Database) -> Result<Self, BookmarkError> {
        let mut mgr = Self {
            db,
            bookmarks: Vec::new(),
        };
        mgr.load()?;
        Ok(mgr)
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let url: String = row.get(2)?;
        let title: Option<String> = row.get(1)?;
        let folder: Option<String> = row.get(3)?;
        Ok(Bookmark {
            id: row.get(0)?,
            title: title.filter(|t| !t.is_empty()).unwrap_or_else(|| url.clone()),
            url,
            folder: folder
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            date_added: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        })
    }

    fn persist(&self, bm: &Bookmark) -> Result<(), BookmarkError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO bookmarks (id, title, url, folder, date_added) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![bm.id, bm.title, bm.url, bm.folder, bm.date_added],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Inserts into the cache keeping it ordered by `date_added` DESC.
    fn cache_insert(&mut self, bm: Bookmark) {
        let pos = self
            .bookmarks
            .iter()
            .position(|b| b.date_added <= bm.date_added)
            .unwrap_or(self.bookmarks.len());
        self.bookmarks.insert(pos, bm);
    }

    fn normalize_folder(folder: Option<&str>) -> String {
        match folder.map(str::trim) {
            Some(f) if !f.is_empty() => f.to_string(),
            _ => DEFAULT_FOLDER.to_string(),
        }
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    fn load(&mut self) -> Result<(), BookmarkError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, url, folder, date_added FROM bookmarks \
                 ORDER BY date_added DESC",
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_bookmark)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut loaded = Vec::new();
        for row in rows {
            loaded.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        tracing::debug!(count = loaded.len(), "Bookmarks loaded");
        self.bookmarks = loaded;
        Ok(())
    }

    /// Adds a new bookmark. An empty title falls back to the URL.
    fn add_bookmark(&mut self, title: &str, url: &str, folder: Option<&str>) -> Result<Bookmark, BookmarkError> {
        if url.trim().is_empty() {
            return Err(BookmarkError::InvalidUrl(url.to_string()));
        }
        let bm = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: if title.trim().is_empty() { url.to_string() } else { title.to_string() },
            url: url.to_string(),
            folder: Self::normalize_folder(folder),
            date_added: Self::now(),
        };
        self.persist(&bm)?;
        // Newest first; same-second additions still land at the front.
        self.bookmarks.insert(0, bm.clone());
        tracing::info!(bookmark_id = %bm.id, url = %bm.url, folder = %bm.folder, "Bookmark added");
        Ok(bm)
    }

    /// Writes a bookmark by id, replacing any cached copy.
    fn upsert(&mut self, bookmark: Bookmark) -> Result<(), BookmarkError> {
        if bookmark.url.trim().is_empty() {
            return Err(BookmarkError::InvalidUrl(bookmark.url));
        }
        self.persist(&bookmark)?;
        self.bookmarks.retain(|b| b.id != bookmark.id);
        self.cache_insert(bookmark);
        Ok(())
    }

    /// Updates title, URL and folder in place; the id and `date_added` are kept.
    fn update_bookmark(&mut self, id: &str, title: &str, url: &str, folder: &str) -> Result<(), BookmarkError> {
        let idx = self
            .bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;
        if url.trim().is_empty() {
            return Err(BookmarkError::InvalidUrl(url.to_string()));
        }

        let mut updated = self.bookmarks[idx].clone();
        updated.title = if title.trim().is_empty() { url.to_string() } else { title.to_string() };
        updated.url = url.to_string();
        updated.folder = Self::normalize_folder(Some(folder));

        self.persist(&updated)?;
        self.bookmarks[idx] = updated;
        Ok(())
    }

    fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .db
            .connection()
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);

        if affected == 0 && before == self.bookmarks.len() {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_all(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    fn get(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    fn find_by_url(&self, url: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.url == url)
    }

    fn get_in_folder(&self, folder: &str) -> Vec<&Bookmark> {
        self.bookmarks.iter().filter(|b| b.folder == folder).collect()
    }

    /// Distinct folders in cache order. With no bookmarks the two default
    /// folders are returned so the UI always has somewhere to file things.
    fn get_folders(&self) -> Vec<String> {
        let mut folders: Vec<String> = Vec::new();
        for bm in &self.bookmarks {
            if !folders.contains(&bm.folder) {
                folders.push(bm.folder.clone());
            }
        }
        if folders.is_empty() {
            folders.push(BOOKMARKS_BAR.to_string());
            folders.push(DEFAULT_FOLDER.to_string());
        }
        folders
    }

    fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.iter().any(|b| b.url == url)
    }

    /// Removes every bookmark of `url` if present, otherwise adds one.
    /// Returns whether the URL is bookmarked afterwards.
    fn toggle_bookmark(&mut self, url: &str, title: &str) -> Result<bool, BookmarkError> {
        if self.is_bookmarked(url) {
            self.db
                .connection()
                .execute("DELETE FROM bookmarks WHERE url = ?1", params![url])
                .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
            self.bookmarks.retain(|b| b.url != url);
            tracing::info!(url = %url, "Bookmark removed");
            Ok(false)
        } else {
            self.add_bookmark(title, url, Some(DEFAULT_FOLDER))?;
            Ok(true)
        }
    }

    fn search(&self, query: &str) -> Vec<&Bookmark> {
        let needle = query.to_lowercase();
        self.bookmarks
            .iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle) || b.url.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
