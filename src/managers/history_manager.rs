//! History Manager for Sea Browser.
//!
//! Implements `HistoryManagerTrait`: recording visits, listing recent pages,
//! searching, deleting and age-based cleanup, backed by `history.db`.
//!
//! The connection sits behind a `Mutex` so a single manager can be shared
//! (via `Arc`) between the page-load handler and the bridge.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;

use crate::database::Database;
use crate::services::internal_pages::is_internal_url;
use crate::types::errors::HistoryError;
use crate::types::history::HistoryItem;

/// Visits older than this many days are removed on startup.
pub const HISTORY_RETENTION_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 86_400;

/// Trait defining history management operations.
pub trait HistoryManagerTrait {
    fn add_visit(&self, url: &str, title: &str) -> Result<(), HistoryError>;
    fn get_recent(&self, limit: usize) -> Result<Vec<HistoryItem>, HistoryError>;
    fn search(&self, query: &str, limit: usize) -> Result<Vec<HistoryItem>, HistoryError>;
    fn clear_history(&self) -> Result<(), HistoryError>;
    fn delete_history_item(&self, url: &str) -> Result<usize, HistoryError>;
    fn cleanup_history(&self, max_age_days: i64) -> Result<usize, HistoryError>;
    fn count(&self) -> Result<usize, HistoryError>;
    fn is_recording_enabled(&self) -> bool;
    fn set_recording_enabled(&self, enabled: bool);
}

/// History manager backed by a mutex-guarded SQLite connection.
pub struct HistoryManager {
    db: Mutex<Database>,
    recording_enabled: AtomicBool,
}

impl HistoryManager {
    /// Creates a new `HistoryManager` owning the given history database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            recording_enabled: AtomicBool::new(true),
        }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, HistoryError> {
        self.db
            .lock()
            .map_err(|e| HistoryError::DatabaseError(format!("history lock poisoned: {}", e)))
    }

    /// Inserts a visit with an explicit timestamp.
    ///
    /// `add_visit` uses the wall clock; this is also how imported or
    /// back-dated entries are written.
    pub fn add_visit_at(&self, url: &str, title: &str, timestamp: i64) -> Result<(), HistoryError> {
        let db = self.lock()?;
        db.connection()
            .execute(
                "INSERT INTO visits (url, title, timestamp) VALUES (?1, ?2, ?3)",
                params![url, title, timestamp],
            )
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Reads a single row; an empty or NULL title falls back to the URL.
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<HistoryItem> {
        let url: String = row.get(1)?;
        let title: Option<String> = row.get(2)?;
        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => url.clone(),
        };
        Ok(HistoryItem {
            id: row.get(0)?,
            url,
            title,
            timestamp: row.get(3)?,
        })
    }
}

impl HistoryManagerTrait for HistoryManager {
    /// Records a page visit. Internal pages and empty URLs are never recorded.
    fn add_visit(&self, url: &str, title: &str) -> Result<(), HistoryError> {
        if url.is_empty() || is_internal_url(url) {
            return Ok(());
        }
        if !self.is_recording_enabled() {
            tracing::debug!(url = %url, "History recording disabled, visit skipped");
            return Ok(());
        }
        self.add_visit_at(url, title, Self::now())
    }

    /// Most recent visits first.
    fn get_recent(&self, limit: usize) -> Result<Vec<HistoryItem>, HistoryError> {
        let db = self.lock()?;
        let mut stmt = db
            .connection()
            .prepare(
                "SELECT id, url, title, timestamp FROM visits \
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_item)
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| HistoryError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    /// Case-insensitive substring match on title or URL, newest first.
    ///
    /// Matched in Rust, not with `LIKE`: `%` and `_` in the query are literal
    /// and non-ASCII text folds case.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<HistoryItem>, HistoryError> {
        let needle = query.to_lowercase();
        let db = self.lock()?;
        let mut stmt = db
            .connection()
            .prepare(
                "SELECT id, url, title, timestamp FROM visits \
                 ORDER BY timestamp DESC, id DESC",
            )
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_item)
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            if results.len() >= limit {
                break;
            }
            let item = row.map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
            if item.title.to_lowercase().contains(&needle) || item.url.to_lowercase().contains(&needle) {
                results.push(item);
            }
        }
        Ok(results)
    }

    fn clear_history(&self) -> Result<(), HistoryError> {
        let db = self.lock()?;
        db.connection()
            .execute("DELETE FROM visits", [])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        tracing::info!("History cleared");
        Ok(())
    }

    /// Deletes every visit of `url`. Returns how many rows went away.
    fn delete_history_item(&self, url: &str) -> Result<usize, HistoryError> {
        let db = self.lock()?;
        let affected = db
            .connection()
            .execute("DELETE FROM visits WHERE url = ?1", params![url])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(HistoryError::NotFound(url.to_string()));
        }
        Ok(affected)
    }

    fn cleanup_history(&self, max_age_days: i64) -> Result<usize, HistoryError> {
        let cutoff = Self::now() - max_age_days.max(0) * SECONDS_PER_DAY;
        let db = self.lock()?;
        let removed = db
            .connection()
            .execute("DELETE FROM visits WHERE timestamp < ?1", params![cutoff])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        if removed > 0 {
            tracing::info!(removed, max_age_days, "Expired history removed");
        }
        Ok(removed)
    }

    fn count(&self) -> Result<usize, HistoryError> {
        let db = self.lock()?;
        let n: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM visits", [], |row| row.get(0))
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        Ok(n as usize)
    }

    fn is_recording_enabled(&self) -> bool {
        self.recording_enabled.load(Ordering::Relaxed)
    }

    fn set_recording_enabled(&self, enabled: bool) {
        self.recording_enabled.store(enabled, Ordering::Relaxed);
    }
}
