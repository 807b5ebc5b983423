//! SQLite connection management for Sea Browser.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and runs the schema migrations of its [`Store`] on open.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;
use super::Store;

/// Core database wrapper providing SQLite connection management.
///
/// Each manager owns one `Database` pointing at its own file, mirroring the
/// one-file-per-store layout of the shell (`history.db`, `bookmarks.db`,
/// `downloads.db`).
pub struct Database {
    conn: Connection,
    store: Store,
}

impl Database {
    /// Opens (or creates) the SQLite file at `path` and runs the store's migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P, store: Store) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self { conn, store };
        db.run_migrations()?;
        tracing::info!(store = store.file_name(), path = %path.as_ref().display(), "Opened database");
        Ok(db)
    }

    /// Opens the store's database file inside `dir`, creating the directory if needed.
    pub fn open_in_dir<P: AsRef<Path>>(dir: P, store: Store) -> Result<Self, rusqlite::Error> {
        if let Err(e) = std::fs::create_dir_all(dir.as_ref()) {
            tracing::warn!(dir = %dir.as_ref().display(), error = %e, "Could not create data directory");
        }
        Self::open(dir.as_ref().join(store.file_name()), store)
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// The database is discarded when the `Database` is dropped.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open_in_memory(store: Store) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, store };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<(), rusqlite::Error> {
        migrations::run_all(&self.conn, self.store)
    }

    /// Which store this database holds.
    pub fn store(&self) -> Store {
        self.store
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
