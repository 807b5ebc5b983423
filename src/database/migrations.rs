//! Schema migrations for the Sea Browser SQLite stores.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each store (history, bookmarks, downloads) lives in its own file and has its
//! own migration list; each migration runs exactly once.

use rusqlite::Connection;

use super::Store;

/// A single versioned schema change.
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

const HISTORY_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create visits table",
        sql: "CREATE TABLE IF NOT EXISTS visits (
                  id INTEGER PRIMARY KEY AUTOINCREMENT,
                  url TEXT NOT NULL,
                  title TEXT,
                  timestamp INTEGER NOT NULL
              );",
    },
    Migration {
        version: 2,
        description: "Index visits by timestamp",
        sql: "CREATE INDEX IF NOT EXISTS idx_visits_timestamp ON visits(timestamp);",
    },
];

const BOOKMARK_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create bookmarks table",
        sql: "CREATE TABLE IF NOT EXISTS bookmarks (
                  id TEXT PRIMARY KEY,
                  title TEXT,
                  url TEXT NOT NULL,
                  folder TEXT DEFAULT 'Other Bookmarks',
                  date_added INTEGER
              );",
    },
    Migration {
        version: 2,
        description: "Index bookmarks by url",
        sql: "CREATE INDEX IF NOT EXISTS idx_bookmarks_url ON bookmarks(url);",
    },
];

const DOWNLOAD_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Create downloads table",
    sql: "CREATE TABLE IF NOT EXISTS downloads (
              id TEXT PRIMARY KEY,
              url TEXT NOT NULL,
              filename TEXT NOT NULL,
              path TEXT,
              mime_type TEXT,
              total_bytes INTEGER DEFAULT 0,
              received_bytes INTEGER DEFAULT 0,
              state INTEGER DEFAULT 0,
              start_time INTEGER,
              end_time INTEGER,
              error_message TEXT
          );",
}];

/// Returns the migration list for a store.
pub fn migrations_for(store: Store) -> &'static [Migration] {
    match store {
        Store::History => HISTORY_MIGRATIONS,
        Store::Bookmarks => BOOKMARK_MIGRATIONS,
        Store::Downloads => DOWNLOAD_MIGRATIONS,
    }
}

/// Latest schema version for a store.
pub fn current_schema_version(store: Store) -> i32 {
    migrations_for(store)
        .iter()
        .map(|m| m.version)
        .max()
        .unwrap_or(0)
}

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations for `store`.
///
/// Safe to call on every startup. Files created by older builds without a
/// `schema_version` table start at version 0; `IF NOT EXISTS` keeps their
/// existing tables and rows intact.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection, store: Store) -> Result<(), rusqlite::Error> {
    // WAL is a per-file setting; in-memory databases silently keep "memory".
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    for migration in migrations_for(store) {
        if current < migration.version {
            conn.execute_batch(migration.sql)?;
            record_version(conn, migration.version, migration.description)?;
            tracing::debug!(
                store = store.file_name(),
                version = migration.version,
                "Applied migration"
            );
        }
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}
