//! Sea Browser database layer.
//!
//! Provides SQLite connection management and per-store schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use seabrowser::database::{Database, Store};
//!
//! // Open a persistent database
//! let db = Database::open("history.db", Store::History).expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory(Store::Bookmarks).expect("failed to open in-memory database");
//!
//! // Access the underlying connection for queries
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;

/// The three SQLite stores the browser keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    History,
    Bookmarks,
    Downloads,
}

impl Store {
    /// File name of the store inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Store::History => "history.db",
            Store::Bookmarks => "bookmarks.db",
            Store::Downloads => "downloads.db",
        }
    }
}
