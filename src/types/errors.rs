use std::fmt;

// === TabError ===

/// Errors related to tab management operations.
#[derive(Debug)]
pub enum TabError {
    /// Tab with the given ID was not found.
    NotFound(String),
    /// The provided tab index is out of bounds.
    InvalidIndex(usize),
    /// There is no closed tab left to reopen.
    NothingToReopen,
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
            TabError::InvalidIndex(index) => write!(f, "Invalid tab index: {}", index),
            TabError::NothingToReopen => write!(f, "No recently closed tab to reopen"),
        }
    }
}

impl std::error::Error for TabError {}

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    NotFound(String),
    /// The bookmark URL is empty.
    InvalidUrl(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: '{}'", url),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === HistoryError ===

/// Errors related to browsing history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// No history entry matched the given URL.
    NotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::NotFound(url) => write!(f, "History entry not found: {}", url),
            HistoryError::DatabaseError(msg) => write!(f, "History database error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

// === DownloadError ===

/// Errors related to download management operations.
#[derive(Debug)]
pub enum DownloadError {
    /// Download with the given ID was not found.
    NotFound(String),
    /// A file system error occurred (opening, revealing, creating dirs).
    FileSystemError(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::NotFound(id) => write!(f, "Download not found: {}", id),
            DownloadError::FileSystemError(msg) => {
                write!(f, "Download file system error: {}", msg)
            }
            DownloadError::DatabaseError(msg) => {
                write!(f, "Download database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DownloadError {}

// === ShortcutError ===

/// Errors related to keyboard accelerator bindings.
#[derive(Debug)]
pub enum ShortcutError {
    /// No binding exists for the given keys.
    NotFound(String),
    /// The keys are already bound to another command.
    Conflict(String),
    /// The provided key combination is invalid.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::NotFound(keys) => write!(f, "Shortcut not bound: {}", keys),
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The obfuscated settings payload could not be decoded.
    DecodeError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::DecodeError(msg) => write!(f, "Settings decode error: {}", msg),
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === PageError ===

/// Errors related to serving internal pages.
#[derive(Debug)]
pub enum PageError {
    /// The URL does not name a known internal page.
    UnknownPage(String),
    /// A resource name was rejected by the path safety check.
    UnsafePath(String),
    /// The template could not be read.
    TemplateMissing(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::UnknownPage(url) => write!(f, "Unknown internal page: {}", url),
            PageError::UnsafePath(path) => write!(f, "Unsafe resource path: {}", path),
            PageError::TemplateMissing(name) => write!(f, "Page template missing: {}", name),
        }
    }
}

impl std::error::Error for PageError {}

// === ExtensionError ===

/// Errors related to extension loading and management.
#[derive(Debug)]
pub enum ExtensionError {
    /// Extension with the given name was not found.
    NotFound(String),
    /// The extension manifest is invalid.
    InvalidManifest(String),
    /// Failed to read or copy extension files.
    LoadError(String),
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::NotFound(name) => write!(f, "Extension not found: {}", name),
            ExtensionError::InvalidManifest(msg) => {
                write!(f, "Invalid extension manifest: {}", msg)
            }
            ExtensionError::LoadError(msg) => write!(f, "Extension load error: {}", msg),
        }
    }
}

impl std::error::Error for ExtensionError {}

// === UpdateError ===

/// Errors related to update checks.
#[derive(Debug)]
pub enum UpdateError {
    /// A network error occurred while checking for updates.
    NetworkError(String),
    /// Failed to parse the release information.
    ParseError(String),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::NetworkError(msg) => write!(f, "Update network error: {}", msg),
            UpdateError::ParseError(msg) => write!(f, "Update parse error: {}", msg),
        }
    }
}

impl std::error::Error for UpdateError {}
