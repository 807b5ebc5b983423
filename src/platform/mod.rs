// Sea Browser platform abstraction
// Provides platform-specific paths, the OS file opener and toolkit environment
// setup for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::io;
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for Sea Browser.
///
/// - **Linux**: `~/.config/seabrowser` (or `$XDG_CONFIG_HOME/seabrowser`)
/// - **macOS**: `~/Library/Application Support/SeaBrowser`
/// - **Windows**: `%APPDATA%/SeaBrowser`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory (databases).
///
/// - **Linux**: `~/.local/share/seabrowser` (or `$XDG_DATA_HOME/seabrowser`)
/// - **macOS**: `~/Library/Application Support/SeaBrowser`
/// - **Windows**: `%APPDATA%/SeaBrowser`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Returns the platform-specific cache directory.
pub fn get_cache_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_cache_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_cache_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_cache_dir()
    }
}

/// Returns the user's downloads directory.
///
/// - **Linux**: `$XDG_DOWNLOAD_DIR`, then `user-dirs.dirs`, then `~/Downloads`
/// - **macOS**: `~/Downloads`
/// - **Windows**: `%USERPROFILE%/Downloads`
pub fn get_downloads_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_downloads_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_downloads_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_downloads_dir()
    }
}

/// Opens a file or directory with the desktop's default handler.
pub fn open_path(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ));
    }
    #[cfg(target_os = "linux")]
    {
        linux::open_path(path)
    }
    #[cfg(target_os = "macos")]
    {
        macos::open_path(path)
    }
    #[cfg(target_os = "windows")]
    {
        windows::open_path(path)
    }
}

/// Shows a file in the system file manager.
pub fn reveal_path(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ));
    }
    #[cfg(target_os = "linux")]
    {
        linux::reveal_path(path)
    }
    #[cfg(target_os = "macos")]
    {
        macos::reveal_path(path)
    }
    #[cfg(target_os = "windows")]
    {
        windows::reveal_path(path)
    }
}

/// Environment for client-side window decorations. Must run before any
/// toolkit is initialized. No-op outside Linux.
pub fn prepare_csd_environment() {
    #[cfg(target_os = "linux")]
    linux::prepare_csd_environment();
}
