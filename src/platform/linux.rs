// Sea Browser platform paths for Linux
// Config:    ~/.config/seabrowser
// Data:      ~/.local/share/seabrowser
// Cache:     ~/.cache/seabrowser
// Downloads: $XDG_DOWNLOAD_DIR or ~/Downloads

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/seabrowser` if set, otherwise `~/.config/seabrowser`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("seabrowser"),
        _ => home_dir().join(".config").join("seabrowser"),
    }
}

/// Uses `$XDG_DATA_HOME/seabrowser` if set, otherwise `~/.local/share/seabrowser`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("seabrowser"),
        _ => home_dir().join(".local").join("share").join("seabrowser"),
    }
}

/// Uses `$XDG_CACHE_HOME/seabrowser` if set, otherwise `~/.cache/seabrowser`.
pub fn get_cache_dir() -> PathBuf {
    match env::var("XDG_CACHE_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("seabrowser"),
        _ => home_dir().join(".cache").join("seabrowser"),
    }
}

pub fn get_downloads_dir() -> PathBuf {
    if let Ok(dir) = env::var("XDG_DOWNLOAD_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let user_dirs = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("user-dirs.dirs"),
        _ => home_dir().join(".config").join("user-dirs.dirs"),
    };
    if let Ok(content) = fs::read_to_string(user_dirs) {
        if let Some(dir) = parse_user_dirs_download(&content, &home_dir()) {
            return dir;
        }
    }
    home_dir().join("Downloads")
}

/// Reads `XDG_DOWNLOAD_DIR="$HOME/..."` from a `user-dirs.dirs` file.
pub fn parse_user_dirs_download(content: &str, home: &Path) -> Option<PathBuf> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix("XDG_DOWNLOAD_DIR=")?;
        let value = value.trim().trim_matches('"');
        let expanded = match value.strip_prefix("$HOME") {
            Some(rest) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(value),
        };
        expanded.is_absolute().then_some(expanded)
    })
}

pub fn open_path(path: &Path) -> io::Result<()> {
    Command::new("xdg-open").arg(path).spawn().map(|_| ())
}

/// Opens the containing folder; there is no portable "select file" call.
pub fn reveal_path(path: &Path) -> io::Result<()> {
    let folder = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    open_path(folder)
}

pub fn prepare_csd_environment() {
    env::set_var("GTK_CSD", "1");
    env::set_var("KWIN_FORCE_CSD", "1");
    env::set_var("GTK_OVERLAY_SCROLLING", "1");
    env::set_var("GTK_USE_PORTAL", "0");
    env::remove_var("GTK_THEME");
    env::remove_var("QT_QPA_PLATFORMTHEME");
}
