// Sea Browser platform paths for macOS
// Config:    ~/Library/Application Support/SeaBrowser
// Data:      ~/Library/Application Support/SeaBrowser
// Cache:     ~/Library/Caches/SeaBrowser
// Downloads: ~/Downloads

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

pub fn get_config_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("SeaBrowser")
}

pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}

pub fn get_cache_dir() -> PathBuf {
    home_dir().join("Library").join("Caches").join("SeaBrowser")
}

pub fn get_downloads_dir() -> PathBuf {
    home_dir().join("Downloads")
}

pub fn open_path(path: &Path) -> io::Result<()> {
    Command::new("open").arg(path).spawn().map(|_| ())
}

pub fn reveal_path(path: &Path) -> io::Result<()> {
    Command::new("open").arg("-R").arg(path).spawn().map(|_| ())
}
