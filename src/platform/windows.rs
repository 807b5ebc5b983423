// Sea Browser platform paths for Windows
// Config:    %APPDATA%/SeaBrowser
// Data:      %APPDATA%/SeaBrowser
// Cache:     %LOCALAPPDATA%/SeaBrowser/cache
// Downloads: %USERPROFILE%/Downloads

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn get_config_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("SeaBrowser")
}

pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}

pub fn get_cache_dir() -> PathBuf {
    let local_appdata = env::var("LOCALAPPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local"));
    PathBuf::from(local_appdata).join("SeaBrowser").join("cache")
}

pub fn get_downloads_dir() -> PathBuf {
    let profile = env::var("USERPROFILE").unwrap_or_else(|_| String::from("C:\\Users\\Default"));
    PathBuf::from(profile).join("Downloads")
}

pub fn open_path(path: &Path) -> io::Result<()> {
    Command::new("explorer").arg(path).spawn().map(|_| ())
}

pub fn reveal_path(path: &Path) -> io::Result<()> {
    let mut select = std::ffi::OsString::from("/select,");
    select.push(path.as_os_str());
    Command::new("explorer").arg(select).spawn().map(|_| ())
}
