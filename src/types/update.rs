use serde::{Deserialize, Serialize};

/// Information about an available browser update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateInfo {
    pub version: String,
    pub changelog: String,
    pub download_url: String,
    pub asset_name: String,
    pub published_at: String,
    pub file_size: u64,
}

/// Installable package flavour used to pick a release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    WindowsInstaller,
    MacDmg,
    Rpm,
    Deb,
    AppImage,
}

impl PackageKind {
    /// File suffixes that identify an asset of this kind.
    pub fn asset_suffixes(self) -> &'static [&'static str] {
        match self {
            PackageKind::WindowsInstaller => &[".exe", ".msi"],
            PackageKind::MacDmg => &[".dmg"],
            PackageKind::Rpm => &[".rpm"],
            PackageKind::Deb => &[".deb"],
            PackageKind::AppImage => &[".AppImage"],
        }
    }
}
