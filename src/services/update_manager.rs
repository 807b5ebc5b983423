//! Update Manager for Sea Browser.
//!
//! Checks the GitHub Releases API for a newer version and picks the asset
//! matching how this build was installed.

use serde_json::Value;

use crate::types::errors::UpdateError;
use crate::types::update::{PackageKind, UpdateInfo};

pub const DEFAULT_OWNER: &str = "seasoftware-dev";
pub const DEFAULT_REPO: &str = "tsunami";

/// Trait defining update management operations.
pub trait UpdateManagerTrait {
    fn check_for_updates(&self) -> Result<Option<UpdateInfo>, UpdateError>;
    fn get_current_version(&self) -> &str;
    fn releases_url(&self) -> String;
    fn set_auto_check_enabled(&mut self, enabled: bool);
    fn is_auto_check_enabled(&self) -> bool;
}

/// Update manager implementation.
pub struct UpdateManager {
    current_version: String,
    owner: String,
    repo: String,
    package: PackageKind,
    auto_check_enabled: bool,
}

impl UpdateManager {
    pub fn new() -> Self {
        Self::with_repo(DEFAULT_OWNER, DEFAULT_REPO)
    }

    pub fn with_repo(owner: &str, repo: &str) -> Self {
        Self {
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            package: detect_package_kind(),
            auto_check_enabled: true,
        }
    }

    pub fn package_kind(&self) -> PackageKind {
        self.package
    }

    /// Compares dotted version strings. Returns true if `latest` is newer than `current`.
    pub fn is_newer_version(current: &str, latest: &str) -> bool {
        let parse = |v: &str| -> Vec<u32> {
            v.trim()
                .trim_start_matches('v')
                .split(['.', '-', '+'])
                .map_while(|s| s.parse().ok())
                .collect()
        };
        let mut c = parse(current);
        let mut l = parse(latest);
        // "1.2" and "1.2.0" are the same release.
        let len = c.len().max(l.len());
        c.resize(len, 0);
        l.resize(len, 0);
        l > c
    }
}

impl Default for UpdateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateManagerTrait for UpdateManager {
    #[cfg(feature = "network")]
    fn check_for_updates(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        let url = self.releases_url();
        let user_agent = format!("SeaBrowser/{}", self.current_version);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| UpdateError::NetworkError(e.to_string()))?;

        let body = runtime.block_on(async {
            let client = reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .map_err(|e| UpdateError::NetworkError(e.to_string()))?;
            let response = client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| UpdateError::NetworkError(e.to_string()))?;
            if !response.status().is_success() {
                return Err(UpdateError::NetworkError(format!("HTTP {}", response.status())));
            }
            response
                .text()
                .await
                .map_err(|e| UpdateError::NetworkError(e.to_string()))
        })?;

        let info = parse_release(&body, &self.current_version, self.package)?;
        match &info {
            Some(update) => tracing::info!(version = %update.version, asset = %update.asset_name, "Update available"),
            None => tracing::info!(current = %self.current_version, "Already up to date"),
        }
        Ok(info)
    }

    #[cfg(not(feature = "network"))]
    fn check_for_updates(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        Err(UpdateError::NetworkError("built without the network feature".to_string()))
    }

    fn get_current_version(&self) -> &str {
        &self.current_version
    }

    fn releases_url(&self) -> String {
        format!("https://api.github.com/repos/{}/{}/releases/latest", self.owner, self.repo)
    }

    fn set_auto_check_enabled(&mut self, enabled: bool) {
        self.auto_check_enabled = enabled;
    }

    fn is_auto_check_enabled(&self) -> bool {
        self.auto_check_enabled
    }
}

/// Reads a GitHub "latest release" document.
///
/// Returns `None` when the release is not newer than `current_version`.
/// The asset is the first whose name ends with one of the package's
/// suffixes; without a match the download URL is the release page.
pub fn parse_release(json: &str, current_version: &str, package: PackageKind) -> Result<Option<UpdateInfo>, UpdateError> {
    let release: Value = serde_json::from_str(json).map_err(|e| UpdateError::ParseError(e.to_string()))?;

    let tag = release
        .get("tag_name")
        .and_then(Value::as_str)
        .ok_or_else(|| UpdateError::ParseError("release has no tag_name".to_string()))?;
    let version = tag.trim().trim_start_matches('v').to_string();

    if !UpdateManager::is_newer_version(current_version, &version) {
        return Ok(None);
    }

    let text = |key: &str| release.get(key).and_then(Value::as_str).unwrap_or("").to_string();

    let asset = release
        .get("assets")
        .and_then(Value::as_array)
        .and_then(|assets| {
            assets.iter().find(|a| {
                let name = a.get("name").and_then(Value::as_str).unwrap_or("");
                package.asset_suffixes().iter().any(|s| name.ends_with(s))
            })
        });

    let (download_url, asset_name, file_size) = match asset {
        Some(a) => (
            a.get("browser_download_url").and_then(Value::as_str).unwrap_or("").to_string(),
            a.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
            a.get("size").and_then(Value::as_u64).unwrap_or(0),
        ),
        None => (text("html_url"), String::new(), 0),
    };

    Ok(Some(UpdateInfo {
        version,
        changelog: text("body"),
        download_url,
        asset_name,
        published_at: text("published_at"),
        file_size,
    }))
}

/// Package flavour for the running system.
pub fn detect_package_kind() -> PackageKind {
    if cfg!(target_os = "windows") {
        PackageKind::WindowsInstaller
    } else if cfg!(target_os = "macos") {
        PackageKind::MacDmg
    } else {
        match std::fs::read_to_string("/etc/os-release") {
            Ok(content) => package_kind_from_os_release(&content),
            Err(_) => PackageKind::AppImage,
        }
    }
}

/// Maps `/etc/os-release` `ID`/`ID_LIKE` to a Linux package kind.
pub fn package_kind_from_os_release(content: &str) -> PackageKind {
    let mut ids: Vec<String> = Vec::new();
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "ID" || key.trim() == "ID_LIKE" {
                let value = value.trim().trim_matches('"').to_ascii_lowercase();
                ids.extend(value.split_whitespace().map(str::to_string));
            }
        }
    }

    let has = |names: &[&str]| ids.iter().any(|id| names.contains(&id.as_str()));
    if has(&["fedora", "rhel", "suse", "opensuse", "centos"]) {
        PackageKind::Rpm
    } else if has(&["debian", "ubuntu"]) {
        PackageKind::Deb
    } else {
        PackageKind::AppImage
    }
}
