use serde::{Deserialize, Serialize};

/// Top-level browser settings container.
///
/// Every section defaults field-by-field so settings files written by older
/// versions (or the other shell flavour) still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BrowserSettings {
    pub privacy: PrivacySettings,
    pub search: SearchSettings,
    pub appearance: AppearanceSettings,
    pub general: GeneralSettings,
}

impl BrowserSettings {
    /// Section names in the order they are written to disk.
    pub const SECTIONS: [&'static str; 4] = ["privacy", "search", "appearance", "general"];
}

/// Privacy-related settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrivacySettings {
    pub cookie_policy: CookiePolicy,
    pub tracking_protection: TrackingProtection,
    pub https_only: bool,
    pub send_dnt: bool,
    pub clear_on_exit: bool,
    pub block_ads: bool,
    pub block_fingerprinting: bool,
    pub disable_webrtc: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            cookie_policy: CookiePolicy::BlockThirdParty,
            tracking_protection: TrackingProtection::Strict,
            https_only: false,
            send_dnt: true,
            clear_on_exit: false,
            block_ads: true,
            block_fingerprinting: true,
            disable_webrtc: false,
        }
    }
}

/// Which cookies the engine accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CookiePolicy {
    AcceptAll,
    BlockThirdParty,
    BlockAll,
}

/// How aggressively tracker requests are blocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingProtection {
    Off,
    Standard,
    Strict,
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub default_engine: String,
    pub show_suggestions: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_engine: "google".to_string(),
            show_suggestions: true,
        }
    }
}

/// Appearance and visual settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
    pub accent_color: String,
    /// Page zoom in percent.
    pub zoom_level: u32,
    pub show_sidebar: bool,
    pub vertical_tabs: bool,
    pub show_bookmarks_bar: bool,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            accent_color: "#2563eb".to_string(),
            zoom_level: 100,
            show_sidebar: false,
            vertical_tabs: false,
            show_bookmarks_bar: true,
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    System,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::System => "system",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" | "auto" => Some(ThemeMode::System),
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// General browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    pub homepage: String,
    /// Empty means the platform downloads directory.
    pub download_path: String,
    pub user_agent: UserAgent,
    pub ask_where_to_save: bool,
    pub restore_tabs: bool,
    pub setup_completed: bool,
    pub encrypt_settings: bool,
    pub auto_reload: bool,
    /// Seconds between automatic reloads.
    pub auto_reload_interval: u32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            homepage: "sea://newtab".to_string(),
            download_path: String::new(),
            user_agent: UserAgent::Chrome,
            ask_where_to_save: false,
            restore_tabs: true,
            setup_completed: false,
            encrypt_settings: false,
            auto_reload: false,
            auto_reload_interval: 30,
        }
    }
}

/// User agent the webview presents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserAgent {
    Chrome,
    Firefox,
    Safari,
}
