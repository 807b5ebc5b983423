//! Startup configuration resolved from the environment.

use std::env;
use std::path::PathBuf;

use crate::platform;
use crate::services::internal_pages::{InternalPage, InternalScheme};
use crate::services::settings_engine::SettingsFormat;
use crate::types::settings::BrowserSettings;

pub const ENV_DATA_DIR: &str = "SEA_BROWSER_DATA_DIR";
pub const ENV_CONFIG_DIR: &str = "SEA_BROWSER_CONFIG_DIR";
pub const ENV_SHELL: &str = "SEA_BROWSER_SHELL";
pub const ENV_RESOURCES: &str = "SEA_BROWSER_RESOURCES";
pub const ENV_THEME: &str = "SEA_THEME";
pub const ENV_FIRST_RUN: &str = "SEA_BROWSER_FIRST_RUN";

/// Where things live and which shell flavour runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub scheme: InternalScheme,
    /// Holds `history.db`, `bookmarks.db` and `downloads.db`.
    pub data_dir: PathBuf,
    /// Holds the settings file and the extensions directory.
    pub config_dir: PathBuf,
    /// Optional page template overrides.
    pub resources_dir: Option<PathBuf>,
    /// Raw `SEA_THEME` value, applied over the stored theme.
    pub theme_override: Option<String>,
    /// `SEA_BROWSER_FIRST_RUN=1` forces the setup page.
    pub force_first_run: bool,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves the configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let scheme = non_empty(ENV_SHELL)
            .and_then(|v| InternalScheme::parse(&v))
            .unwrap_or(InternalScheme::Sea);

        Self {
            scheme,
            data_dir: non_empty(ENV_DATA_DIR).map(PathBuf::from).unwrap_or_else(platform::get_data_dir),
            config_dir: non_empty(ENV_CONFIG_DIR).map(PathBuf::from).unwrap_or_else(platform::get_config_dir),
            resources_dir: non_empty(ENV_RESOURCES).map(PathBuf::from),
            theme_override: non_empty(ENV_THEME),
            force_first_run: non_empty(ENV_FIRST_RUN).map(|v| v.trim() == "1").unwrap_or(false),
        }
    }

    /// Explicit directories, no overrides.
    pub fn for_dirs(data_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>, scheme: InternalScheme) -> Self {
        Self {
            scheme,
            data_dir: data_dir.into(),
            config_dir: config_dir.into(),
            resources_dir: None,
            theme_override: None,
            force_first_run: false,
        }
    }

    pub fn product_name(&self) -> &'static str {
        self.scheme.product_name()
    }

    /// Sea keeps key=value settings; Tsunami keeps JSON.
    pub fn settings_format(&self) -> SettingsFormat {
        match self.scheme {
            InternalScheme::Sea => SettingsFormat::KeyValue,
            InternalScheme::Tsunami => SettingsFormat::Json,
        }
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.config_dir.join("extensions")
    }

    /// Factory settings for this flavour; the homepage points at its scheme.
    pub fn default_settings(&self) -> BrowserSettings {
        let mut settings = BrowserSettings::default();
        settings.general.homepage = self.scheme.url(InternalPage::NewTab);
        settings
    }
}

/// Initializes the global `tracing` subscriber on stderr. `RUST_LOG`
/// overrides the default `info` filter. Stdout stays free for the bridge
/// server's NDJSON stream.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
