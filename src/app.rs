//! App Core for Sea Browser.
//!
//! Central struct holding all managers and services, managing application lifecycle.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::database::{Database, Store};
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait, HISTORY_RETENTION_DAYS};
use crate::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use crate::managers::tab_manager::{self, TabManager, TabManagerTrait};
use crate::platform;
use crate::services::content_blocker::{self, ContentBlocker, NavigationDecision};
use crate::services::extension_manager::{ExtensionManager, ExtensionManagerTrait};
use crate::services::internal_pages::{self, InternalPage, PageRenderer, TOOLBAR_JS};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::update_manager::UpdateManager;
use crate::services::url_input::{self, SearchEngine};
use crate::types::errors::TabError;
use crate::types::settings::ThemeMode;

/// How many history rows the history page receives.
const HISTORY_PAGE_LIMIT: usize = 500;

/// Central application struct holding all managers and services.
///
/// `history` guards its own connection, so it is handed out as an `Arc`
/// and can be used without holding the app lock.
pub struct App {
    pub config: AppConfig,
    pub history: Arc<HistoryManager>,
    pub bookmarks: BookmarkManager,
    pub downloads: DownloadManager,
    pub tabs: TabManager,
    pub shortcuts: ShortcutManager,
    pub settings: SettingsEngine,
    pub blocker: ContentBlocker,
    pub extensions: ExtensionManager,
    pub pages: PageRenderer,
    pub updates: UpdateManager,
    theme: ThemeMode,
}

impl App {
    /// Opens the three databases under the data directory and wires up
    /// every manager. Settings are not read until `startup`.
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let history_db = Database::open_in_dir(&config.data_dir, Store::History)?;
        let bookmarks_db = Database::open_in_dir(&config.data_dir, Store::Bookmarks)?;
        let downloads_db = Database::open_in_dir(&config.data_dir, Store::Downloads)?;
        tracing::info!(data_dir = %config.data_dir.display(), "Databases opened");

        let history = Arc::new(HistoryManager::new(history_db));
        let bookmarks = BookmarkManager::new(bookmarks_db)
            .map_err(|e| format!("BookmarkManager init failed: {}", e))?;
        let downloads = DownloadManager::new(downloads_db, platform::get_downloads_dir())
            .map_err(|e| format!("DownloadManager init failed: {}", e))?;

        let settings = SettingsEngine::with_defaults(
            &config.config_dir,
            config.settings_format(),
            config.default_settings(),
        );
        let extensions = ExtensionManager::new(config.extensions_dir());
        let pages = PageRenderer::new(config.resources_dir.clone());

        Ok(Self {
            history,
            bookmarks,
            downloads,
            tabs: TabManager::new(),
            shortcuts: ShortcutManager::new(),
            settings,
            blocker: ContentBlocker::new(),
            extensions,
            pages,
            updates: UpdateManager::new(),
            theme: ThemeMode::System,
            config,
        })
    }

    /// Startup sequence: load settings, apply `SEA_THEME`, expire old
    /// history, load extensions, configure the blocker and open the first
    /// tab. Returns the URL of that tab.
    pub fn startup(&mut self) -> String {
        if let Err(e) = self.settings.load() {
            tracing::error!(error = %e, "Failed to load settings, using defaults");
        }
        self.apply_settings();

        if let Err(e) = self.history.cleanup_history(HISTORY_RETENTION_DAYS) {
            tracing::error!(error = %e, "History cleanup failed");
        }

        match self.extensions.load_extensions() {
            Ok(count) => tracing::info!(count, "Extensions loaded"),
            Err(e) => tracing::error!(error = %e, "Failed to load extensions"),
        }

        let url = self.initial_url();
        self.tabs.create_tab(&url, true);
        tracing::info!(url = %url, product = self.config.product_name(), "Startup complete");
        url
    }

    /// Shutdown sequence: honour clear-on-exit, then persist settings.
    pub fn shutdown(&mut self) {
        if self.settings.get_settings().privacy.clear_on_exit {
            if let Err(e) = self.history.clear_history() {
                tracing::error!(error = %e, "Failed to clear history on exit");
            }
        }
        if let Err(e) = self.settings.save() {
            tracing::error!(error = %e, "Failed to save settings on exit");
        }
        tracing::info!("Shutdown complete");
    }

    /// Setup page on first run, the homepage otherwise.
    pub fn initial_url(&self) -> String {
        let general = &self.settings.get_settings().general;
        if self.config.force_first_run || !general.setup_completed {
            return self.config.scheme.url(InternalPage::Setup);
        }
        if general.homepage.trim().is_empty() {
            self.config.scheme.url(InternalPage::NewTab)
        } else {
            general.homepage.clone()
        }
    }

    /// Pushes the current settings into the blocker, the download
    /// directory and the session theme. Call after any settings change.
    pub fn apply_settings(&mut self) {
        let settings = self.settings.get_settings().clone();
        self.blocker
            .configure(settings.privacy.tracking_protection, settings.privacy.block_ads);
        self.downloads.set_downloads_dir(self.downloads_dir());
        self.theme = self.settings.effective_theme(self.config.theme_override.as_deref());
    }

    /// Theme in effect for this session.
    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    /// Configured download path, or the platform downloads directory.
    pub fn downloads_dir(&self) -> PathBuf {
        let configured = self.settings.get_settings().general.download_path.trim();
        if configured.is_empty() {
            platform::get_downloads_dir()
        } else {
            PathBuf::from(configured)
        }
    }

    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::from_name(&self.settings.get_settings().search.default_engine)
    }

    /// Address bar text to URL.
    pub fn process_input(&self, input: &str) -> String {
        url_input::process_url_input(input, self.config.scheme, self.search_engine())
    }

    /// Whether a top-level navigation may proceed.
    pub fn check_navigation(&self, url: &str) -> NavigationDecision {
        self.blocker
            .check_navigation(url, self.settings.get_settings().privacy.https_only)
    }

    pub fn user_agent(&self) -> &'static str {
        content_blocker::user_agent_string(self.settings.get_settings().general.user_agent)
    }

    /// The toolbar bridge, preceded by the internal scheme and the bound
    /// accelerators. Only those keys are claimed from the page.
    pub fn bridge_script(&self) -> String {
        let mut bindings: Vec<&String> = self.shortcuts.list_shortcuts().keys().collect();
        bindings.sort();
        format!(
            "window.__seaScheme = {};\nwindow.__seaBindings = {};\n{}",
            json!(self.config.scheme.name()),
            json!(bindings),
            TOOLBAR_JS
        )
    }

    /// Script injected at document start: the toolbar bridge plus every
    /// enabled extension.
    pub fn initialization_script(&self) -> String {
        let mut script = self.bridge_script();
        script.push('\n');
        script.push_str(&self.extensions.combined_script());
        script
    }

    /// Registers a download the webview is about to write and returns the
    /// path it should go to. `None` when the URL is already downloading or
    /// the record could not be created.
    pub fn begin_download(&mut self, url: &str, suggested_filename: Option<&str>) -> Option<PathBuf> {
        if let Some(existing) = self.downloads.find_in_progress_by_url(url) {
            tracing::debug!(url = %url, id = %existing.id, "Download already running");
            return None;
        }
        match self.downloads.start_download(url, suggested_filename, None, 0) {
            Ok(dl) => Some(PathBuf::from(dl.path)),
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Could not start download");
                None
            }
        }
    }

    /// Updates the tab after a committed load and records the visit.
    pub fn record_navigation(&mut self, tab_id: &str, url: &str, title: &str) -> Result<(), TabError> {
        self.tabs.update_tab_url(tab_id, url)?;
        if !title.trim().is_empty() {
            self.tabs.update_tab_title(tab_id, title)?;
        } else if let Some(page) = InternalPage::from_url(url) {
            self.tabs.update_tab_title(tab_id, page.title())?;
        }

        if !internal_pages::is_internal_url(url) {
            if let Err(e) = self.history.add_visit(url, title) {
                tracing::error!(url = %url, error = %e, "Failed to record history visit");
            }
        }
        Ok(())
    }

    /// Window title for the active tab.
    pub fn window_title(&self) -> String {
        let title = self
            .tabs
            .get_active_tab()
            .map(|t| t.title.clone())
            .unwrap_or_default();
        tab_manager::window_title(&title, self.config.product_name())
    }

    /// Renders an internal page with its placeholders filled in.
    pub fn render_page(&self, url: &str) -> String {
        let mut vars: HashMap<&str, String> = HashMap::new();
        let settings = self.settings.get_settings();

        vars.insert("APP_NAME", self.config.product_name().to_string());
        vars.insert("APP_VERSION", env!("CARGO_PKG_VERSION").to_string());
        vars.insert("SCHEME", self.config.scheme.name().to_string());
        vars.insert("THEME", self.theme.as_str().to_string());
        vars.insert("ACCENT_COLOR", internal_pages::escape_html(&settings.appearance.accent_color));
        vars.insert("SEARCH_URL", self.search_engine().prefix().to_string());
        vars.insert("BRIDGE_SCRIPT", self.bridge_script().replace("</", "<\\/"));

        match InternalPage::from_url(url) {
            Some(InternalPage::History) => {
                let items = self.history.get_recent(HISTORY_PAGE_LIMIT).unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Failed to read history for page");
                    Vec::new()
                });
                vars.insert("HISTORY_DATA", internal_pages::json_for_script(&json!(items)));
            }
            Some(InternalPage::Bookmarks) | Some(InternalPage::NewTab) => {
                vars.insert("BOOKMARKS_DATA", internal_pages::json_for_script(&json!(self.bookmarks.get_all())));
                vars.insert("FOLDERS_DATA", internal_pages::json_for_script(&json!(self.bookmarks.get_folders())));
            }
            Some(InternalPage::Downloads) => {
                vars.insert("DOWNLOADS_DATA", internal_pages::json_for_script(&json!(self.downloads.get_all())));
            }
            Some(InternalPage::Extensions) => {
                vars.insert(
                    "EXTENSIONS_DATA",
                    internal_pages::json_for_script(&json!(self.extensions.get_extensions())),
                );
            }
            Some(InternalPage::Settings) | Some(InternalPage::Setup) => {}
            None => {}
        }
        vars.insert("SETTINGS_DATA", internal_pages::json_for_script(&self.settings_snapshot()));

        self.pages.render_url(url, self.config.product_name(), &vars)
    }

    /// Settings as sent to pages, with the session theme applied.
    pub fn settings_snapshot(&self) -> Value {
        let mut snapshot = self.settings.bridge_snapshot();
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("theme".to_string(), json!(self.theme.as_str()));
            obj.insert("darkMode".to_string(), json!(self.theme == ThemeMode::Dark));
            obj.insert("scheme".to_string(), json!(self.config.scheme.name()));
        }
        snapshot
    }
}
