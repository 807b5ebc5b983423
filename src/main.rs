//! Sea Browser: a privacy-minded browser shell around the system webview.
//!
//! Entry point: prepares the GTK environment, sets up logging and opens the
//! browser window. When built without the `gui` feature, runs a console demo.

use seabrowser::config::{init_logging, AppConfig};
use seabrowser::platform;

#[cfg(feature = "gui")]
fn main() {
    platform::prepare_csd_environment();
    init_logging();

    let config = AppConfig::from_env();
    tracing::info!(product = config.product_name(), version = env!("CARGO_PKG_VERSION"), "Starting");

    if let Err(e) = seabrowser::ui::webview_app::run(config) {
        tracing::error!(error = %e, "Browser exited with an error");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    platform::prepare_csd_environment();
    init_logging();

    let mut config = AppConfig::from_env();
    // Keep the demo away from the real profile unless one was chosen.
    if std::env::var(seabrowser::config::ENV_DATA_DIR).is_err() {
        let demo_dir = std::env::temp_dir().join("seabrowser-demo");
        config.data_dir = demo_dir.join("data");
        config.config_dir = demo_dir.join("config");
    }

    println!();
    println!("  {} v{} (console mode)", config.product_name(), env!("CARGO_PKG_VERSION"));
    println!();

    if let Err(e) = demo::run(config) {
        eprintln!("demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
mod demo {
    use seabrowser::app::App;
    use seabrowser::bridge::handle_with_app;
    use seabrowser::config::AppConfig;
    use seabrowser::managers::bookmark_manager::BookmarkManagerTrait;
    use seabrowser::managers::history_manager::HistoryManagerTrait;
    use seabrowser::managers::shortcut_manager::ShortcutManagerTrait;
    use seabrowser::managers::tab_manager::TabManagerTrait;
    use seabrowser::services::internal_pages::InternalPage;
    use seabrowser::services::settings_engine::SettingsEngineTrait;
    use serde_json::json;

    fn section(name: &str) {
        println!("───────────────────────────────────────────────────────────────");
        println!("  {}", name);
        println!("───────────────────────────────────────────────────────────────");
    }

    pub fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = App::new(config)?;

        section("Startup");
        let url = app.startup();
        println!("  Initial page: {}", url);
        println!("  Settings file: {}", app.settings.get_config_path().display());
        println!();

        section("Address bar");
        for input in ["example.com", "rust ownership", "localhost:8080", "settings"] {
            println!("  {:<18} -> {}", input, app.process_input(input));
        }
        println!();

        section("Tabs and history");
        let tab = app.tabs.get_active_tab().map(|t| t.id.clone()).unwrap_or_default();
        app.record_navigation(&tab, "https://www.rust-lang.org/", "Rust Programming Language")?;
        println!("  Window title: {}", app.window_title());
        println!("  History entries: {}", app.history.count()?);
        println!();

        section("Bridge");
        let reply = handle_with_app(&mut app, "sea", &json!({"action": "addBookmark", "url": "https://docs.rs", "title": "Docs.rs"}))?;
        println!("  addBookmark -> {}", reply);
        println!("  Bookmarks: {}", app.bookmarks.get_all().len());
        let reply = handle_with_app(&mut app, "sea", &json!({"action": "shortcut", "keys": "Ctrl+T"}))?;
        println!("  Ctrl+T -> {}", reply);
        println!("  Shortcuts registered: {}", app.shortcuts.list_shortcuts().len());
        println!();

        section("Internal pages");
        let html = app.render_page(&app.config.scheme.url(InternalPage::NewTab));
        println!("  newtab rendered: {} bytes", html.len());
        println!();

        app.shutdown();
        Ok(())
    }
}
