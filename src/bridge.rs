//! JS to native message handler.
//!
//! Internal pages post `{id, handler, action, ...}` through the webview IPC
//! channel (or through `seabrowser-bridge` on stdin). `handle_message`
//! dispatches to the managers held by `App` and returns the reply payload.

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::download_manager::DownloadManagerTrait;
use crate::managers::history_manager::HistoryManagerTrait;
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::managers::tab_manager::TabManagerTrait;
use crate::services::extension_manager::ExtensionManagerTrait;
use crate::services::internal_pages::{InternalPage, InternalScheme};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::{BookmarkError, DownloadError, ExtensionError, HistoryError, TabError};
use crate::types::shortcut::BrowserCommand;
use crate::types::tab::CloseOutcome;

#[cfg(feature = "network")]
use crate::services::update_manager::UpdateManagerTrait;

/// Rows returned by `getHistory` when the page doesn't ask for a limit.
const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Locks the app and dispatches one message.
pub fn handle_message(app: &Mutex<App>, handler: &str, body: &Value) -> Result<Value, String> {
    let mut app = app.lock().map_err(|e| e.to_string())?;
    handle_with_app(&mut app, handler, body)
}

/// Dispatches one message against an already locked app.
///
/// The legacy `settings` and `history` handlers read their own body shape;
/// every other handler name carries an `action` field.
pub fn handle_with_app(app: &mut App, handler: &str, body: &Value) -> Result<Value, String> {
    match handler {
        "settings" => {
            let key = str_field(body, "key")?;
            let value = body.get("value").cloned().unwrap_or(Value::Null);
            save_setting(app, key, &value)
        }
        "history" => match body.get("action").and_then(Value::as_str) {
            Some("clear") => reply("clearHistory", app.history.clear_history()),
            other => Err(format!("unknown history action: {}", other.unwrap_or(""))),
        },
        _ => {
            let action = str_field(body, "action")?;
            dispatch(app, action, body)
        }
    }
}

/// Whether a message posted by the page at `origin` may be dispatched.
///
/// Internal pages may call anything. Other pages only get the `shortcut`
/// action so bound accelerators keep working everywhere.
pub fn is_allowed_from(origin: &str, scheme: InternalScheme, handler: &str, body: &Value) -> bool {
    if scheme.owns_url(origin) {
        return true;
    }
    handler == "sea" && body.get("action").and_then(Value::as_str) == Some("shortcut")
}

fn dispatch(app: &mut App, action: &str, body: &Value) -> Result<Value, String> {
    tracing::debug!(action = %action, "Bridge message");
    match action {
        // ─── Settings ───
        "getSettings" => Ok(app.settings_snapshot()),
        "saveSetting" => {
            let key = str_field(body, "key")?;
            let value = body.get("value").cloned().unwrap_or(Value::Null);
            save_setting(app, key, &value)
        }
        "resetSettings" => {
            app.settings.reset().map_err(|e| e.to_string())?;
            app.apply_settings();
            Ok(app.settings_snapshot())
        }
        "completeSetup" => {
            if let Some(choices) = body.get("settings").and_then(Value::as_object) {
                for (key, value) in choices {
                    if let Err(e) = app.settings.set_from_bridge(key, value) {
                        tracing::warn!(key = %key, error = %e, "Ignoring setup choice");
                    }
                }
            }
            app.settings
                .set_value("general.setup_completed", json!(true))
                .map_err(|e| e.to_string())?;
            app.apply_settings();
            tracing::info!("First-run setup completed");
            let home = app.settings.get_settings().general.homepage.clone();
            Ok(json!({"ok": true, "navigate": home}))
        }

        // ─── History ───
        "getHistory" => {
            let limit = body
                .get("limit")
                .and_then(Value::as_u64)
                .map(|l| l as usize)
                .unwrap_or(DEFAULT_HISTORY_LIMIT);
            let items = match body.get("query").and_then(Value::as_str).filter(|q| !q.trim().is_empty()) {
                Some(query) => app.history.search(query, limit),
                None => app.history.get_recent(limit),
            }
            .map_err(|e| e.to_string())?;
            Ok(json!(items))
        }
        "clearHistory" => reply(action, app.history.clear_history()),
        "deleteHistoryItem" => {
            let url = str_field(body, "url")?;
            reply(action, app.history.delete_history_item(url))
        }

        // ─── Bookmarks ───
        "getBookmarks" => {
            let list: Vec<_> = match (
                body.get("folder").and_then(Value::as_str),
                body.get("query").and_then(Value::as_str),
            ) {
                (_, Some(query)) if !query.trim().is_empty() => app.bookmarks.search(query),
                (Some(folder), _) => app.bookmarks.get_in_folder(folder),
                _ => app.bookmarks.get_all().iter().collect(),
            };
            Ok(json!(list))
        }
        "getFolders" => Ok(json!(app.bookmarks.get_folders())),
        "addBookmark" => {
            let url = str_field(body, "url")?;
            let title = body.get("title").and_then(Value::as_str).unwrap_or("");
            let folder = body.get("folder").and_then(Value::as_str);
            let bookmark = app
                .bookmarks
                .add_bookmark(title, url, folder)
                .map_err(|e| e.to_string())?;
            Ok(json!(bookmark))
        }
        "updateBookmark" => {
            let id = str_field(body, "id")?;
            let title = body.get("title").and_then(Value::as_str).unwrap_or("");
            let url = str_field(body, "url")?;
            let folder = body.get("folder").and_then(Value::as_str).unwrap_or("");
            reply(action, app.bookmarks.update_bookmark(id, title, url, folder))
        }
        "deleteBookmark" => {
            let id = str_field(body, "id")?;
            reply(action, app.bookmarks.delete_bookmark(id))
        }
        "toggleBookmark" => {
            let url = str_field(body, "url")?;
            let title = body.get("title").and_then(Value::as_str).unwrap_or("");
            let bookmarked = app.bookmarks.toggle_bookmark(url, title).map_err(|e| e.to_string())?;
            Ok(json!({"bookmarked": bookmarked}))
        }
        "isBookmarked" => {
            let url = str_field(body, "url")?;
            Ok(json!({"bookmarked": app.bookmarks.is_bookmarked(url)}))
        }

        // ─── Downloads ───
        "getDownloads" => Ok(json!(app.downloads.get_all())),
        "pauseDownload" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.pause_download(id))
        }
        "resumeDownload" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.resume_download(id))
        }
        "cancelDownload" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.cancel_download(id))
        }
        "retryDownload" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.retry_download(id))
        }
        "removeDownload" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.remove_download(id))
        }
        "clearCompletedDownloads" => {
            let removed = app.downloads.clear_completed().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "removed": removed}))
        }
        "openDownload" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.open_file(id))
        }
        "showInFolder" => {
            let id = str_field(body, "id")?;
            reply(action, app.downloads.show_in_folder(id))
        }
        "openDownloadsFolder" => reply(action, app.downloads.open_downloads_folder()),

        // ─── Extensions ───
        "getExtensions" => Ok(json!(app.extensions.get_extensions())),
        "toggleExtension" => {
            let name = str_field(body, "name")?;
            let enabled = body.get("enabled").and_then(Value::as_bool).unwrap_or(true);
            reply(action, app.extensions.toggle_extension(name, enabled))
        }
        "installExtension" => {
            let path = str_field(body, "path")?;
            let name = app
                .extensions
                .install_from_path(Path::new(path))
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "name": name}))
        }
        "uninstallExtension" => {
            let name = str_field(body, "name")?;
            reply(action, app.extensions.uninstall(name))
        }

        // ─── Tabs ───
        "getTabs" => {
            let tabs = app.tabs.get_all_tabs();
            let active = app.tabs.get_active_tab().map(|t| t.id.clone());
            Ok(json!({"tabs": tabs, "active": active}))
        }
        "newTab" => {
            let url = match body.get("url").and_then(Value::as_str).filter(|u| !u.trim().is_empty()) {
                Some(input) => app.process_input(input),
                None => app.config.scheme.url(InternalPage::NewTab),
            };
            let id = app.tabs.create_tab(&url, true);
            Ok(json!({"tabId": id, "navigate": url}))
        }
        "closeTab" => {
            let id = tab_id_or_active(app, body)?;
            close_tab(app, &id)
        }
        "switchTab" => {
            let id = str_field(body, "id")?;
            match app.tabs.switch_tab(id) {
                Ok(()) => Ok(navigate_active(app)),
                Err(e) => reply(action, Err::<(), _>(e)),
            }
        }
        "reopenClosedTab" => match app.tabs.reopen_closed_tab() {
            Ok(id) => Ok(json!({"tabId": id, "navigate": active_url(app)})),
            Err(e) => reply(action, Err::<(), _>(e)),
        },
        "duplicateTab" => {
            let id = tab_id_or_active(app, body)?;
            match app.tabs.duplicate_tab(&id) {
                Ok(new_id) => Ok(json!({"tabId": new_id, "navigate": active_url(app)})),
                Err(e) => reply(action, Err::<(), _>(e)),
            }
        }
        "pinTab" => {
            let id = tab_id_or_active(app, body)?;
            reply(action, app.tabs.pin_tab(&id))
        }
        "unpinTab" => {
            let id = tab_id_or_active(app, body)?;
            reply(action, app.tabs.unpin_tab(&id))
        }

        // ─── Navigation ───
        "navigate" => {
            let input = body
                .get("url")
                .or_else(|| body.get("input"))
                .and_then(Value::as_str)
                .ok_or("missing url")?;
            let url = app.process_input(input);
            if url.is_empty() {
                return Ok(json!({"ok": false}));
            }
            Ok(json!({"navigate": url}))
        }
        "shortcut" => {
            let command = match body.get("keys").and_then(Value::as_str) {
                Some(keys) => app.shortcuts.resolve(keys),
                None => {
                    let name = str_field(body, "command")?;
                    let index = body.get("index").and_then(Value::as_u64).map(|i| i as usize);
                    BrowserCommand::from_name(name, index)
                }
            };
            match command {
                Some(command) => Ok(run_command(app, command)),
                None => Ok(json!({"ok": false})),
            }
        }

        // ─── Updates ───
        #[cfg(feature = "network")]
        "checkForUpdates" => match app.updates.check_for_updates().map_err(|e| e.to_string())? {
            Some(info) => Ok(json!({"available": true, "update": info})),
            None => Ok(json!({"available": false, "version": app.updates.get_current_version()})),
        },

        _ => Err(format!("unknown action: {}", action)),
    }
}

/// Applies a browser command to the app state and describes what the UI
/// still has to do. Commands that only touch the webview come back as
/// `{"command": name}`.
pub fn run_command(app: &mut App, command: BrowserCommand) -> Value {
    let name = command.name();
    match command {
        BrowserCommand::NewTab => {
            let url = app.config.scheme.url(InternalPage::NewTab);
            let id = app.tabs.create_tab(&url, true);
            json!({"command": name, "tabId": id, "navigate": url})
        }
        BrowserCommand::CloseTab => {
            let active = app.tabs.get_active_tab().map(|t| t.id.clone());
            match active.map(|id| close_tab(app, &id)) {
                Some(Ok(mut value)) => {
                    value["command"] = json!(name);
                    value
                }
                _ => json!({"command": name, "closeWindow": true}),
            }
        }
        BrowserCommand::ReopenClosedTab => match app.tabs.reopen_closed_tab() {
            Ok(id) => json!({"command": name, "tabId": id, "navigate": active_url(app)}),
            Err(e) => {
                tracing::debug!(error = %e, "Nothing to reopen");
                json!({"command": name, "ok": false})
            }
        },
        BrowserCommand::NextTab | BrowserCommand::PreviousTab | BrowserCommand::SelectLastTab => {
            let switched = match command {
                BrowserCommand::NextTab => app.tabs.next_tab(),
                BrowserCommand::PreviousTab => app.tabs.previous_tab(),
                _ => app.tabs.select_last(),
            };
            match switched {
                Some(id) => json!({"command": name, "tabId": id, "navigate": active_url(app)}),
                None => json!({"command": name, "ok": false}),
            }
        }
        BrowserCommand::SelectTab(index) => match app.tabs.select_index(index) {
            Ok(id) => json!({"command": name, "index": index, "tabId": id, "navigate": active_url(app)}),
            Err(_) => json!({"command": name, "index": index, "ok": false}),
        },
        BrowserCommand::ZoomIn | BrowserCommand::ZoomOut | BrowserCommand::ZoomReset => {
            let Some(id) = app.tabs.get_active_tab().map(|t| t.id.clone()) else {
                return json!({"command": name, "ok": false});
            };
            let zoom = match command {
                BrowserCommand::ZoomIn => app.tabs.zoom_in(&id),
                BrowserCommand::ZoomOut => app.tabs.zoom_out(&id),
                _ => app.tabs.zoom_reset(&id),
            };
            match zoom {
                Ok(level) => json!({"command": name, "zoom": level}),
                Err(_) => json!({"command": name, "ok": false}),
            }
        }
        BrowserCommand::ShowHistory | BrowserCommand::ShowDownloads => {
            let page = if command == BrowserCommand::ShowHistory {
                InternalPage::History
            } else {
                InternalPage::Downloads
            };
            let url = app.config.scheme.url(page);
            let id = app.tabs.create_tab(&url, true);
            json!({"command": name, "tabId": id, "navigate": url})
        }
        BrowserCommand::BookmarkPage => {
            let Some((url, title)) = app.tabs.get_active_tab().map(|t| (t.url.clone(), t.title.clone())) else {
                return json!({"command": name, "ok": false});
            };
            match app.bookmarks.toggle_bookmark(&url, &title) {
                Ok(bookmarked) => json!({"command": name, "bookmarked": bookmarked}),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Bookmark toggle failed");
                    json!({"command": name, "ok": false})
                }
            }
        }
        BrowserCommand::ClearBrowsingData => {
            let cleared = app.history.clear_history().is_ok();
            json!({"command": name, "ok": cleared})
        }
        _ => json!({"command": name}),
    }
}

fn close_tab(app: &mut App, id: &str) -> Result<Value, String> {
    match app.tabs.close_tab(id) {
        Ok(CloseOutcome::LastTabClosed) => Ok(json!({"closeWindow": true})),
        Ok(CloseOutcome::Closed) => Ok(navigate_active(app)),
        Err(e) => reply("closeTab", Err::<(), _>(e)),
    }
}

fn active_url(app: &App) -> String {
    app.tabs.get_active_tab().map(|t| t.url.clone()).unwrap_or_default()
}

fn navigate_active(app: &App) -> Value {
    match app.tabs.get_active_tab() {
        Some(tab) => json!({"tabId": tab.id, "navigate": tab.url}),
        None => json!({"ok": true}),
    }
}

fn tab_id_or_active(app: &App, body: &Value) -> Result<String, String> {
    match body.get("id").and_then(Value::as_str) {
        Some(id) => Ok(id.to_string()),
        None => app
            .tabs
            .get_active_tab()
            .map(|t| t.id.clone())
            .ok_or_else(|| "no active tab".to_string()),
    }
}

/// Stores one setting (the engine persists it) and pushes it into the live
/// services.
fn save_setting(app: &mut App, key: &str, value: &Value) -> Result<Value, String> {
    app.settings.set_from_bridge(key, value).map_err(|e| e.to_string())?;
    app.apply_settings();
    tracing::debug!(key = %key, "Setting saved");
    Ok(json!({"ok": true}))
}

fn str_field<'a>(body: &'a Value, field: &str) -> Result<&'a str, String> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing {}", field))
}

/// Errors that mean "the item is already gone".
trait MissingItem {
    fn is_not_found(&self) -> bool;
}

impl MissingItem for HistoryError {
    fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::NotFound(_))
    }
}

impl MissingItem for BookmarkError {
    fn is_not_found(&self) -> bool {
        matches!(self, BookmarkError::NotFound(_))
    }
}

impl MissingItem for DownloadError {
    fn is_not_found(&self) -> bool {
        matches!(self, DownloadError::NotFound(_))
    }
}

impl MissingItem for ExtensionError {
    fn is_not_found(&self) -> bool {
        matches!(self, ExtensionError::NotFound(_))
    }
}

impl MissingItem for TabError {
    fn is_not_found(&self) -> bool {
        matches!(self, TabError::NotFound(_) | TabError::InvalidIndex(_) | TabError::NothingToReopen)
    }
}

/// `{"ok": true}` on success. A missing item is logged and answered with
/// `{"ok": false}`; anything else becomes an error reply.
fn reply<T, E>(action: &str, result: Result<T, E>) -> Result<Value, String>
where
    E: MissingItem + fmt::Display,
{
    match result {
        Ok(_) => Ok(json!({"ok": true})),
        Err(e) if e.is_not_found() => {
            tracing::warn!(action = %action, error = %e, "Bridge target not found");
            Ok(json!({"ok": false}))
        }
        Err(e) => Err(e.to_string()),
    }
}
