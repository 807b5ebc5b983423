//! WebView-based browser window using `wry` + `tao`.
//!
//! Architecture:
//! - One webview per window; switching tabs loads the tab's URL into it.
//! - Internal pages are served through a custom protocol named after the
//!   scheme (`sea` or `tsunami`) and rendered by `App::render_page`.
//! - The toolbar bridge and enabled extensions are injected with
//!   `with_initialization_script`. Internal pages also inline the bridge
//!   because init scripts don't run on custom-protocol pages on Windows.
//! - IPC from JS to Rust via `window.ipc.postMessage()`; replies go back
//!   through `window.__seaBridgeReply(id, result, error)`.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::{Fullscreen, Window, WindowBuilder};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

use crate::app::App;
use crate::bridge;
use crate::config::AppConfig;
use crate::managers::download_manager::DownloadManagerTrait;
use crate::managers::tab_manager::TabManagerTrait;
use crate::services::content_blocker::NavigationDecision;
use crate::services::internal_pages::InternalScheme;
use crate::services::settings_engine::SettingsEngineTrait;

#[derive(Debug)]
enum UserEvent {
    LoadUrl(String),
    EvalScript(String),
    /// A browser command the webview or window has to carry out.
    Command(String),
    Zoom(f64),
    PageLoaded(String),
    RecordVisit { url: String, title: String },
    TitleChanged(String),
    CloseWindow,
}

type SharedApp = Arc<Mutex<App>>;

/// Runs `f` with the app locked. A poisoned lock is logged and skipped.
fn with_app<R>(state: &Mutex<App>, f: impl FnOnce(&mut App) -> R) -> Option<R> {
    match state.lock() {
        Ok(mut app) => Some(f(&mut app)),
        Err(e) => {
            tracing::error!(error = %e, "App state poisoned");
            None
        }
    }
}

fn html_response(html: String) -> wry::http::Response<Cow<'static, [u8]>> {
    let body: Cow<'static, [u8]> = html.into_bytes().into();
    let mut response = wry::http::Response::new(body);
    response.headers_mut().insert(
        wry::http::header::CONTENT_TYPE,
        wry::http::HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

// ─── IPC handler ───

/// Handles one IPC message and queues everything the reply asks for.
fn handle_ipc(state: &Mutex<App>, proxy: &EventLoopProxy<UserEvent>, scheme: InternalScheme, origin: &str, message: &str) {
    let msg: Value = match serde_json::from_str(message) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed IPC message");
            return;
        }
    };
    let id = msg.get("id").cloned().unwrap_or(Value::Null);
    let handler = msg.get("handler").and_then(Value::as_str).unwrap_or("sea");

    if !bridge::is_allowed_from(origin, scheme, handler, &msg) {
        tracing::warn!(origin = %origin, handler = %handler, "Rejected bridge call from web page");
        let script = format!(
            "window.__seaBridgeReply && window.__seaBridgeReply({}, null, {})",
            id,
            json!("not allowed from this page")
        );
        let _ = proxy.send_event(UserEvent::EvalScript(script));
        return;
    }

    let outcome = with_app(state, |app| {
        let result = bridge::handle_with_app(app, handler, &msg);
        let zoom = app.tabs.get_active_tab().map(|t| t.zoom_level);
        (result, zoom)
    });
    let Some((result, active_zoom)) = outcome else {
        return;
    };

    let script = match &result {
        Ok(value) => format!("window.__seaBridgeReply && window.__seaBridgeReply({}, {}, null)", id, value),
        Err(err) => {
            tracing::warn!(handler = %handler, error = %err, "Bridge call failed");
            format!("window.__seaBridgeReply && window.__seaBridgeReply({}, null, {})", id, json!(err))
        }
    };
    let _ = proxy.send_event(UserEvent::EvalScript(script));

    let Ok(value) = result else {
        return;
    };
    if value.get("closeWindow").and_then(Value::as_bool) == Some(true) {
        let _ = proxy.send_event(UserEvent::CloseWindow);
        return;
    }
    if let Some(command) = value.get("command").and_then(Value::as_str) {
        let _ = proxy.send_event(UserEvent::Command(command.to_string()));
    }
    if let Some(zoom) = value.get("zoom").and_then(Value::as_f64) {
        let _ = proxy.send_event(UserEvent::Zoom(zoom));
    }
    if let Some(url) = value.get("navigate").and_then(Value::as_str) {
        let _ = proxy.send_event(UserEvent::LoadUrl(url.to_string()));
        if let Some(zoom) = active_zoom {
            let _ = proxy.send_event(UserEvent::Zoom(zoom));
        }
    }
}

/// Webview-side part of a browser command. Tab bookkeeping already
/// happened in the bridge.
fn run_webview_command(command: &str, webview: &WebView, window: &Window) {
    let script = match command {
        "reload" => Some("location.reload()"),
        "hard_reload" => Some("location.reload(true)"),
        "back" => Some("history.back()"),
        "forward" => Some("history.forward()"),
        "fullscreen" => {
            if window.fullscreen().is_some() {
                window.set_fullscreen(None);
            } else {
                window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            }
            None
        }
        "dev_tools" => {
            #[cfg(debug_assertions)]
            webview.open_devtools();
            None
        }
        _ => None,
    };
    let result = match script {
        Some(js) => webview.evaluate_script(js),
        // Pages may react to the rest (focus_address_bar, find, ...).
        None => webview.evaluate_script(&format!(
            "window.__seaCommand && window.__seaCommand({})",
            json!(command)
        )),
    };
    if let Err(e) = result {
        tracing::warn!(command = %command, error = %e, "Command script failed");
    }
}

// ─── Main entry point ───

/// Opens the browser window and runs the event loop until it closes.
pub fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scheme = config.scheme;
    let mut app = App::new(config)?;
    let initial_url = app.startup();

    let title = app.window_title();
    let user_agent = app.user_agent();
    let init_script = app.initialization_script();
    let initial_zoom = f64::from(app.settings.get_settings().appearance.zoom_level) / 100.0;

    let state: SharedApp = Arc::new(Mutex::new(app));

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // GTK_CSD=0 asks for server-side decorations; anything else keeps ours.
    let decorated = std::env::var("GTK_CSD").map(|v| v.trim() != "0").unwrap_or(true);

    let window = WindowBuilder::new()
        .with_title(title)
        .with_decorations(decorated)
        .with_inner_size(tao::dpi::LogicalSize::new(1280.0, 800.0))
        .build(&event_loop)?;

    let protocol_state = state.clone();
    let ipc_state = state.clone();
    let nav_state = state.clone();
    let dl_start_state = state.clone();
    let dl_done_state = state.clone();
    let popup_state = state.clone();

    let ipc_proxy = proxy.clone();
    let nav_proxy = proxy.clone();
    let load_proxy = proxy.clone();
    let title_proxy = proxy.clone();
    let popup_proxy = proxy.clone();

    let builder = WebViewBuilder::new()
        .with_custom_protocol(scheme.name().into(), move |_wv_id, request| {
            let url = request.uri().to_string();
            let html = with_app(&protocol_state, |app| app.render_page(&url)).unwrap_or_default();
            html_response(html)
        })
        .with_initialization_script(&init_script)
        .with_user_agent(user_agent)
        .with_url(&initial_url)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let origin = msg.uri().to_string();
            handle_ipc(&ipc_state, &ipc_proxy, scheme, &origin, msg.body());
        })
        .with_navigation_handler(move |url: String| {
            let decision = with_app(&nav_state, |app| app.check_navigation(&url)).unwrap_or(NavigationDecision::Allow);
            match decision {
                NavigationDecision::Allow => true,
                NavigationDecision::Block => {
                    tracing::info!(url = %url, "Blocked navigation");
                    false
                }
                NavigationDecision::Upgrade(https) => {
                    tracing::debug!(from = %url, to = %https, "Upgrading to HTTPS");
                    let _ = nav_proxy.send_event(UserEvent::LoadUrl(https));
                    false
                }
            }
        })
        .with_on_page_load_handler(move |event, url| {
            if let PageLoadEvent::Finished = event {
                let _ = load_proxy.send_event(UserEvent::PageLoaded(url));
            }
        })
        .with_document_title_changed_handler(move |title: String| {
            let _ = title_proxy.send_event(UserEvent::TitleChanged(title));
        })
        .with_download_started_handler(move |url: String, path: &mut PathBuf| {
            let suggested = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
            let started = with_app(&dl_start_state, |app| app.begin_download(&url, suggested.as_deref()));
            match started.flatten() {
                Some(target) => {
                    *path = target;
                    true
                }
                None => false,
            }
        })
        .with_download_completed_handler(move |url: String, _path: Option<PathBuf>, success: bool| {
            with_app(&dl_done_state, |app| {
                let Some(id) = app.downloads.find_in_progress_by_url(&url).map(|d| d.id.clone()) else {
                    return;
                };
                let result = if success {
                    app.downloads.complete_download(&id)
                } else {
                    app.downloads.fail_download(&id, "Download failed")
                };
                if let Err(e) = result {
                    tracing::error!(id = %id, error = %e, "Could not finish download");
                }
            });
        })
        .with_new_window_req_handler(move |url, _features| {
            if url.starts_with("http://") || url.starts_with("https://") {
                with_app(&popup_state, |app| app.tabs.create_tab(&url, true));
                let _ = popup_proxy.send_event(UserEvent::LoadUrl(url));
            }
            wry::NewWindowResponse::Deny
        })
        .with_devtools(cfg!(debug_assertions));

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().ok_or("window has no GTK container")?;
        builder.build_gtk(vbox)?
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window)?;

    if (initial_zoom - 1.0).abs() > f64::EPSILON {
        let _ = webview.zoom(initial_zoom);
    }
    tracing::info!(url = %initial_url, "Browser window ready");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            }
            | Event::UserEvent(UserEvent::CloseWindow) => {
                with_app(&state, |app| app.shutdown());
                *control_flow = ControlFlow::Exit;
            }

            Event::UserEvent(UserEvent::LoadUrl(url)) => {
                tracing::debug!(url = %url, "Loading");
                if let Err(e) = webview.load_url(&url) {
                    tracing::warn!(url = %url, error = %e, "load_url failed");
                }
            }
            Event::UserEvent(UserEvent::EvalScript(js)) => {
                let _ = webview.evaluate_script(&js);
            }
            Event::UserEvent(UserEvent::Command(command)) => {
                run_webview_command(&command, &webview, &window);
            }
            Event::UserEvent(UserEvent::Zoom(level)) => {
                let _ = webview.zoom(level);
            }
            Event::UserEvent(UserEvent::PageLoaded(url)) => {
                let visit_proxy = proxy.clone();
                let result = webview.evaluate_script_with_callback("document.title", move |raw: String| {
                    let title = serde_json::from_str::<String>(&raw).unwrap_or_default();
                    let _ = visit_proxy.send_event(UserEvent::RecordVisit { url: url.clone(), title });
                });
                if let Err(e) = result {
                    tracing::debug!(error = %e, "Could not read document title");
                }
            }
            Event::UserEvent(UserEvent::RecordVisit { url, title }) => {
                with_app(&state, |app| {
                    let Some(id) = app.tabs.get_active_tab().map(|t| t.id.clone()) else {
                        return;
                    };
                    let _ = app.tabs.set_loading(&id, false);
                    if let Err(e) = app.record_navigation(&id, &url, &title) {
                        tracing::warn!(url = %url, error = %e, "Could not record navigation");
                    }
                });
            }
            Event::UserEvent(UserEvent::TitleChanged(title)) => {
                let window_title = with_app(&state, |app| {
                    if let Some(id) = app.tabs.get_active_tab().map(|t| t.id.clone()) {
                        let _ = app.tabs.update_tab_title(&id, &title);
                    }
                    app.window_title()
                });
                if let Some(window_title) = window_title {
                    window.set_title(&window_title);
                }
            }

            _ => {}
        }
    })
}
