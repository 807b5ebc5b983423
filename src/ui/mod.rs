//! Sea Browser UI layer.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! Every page, internal or external, runs inside the webview. The native
//! side talks to it over wry IPC.

pub mod webview_app;
