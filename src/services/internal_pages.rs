//! Internal pages (`sea://` or `tsunami://`).
//!
//! Templates are embedded at build time from `resources/pages/`. A
//! resources directory can override them file by file. Rendering replaces
//! `{{KEY}}` placeholders natively before the HTML reaches the engine.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::types::errors::PageError;

/// Bridge helper and keyboard forwarding, injected into every page.
pub const TOOLBAR_JS: &str = include_str!("../../resources/ui/toolbar.js");

/// URL scheme of the internal pages, which also selects the shell flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalScheme {
    Sea,
    Tsunami,
}

impl InternalScheme {
    pub const ALL: [InternalScheme; 2] = [InternalScheme::Sea, InternalScheme::Tsunami];

    /// Scheme name without the separator, as registered with the webview.
    pub fn name(self) -> &'static str {
        match self {
            InternalScheme::Sea => "sea",
            InternalScheme::Tsunami => "tsunami",
        }
    }

    /// `sea://` or `tsunami://`.
    pub fn prefix(self) -> &'static str {
        match self {
            InternalScheme::Sea => "sea://",
            InternalScheme::Tsunami => "tsunami://",
        }
    }

    pub fn product_name(self) -> &'static str {
        match self {
            InternalScheme::Sea => "Sea Browser",
            InternalScheme::Tsunami => "Tsunami",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sea" => Some(InternalScheme::Sea),
            "tsunami" => Some(InternalScheme::Tsunami),
            _ => None,
        }
    }

    /// Whether `url` is served by this scheme's protocol handler, either as
    /// `sea://...` or as the `http(s)://sea.localhost/...` form Windows uses.
    pub fn owns_url(self, url: &str) -> bool {
        let url = url.trim_start();
        if strip_prefix_ignore_case(url, self.prefix()).is_some() {
            return true;
        }
        let Some(rest) = strip_prefix_ignore_case(url, "http://")
            .or_else(|| strip_prefix_ignore_case(url, "https://"))
        else {
            return false;
        };
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        host.eq_ignore_ascii_case(&format!("{}.localhost", self.name()))
    }

    /// Full URL of `page` under this scheme.
    pub fn url(self, page: InternalPage) -> String {
        format!("{}{}", self.prefix(), page.name())
    }
}

/// A page served under the internal scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalPage {
    NewTab,
    Settings,
    History,
    Bookmarks,
    Downloads,
    Extensions,
    Setup,
}

impl InternalPage {
    pub const ALL: [InternalPage; 7] = [
        InternalPage::NewTab,
        InternalPage::Settings,
        InternalPage::History,
        InternalPage::Bookmarks,
        InternalPage::Downloads,
        InternalPage::Extensions,
        InternalPage::Setup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InternalPage::NewTab => "newtab",
            InternalPage::Settings => "settings",
            InternalPage::History => "history",
            InternalPage::Bookmarks => "bookmarks",
            InternalPage::Downloads => "downloads",
            InternalPage::Extensions => "extensions",
            InternalPage::Setup => "setup",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            InternalPage::NewTab => "New Tab",
            InternalPage::Settings => "Settings",
            InternalPage::History => "History",
            InternalPage::Bookmarks => "Bookmarks",
            InternalPage::Downloads => "Downloads",
            InternalPage::Extensions => "Extensions",
            InternalPage::Setup => "Welcome",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Parses `sea://history`, `tsunami://settings/#privacy` and similar.
    /// The fragment, the query and trailing slashes are ignored.
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = InternalScheme::ALL
            .iter()
            .find_map(|s| strip_prefix_ignore_case(url.trim(), s.prefix()))?;
        let rest = rest.split(['#', '?']).next().unwrap_or("");
        let name = rest.trim_end_matches('/');
        Self::from_name(&name.to_ascii_lowercase())
    }

    fn embedded_template(self) -> &'static str {
        match self {
            InternalPage::NewTab => include_str!("../../resources/pages/newtab.html"),
            InternalPage::Settings => include_str!("../../resources/pages/settings.html"),
            InternalPage::History => include_str!("../../resources/pages/history.html"),
            InternalPage::Bookmarks => include_str!("../../resources/pages/bookmarks.html"),
            InternalPage::Downloads => include_str!("../../resources/pages/downloads.html"),
            InternalPage::Extensions => include_str!("../../resources/pages/extensions.html"),
            InternalPage::Setup => include_str!("../../resources/pages/setup.html"),
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

/// True for URLs under either internal scheme.
pub fn is_internal_url(url: &str) -> bool {
    InternalScheme::ALL
        .iter()
        .any(|s| strip_prefix_ignore_case(url.trim_start(), s.prefix()).is_some())
}

/// Resource names must stay inside the resources directory.
pub fn is_safe_resource_path(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('/') && !name.starts_with('\\') && !name.contains("..") && !name.contains(':')
}

/// Replaces every `{{KEY}}` that has a value in `vars`. Unknown
/// placeholders are left untouched.
pub fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key.trim()) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for use inside a double-quoted JS/JSON string literal.
pub fn escape_json_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// JSON that can sit inside a `<script>` element.
pub fn json_for_script(value: &Value) -> String {
    value
        .to_string()
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// 404 page naming the requested URL.
pub fn not_found_page(url: &str, product: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>Page not found - {product}</title>\
         <style>body{{font-family:system-ui,sans-serif;display:flex;align-items:center;justify-content:center;\
         height:100vh;margin:0;background:#0f172a;color:#e2e8f0}}code{{color:#93c5fd}}</style></head>\
         <body><div><h1>404</h1><p>{product} has no page at <code>{url}</code>.</p></div></body></html>",
        product = escape_html(product),
        url = escape_html(url),
    )
}

/// Loads page templates and renders them.
pub struct PageRenderer {
    override_dir: Option<PathBuf>,
}

impl PageRenderer {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    /// Template for `page`: `<override_dir>/<page>.html` when present,
    /// the embedded copy otherwise.
    pub fn template(&self, page: InternalPage) -> Result<Cow<'static, str>, PageError> {
        if let Some(dir) = &self.override_dir {
            let file_name = format!("{}.html", page.name());
            if !is_safe_resource_path(&file_name) {
                tracing::warn!(file = %file_name, "Rejected unsafe resource path");
                return Err(PageError::UnsafePath(file_name));
            }
            let path = dir.join(&file_name);
            if path.is_file() {
                return fs::read_to_string(&path)
                    .map(Cow::Owned)
                    .map_err(|e| PageError::TemplateMissing(format!("{}: {}", path.display(), e)));
            }
        }
        Ok(Cow::Borrowed(page.embedded_template()))
    }

    /// Reads a named resource (`pages/extra.css`) from the override directory.
    pub fn resource(&self, name: &str) -> Result<String, PageError> {
        if !is_safe_resource_path(name) {
            tracing::warn!(name = %name, "Rejected unsafe resource path");
            return Err(PageError::UnsafePath(name.to_string()));
        }
        let dir = self
            .override_dir
            .as_ref()
            .ok_or_else(|| PageError::TemplateMissing(name.to_string()))?;
        fs::read_to_string(dir.join(name)).map_err(|e| PageError::TemplateMissing(format!("{}: {}", name, e)))
    }

    pub fn render(&self, page: InternalPage, vars: &HashMap<&str, String>) -> Result<String, PageError> {
        let template = self.template(page)?;
        Ok(render_template(&template, vars))
    }

    /// Renders the page behind `url`, or the 404 page.
    pub fn render_url(&self, url: &str, product: &str, vars: &HashMap<&str, String>) -> String {
        let page = match InternalPage::from_url(url) {
            Some(page) => page,
            None => {
                tracing::debug!(url = %url, "Unknown internal page");
                return not_found_page(url, product);
            }
        };
        match self.render(page, vars) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Internal page unavailable");
                not_found_page(url, product)
            }
        }
    }
}
