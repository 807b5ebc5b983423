//! Address bar input handling: decides whether text is a URL or a search.

use crate::services::internal_pages::InternalScheme;

const KNOWN_TLDS: &[&str] = &[
    ".com", ".org", ".net", ".io", ".co", ".dev", ".app", ".gov", ".edu", ".ai", ".tech", ".cloud",
    ".design", ".blog", ".info", ".biz", ".us", ".uk", ".eu", ".de", ".fr", ".jp", ".cn", ".ru", ".in",
    ".br",
];

/// Search providers the address bar can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    DuckDuckGo,
    Bing,
    Brave,
    Ecosia,
    Startpage,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 6] = [
        SearchEngine::Google,
        SearchEngine::DuckDuckGo,
        SearchEngine::Bing,
        SearchEngine::Brave,
        SearchEngine::Ecosia,
        SearchEngine::Startpage,
    ];

    /// Looks an engine up by its settings name. Unknown names mean Google.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "duckduckgo" => SearchEngine::DuckDuckGo,
            "bing" => SearchEngine::Bing,
            "brave" => SearchEngine::Brave,
            "ecosia" => SearchEngine::Ecosia,
            "startpage" => SearchEngine::Startpage,
            _ => SearchEngine::Google,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::Bing => "bing",
            SearchEngine::Brave => "brave",
            SearchEngine::Ecosia => "ecosia",
            SearchEngine::Startpage => "startpage",
        }
    }

    /// Query URL prefix; the encoded query is appended as-is.
    pub fn prefix(self) -> &'static str {
        match self {
            SearchEngine::Google => "https://www.google.com/search?q=",
            SearchEngine::DuckDuckGo => "https://duckduckgo.com/?q=",
            SearchEngine::Bing => "https://www.bing.com/search?q=",
            SearchEngine::Brave => "https://search.brave.com/search?q=",
            SearchEngine::Ecosia => "https://www.ecosia.org/search?q=",
            SearchEngine::Startpage => "https://www.startpage.com/do/dsearch?query=",
        }
    }

    pub fn search_url(self, query: &str) -> String {
        format!("{}{}", self.prefix(), encode_query(query))
    }
}

/// Turns address bar text into a URL to load.
pub fn process_url_input(input: &str, scheme: InternalScheme, engine: SearchEngine) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return format!("{}newtab", scheme.prefix());
    }

    let lower = trimmed.to_ascii_lowercase();
    let keep_as_is = InternalScheme::ALL.iter().any(|s| lower.starts_with(s.prefix()))
        || ["http://", "https://", "file://", "about:"]
            .iter()
            .any(|p| lower.starts_with(p));
    if keep_as_is {
        return trimmed.to_string();
    }

    if is_url(trimmed) {
        return format!("https://{}", trimmed);
    }

    engine.search_url(trimmed)
}

/// Heuristic for "looks like a host name".
pub fn is_url(input: &str) -> bool {
    if input.is_empty() || input.contains(' ') {
        return false;
    }

    let host = input.split('/').next().unwrap_or(input);
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    if let Some(port) = host.to_ascii_lowercase().strip_prefix("localhost:") {
        return !port.is_empty() && port.chars().all(|c| c.is_ascii_digit());
    }

    let lower = input.to_ascii_lowercase();
    if KNOWN_TLDS
        .iter()
        .any(|tld| lower.len() > tld.len() && lower.ends_with(tld))
    {
        return true;
    }

    input.contains('.') && !input.contains("..")
}

/// Form-encodes a query: ASCII alphanumerics stay, spaces become `+`,
/// every other byte becomes `%XX`.
pub fn encode_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len() * 3);
    for b in query.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(b as char),
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(b"0123456789ABCDEF"[(b >> 4) as usize]));
                out.push(char::from(b"0123456789ABCDEF"[(b & 0xf) as usize]));
            }
        }
    }
    out
}

/// Short label for a URL when the page has no title yet.
pub fn title_from_url(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split('/')
        .next()
        .filter(|host| !host.is_empty())
        .unwrap_or(url)
        .to_string()
}
