//! Content Blocker for Sea Browser.
//!
//! Decides whether a navigation or request is allowed: tracker blocking by
//! domain substring, ad path patterns, and the HTTPS-only upgrade.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::services::internal_pages::is_internal_url;
use crate::types::settings::{TrackingProtection, UserAgent};

/// Trackers blocked at the standard level.
const BASE_TRACKER_DOMAINS: &[&str] = &[
    "google-analytics.com", "googletagmanager.com", "doubleclick.net",
    "googlesyndication.com", "facebook.net", "connect.facebook.net",
    "analytics.twitter.com", "ads.twitter.com", "hotjar.com",
    "mixpanel.com", "segment.io", "amplitude.com",
];

/// Added on top of the base list at the strict level.
const EXTENDED_TRACKER_DOMAINS: &[&str] = &[
    // Google
    "analytics.google.com", "adservice.google.com", "pagead2.googlesyndication.com",
    "googleadservices.com",
    // Facebook / Meta
    "pixel.facebook.com", "graph.facebook.com",
    // Amazon
    "amazon-adsystem.com",
    // Analytics & tracking
    "scorecardresearch.com", "quantserve.com", "segment.com", "heapanalytics.com",
    "fullstory.com", "mouseflow.com", "crazyegg.com", "luckyorange.com",
    "clarity.ms", "nr-data.net",
    // Ad networks
    "outbrain.com", "taboola.com", "criteo.com", "criteo.net",
    "adsrvr.org", "adnxs.com", "rubiconproject.com", "pubmatic.com",
    "openx.net", "casalemedia.com", "moatads.com", "doubleverify.com",
    "adsafeprotected.com",
    // Social trackers
    "syndication.twitter.com", "snap.licdn.com", "static.ads-twitter.com",
    // Other trackers
    "bat.bing.com", "ads.yahoo.com", "mc.yandex.ru", "analytics.tiktok.com",
];

/// Known ad-serving URL path patterns, checked when ad blocking is on.
const AD_PATH_PATTERNS: &[&str] = &[
    "/ads/", "/adserver", "/adclick", "/pagead/", "/doubleclick/", "/adsense/",
];

/// Outcome of checking a top-level navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Block,
    /// Load this `https://` URL instead.
    Upgrade(String),
}

/// Domain-list content blocker.
pub struct ContentBlocker {
    blocked_domains: Vec<&'static str>,
    block_ad_paths: bool,
    blocked_count: AtomicU64,
}

impl ContentBlocker {
    /// A blocker at the standard level.
    pub fn new() -> Self {
        let mut blocker = Self {
            blocked_domains: Vec::new(),
            block_ad_paths: false,
            blocked_count: AtomicU64::new(0),
        };
        blocker.configure(TrackingProtection::Standard, false);
        blocker
    }

    /// Rebuilds the filter list for a protection level.
    pub fn configure(&mut self, protection: TrackingProtection, block_ads: bool) {
        self.blocked_domains = match protection {
            TrackingProtection::Off => Vec::new(),
            TrackingProtection::Standard => BASE_TRACKER_DOMAINS.to_vec(),
            TrackingProtection::Strict => BASE_TRACKER_DOMAINS
                .iter()
                .chain(EXTENDED_TRACKER_DOMAINS.iter())
                .copied()
                .collect(),
        };
        self.block_ad_paths = block_ads && protection != TrackingProtection::Off;
        tracing::debug!(
            domains = self.blocked_domains.len(),
            ad_paths = self.block_ad_paths,
            "Content blocker configured"
        );
    }

    /// Substring match against the filter list. Counts every hit.
    pub fn is_blocked(&self, url: &str) -> bool {
        let lower = url.to_ascii_lowercase();
        let hit = self.blocked_domains.iter().any(|d| lower.contains(d))
            || (self.block_ad_paths && AD_PATH_PATTERNS.iter().any(|p| lower.contains(p)));
        if hit {
            self.blocked_count.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    pub fn blocked_count(&self) -> u64 {
        self.blocked_count.load(Ordering::Relaxed)
    }

    pub fn domain_count(&self) -> usize {
        self.blocked_domains.len()
    }

    /// Internal pages always load. Blocked URLs are refused. Plain `http://`
    /// is upgraded under HTTPS-only, except for local hosts.
    pub fn check_navigation(&self, url: &str, https_only: bool) -> NavigationDecision {
        if is_internal_url(url) {
            return NavigationDecision::Allow;
        }
        if self.is_blocked(url) {
            tracing::debug!(url = %url, "Navigation blocked");
            return NavigationDecision::Block;
        }
        if https_only {
            if let Some(rest) = strip_http(url) {
                if !is_local_host(rest) {
                    return NavigationDecision::Upgrade(format!("https://{}", rest));
                }
            }
        }
        NavigationDecision::Allow
    }
}

impl Default for ContentBlocker {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_http(url: &str) -> Option<&str> {
    let head = url.get(..7)?;
    if head.eq_ignore_ascii_case("http://") {
        url.get(7..)
    } else {
        None
    }
}

fn is_local_host(rest: &str) -> bool {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
    host == "localhost" || host == "127.0.0.1"
}

/// User agent header string for the chosen browser identity.
pub fn user_agent_string(agent: UserAgent) -> &'static str {
    match agent {
        UserAgent::Chrome => {
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36"
        }
        UserAgent::Firefox => {
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:134.0) Gecko/20100101 Firefox/134.0"
        }
        UserAgent::Safari => {
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.3 Safari/605.1.15"
        }
    }
}
