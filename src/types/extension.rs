use serde::{Deserialize, Serialize};

/// How an extension was packaged on disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    /// A single `.js` file in the extensions directory.
    UserScript,
    /// A directory with a `manifest.json`.
    Package,
}

/// The subset of `manifest.json` the browser understands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtensionManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub content_scripts: Vec<ContentScript>,
    pub background: Option<Background>,
}

/// A content script entry; only the script files are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentScript {
    #[serde(default)]
    pub js: Vec<String>,
}

/// Background section of a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Background {
    #[serde(default)]
    pub scripts: Vec<String>,
}

/// A loaded extension with its resolved script source.
#[derive(Debug, Clone, Serialize)]
pub struct Extension {
    pub name: String,
    pub version: String,
    pub description: String,
    pub path: String,
    pub kind: ExtensionKind,
    pub enabled: bool,
    #[serde(skip)]
    pub script: String,
}
