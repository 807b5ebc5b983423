// Sea Browser Settings Engine
// Loads, saves and updates user settings. Two on-disk formats are supported:
// pretty JSON (`tsunami_settings.json`) and a flat key=value file
// (`settings.conf`). Either can be XOR+Base64 obfuscated when
// `general.encrypt_settings` is on. The obfuscation only keeps casual readers out.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::types::errors::SettingsError;
use crate::types::settings::{BrowserSettings, ThemeMode};

/// Repeating XOR key for obfuscated settings files.
pub const ENCRYPTION_KEY: &str = "SeaBrowser_Secret_Key_2024_Wyind_Ryan";

/// First line of an obfuscated settings file.
pub const ENCRYPTED_HEADER: &str = "# [ENCRYPTED]\n";

const KEY_VALUE_TITLE: &str = "# Sea Browser Settings";

/// On-disk settings format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    KeyValue,
}

impl SettingsFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            SettingsFormat::Json => "tsunami_settings.json",
            SettingsFormat::KeyValue => "settings.conf",
        }
    }
}

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<BrowserSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &BrowserSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn set_from_bridge(&mut self, key: &str, value: &Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine that persists `BrowserSettings` in the config directory.
pub struct SettingsEngine {
    config_path: PathBuf,
    format: SettingsFormat,
    settings: BrowserSettings,
    defaults: BrowserSettings,
}

impl SettingsEngine {
    /// Creates an engine storing `format.file_name()` under `config_dir`.
    pub fn new(config_dir: &Path, format: SettingsFormat) -> Self {
        Self::with_defaults(config_dir, format, BrowserSettings::default())
    }

    /// Like `new`, but `reset()` and first-run loads use `defaults`.
    pub fn with_defaults(config_dir: &Path, format: SettingsFormat, defaults: BrowserSettings) -> Self {
        Self {
            config_path: config_dir.join(format.file_name()),
            format,
            settings: defaults.clone(),
            defaults,
        }
    }

    pub fn format(&self) -> SettingsFormat {
        self.format
    }

    /// Settings as the internal pages see them.
    pub fn bridge_snapshot(&self) -> Value {
        let s = &self.settings;
        json!({
            "darkMode": s.appearance.theme == ThemeMode::Dark,
            "accentColor": s.appearance.accent_color,
            "searchEngine": s.search.default_engine,
            "theme": s.appearance.theme.as_str(),
            "settings": s,
        })
    }

    /// Theme for this session. A valid `SEA_THEME` value wins over the stored one.
    pub fn effective_theme(&self, env_override: Option<&str>) -> ThemeMode {
        env_override
            .and_then(ThemeMode::parse)
            .unwrap_or(self.settings.appearance.theme)
    }

    /// Applies `value` at the dot path and returns the validated result
    /// without touching `self`.
    fn apply_value(&self, key: &str, value: Value) -> Result<BrowserSettings, SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let parts: Vec<&str> = key.split('.').collect();
        let (last, path) = match parts.split_last() {
            Some(split) => split,
            None => return Err(SettingsError::InvalidKey(key.to_string())),
        };

        let mut current = &mut json_value;
        for part in path {
            current = current
                .get_mut(*part)
                .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        }
        match current {
            Value::Object(map) if map.contains_key(*last) => {
                map.insert(last.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )))
            }
        }

        serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })
    }

    /// Tries each candidate in order; the first that validates is stored.
    fn set_first_valid(&mut self, key: &str, candidates: Vec<Value>) -> Result<(), SettingsError> {
        let mut last_err = SettingsError::InvalidValue(format!("No usable value for '{}'", key));
        for candidate in candidates {
            match self.apply_value(key, candidate) {
                Ok(updated) => {
                    self.settings = updated;
                    return self.save();
                }
                Err(e @ SettingsError::InvalidKey(_)) => return Err(e),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    fn read_file(&self) -> Result<(String, bool), SettingsError> {
        let raw = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        match raw.strip_prefix(ENCRYPTED_HEADER) {
            Some(payload) => Ok((decode_obfuscated(payload)?, true)),
            None => Ok((raw, false)),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from disk.
    ///
    /// A missing file yields the defaults, which are written out. A malformed
    /// JSON file is an error; key=value files are parsed leniently.
    fn load(&mut self) -> Result<BrowserSettings, SettingsError> {
        if !self.config_path.exists() {
            self.settings = self.defaults.clone();
            self.save()?;
            tracing::info!(path = %self.config_path.display(), "Settings file created with defaults");
            return Ok(self.settings.clone());
        }

        let (content, encrypted) = self.read_file()?;

        let mut settings = match self.format {
            SettingsFormat::Json => serde_json::from_str::<BrowserSettings>(&content).map_err(|e| {
                SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
            })?,
            SettingsFormat::KeyValue => parse_key_value(&content, &self.defaults)?,
        };
        if encrypted {
            settings.general.encrypt_settings = true;
        }

        self.settings = settings;
        tracing::debug!(path = %self.config_path.display(), encrypted, "Settings loaded");
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let body = match self.format {
            SettingsFormat::Json => serde_json::to_string_pretty(&self.settings).map_err(|e| {
                SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
            })?,
            SettingsFormat::KeyValue => to_key_value(&self.settings)?,
        };

        let content = if self.settings.general.encrypt_settings {
            format!("{}{}", ENCRYPTED_HEADER, encode_obfuscated(&body))
        } else {
            body
        };

        fs::write(&self.config_path, content).map_err(|e| {
            tracing::error!(path = %self.config_path.display(), error = %e, "Failed to save settings");
            SettingsError::IoError(format!("Failed to write config file: {}", e))
        })?;
        tracing::info!(path = %self.config_path.display(), "Settings saved");
        Ok(())
    }

    fn get_settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Updates one setting by dot path (`"privacy.https_only"`), validates the
    /// result by deserializing it, then saves.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let updated = self.apply_value(key, value)?;
        self.settings = updated;
        self.save()
    }

    /// Applies a setting sent by a page.
    ///
    /// Accepts bare field names from any section, dashed aliases
    /// (`https-only`), dashed enum values (`accept-all`) and the camelCase
    /// keys older pages use.
    fn set_from_bridge(&mut self, key: &str, value: &Value) -> Result<(), SettingsError> {
        match key {
            "darkMode" => {
                self.settings.appearance.theme = if truthy(value) { ThemeMode::Dark } else { ThemeMode::Light };
                return self.save();
            }
            "firstRun" => {
                self.settings.general.setup_completed = truthy(value);
                return self.save();
            }
            "zoom" | "zoom-level" | "zoomLevel" => {
                let percent = zoom_percent(value)
                    .ok_or_else(|| SettingsError::InvalidValue(format!("Invalid zoom: {}", value)))?;
                self.settings.appearance.zoom_level = percent;
                return self.save();
            }
            _ => {}
        }

        let field = match key {
            "search-engine" | "searchEngine" => "default_engine".to_string(),
            "accentColor" => "accent_color".to_string(),
            other => other.replace('-', "_"),
        };

        let current = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        let section = section_of(&current, &field).ok_or_else(|| SettingsError::InvalidKey(key.to_string()))?;
        let existing = current
            .get(section)
            .and_then(|s| s.get(field.as_str()))
            .cloned()
            .unwrap_or(Value::Null);

        let path = format!("{}.{}", section, field);
        self.set_first_valid(&path, candidates_from_value(&existing, value))
    }

    /// Restores the defaults and saves.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = self.defaults.clone();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}

/// XORs `data` with the repeating key.
pub fn xor_with_key(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Base64 of `body` XORed with `ENCRYPTION_KEY`.
pub fn encode_obfuscated(body: &str) -> String {
    BASE64.encode(xor_with_key(body.as_bytes(), ENCRYPTION_KEY.as_bytes()))
}

/// Reverses `encode_obfuscated`. Surrounding whitespace is ignored.
pub fn decode_obfuscated(payload: &str) -> Result<String, SettingsError> {
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| SettingsError::DecodeError(format!("Invalid Base64: {}", e)))?;
    String::from_utf8(xor_with_key(&bytes, ENCRYPTION_KEY.as_bytes()))
        .map_err(|e| SettingsError::DecodeError(format!("Invalid UTF-8 after decoding: {}", e)))
}

/// Renders settings in the key=value format, one `# Section` block each.
pub fn to_key_value(settings: &BrowserSettings) -> Result<String, SettingsError> {
    let value = serde_json::to_value(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;

    let mut out = String::from(KEY_VALUE_TITLE);
    out.push('\n');
    for section in BrowserSettings::SECTIONS {
        let fields = match value.get(section) {
            Some(Value::Object(fields)) => fields,
            _ => continue,
        };
        out.push_str(&format!("\n# {}\n", section_title(section)));
        for (key, v) in fields {
            out.push_str(&format!("{}={}\n", key, scalar_to_string(v)));
        }
    }
    Ok(out)
}

/// Parses the key=value format on top of `defaults`.
///
/// Unknown keys are logged and skipped. A value that does not fit its field
/// leaves that field at its default.
pub fn parse_key_value(content: &str, defaults: &BrowserSettings) -> Result<BrowserSettings, SettingsError> {
    let mut value = serde_json::to_value(defaults).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, raw) = match line.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => continue,
        };

        let section = match section_of(&value, key) {
            Some(s) => s,
            None => {
                tracing::warn!(key = %key, "Unknown settings key ignored");
                continue;
            }
        };
        let existing = value
            .get(section)
            .and_then(|s| s.get(key))
            .cloned()
            .unwrap_or(Value::Null);

        let mut applied = false;
        for candidate in candidates_from_str(&existing, raw) {
            let mut trial = value.clone();
            if let Some(Value::Object(fields)) = trial.get_mut(section) {
                fields.insert(key.to_string(), candidate);
            }
            if serde_json::from_value::<BrowserSettings>(trial.clone()).is_ok() {
                value = trial;
                applied = true;
                break;
            }
        }
        if !applied {
            tracing::warn!(key = %key, value = %raw, "Invalid settings value, keeping default");
        }
    }

    serde_json::from_value(value).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to build settings: {}", e))
    })
}

/// First section (in file order) holding a field called `key`.
fn section_of(settings: &Value, key: &str) -> Option<&'static str> {
    BrowserSettings::SECTIONS
        .iter()
        .copied()
        .find(|section| settings.get(*section).and_then(|s| s.get(key)).is_some())
}

fn section_title(section: &str) -> String {
    let mut chars = section.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.replace(['\n', '\r'], " "),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Values to try for a field whose current value is `existing`, parsed from text.
fn candidates_from_str(existing: &Value, raw: &str) -> Vec<Value> {
    match existing {
        Value::Bool(_) => vec![Value::Bool(raw == "true" || raw == "1")],
        Value::Number(_) => match raw.parse::<u64>() {
            Ok(n) => vec![json!(n)],
            Err(_) => Vec::new(),
        },
        _ => {
            let normalized = raw.replace('-', "_").to_ascii_lowercase();
            if normalized == raw {
                vec![Value::String(raw.to_string())]
            } else {
                vec![Value::String(raw.to_string()), Value::String(normalized)]
            }
        }
    }
}

fn candidates_from_value(existing: &Value, raw: &Value) -> Vec<Value> {
    match (existing, raw) {
        (_, Value::String(s)) => candidates_from_str(existing, s.trim()),
        (Value::Bool(_), Value::Number(_)) => vec![Value::Bool(truthy(raw))],
        _ => vec![raw.clone()],
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

/// Zoom from a page: a percentage (`110`) or a factor (`1.1`).
fn zoom_percent(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number <= 0.0 {
        return None;
    }
    let percent = if number <= 5.0 { number * 100.0 } else { number };
    Some(percent.round() as u32)
}
