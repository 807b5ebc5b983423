//! Shortcut Manager for Sea Browser.
//!
//! Maps accelerator strings such as `Ctrl+Shift+T` to `BrowserCommand`s.
//! Keys are normalized before every lookup so `shift+ctrl+t` and
//! `Ctrl+Shift+T` resolve to the same binding.

use std::collections::HashMap;

use crate::types::errors::ShortcutError;
use crate::types::shortcut::BrowserCommand;

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register(&mut self, keys: &str, command: BrowserCommand) -> Result<(), ShortcutError>;
    fn unregister(&mut self, keys: &str) -> Result<(), ShortcutError>;
    fn resolve(&self, keys: &str) -> Option<BrowserCommand>;
    fn bindings_for(&self, command: BrowserCommand) -> Vec<String>;
    fn list_shortcuts(&self) -> &HashMap<String, BrowserCommand>;
    fn reset_to_defaults(&mut self);
}

/// Shortcut manager with in-memory bindings keyed by normalized accelerator.
pub struct ShortcutManager {
    shortcuts: HashMap<String, BrowserCommand>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self {
            shortcuts: default_shortcuts(),
        }
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register(&mut self, keys: &str, command: BrowserCommand) -> Result<(), ShortcutError> {
        let normalized = normalize_keys(keys)?;
        if let Some(existing) = self.shortcuts.get(&normalized) {
            if *existing != command {
                return Err(ShortcutError::Conflict(format!(
                    "'{}' is already bound to '{}'",
                    normalized,
                    existing.name()
                )));
            }
        }
        self.shortcuts.insert(normalized, command);
        Ok(())
    }

    fn unregister(&mut self, keys: &str) -> Result<(), ShortcutError> {
        let normalized = normalize_keys(keys)?;
        self.shortcuts
            .remove(&normalized)
            .map(|_| ())
            .ok_or(ShortcutError::NotFound(normalized))
    }

    fn resolve(&self, keys: &str) -> Option<BrowserCommand> {
        let normalized = normalize_keys(keys).ok()?;
        self.shortcuts.get(&normalized).copied()
    }

    /// All accelerators bound to `command`, sorted.
    fn bindings_for(&self, command: BrowserCommand) -> Vec<String> {
        let mut keys: Vec<String> = self
            .shortcuts
            .iter()
            .filter(|(_, c)| **c == command)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn list_shortcuts(&self) -> &HashMap<String, BrowserCommand> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        self.shortcuts = default_shortcuts();
    }
}

/// The stock accelerator table.
pub fn default_shortcuts() -> HashMap<String, BrowserCommand> {
    let mut defaults = vec![
        ("Ctrl+T", BrowserCommand::NewTab),
        ("Ctrl+W", BrowserCommand::CloseTab),
        ("Ctrl+Shift+T", BrowserCommand::ReopenClosedTab),
        ("Ctrl+R", BrowserCommand::Reload),
        ("F5", BrowserCommand::Reload),
        ("Ctrl+Shift+R", BrowserCommand::HardReload),
        ("Ctrl+F5", BrowserCommand::HardReload),
        ("Alt+Left", BrowserCommand::Back),
        ("Alt+Right", BrowserCommand::Forward),
        ("Ctrl+L", BrowserCommand::FocusAddressBar),
        ("Ctrl+K", BrowserCommand::FocusSearch),
        ("F12", BrowserCommand::DevTools),
        ("F11", BrowserCommand::Fullscreen),
        ("Ctrl+F", BrowserCommand::Find),
        ("Ctrl+Plus", BrowserCommand::ZoomIn),
        ("Ctrl+Equal", BrowserCommand::ZoomIn),
        ("Ctrl+Minus", BrowserCommand::ZoomOut),
        ("Ctrl+0", BrowserCommand::ZoomReset),
        ("Ctrl+Tab", BrowserCommand::NextTab),
        ("Ctrl+Shift+Tab", BrowserCommand::PreviousTab),
        ("Ctrl+9", BrowserCommand::SelectLastTab),
        ("Ctrl+Shift+N", BrowserCommand::NewWindow),
        ("Ctrl+Shift+Delete", BrowserCommand::ClearBrowsingData),
        ("Ctrl+H", BrowserCommand::ShowHistory),
        ("Ctrl+D", BrowserCommand::BookmarkPage),
        ("Ctrl+J", BrowserCommand::ShowDownloads),
    ]
    .into_iter()
    .map(|(k, c)| (k.to_string(), c))
    .collect::<Vec<_>>();

    for n in 1..=8usize {
        defaults.push((format!("Ctrl+{}", n), BrowserCommand::SelectTab(n - 1)));
    }

    defaults.into_iter().collect()
}

/// Normalizes an accelerator to `Ctrl+Alt+Shift+Key` form.
///
/// Modifiers are case-insensitive and may appear in any order; `Cmd`,
/// `Meta` and `Control` fold into `Ctrl`. Single characters are upper-cased
/// and `+`, `=` and `-` map to `Plus`, `Equal` and `Minus`.
pub fn normalize_keys(keys: &str) -> Result<String, ShortcutError> {
    let trimmed = keys.trim();
    if trimmed.is_empty() {
        return Err(ShortcutError::InvalidKeys("Keys cannot be empty".to_string()));
    }

    // A trailing "++" means the key itself is '+'.
    let (body, plus_key) = match trimmed.strip_suffix("++") {
        Some(rest) => (rest, true),
        None => (trimmed, trimmed == "+"),
    };

    let (mut ctrl, mut alt, mut shift) = (false, false, false);
    let mut key: Option<String> = if plus_key { Some("Plus".to_string()) } else { None };

    let parts = if trimmed == "+" { Vec::new() } else { body.split('+').collect::<Vec<_>>() };
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            return Err(ShortcutError::InvalidKeys(keys.to_string()));
        }
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "cmd" | "meta" | "primary" => ctrl = true,
            "alt" | "option" => alt = true,
            "shift" => shift = true,
            _ => {
                if key.is_some() {
                    return Err(ShortcutError::InvalidKeys(keys.to_string()));
                }
                key = Some(normalize_key_name(part));
            }
        }
    }

    let key = key.ok_or_else(|| ShortcutError::InvalidKeys(keys.to_string()))?;

    let mut out = String::new();
    if ctrl {
        out.push_str("Ctrl+");
    }
    if alt {
        out.push_str("Alt+");
    }
    if shift {
        out.push_str("Shift+");
    }
    out.push_str(&key);
    Ok(out)
}

fn normalize_key_name(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    match lower.as_str() {
        "=" | "equal" => return "Equal".to_string(),
        "-" | "minus" => return "Minus".to_string(),
        "plus" => return "Plus".to_string(),
        "left" | "arrowleft" => return "Left".to_string(),
        "right" | "arrowright" => return "Right".to_string(),
        "up" | "arrowup" => return "Up".to_string(),
        "down" | "arrowdown" => return "Down".to_string(),
        "del" | "delete" => return "Delete".to_string(),
        "esc" | "escape" => return "Escape".to_string(),
        "comma" | "," => return "Comma".to_string(),
        _ => {}
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
