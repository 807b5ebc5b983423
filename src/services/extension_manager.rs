//! Extension Manager for Sea Browser.
//!
//! Extensions live in `<config>/extensions`. A bare `.js` file is a user
//! script; a directory with a `manifest.json` is a package whose content
//! scripts (or background scripts) are concatenated. Enabled scripts are
//! injected at document start. Disabled names are kept in `disabled.json`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::types::errors::ExtensionError;
use crate::types::extension::{Extension, ExtensionKind, ExtensionManifest};

const DISABLED_FILE: &str = "disabled.json";
const MANIFEST_FILE: &str = "manifest.json";

/// Trait defining extension management operations.
pub trait ExtensionManagerTrait {
    fn load_extensions(&mut self) -> Result<usize, ExtensionError>;
    fn get_extensions(&self) -> &[Extension];
    fn toggle_extension(&mut self, name: &str, enabled: bool) -> Result<(), ExtensionError>;
    fn enabled_scripts(&self) -> Vec<&str>;
    fn combined_script(&self) -> String;
    fn install_from_path(&mut self, path: &Path) -> Result<String, ExtensionError>;
    fn uninstall(&mut self, name: &str) -> Result<(), ExtensionError>;
}

/// Directory-backed extension manager.
pub struct ExtensionManager {
    dir: PathBuf,
    extensions: Vec<Extension>,
    disabled: BTreeSet<String>,
}

impl ExtensionManager {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            extensions: Vec::new(),
            disabled: BTreeSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_disabled(&mut self) {
        let path = self.dir.join(DISABLED_FILE);
        self.disabled = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(names) => names.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable disabled list");
                    BTreeSet::new()
                }
            },
            Err(_) => BTreeSet::new(),
        };
    }

    fn save_disabled(&self) -> Result<(), ExtensionError> {
        fs::create_dir_all(&self.dir).map_err(|e| ExtensionError::LoadError(e.to_string()))?;
        let names: Vec<&String> = self.disabled.iter().collect();
        let json = serde_json::to_string_pretty(&names).map_err(|e| ExtensionError::LoadError(e.to_string()))?;
        fs::write(self.dir.join(DISABLED_FILE), json).map_err(|e| ExtensionError::LoadError(e.to_string()))
    }

    fn load_user_script(path: &Path) -> Result<Extension, ExtensionError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "script".to_string());
        let script = fs::read_to_string(path)
            .map_err(|e| ExtensionError::LoadError(format!("Cannot read {}: {}", path.display(), e)))?;
        Ok(Extension {
            name,
            version: "1.0.0".to_string(),
            description: "User script".to_string(),
            path: path.to_string_lossy().to_string(),
            kind: ExtensionKind::UserScript,
            enabled: true,
            script,
        })
    }

    fn load_package(dir: &Path) -> Result<Extension, ExtensionError> {
        let manifest = parse_manifest(dir)?;

        let content_files: Vec<&String> = manifest.content_scripts.iter().flat_map(|cs| cs.js.iter()).collect();
        let files: Vec<&String> = if content_files.is_empty() {
            manifest
                .background
                .as_ref()
                .map(|b| b.scripts.iter().collect())
                .unwrap_or_default()
        } else {
            content_files
        };

        let mut script = String::new();
        for file in files {
            let source = read_extension_file(dir, file)?;
            script.push_str(&format!("// ===== {} =====\n", file));
            script.push_str(&source);
            script.push('\n');
        }

        Ok(Extension {
            name: manifest.name.unwrap_or_else(|| "Unknown Extension".to_string()),
            version: manifest.version.unwrap_or_else(|| "1.0.0".to_string()),
            description: manifest.description.unwrap_or_else(|| "No description".to_string()),
            path: dir.to_string_lossy().to_string(),
            kind: ExtensionKind::Package,
            enabled: true,
            script,
        })
    }
}

impl ExtensionManagerTrait for ExtensionManager {
    /// Rescans the extensions directory. Returns how many were loaded.
    fn load_extensions(&mut self) -> Result<usize, ExtensionError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ExtensionError::LoadError(format!("Cannot create {}: {}", self.dir.display(), e)))?;
        self.load_disabled();

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(|e| ExtensionError::LoadError(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        let mut loaded = Vec::new();
        for path in entries {
            let result = if path.is_file() && path.extension().map(|e| e == "js").unwrap_or(false) {
                Self::load_user_script(&path)
            } else if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
                Self::load_package(&path)
            } else {
                continue;
            };

            match result {
                Ok(mut ext) => {
                    ext.enabled = !self.disabled.contains(&ext.name);
                    tracing::info!(name = %ext.name, version = %ext.version, enabled = ext.enabled, "Extension loaded");
                    loaded.push(ext);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping extension");
                }
            }
        }

        self.extensions = loaded;
        Ok(self.extensions.len())
    }

    fn get_extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn toggle_extension(&mut self, name: &str, enabled: bool) -> Result<(), ExtensionError> {
        let ext = self
            .extensions
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ExtensionError::NotFound(name.to_string()))?;
        ext.enabled = enabled;

        if enabled {
            self.disabled.remove(name);
        } else {
            self.disabled.insert(name.to_string());
        }
        self.save_disabled()?;
        tracing::info!(name = %name, enabled, "Extension toggled");
        Ok(())
    }

    fn enabled_scripts(&self) -> Vec<&str> {
        self.extensions
            .iter()
            .filter(|e| e.enabled && !e.script.is_empty())
            .map(|e| e.script.as_str())
            .collect()
    }

    /// Every enabled script, each wrapped so one failure can't stop the rest.
    fn combined_script(&self) -> String {
        let mut out = String::new();
        for ext in self.extensions.iter().filter(|e| e.enabled && !e.script.is_empty()) {
            let label = format!("{} {}", ext.name, ext.version).replace("*/", "* /");
            out.push_str(&format!(
                "/* {} */\ntry {{\n{}\n}} catch (e) {{ console.error('[extension]', {}, e); }}\n",
                label,
                ext.script,
                Value::String(ext.name.clone())
            ));
        }
        out
    }

    /// Copies a `.js` file or an extension directory into the extensions
    /// directory and reloads. Returns the installed extension's name.
    fn install_from_path(&mut self, path: &Path) -> Result<String, ExtensionError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ExtensionError::LoadError(format!("Invalid path: {}", path.display())))?;
        fs::create_dir_all(&self.dir).map_err(|e| ExtensionError::LoadError(e.to_string()))?;
        let target = self.dir.join(file_name);

        let name = if path.is_file() && path.extension().map(|e| e == "js").unwrap_or(false) {
            fs::copy(path, &target).map_err(|e| ExtensionError::LoadError(e.to_string()))?;
            Self::load_user_script(&target)?.name
        } else if path.is_dir() {
            // Validate before copying anything.
            let ext = Self::load_package(path)?;
            copy_dir_recursive(path, &target)?;
            ext.name
        } else {
            return Err(ExtensionError::InvalidManifest(format!(
                "{} is neither a .js file nor an extension directory",
                path.display()
            )));
        };

        self.load_extensions()?;
        tracing::info!(name = %name, "Extension installed");
        Ok(name)
    }

    /// Deletes the extension's file or directory.
    fn uninstall(&mut self, name: &str) -> Result<(), ExtensionError> {
        let idx = self
            .extensions
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| ExtensionError::NotFound(name.to_string()))?;
        let ext = &self.extensions[idx];

        // Stays listed if the files can't be removed.
        let path = Path::new(&ext.path);
        let removed = match ext.kind {
            ExtensionKind::UserScript => fs::remove_file(path),
            ExtensionKind::Package => fs::remove_dir_all(path),
        };
        removed.map_err(|e| ExtensionError::LoadError(format!("Cannot remove {}: {}", path.display(), e)))?;
        self.extensions.remove(idx);

        if self.disabled.remove(name) {
            self.save_disabled()?;
        }
        tracing::info!(name = %name, "Extension uninstalled");
        Ok(())
    }
}

fn parse_manifest(dir: &Path) -> Result<ExtensionManifest, ExtensionError> {
    let content = fs::read_to_string(dir.join(MANIFEST_FILE))
        .map_err(|e| ExtensionError::InvalidManifest(format!("Cannot read manifest.json: {}", e)))?;
    serde_json::from_str(&content)
        .map_err(|e| ExtensionError::InvalidManifest(format!("Invalid manifest.json: {}", e)))
}

/// Reads `relative` from inside `base`. Paths resolving outside `base` are rejected.
fn read_extension_file(base: &Path, relative: &str) -> Result<String, ExtensionError> {
    let root = base
        .canonicalize()
        .map_err(|e| ExtensionError::LoadError(format!("Invalid base path: {}", e)))?;
    let full = base
        .join(relative)
        .canonicalize()
        .map_err(|e| ExtensionError::LoadError(format!("Cannot resolve {}: {}", relative, e)))?;
    if !full.starts_with(&root) {
        return Err(ExtensionError::LoadError(format!(
            "Path traversal blocked: {} escapes extension directory",
            relative
        )));
    }
    fs::read_to_string(&full).map_err(|e| ExtensionError::LoadError(format!("Cannot read {}: {}", relative, e)))
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), ExtensionError> {
    fs::create_dir_all(to).map_err(|e| ExtensionError::LoadError(e.to_string()))?;
    for entry in fs::read_dir(from).map_err(|e| ExtensionError::LoadError(e.to_string()))? {
        let entry = entry.map_err(|e| ExtensionError::LoadError(e.to_string()))?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        if src.is_dir() {
            copy_dir_recursive(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).map_err(|e| ExtensionError::LoadError(e.to_string()))?;
        }
    }
    Ok(())
}
