// Sea Browser shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod download;
pub mod errors;
pub mod extension;
pub mod history;
pub mod settings;
pub mod shortcut;
pub mod tab;
pub mod update;
