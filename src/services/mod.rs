// Sea Browser services
// Services provide settings, internal pages, address bar input, content blocking, extensions and updates.

pub mod content_blocker;
pub mod extension_manager;
pub mod internal_pages;
pub mod settings_engine;
pub mod update_manager;
pub mod url_input;
