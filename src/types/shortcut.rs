use serde::{Deserialize, Serialize};

/// A browser action that a keyboard accelerator can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserCommand {
    NewTab,
    CloseTab,
    ReopenClosedTab,
    Reload,
    HardReload,
    Back,
    Forward,
    FocusAddressBar,
    FocusSearch,
    DevTools,
    Fullscreen,
    Find,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    NextTab,
    PreviousTab,
    /// Zero-based tab position (Ctrl+1 selects index 0).
    SelectTab(usize),
    SelectLastTab,
    NewWindow,
    ClearBrowsingData,
    ShowHistory,
    BookmarkPage,
    ShowDownloads,
}

impl BrowserCommand {
    /// Name used in bridge replies.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserCommand::NewTab => "new_tab",
            BrowserCommand::CloseTab => "close_tab",
            BrowserCommand::ReopenClosedTab => "reopen_closed_tab",
            BrowserCommand::Reload => "reload",
            BrowserCommand::HardReload => "hard_reload",
            BrowserCommand::Back => "back",
            BrowserCommand::Forward => "forward",
            BrowserCommand::FocusAddressBar => "focus_address_bar",
            BrowserCommand::FocusSearch => "focus_search",
            BrowserCommand::DevTools => "dev_tools",
            BrowserCommand::Fullscreen => "fullscreen",
            BrowserCommand::Find => "find",
            BrowserCommand::ZoomIn => "zoom_in",
            BrowserCommand::ZoomOut => "zoom_out",
            BrowserCommand::ZoomReset => "zoom_reset",
            BrowserCommand::NextTab => "next_tab",
            BrowserCommand::PreviousTab => "previous_tab",
            BrowserCommand::SelectTab(_) => "select_tab",
            BrowserCommand::SelectLastTab => "select_last_tab",
            BrowserCommand::NewWindow => "new_window",
            BrowserCommand::ClearBrowsingData => "clear_browsing_data",
            BrowserCommand::ShowHistory => "show_history",
            BrowserCommand::BookmarkPage => "bookmark_page",
            BrowserCommand::ShowDownloads => "show_downloads",
        }
    }

    /// Inverse of `name`. `select_tab` needs an index.
    pub fn from_name(name: &str, index: Option<usize>) -> Option<Self> {
        let command = match name {
            "new_tab" => BrowserCommand::NewTab,
            "close_tab" => BrowserCommand::CloseTab,
            "reopen_closed_tab" => BrowserCommand::ReopenClosedTab,
            "reload" => BrowserCommand::Reload,
            "hard_reload" => BrowserCommand::HardReload,
            "back" => BrowserCommand::Back,
            "forward" => BrowserCommand::Forward,
            "focus_address_bar" => BrowserCommand::FocusAddressBar,
            "focus_search" => BrowserCommand::FocusSearch,
            "dev_tools" => BrowserCommand::DevTools,
            "fullscreen" => BrowserCommand::Fullscreen,
            "find" => BrowserCommand::Find,
            "zoom_in" => BrowserCommand::ZoomIn,
            "zoom_out" => BrowserCommand::ZoomOut,
            "zoom_reset" => BrowserCommand::ZoomReset,
            "next_tab" => BrowserCommand::NextTab,
            "previous_tab" => BrowserCommand::PreviousTab,
            "select_tab" => BrowserCommand::SelectTab(index?),
            "select_last_tab" => BrowserCommand::SelectLastTab,
            "new_window" => BrowserCommand::NewWindow,
            "clear_browsing_data" => BrowserCommand::ClearBrowsingData,
            "show_history" => BrowserCommand::ShowHistory,
            "bookmark_page" => BrowserCommand::BookmarkPage,
            "show_downloads" => BrowserCommand::ShowDownloads,
            _ => return None,
        };
        Some(command)
    }
}
