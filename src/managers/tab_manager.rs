use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::types::errors::TabError;
use crate::types::tab::{CloseOutcome, ClosedTab, Tab};

/// How many closed tabs Ctrl+Shift+T can bring back.
pub const MAX_CLOSED_TABS: usize = 10;

/// Tab titles longer than this are shortened in the tab strip.
pub const MAX_TAB_TITLE_CHARS: usize = 20;
const TRUNCATED_TITLE_CHARS: usize = 17;

pub const ZOOM_STEP: f64 = 0.1;
pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 5.0;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Trait defining the tab management interface.
pub trait TabManagerTrait {
    fn create_tab(&mut self, url: &str, active: bool) -> String;
    fn close_tab(&mut self, tab_id: &str) -> Result<CloseOutcome, TabError>;
    fn reopen_closed_tab(&mut self) -> Result<String, TabError>;
    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn next_tab(&mut self) -> Option<String>;
    fn previous_tab(&mut self) -> Option<String>;
    fn select_index(&mut self, index: usize) -> Result<String, TabError>;
    fn select_last(&mut self) -> Option<String>;
    fn reorder_tab(&mut self, tab_id: &str, new_index: usize) -> Result<(), TabError>;
    fn pin_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn unpin_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn duplicate_tab(&mut self, tab_id: &str) -> Result<String, TabError>;
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn get_all_tabs(&self) -> Vec<&Tab>;
    fn get_active_tab(&self) -> Option<&Tab>;
    fn tab_count(&self) -> usize;
    fn closed_tab_count(&self) -> usize;
    fn update_tab_url(&mut self, tab_id: &str, url: &str) -> Result<(), TabError>;
    fn update_tab_title(&mut self, tab_id: &str, title: &str) -> Result<(), TabError>;
    fn set_loading(&mut self, tab_id: &str, loading: bool) -> Result<(), TabError>;
    fn zoom_in(&mut self, tab_id: &str) -> Result<f64, TabError>;
    fn zoom_out(&mut self, tab_id: &str) -> Result<f64, TabError>;
    fn zoom_reset(&mut self, tab_id: &str) -> Result<f64, TabError>;
}

/// In-memory tab manager for the browser window.
pub struct TabManager {
    tabs: Vec<Tab>,
    tab_order: Vec<String>,
    active_tab_id: Option<String>,
    closed_tabs: VecDeque<ClosedTab>,
}

impl TabManager {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            tab_order: Vec::new(),
            active_tab_id: None,
            closed_tabs: VecDeque::new(),
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find_tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn find_order_index(&self, tab_id: &str) -> Option<usize> {
        self.tab_order.iter().position(|id| id == tab_id)
    }

    fn tab_mut(&mut self, tab_id: &str) -> Result<&mut Tab, TabError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    /// Count of pinned tabs in the current order (they are always at the left).
    fn pinned_count(&self) -> usize {
        self.tab_order
            .iter()
            .filter(|id| self.tabs.iter().any(|t| &t.id == *id && t.pinned))
            .count()
    }

    fn active_order_index(&self) -> Option<usize> {
        self.active_tab_id
            .as_deref()
            .and_then(|id| self.find_order_index(id))
    }

    fn activate_order_index(&mut self, idx: usize) -> Option<String> {
        let id = self.tab_order.get(idx)?.clone();
        self.active_tab_id = Some(id.clone());
        Some(id)
    }

    fn remember_closed(&mut self, tab: &Tab) {
        if tab.url.is_empty() {
            return;
        }
        let title = if tab.title.is_empty() { tab.url.clone() } else { tab.title.clone() };
        self.closed_tabs.push_back(ClosedTab { url: tab.url.clone(), title });
        while self.closed_tabs.len() > MAX_CLOSED_TABS {
            self.closed_tabs.pop_front();
        }
    }

    fn set_zoom(&mut self, tab_id: &str, zoom: f64) -> Result<f64, TabError> {
        let tab = self.tab_mut(tab_id)?;
        tab.zoom_level = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Ok(tab.zoom_level)
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabManagerTrait for TabManager {
    /// Create a new tab showing `url`. Returns the new tab's ID.
    fn create_tab(&mut self, url: &str, active: bool) -> String {
        let id = Uuid::new_v4().to_string();
        let tab = Tab {
            id: id.clone(),
            url: url.to_string(),
            title: "New Tab".to_string(),
            pinned: false,
            loading: false,
            zoom_level: DEFAULT_ZOOM,
            created_at: Self::now(),
        };
        self.tabs.push(tab);
        self.tab_order.push(id.clone());
        if active || self.active_tab_id.is_none() {
            self.active_tab_id = Some(id.clone());
        }
        id
    }

    /// Close a tab. If it's the active tab, switch to the right neighbour
    /// (or the left one at the end of the strip). Closing the last tab
    /// reports `LastTabClosed` so the caller can close the window.
    fn close_tab(&mut self, tab_id: &str) -> Result<CloseOutcome, TabError> {
        let tab_idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        let order_idx = self
            .find_order_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        let need_switch = self.active_tab_id.as_deref() == Some(tab_id);

        let closed = self.tabs.remove(tab_idx);
        self.tab_order.remove(order_idx);
        self.remember_closed(&closed);

        if self.tabs.is_empty() {
            self.active_tab_id = None;
            return Ok(CloseOutcome::LastTabClosed);
        }

        if need_switch {
            let new_order_idx = order_idx.min(self.tab_order.len() - 1);
            self.activate_order_index(new_order_idx);
        }

        Ok(CloseOutcome::Closed)
    }

    /// Reopen the most recently closed tab as the active tab.
    fn reopen_closed_tab(&mut self) -> Result<String, TabError> {
        let closed = self.closed_tabs.pop_back().ok_or(TabError::NothingToReopen)?;
        let id = self.create_tab(&closed.url, true);
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.title = closed.title;
        }
        tracing::debug!(url = %closed.url, "Reopened closed tab");
        Ok(id)
    }

    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        if self.find_tab_index(tab_id).is_none() {
            return Err(TabError::NotFound(tab_id.to_string()));
        }
        self.active_tab_id = Some(tab_id.to_string());
        Ok(())
    }

    /// Activate the tab to the right, wrapping to the first.
    fn next_tab(&mut self) -> Option<String> {
        let len = self.tab_order.len();
        if len == 0 {
            return None;
        }
        let next = self.active_order_index().map(|i| (i + 1) % len).unwrap_or(0);
        self.activate_order_index(next)
    }

    /// Activate the tab to the left, wrapping to the last.
    fn previous_tab(&mut self) -> Option<String> {
        let len = self.tab_order.len();
        if len == 0 {
            return None;
        }
        let prev = self
            .active_order_index()
            .map(|i| if i == 0 { len - 1 } else { i - 1 })
            .unwrap_or(0);
        self.activate_order_index(prev)
    }

    /// Activate the tab at a zero-based position in the strip.
    fn select_index(&mut self, index: usize) -> Result<String, TabError> {
        self.activate_order_index(index)
            .ok_or(TabError::InvalidIndex(index))
    }

    fn select_last(&mut self) -> Option<String> {
        let len = self.tab_order.len();
        if len == 0 {
            return None;
        }
        self.activate_order_index(len - 1)
    }

    /// Move a tab to a new position in the tab order.
    fn reorder_tab(&mut self, tab_id: &str, new_index: usize) -> Result<(), TabError> {
        let order_idx = self
            .find_order_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        if new_index >= self.tab_order.len() {
            return Err(TabError::InvalidIndex(new_index));
        }

        let id = self.tab_order.remove(order_idx);
        self.tab_order.insert(new_index, id);
        Ok(())
    }

    /// Pin a tab, moving it to the end of the pinned section.
    fn pin_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        let tab_idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        if self.tabs[tab_idx].pinned {
            return Ok(());
        }

        let pinned_before = self.pinned_count();
        self.tabs[tab_idx].pinned = true;

        if let Some(order_idx) = self.find_order_index(tab_id) {
            let id = self.tab_order.remove(order_idx);
            let insert_pos = pinned_before.min(self.tab_order.len());
            self.tab_order.insert(insert_pos, id);
        }

        Ok(())
    }

    /// Unpin a tab, moving it to just after the pinned section.
    fn unpin_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        let tab_idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        if !self.tabs[tab_idx].pinned {
            return Ok(());
        }

        self.tabs[tab_idx].pinned = false;

        if let Some(order_idx) = self.find_order_index(tab_id) {
            let pinned_count = self.pinned_count();
            let id = self.tab_order.remove(order_idx);
            let insert_pos = pinned_count.min(self.tab_order.len());
            self.tab_order.insert(insert_pos, id);
        }

        Ok(())
    }

    /// Duplicate a tab right after the source. Returns the new tab's ID.
    fn duplicate_tab(&mut self, tab_id: &str) -> Result<String, TabError> {
        let tab_idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        let order_idx = self
            .find_order_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        let source = &self.tabs[tab_idx];
        let new_id = Uuid::new_v4().to_string();
        let new_tab = Tab {
            id: new_id.clone(),
            url: source.url.clone(),
            title: source.title.clone(),
            pinned: false,
            loading: false,
            zoom_level: source.zoom_level,
            created_at: Self::now(),
        };

        self.tabs.push(new_tab);
        self.tab_order.insert(order_idx + 1, new_id.clone());

        Ok(new_id)
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn get_all_tabs(&self) -> Vec<&Tab> {
        self.tab_order
            .iter()
            .filter_map(|id| self.tabs.iter().find(|t| t.id == *id))
            .collect()
    }

    fn get_active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .as_ref()
            .and_then(|id| self.tabs.iter().find(|t| t.id == *id))
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn closed_tab_count(&self) -> usize {
        self.closed_tabs.len()
    }

    fn update_tab_url(&mut self, tab_id: &str, url: &str) -> Result<(), TabError> {
        let tab = self.tab_mut(tab_id)?;
        tab.url = url.to_string();
        Ok(())
    }

    fn update_tab_title(&mut self, tab_id: &str, title: &str) -> Result<(), TabError> {
        let tab = self.tab_mut(tab_id)?;
        tab.title = title.to_string();
        Ok(())
    }

    fn set_loading(&mut self, tab_id: &str, loading: bool) -> Result<(), TabError> {
        self.tab_mut(tab_id)?.loading = loading;
        Ok(())
    }

    fn zoom_in(&mut self, tab_id: &str) -> Result<f64, TabError> {
        let current = self.tab_mut(tab_id)?.zoom_level;
        self.set_zoom(tab_id, current + ZOOM_STEP)
    }

    fn zoom_out(&mut self, tab_id: &str) -> Result<f64, TabError> {
        let current = self.tab_mut(tab_id)?.zoom_level;
        self.set_zoom(tab_id, current - ZOOM_STEP)
    }

    fn zoom_reset(&mut self, tab_id: &str) -> Result<f64, TabError> {
        self.set_zoom(tab_id, DEFAULT_ZOOM)
    }
}

/// Title shown in the tab strip: long titles are cut to 17 chars plus "...".
pub fn display_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return "New Tab".to_string();
    }
    if trimmed.chars().count() > MAX_TAB_TITLE_CHARS {
        let short: String = trimmed.chars().take(TRUNCATED_TITLE_CHARS).collect();
        format!("{}...", short)
    } else {
        trimmed.to_string()
    }
}

/// Window title for the active page, e.g. "Example Domain - Sea Browser".
pub fn window_title(page_title: &str, product: &str) -> String {
    let trimmed = page_title.trim();
    if trimmed.is_empty() {
        product.to_string()
    } else {
        format!("{} - {}", trimmed, product)
    }
}
