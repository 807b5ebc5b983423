use serde::{Deserialize, Serialize};

/// State of a download. The integer codes are what the database stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Paused,
}

impl DownloadState {
    pub fn code(self) -> i32 {
        match self {
            DownloadState::InProgress => 0,
            DownloadState::Completed => 1,
            DownloadState::Failed => 2,
            DownloadState::Cancelled => 3,
            DownloadState::Paused => 4,
        }
    }

    /// Unknown codes map to `Failed` so a corrupt row never looks active.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => DownloadState::InProgress,
            1 => DownloadState::Completed,
            3 => DownloadState::Cancelled,
            4 => DownloadState::Paused,
            _ => DownloadState::Failed,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, DownloadState::InProgress | DownloadState::Paused)
    }
}

/// Represents a file download with its progress and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Download {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub path: String,
    pub mime_type: String,
    pub total_bytes: i64,
    pub received_bytes: i64,
    /// Bytes per second, computed from progress updates. Not persisted.
    #[serde(default)]
    pub speed: i64,
    pub state: DownloadState,
    pub start_time: i64,
    pub end_time: i64,
    pub error_message: String,
}

impl Download {
    /// Completion in percent, or `None` when the total size is unknown.
    pub fn progress_percent(&self) -> Option<u8> {
        if self.total_bytes <= 0 {
            return None;
        }
        let pct = (self.received_bytes.max(0) as f64 / self.total_bytes as f64) * 100.0;
        Some(pct.clamp(0.0, 100.0) as u8)
    }
}
