//! Download Manager for Sea Browser.
//!
//! Tracks downloads handed over by the web engine: start, progress,
//! pause/resume/cancel/retry, completion and cleanup. Every state change is
//! written to `downloads.db`; progress ticks stay in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::platform;
use crate::types::download::{Download, DownloadState};
use crate::types::errors::DownloadError;

/// Name used when neither the engine nor the URL yields a file name.
pub const FALLBACK_FILENAME: &str = "download";

const MAX_FILENAME_BYTES: usize = 255;
const EXTENSION_KEEP_THRESHOLD: usize = 200;

/// Callback fired whenever a download changes.
pub type ProgressCallback = Box<dyn Fn(&Download) + Send>;

/// Trait defining download management operations.
pub trait DownloadManagerTrait {
    fn start_download(
        &mut self,
        url: &str,
        suggested_filename: Option<&str>,
        mime_type: Option<&str>,
        total_bytes: i64,
    ) -> Result<Download, DownloadError>;
    fn update_progress(&mut self, id: &str, received: i64, total: i64) -> Result<(), DownloadError>;
    fn complete_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn fail_download(&mut self, id: &str, message: &str) -> Result<(), DownloadError>;
    fn cancel_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn pause_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn resume_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn retry_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn set_state(&mut self, id: &str, state: DownloadState) -> Result<(), DownloadError>;
    fn remove_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn clear_completed(&mut self) -> Result<usize, DownloadError>;
    fn get_all(&self) -> &[Download];
    fn get(&self, id: &str) -> Option<&Download>;
    fn get_active(&self) -> Vec<&Download>;
    fn find_in_progress_by_url(&self, url: &str) -> Option<&Download>;
}

/// Download manager backed by SQLite with an in-memory cache (newest first).
pub struct DownloadManager {
    db: Database,
    downloads: Vec<Download>,
    downloads_dir: PathBuf,
    on_progress: Option<ProgressCallback>,
    last_tick: HashMap<String, (Instant, i64)>,
}

impl DownloadManager {
    /// Creates the manager and loads stored downloads.
    pub fn new(db: Database, downloads_dir: PathBuf) -> Result<Self, DownloadError> {
        let mut mgr = Self {
            db,
            downloads: Vec::new(),
            downloads_dir,
            on_progress: None,
            last_tick: HashMap::new(),
        };
        mgr.load()?;
        Ok(mgr)
    }

    /// Reloads the cache from the database.
    pub fn load(&mut self) -> Result<(), DownloadError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, url, filename, path, mime_type, total_bytes, received_bytes, \
                 state, start_time, end_time, error_message \
                 FROM downloads ORDER BY start_time DESC",
            )
            .map_err(|e| DownloadError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Download {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    filename: row.get(2)?,
                    path: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    mime_type: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    total_bytes: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
                    received_bytes: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
                    speed: 0,
                    state: DownloadState::from_code(row.get::<_, Option<i32>>(7)?.unwrap_or(0)),
                    start_time: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
                    end_time: row.get::<_, Option<i64>>(9)?.unwrap_or(0),
                    error_message: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
                })
            })
            .map_err(|e| DownloadError::DatabaseError(e.to_string()))?;

        let mut loaded = Vec::new();
        for row in rows {
            loaded.push(row.map_err(|e| DownloadError::DatabaseError(e.to_string()))?);
        }
        tracing::info!(count = loaded.len(), "Downloads loaded");
        self.downloads = loaded;
        Ok(())
    }

    /// Registers the callback fired on every download change.
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.on_progress = Some(callback);
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    pub fn set_downloads_dir(&mut self, dir: PathBuf) {
        self.downloads_dir = dir;
    }

    /// Opens a finished download with the desktop's default handler.
    pub fn open_file(&self, id: &str) -> Result<(), DownloadError> {
        let dl = self.get(id).ok_or_else(|| DownloadError::NotFound(id.to_string()))?;
        platform::open_path(Path::new(&dl.path)).map_err(|e| DownloadError::FileSystemError(e.to_string()))
    }

    /// Opens the folder containing a download.
    pub fn show_in_folder(&self, id: &str) -> Result<(), DownloadError> {
        let dl = self.get(id).ok_or_else(|| DownloadError::NotFound(id.to_string()))?;
        platform::reveal_path(Path::new(&dl.path)).map_err(|e| DownloadError::FileSystemError(e.to_string()))
    }

    pub fn open_downloads_folder(&self) -> Result<(), DownloadError> {
        platform::open_path(&self.downloads_dir).map_err(|e| DownloadError::FileSystemError(e.to_string()))
    }

    fn now_ts() -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
    }

    fn find_index(&self, id: &str) -> Result<usize, DownloadError> {
        self.downloads
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    fn persist(&self, item: &Download) -> Result<(), DownloadError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO downloads (id, url, filename, path, mime_type, total_bytes, \
                 received_bytes, state, start_time, end_time, error_message) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    item.id,
                    item.url,
                    item.filename,
                    item.path,
                    item.mime_type,
                    item.total_bytes,
                    item.received_bytes,
                    item.state.code(),
                    item.start_time,
                    item.end_time,
                    item.error_message
                ],
            )
            .map_err(|e| DownloadError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn notify(&self, idx: usize) {
        if let Some(cb) = &self.on_progress {
            cb(&self.downloads[idx]);
        }
    }

    /// Persists the entry at `idx` and fires the callback.
    fn commit(&self, idx: usize) -> Result<(), DownloadError> {
        self.persist(&self.downloads[idx])?;
        self.notify(idx);
        Ok(())
    }

    /// Paths reserved by downloads that have not finished writing yet.
    fn reserved_paths(&self) -> Vec<&str> {
        self.downloads
            .iter()
            .filter(|d| d.state.is_active())
            .map(|d| d.path.as_str())
            .collect()
    }
}

impl DownloadManagerTrait for DownloadManager {
    fn start_download(
        &mut self,
        url: &str,
        suggested_filename: Option<&str>,
        mime_type: Option<&str>,
        total_bytes: i64,
    ) -> Result<Download, DownloadError> {
        let raw_name = match suggested_filename.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => filename_from_url(url),
        };
        let filename = sanitize_filename(&raw_name);

        let path = {
            let reserved = self.reserved_paths();
            unique_download_path(&self.downloads_dir, &filename, |p| {
                p.exists() || reserved.iter().any(|r| Path::new(r) == p)
            })
        };

        let item = Download {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or(filename),
            path: path.to_string_lossy().to_string(),
            mime_type: mime_type.unwrap_or_default().to_string(),
            total_bytes: total_bytes.max(0),
            received_bytes: 0,
            speed: 0,
            state: DownloadState::InProgress,
            start_time: Self::now_ts(),
            end_time: 0,
            error_message: String::new(),
        };

        self.persist(&item)?;
        self.downloads.insert(0, item.clone());
        self.notify(0);
        tracing::info!(download_id = %item.id, url = %url, path = %item.path, "Download started");
        Ok(item)
    }

    /// Memory-only progress update; also refreshes `speed`.
    fn update_progress(&mut self, id: &str, received: i64, total: i64) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        let now = Instant::now();

        let speed = match self.last_tick.get(id) {
            Some((at, prev)) => {
                let secs = now.duration_since(*at).as_secs_f64();
                if secs > 0.0 {
                    ((received - prev).max(0) as f64 / secs) as i64
                } else {
                    self.downloads[idx].speed
                }
            }
            None => 0,
        };
        self.last_tick.insert(id.to_string(), (now, received));

        let dl = &mut self.downloads[idx];
        dl.received_bytes = received.max(0);
        if total > 0 {
            dl.total_bytes = total;
        }
        dl.speed = speed;
        self.notify(idx);
        Ok(())
    }

    fn complete_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        {
            let dl = &mut self.downloads[idx];
            dl.state = DownloadState::Completed;
            if dl.total_bytes > 0 {
                dl.received_bytes = dl.total_bytes;
            } else {
                dl.total_bytes = dl.received_bytes;
            }
            dl.speed = 0;
            dl.end_time = Self::now_ts();
        }
        self.last_tick.remove(id);
        self.commit(idx)?;
        tracing::info!(download_id = %id, "Download completed");
        Ok(())
    }

    fn fail_download(&mut self, id: &str, message: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        {
            let dl = &mut self.downloads[idx];
            dl.state = DownloadState::Failed;
            dl.error_message = message.to_string();
            dl.speed = 0;
            dl.end_time = Self::now_ts();
        }
        self.last_tick.remove(id);
        self.commit(idx)?;
        tracing::warn!(download_id = %id, error = %message, "Download failed");
        Ok(())
    }

    fn cancel_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        {
            let dl = &mut self.downloads[idx];
            dl.state = DownloadState::Cancelled;
            dl.speed = 0;
            dl.end_time = Self::now_ts();
        }
        self.last_tick.remove(id);
        self.commit(idx)
    }

    /// Pauses an in-progress download; any other state is left alone.
    fn pause_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        if self.downloads[idx].state != DownloadState::InProgress {
            tracing::debug!(download_id = %id, state = ?self.downloads[idx].state, "Pause ignored");
            return Ok(());
        }
        self.downloads[idx].state = DownloadState::Paused;
        self.downloads[idx].speed = 0;
        self.commit(idx)
    }

    /// Resumes a paused download; any other state is left alone.
    fn resume_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        if self.downloads[idx].state != DownloadState::Paused {
            tracing::debug!(download_id = %id, state = ?self.downloads[idx].state, "Resume ignored");
            return Ok(());
        }
        self.downloads[idx].state = DownloadState::InProgress;
        self.commit(idx)
    }

    fn retry_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        {
            let dl = &mut self.downloads[idx];
            dl.state = DownloadState::InProgress;
            dl.received_bytes = 0;
            dl.speed = 0;
            dl.error_message.clear();
            dl.start_time = Self::now_ts();
            dl.end_time = 0;
        }
        self.last_tick.remove(id);
        self.commit(idx)?;
        tracing::info!(download_id = %id, "Download retried");
        Ok(())
    }

    fn set_state(&mut self, id: &str, state: DownloadState) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        self.downloads[idx].state = state;
        if !state.is_active() && self.downloads[idx].end_time == 0 {
            self.downloads[idx].end_time = Self::now_ts();
        }
        self.commit(idx)
    }

    /// Forgets a download. The file on disk is not touched.
    fn remove_download(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self.find_index(id)?;
        self.db
            .connection()
            .execute("DELETE FROM downloads WHERE id = ?1", params![id])
            .map_err(|e| DownloadError::DatabaseError(e.to_string()))?;
        self.downloads.remove(idx);
        self.last_tick.remove(id);
        Ok(())
    }

    /// Drops every completed or cancelled entry. Returns how many were removed.
    fn clear_completed(&mut self) -> Result<usize, DownloadError> {
        self.db
            .connection()
            .execute(
                "DELETE FROM downloads WHERE state IN (?1, ?2)",
                params![DownloadState::Completed.code(), DownloadState::Cancelled.code()],
            )
            .map_err(|e| DownloadError::DatabaseError(e.to_string()))?;
        let before = self.downloads.len();
        self.downloads
            .retain(|d| !matches!(d.state, DownloadState::Completed | DownloadState::Cancelled));
        Ok(before - self.downloads.len())
    }

    fn get_all(&self) -> &[Download] {
        &self.downloads
    }

    fn get(&self, id: &str) -> Option<&Download> {
        self.downloads.iter().find(|d| d.id == id)
    }

    fn get_active(&self) -> Vec<&Download> {
        self.downloads.iter().filter(|d| d.state.is_active()).collect()
    }

    fn find_in_progress_by_url(&self, url: &str) -> Option<&Download> {
        self.downloads
            .iter()
            .find(|d| d.url == url && d.state == DownloadState::InProgress)
    }
}

/// Derives a file name from the last path segment of `url`.
///
/// Query and fragment are dropped, `%XX` escapes are decoded and `+` becomes a
/// space. Falls back to [`FALLBACK_FILENAME`].
pub fn filename_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or("");
    let path = match without_query.find("://") {
        Some(i) => {
            let rest = &without_query[i + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            }
        }
        None => without_query,
    };

    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let decoded = percent_decode(segment).replace('+', " ");
    if decoded.trim().is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        decoded
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Makes a name safe to create inside the downloads directory.
///
/// Path separators, `:*?"<>|` and control characters become `_`; leading and
/// trailing dots/spaces are stripped; names longer than 255 bytes are cut,
/// keeping the extension when it starts past byte 200.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    if trimmed.len() <= MAX_FILENAME_BYTES {
        return trimmed.to_string();
    }

    match trimmed.rfind('.') {
        Some(dot) if dot > EXTENSION_KEEP_THRESHOLD => {
            let head = truncate_at_char_boundary(trimmed, EXTENSION_KEEP_THRESHOLD);
            let ext_budget = MAX_FILENAME_BYTES - head.len();
            let ext = truncate_at_char_boundary(&trimmed[dot..], ext_budget);
            format!("{}{}", head, ext)
        }
        _ => truncate_at_char_boundary(trimmed, MAX_FILENAME_BYTES).to_string(),
    }
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Picks `dir/name`, or `dir/stem (n).ext` with the smallest free `n`.
///
/// `taken` decides whether a candidate is already in use.
pub fn unique_download_path<F>(dir: &Path, name: &str, taken: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let first = dir.join(name);
    if !taken(&first) {
        return first;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };

    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, counter, ext));
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
