//! Playback history log.
//!
//! A small text file with one `YYYY-MM-DD HH:MM,<sound>,<reason>` line per
//! playback, trimmed to the newest `limit` lines on every write. History is
//! informational: write failures are logged and otherwise ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use serde::Serialize;

/// One parsed history line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub time: String,
    pub sound_name: String,
    pub reason: String,
}

impl HistoryEntry {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, ',');
        let time = parts.next()?.trim();
        let sound_name = parts.next()?.trim();
        let reason = parts.next().unwrap_or("").trim();
        if time.is_empty() || sound_name.is_empty() {
            return None;
        }
        Some(Self {
            time: time.to_string(),
            sound_name: sound_name.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// File-backed playback history.
pub struct PlaybackHistory {
    path: Option<PathBuf>,
    limit: usize,
    /// Serializes read-modify-write cycles from concurrent callers.
    write_lock: Mutex<()>,
}

impl PlaybackHistory {
    /// Creates a history writing to `path`; `None` disables recording.
    pub fn new(path: Option<PathBuf>, limit: usize) -> Self {
        Self {
            path,
            limit: limit.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// A history that records nothing.
    pub fn disabled() -> Self {
        Self::new(None, 1)
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Appends an entry stamped with the current local time.
    pub fn record(&self, sound_name: &str, reason: &str) {
        self.record_at(Local::now().naive_local(), sound_name, reason);
    }

    /// Appends an entry from async code on the blocking pool.
    pub async fn record_async(self: &Arc<Self>, sound_name: &str, reason: &str) {
        if !self.is_enabled() {
            return;
        }
        let history = Arc::clone(self);
        let when = Local::now().naive_local();
        let sound_name = sound_name.to_string();
        let reason = reason.to_string();
        let task =
            tokio::task::spawn_blocking(move || history.record_at(when, &sound_name, &reason));
        if let Err(e) = task.await {
            log::error!("[History] Write task failed: {}", e);
        }
    }

    /// Appends an entry with an explicit timestamp.
    pub fn record_at(&self, when: NaiveDateTime, sound_name: &str, reason: &str) {
        let Some(path) = &self.path else {
            return;
        };

        let line = format!(
            "{},{},{}",
            when.format("%Y-%m-%d %H:%M"),
            single_line(sound_name),
            single_line(reason)
        );

        let _guard = self.write_lock.lock();
        if let Err(e) = self.append_trimmed(path, &line) {
            log::error!(
                "[History] Failed to update playback history {}: {}",
                path.display(),
                e
            );
        }
    }

    /// Returns the recorded entries, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        match fs::read_to_string(path) {
            Ok(content) => content.lines().rev().filter_map(HistoryEntry::parse).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!("[History] Failed to read {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn append_trimmed(&self, path: &Path, line: &str) -> io::Result<()> {
        let existing = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let mut lines: Vec<&str> = existing.lines().filter(|l| !l.is_empty()).collect();
        lines.push(line);
        let skip = lines.len().saturating_sub(self.limit);

        let mut content = lines[skip..].join("\n");
        content.push('\n');

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write to a sibling temp file, then rename over the old history
        let temp_path = temp_path_for(path);
        if let Err(e) = fs::write(&temp_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, path).inspect_err(|_| {
            let _ = fs::remove_file(&temp_path);
        })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r'], " ")
}
