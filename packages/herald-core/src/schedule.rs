//! Time-of-day playback schedule.
//!
//! The schedule is a YAML file listing the minutes at which something plays
//! and on which devices:
//!
//! ```yaml
//! entries:
//!   - hour: 8
//!     minute: 0
//!     kind: chime
//!     note: Morning bell
//!     devices: [hall, lobby]
//!   - hour: 12
//!     minute: 30
//!     kind: song
//!     note: Lunch break
//!     devices: [canteen]
//! ```
//!
//! Entries are validated against the device registry when loaded, so a
//! loaded schedule never references an unknown device.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{DeviceId, DeviceRegistry};

/// Errors raised while loading a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The schedule file could not be read.
    #[error("Failed to read schedule {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schedule file is not valid YAML for the expected shape.
    #[error("Failed to parse schedule: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An entry violates a value or reference constraint.
    #[error("Schedule entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// Reload requested but no schedule file is configured.
    #[error("No schedule file configured")]
    NotConfigured,
}

/// What a schedule entry plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// The configured chime sound (time signal).
    Chime,
    /// A random pick from the song library.
    Song,
}

/// One scheduled playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub hour: u32,
    pub minute: u32,
    pub kind: EntryKind,
    /// Free text, recorded as the playback reason.
    #[serde(default)]
    pub note: String,
    /// Target devices, in dispatch order.
    #[serde(default)]
    pub devices: Vec<DeviceId>,
}

impl ScheduleEntry {
    fn validate(&self, registry: &DeviceRegistry) -> Result<(), String> {
        if self.hour > 23 {
            return Err(format!("hour must be within 0-23, got {}", self.hour));
        }
        if self.minute > 59 {
            return Err(format!("minute must be within 0-59, got {}", self.minute));
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            if !registry.contains(device) {
                return Err(format!(
                    "device [{}] is not in the device list {:?}",
                    device,
                    registry.names()
                ));
            }
            if !seen.insert(device.as_str()) {
                return Err(format!("device [{}] is listed twice", device));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ScheduleFile {
    #[serde(default)]
    entries: Vec<ScheduleEntry>,
}

/// A validated schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// A schedule with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates `entries` against the registry.
    pub fn new(
        entries: Vec<ScheduleEntry>,
        registry: &DeviceRegistry,
    ) -> Result<Self, ScheduleError> {
        for (i, entry) in entries.iter().enumerate() {
            entry
                .validate(registry)
                .map_err(|reason| ScheduleError::InvalidEntry {
                    index: i + 1,
                    reason,
                })?;
        }
        Ok(Self { entries })
    }

    /// Parses and validates a YAML schedule.
    pub fn from_yaml_str(yaml: &str, registry: &DeviceRegistry) -> Result<Self, ScheduleError> {
        let file: ScheduleFile = serde_yaml::from_str(yaml)?;
        Self::new(file.entries, registry)
    }

    /// Reads, parses and validates a schedule file.
    pub fn load(path: &Path, registry: &DeviceRegistry) -> Result<Self, ScheduleError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScheduleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content, registry)
    }

    /// Entries scheduled for the given local time, in file order.
    pub fn due(&self, hour: u32, minute: u32) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries
            .iter()
            .filter(move |e| e.hour == hour && e.minute == minute)
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
