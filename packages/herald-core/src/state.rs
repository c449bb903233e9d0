//! Core configuration types.
//!
//! [`Config`] is loaded once at startup and never mutated afterwards. The
//! device table it carries is turned into a [`DeviceRegistry`] by bootstrap.
//!
//! [`DeviceRegistry`]: crate::registry::DeviceRegistry

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    DEFAULT_BIND_PORT, DEFAULT_CHIME_SOUND, DEFAULT_FIRED_INTERVAL_SECS, DEFAULT_HISTORY_LIMIT,
    DEFAULT_IDLE_INTERVAL_SECS,
};

/// HTTP basic-auth credential pair presented to a device.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One entry of the configured device table.
///
/// `username`/`password` fall back individually to
/// [`Config::device_credentials`] when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier, as used in requests and schedules.
    pub name: String,
    /// Base URL of the device's control endpoint.
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Static delay hint (ms), used by [`SyncStrategy::Static`].
    #[serde(default)]
    pub sync_delay_ms: Option<u64>,
}

/// How per-device delays are chosen for a dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStrategy {
    /// Measure latency with a health probe and compensate for the spread.
    #[default]
    Probe,
    /// Skip probing and use each device's configured `sync_delay_ms`.
    Static,
}

/// Timing of the schedule polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Sleep after a poll that matched nothing (seconds).
    pub idle_interval_secs: u64,
    /// Sleep after a poll that fired at least one entry (seconds).
    pub fired_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_interval_secs: DEFAULT_IDLE_INTERVAL_SECS,
            fired_interval_secs: DEFAULT_FIRED_INTERVAL_SECS,
        }
    }
}

/// Configuration for the Herald application.
///
/// All fields have sensible defaults; an empty device table is valid but
/// leaves nothing to dispatch to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port for the trigger HTTP server.
    pub bind_port: u16,

    // Devices
    /// Device table, in display order.
    pub devices: Vec<DeviceConfig>,
    /// Process-wide credentials for devices that do not carry their own.
    pub device_credentials: Option<Credentials>,
    /// Delay selection for dispatches.
    pub sync_strategy: SyncStrategy,

    // Scheduling
    /// Schedule file (YAML). No scheduled playback when unset.
    pub schedule_path: Option<PathBuf>,
    /// Sound used for chime slots.
    pub chime_sound: String,
    /// Sound library for song slots; one is picked at random per slot.
    pub songs: Vec<String>,
    pub scheduler: SchedulerConfig,

    // History
    /// Playback history file. History is not recorded when unset.
    pub history_path: Option<PathBuf>,
    /// Number of history lines kept.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_port: DEFAULT_BIND_PORT,
            devices: Vec::new(),
            device_credentials: None,
            sync_strategy: SyncStrategy::default(),
            schedule_path: None,
            chime_sound: DEFAULT_CHIME_SOUND.to_string(),
            songs: Vec::new(),
            scheduler: SchedulerConfig::default(),
            history_path: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Validates values that would otherwise fail at runtime.
    pub fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("history_limit must be >= 1".to_string());
        }
        if self.scheduler.idle_interval_secs == 0 || self.scheduler.fired_interval_secs == 0 {
            return Err("scheduler intervals must be >= 1 second".to_string());
        }
        if self.chime_sound.trim().is_empty() {
            return Err("chime_sound must not be empty".to_string());
        }
        Ok(())
    }
}
