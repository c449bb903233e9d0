//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.
//!
//! ```yaml
//! bind_port: 49500
//! device_username: agent
//! device_password: secret
//! devices:
//!   - { name: hall, url: "http://10.0.0.5:8000/" }
//!   - { name: lobby, url: "http://10.0.0.6:8000/", sync_delay_ms: 40 }
//! schedule_path: /etc/herald/schedule.yaml
//! history_path: /var/lib/herald/history.csv
//! songs: [morning.mp3, lunch.mp3]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use herald_core::protocol_constants::{
    DEFAULT_BIND_PORT, DEFAULT_CHIME_SOUND, DEFAULT_HISTORY_LIMIT,
};
use herald_core::{Credentials, DeviceConfig, SchedulerConfig, SyncStrategy};
use serde::Deserialize;

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to.
    /// Override: `HERALD_BIND_PORT`
    pub bind_port: u16,

    /// Playback agents, in display order.
    pub devices: Vec<DeviceConfig>,

    /// Basic-auth user for devices without their own.
    /// Override: `HERALD_DEVICE_USERNAME`
    pub device_username: Option<String>,

    /// Basic-auth password for devices without their own.
    /// Override: `HERALD_DEVICE_PASSWORD`
    pub device_password: Option<String>,

    /// `probe` (measure latency) or `static` (use `sync_delay_ms` hints).
    /// Override: `HERALD_SYNC_STRATEGY`
    pub sync_strategy: SyncStrategy,

    /// Schedule file. Override: `HERALD_SCHEDULE_PATH`
    pub schedule_path: Option<PathBuf>,

    /// Sound played for chime entries.
    pub chime_sound: String,

    /// Library for song entries.
    pub songs: Vec<String>,

    pub scheduler: SchedulerConfig,

    /// Playback history file. Override: `HERALD_HISTORY_PATH`
    pub history_path: Option<PathBuf>,

    pub history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_port: DEFAULT_BIND_PORT,
            devices: Vec::new(),
            device_username: None,
            device_password: None,
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

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides from `lookup` (the process environment in production).
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("HERALD_BIND_PORT").and_then(|v| v.parse().ok()) {
            self.bind_port = port;
        }

        if let Some(user) = lookup("HERALD_DEVICE_USERNAME") {
            self.device_username = Some(user);
        }

        if let Some(password) = lookup("HERALD_DEVICE_PASSWORD") {
            self.device_password = Some(password);
        }

        if let Some(val) = lookup("HERALD_SYNC_STRATEGY") {
            match serde_yaml::from_str::<SyncStrategy>(&val) {
                Ok(strategy) => self.sync_strategy = strategy,
                Err(_) => log::warn!("Ignoring invalid HERALD_SYNC_STRATEGY={}", val),
            }
        }

        if let Some(path) = lookup("HERALD_SCHEDULE_PATH") {
            self.schedule_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("HERALD_HISTORY_PATH") {
            self.history_path = Some(PathBuf::from(path));
        }
    }

    /// Converts to herald-core's Config type.
    pub fn to_core_config(&self) -> herald_core::Config {
        let device_credentials = match (&self.device_username, &self.device_password) {
            (Some(user), Some(password)) => Some(Credentials::new(user, password)),
            _ => None,
        };

        herald_core::Config {
            bind_port: self.bind_port,
            devices: self.devices.clone(),
            device_credentials,
            sync_strategy: self.sync_strategy,
            schedule_path: self.schedule_path.clone(),
            chime_sound: self.chime_sound.clone(),
            songs: self.songs.clone(),
            scheduler: self.scheduler.clone(),
            history_path: self.history_path.clone(),
            history_limit: self.history_limit,
        }
    }
}
