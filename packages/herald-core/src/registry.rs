//! Static device registry.
//!
//! Built once from the configured device table and shared read-only
//! (`Arc<DeviceRegistry>`) by every dispatch. No locking is needed because
//! nothing mutates it after construction.

use std::collections::HashMap;

use reqwest::Url;
use thiserror::Error;

use crate::error::{HeraldError, HeraldResult};
use crate::state::{Credentials, DeviceConfig};

/// Identifier of a device, as used in requests and schedules.
pub type DeviceId = String;

/// Errors raised while building the registry from configuration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two devices share the same name.
    #[error("Duplicate device name: {0}")]
    DuplicateDevice(String),

    /// A device URL does not parse.
    #[error("Invalid URL for device [{device}]: {reason}")]
    InvalidUrl { device: String, reason: String },

    /// Neither the device nor the process-wide settings provide credentials.
    #[error("No credentials configured for device [{0}]")]
    MissingCredentials(String),
}

/// A networked speaker exposing an HTTP control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: DeviceId,
    /// Base URL of the control endpoint, always ending with `/`.
    pub base_url: Url,
    pub credentials: Credentials,
    /// Static delay hint (ms).
    pub sync_delay_ms: Option<u64>,
}

impl Device {
    /// Creates a device, normalizing the base URL to end with `/`.
    pub fn new(
        id: impl Into<DeviceId>,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, RegistryError> {
        let id = id.into();
        let base_url = parse_base_url(&id, base_url)?;
        Ok(Self {
            id,
            base_url,
            credentials,
            sync_delay_ms: None,
        })
    }

    /// Sets the static delay hint.
    #[must_use]
    pub fn with_sync_delay(mut self, delay_ms: u64) -> Self {
        self.sync_delay_ms = Some(delay_ms);
        self
    }
}

/// Parses a device base URL. The path is kept as configured.
fn parse_base_url(device: &str, raw: &str) -> Result<Url, RegistryError> {
    let url = Url::parse(raw.trim()).map_err(|e| RegistryError::InvalidUrl {
        device: device.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(RegistryError::InvalidUrl {
            device: device.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }

    Ok(url)
}

/// Read-only mapping of device id to [`Device`], preserving configured order.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    index: HashMap<DeviceId, usize>,
}

impl DeviceRegistry {
    /// Builds a registry from already-constructed devices.
    pub fn from_devices(devices: Vec<Device>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(devices.len());
        for (i, device) in devices.iter().enumerate() {
            if index.insert(device.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicateDevice(device.id.clone()));
            }
        }
        Ok(Self { devices, index })
    }

    /// Builds a registry from the configured device table.
    ///
    /// Per-device credentials take precedence over `defaults`, field by field.
    pub fn from_config(
        configs: &[DeviceConfig],
        defaults: Option<&Credentials>,
    ) -> Result<Self, RegistryError> {
        let devices = configs
            .iter()
            .map(|cfg| {
                let username = cfg
                    .username
                    .clone()
                    .or_else(|| defaults.map(|d| d.username.clone()));
                let password = cfg
                    .password
                    .clone()
                    .or_else(|| defaults.map(|d| d.password.clone()));

                let (Some(username), Some(password)) = (username, password) else {
                    return Err(RegistryError::MissingCredentials(cfg.name.clone()));
                };

                let mut device = Device::new(
                    cfg.name.clone(),
                    &cfg.url,
                    Credentials::new(username, password),
                )?;
                device.sync_delay_ms = cfg.sync_delay_ms;
                Ok(device)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_devices(devices)
    }

    /// Looks up a device by id.
    pub fn get(&self, id: &str) -> Option<&Device> {
        self.index.get(id).map(|&i| &self.devices[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Device ids in configured order.
    pub fn names(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Resolves every id to its device, in input order.
    ///
    /// Fails on the first unknown id; nothing is returned for the rest, so a
    /// caller can never act on a partial set.
    pub fn resolve(&self, ids: &[DeviceId]) -> HeraldResult<Vec<Device>> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| HeraldError::UnknownDevice {
                        device: id.clone(),
                        available: self.names(),
                    })
            })
            .collect()
    }
}
