//! Shared test fixtures: a scripted device invoker and registry helpers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;
use tokio::time::Instant;

use crate::device::{ClientResponse, DeviceInvoker};
use crate::protocol_constants::HEALTH_CHECK_PATH;
use crate::registry::{Device, DeviceRegistry};
use crate::state::Credentials;

/// Builds a registry of `http://<name>.local/` devices.
pub(crate) fn test_registry(names: &[&str]) -> Arc<DeviceRegistry> {
    let devices = names
        .iter()
        .map(|name| {
            Device::new(
                *name,
                &format!("http://{}.local/", name),
                Credentials::new("agent", "secret"),
            )
            .unwrap()
        })
        .collect();
    Arc::new(DeviceRegistry::from_devices(devices).unwrap())
}

/// One request observed by [`ScriptedInvoker`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub device: String,
    pub url: Url,
    /// When the request was issued.
    pub at: Instant,
}

impl RecordedCall {
    pub fn is_health_check(&self) -> bool {
        self.url.path().ends_with(HEALTH_CHECK_PATH)
    }

    /// Value of a query parameter, if present.
    pub fn query(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Invoker returning canned responses per device and recording every call.
///
/// Unscripted probes answer 200 with zero latency; unscripted plays answer
/// 200 `"ok"`.
#[derive(Default)]
pub(crate) struct ScriptedInvoker {
    probes: HashMap<String, ClientResponse>,
    plays: HashMap<String, ClientResponse>,
    holds: HashMap<String, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Healthy probe with the given measured latency.
    pub fn probe_latency(self, device: &str, latency_ms: u64) -> Self {
        self.probe_response(device, ClientResponse::new("ok", 200, latency_ms))
    }

    pub fn probe_response(mut self, device: &str, resp: ClientResponse) -> Self {
        self.probes.insert(device.to_string(), resp);
        self
    }

    pub fn play_response(mut self, device: &str, resp: ClientResponse) -> Self {
        self.plays.insert(device.to_string(), resp);
        self
    }

    /// Delays every answer from `device`, to reorder completions.
    pub fn hold(mut self, device: &str, duration: Duration) -> Self {
        self.holds.insert(device.to_string(), duration);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn play_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| !c.is_health_check())
            .collect()
    }
}

#[async_trait]
impl DeviceInvoker for ScriptedInvoker {
    async fn invoke(&self, device: &Device, url: &Url) -> ClientResponse {
        let call = RecordedCall {
            device: device.id.clone(),
            url: url.clone(),
            at: Instant::now(),
        };
        let is_health_check = call.is_health_check();
        self.calls.lock().push(call);

        if let Some(hold) = self.holds.get(&device.id) {
            tokio::time::sleep(*hold).await;
        }

        let scripted = if is_health_check {
            self.probes.get(&device.id)
        } else {
            self.plays.get(&device.id)
        };
        scripted.cloned().unwrap_or_else(|| {
            if is_health_check {
                ClientResponse::new("ok", 200, 0)
            } else {
                ClientResponse::new("ok", 200, 1)
            }
        })
    }
}
