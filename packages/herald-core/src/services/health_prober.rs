//! Concurrent latency probing.
//!
//! Probes measure round-trip time only. A failed probe never removes a device
//! from a dispatch; it just makes that device's synchronization less precise.

use std::sync::Arc;

use futures::future::join_all;

use crate::device::{health_check_url, ClientResponse, DeviceInvoker};
use crate::registry::Device;

/// Sends one health-check request per device, all at once.
pub struct HealthProber {
    invoker: Arc<dyn DeviceInvoker>,
}

impl HealthProber {
    pub fn new(invoker: Arc<dyn DeviceInvoker>) -> Self {
        Self { invoker }
    }

    /// Probes every device concurrently and waits for all of them.
    ///
    /// Returns one response per device, in input order, regardless of which
    /// device answered first.
    pub async fn probe(&self, devices: &[Device]) -> Vec<ClientResponse> {
        let futures = devices.iter().map(|device| {
            let invoker = Arc::clone(&self.invoker);
            async move {
                let url = health_check_url(device);
                invoker.invoke(device, &url).await
            }
        });

        let results = join_all(futures).await;

        for (device, probe) in devices.iter().zip(&results) {
            if probe.is_success() {
                log::debug!(
                    "[HealthProber] {} healthy, latency {}ms",
                    device.id,
                    probe.latency_ms
                );
            } else {
                log::warn!(
                    "[HealthProber] {} probe failed ({}): {} - latency {}ms used as-is",
                    device.id,
                    probe.status_code,
                    probe.response_text,
                    probe.latency_ms
                );
            }
        }

        results
    }
}
