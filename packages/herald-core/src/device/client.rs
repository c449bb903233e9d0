//! `reqwest`-backed [`DeviceInvoker`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::device::traits::DeviceInvoker;
use crate::device::types::ClientResponse;
use crate::protocol_constants::DEVICE_REQUEST_TIMEOUT_SECS;
use crate::registry::Device;

/// Sends device requests through a shared, pooled HTTP client.
#[derive(Clone)]
pub struct HttpDeviceInvoker {
    client: Client,
    timeout: Duration,
}

impl HttpDeviceInvoker {
    /// Creates an invoker with the standard per-request timeout.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_timeout(client, Duration::from_secs(DEVICE_REQUEST_TIMEOUT_SECS))
    }

    /// Creates an invoker with a custom per-request timeout.
    #[must_use]
    pub fn with_timeout(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn send(&self, device: &Device, url: &Url) -> Result<(u16, String), reqwest::Error> {
        let res = self
            .client
            .get(url.clone())
            .basic_auth(&device.credentials.username, Some(&device.credentials.password))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status().as_u16();
        let text = res.text().await?;
        Ok((status, text))
    }
}

#[async_trait]
impl DeviceInvoker for HttpDeviceInvoker {
    async fn invoke(&self, device: &Device, url: &Url) -> ClientResponse {
        log::debug!("[Device] {} -> {}", device.id, url);

        let start = Instant::now();
        let result = self.send(device, url).await;
        let latency_ms = elapsed_ms(start);

        match result {
            Ok((status, text)) => {
                log::debug!(
                    "[Device] {} answered {} in {}ms",
                    device.id,
                    status,
                    latency_ms
                );
                ClientResponse::new(text, status, latency_ms)
            }
            Err(e) => {
                log::warn!(
                    "[Device] {} request failed after {}ms: {}",
                    device.id,
                    latency_ms,
                    e
                );
                ClientResponse::transport_failure(e, latency_ms)
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
