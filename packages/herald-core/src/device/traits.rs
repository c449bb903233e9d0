//! Trait abstraction for device requests.
//!
//! Services depend on [`DeviceInvoker`] rather than on `reqwest` directly,
//! so probing and dispatch logic can be exercised against scripted devices.

use async_trait::async_trait;
use reqwest::Url;

use crate::device::types::ClientResponse;
use crate::registry::Device;

/// Performs one authenticated GET against one device.
#[async_trait]
pub trait DeviceInvoker: Send + Sync {
    /// Sends the request and records its outcome.
    ///
    /// Must not fail: transport problems are reported through the returned
    /// [`ClientResponse`] so that every device always gets a result.
    ///
    /// # Arguments
    /// * `device` - Target device (credentials are taken from it)
    /// * `url` - Fully built request URL
    async fn invoke(&self, device: &Device, url: &Url) -> ClientResponse;
}
