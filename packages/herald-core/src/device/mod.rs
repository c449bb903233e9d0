//! Device control over HTTP.
//!
//! # Module Structure
//!
//! - `types` - Per-device outcome record ([`ClientResponse`])
//! - `traits` - [`DeviceInvoker`] abstraction for testability
//! - `client` - [`HttpDeviceInvoker`], the `reqwest`-backed implementation
//! - `urls` - Play and health-check URL construction

pub mod client;
pub mod traits;
pub mod types;
pub mod urls;

pub use client::HttpDeviceInvoker;
pub use traits::DeviceInvoker;
pub use types::ClientResponse;
pub use urls::{health_check_url, play_url};

#[cfg(test)]
pub(crate) mod test_fixtures;
