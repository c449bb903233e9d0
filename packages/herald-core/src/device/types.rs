//! Domain types for device invocation outcomes.

use std::fmt;

use serde::Serialize;

use crate::protocol_constants::TRANSPORT_ERROR_STATUS;

/// Outcome of a single request to a single device.
///
/// Always produced, whether the device answered or the request failed in
/// transport; in the latter case `status_code` is [`TRANSPORT_ERROR_STATUS`]
/// and `response_text` holds the failure description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub response_text: String,
    pub status_code: u16,
    /// Wall-clock round trip in milliseconds.
    pub latency_ms: u64,
}

impl ClientResponse {
    pub fn new(response_text: impl Into<String>, status_code: u16, latency_ms: u64) -> Self {
        Self {
            response_text: response_text.into(),
            status_code,
            latency_ms,
        }
    }

    /// Records a request that never produced an HTTP response.
    pub fn transport_failure(error: impl fmt::Display, latency_ms: u64) -> Self {
        Self::new(error.to_string(), TRANSPORT_ERROR_STATUS, latency_ms)
    }

    /// Returns true for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl fmt::Display for ClientResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status_code: {}, response_text: {}, response_latency_ms: {}",
            self.status_code, self.response_text, self.latency_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_whole_2xx_range() {
        assert!(ClientResponse::new("", 200, 0).is_success());
        assert!(ClientResponse::new("", 204, 0).is_success());
        assert!(!ClientResponse::new("", 199, 0).is_success());
        assert!(!ClientResponse::new("", 300, 0).is_success());
    }

    #[test]
    fn transport_failure_uses_sentinel_status() {
        let resp = ClientResponse::transport_failure("connection refused", 12);
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.response_text, "connection refused");
        assert_eq!(resp.latency_ms, 12);
        assert!(!resp.is_success());
    }
}
