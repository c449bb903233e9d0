//! Operator-facing dispatch report.
//!
//! Pure formatting over the ordered outcome list produced by a dispatch.

use crate::device::ClientResponse;

/// Message returned when a dispatch targeted no devices.
pub const NO_DEVICES_MESSAGE: &str = "No playback devices available";

/// Formats one line per device, pairing names and responses by position.
///
/// Lines are newline-terminated. An empty device list yields exactly
/// [`NO_DEVICES_MESSAGE`].
pub fn format_report<S: AsRef<str>>(device_names: &[S], responses: &[ClientResponse]) -> String {
    debug_assert_eq!(
        device_names.len(),
        responses.len(),
        "one response per device"
    );

    let mut report = String::new();
    for (name, resp) in device_names.iter().zip(responses) {
        let name = name.as_ref();
        if resp.is_success() {
            report.push_str(&format!("Device [{}]: queued for playback\n", name));
        } else {
            report.push_str(&format!(
                "Device [{}]: failed, HTTP status: {}, error: {}\n",
                name, resp.status_code, resp.response_text
            ));
        }
    }

    if report.is_empty() {
        return NO_DEVICES_MESSAGE.to_string();
    }
    report
}

/// Renders a report for a browser, replacing newlines with `<br>`.
#[must_use]
pub fn to_html(report: &str) -> String {
    report.replace('\n', "<br>")
}
