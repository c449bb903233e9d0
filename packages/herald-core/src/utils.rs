//! General utilities shared across the application.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{HeraldError, HeraldResult};

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Validates a sound name before it is forwarded to devices.
///
/// Devices resolve the name against their local sound repository, so path
/// traversal sequences are refused.
pub fn validate_sound_name(sound_name: &str) -> HeraldResult<()> {
    if sound_name.trim().is_empty() {
        return Err(HeraldError::InvalidRequest(
            "sound_name must not be empty".into(),
        ));
    }
    if sound_name.contains("../") || sound_name.contains("/..") {
        return Err(HeraldError::InvalidRequest(format!(
            "sound_name [{}] contains illegal characters",
            sound_name
        )));
    }
    Ok(())
}
