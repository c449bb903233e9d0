//! Fixed protocol constants shared with the speaker agents.
//!
//! Devices in the field depend on these values; changing them breaks
//! compatibility with deployed agents or with operator-facing behavior.

// ─────────────────────────────────────────────────────────────────────────────
// Device Protocol
// ─────────────────────────────────────────────────────────────────────────────

/// Client-side timeout for every request sent to a device (seconds).
pub const DEVICE_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Status recorded when a request never produced an HTTP response.
///
/// Shares its value with a genuine device-side 500; reports do not tell the
/// two apart.
pub const TRANSPORT_ERROR_STATUS: u16 = 500;

/// Path (relative to the device base URL) of the latency probe endpoint.
pub const HEALTH_CHECK_PATH: &str = "health_check/";

/// Query parameter carrying the sound to play.
pub const SOUND_NAME_PARAM: &str = "sound_name";

/// Query parameter carrying the compensating delay in milliseconds.
pub const DELAY_MS_PARAM: &str = "delay_ms";

// ─────────────────────────────────────────────────────────────────────────────
// Scheduling
// ─────────────────────────────────────────────────────────────────────────────

/// Sound played for chime slots unless configured otherwise.
pub const DEFAULT_CHIME_SOUND: &str = "0-cuckoo-clock-sound.mp3";

/// Scheduler sleep after a minute with no matching entry (seconds).
pub const DEFAULT_IDLE_INTERVAL_SECS: u64 = 50;

/// Scheduler sleep in debug mode after a minute with no match (seconds).
pub const DEBUG_IDLE_INTERVAL_SECS: u64 = 30;

/// Scheduler sleep after firing, long enough to leave the matched minute.
pub const DEFAULT_FIRED_INTERVAL_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

/// Number of playback history lines kept on disk.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier reported by the liveness endpoint.
pub const SERVICE_ID: &str = "herald";

/// Default port for the trigger HTTP server.
pub const DEFAULT_BIND_PORT: u16 = 49500;
