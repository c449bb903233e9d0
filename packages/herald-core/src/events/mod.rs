//! Domain events emitted by the dispatch and scheduling services.
//!
//! This module provides:
//! - [`EventEmitter`] trait for services to emit events
//! - [`LoggingEventEmitter`] and [`NoopEventEmitter`] implementations
//! - Event types for dispatches and schedule activity

mod emitter;

pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

use crate::schedule::EntryKind;

/// Events describing the life of one dispatch.
///
/// Every event carries the `dispatch_id` so concurrent dispatches can be told
/// apart in logs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DispatchEvent {
    /// Validation passed; the probe phase (if any) is about to start.
    Started {
        #[serde(rename = "dispatchId")]
        dispatch_id: String,
        #[serde(rename = "soundName")]
        sound_name: String,
        devices: Vec<String>,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// Per-device delays have been decided, in request order.
    SyncPlanned {
        #[serde(rename = "dispatchId")]
        dispatch_id: String,
        #[serde(rename = "delaysMs")]
        delays_ms: Vec<u64>,
        timestamp: u64,
    },
    /// One device's play command finished (successfully or not).
    DeviceCompleted {
        #[serde(rename = "dispatchId")]
        dispatch_id: String,
        device: String,
        #[serde(rename = "statusCode")]
        status_code: u16,
        #[serde(rename = "latencyMs")]
        latency_ms: u64,
        success: bool,
    },
    /// Every device has reported.
    Completed {
        #[serde(rename = "dispatchId")]
        dispatch_id: String,
        succeeded: usize,
        failed: usize,
        timestamp: u64,
    },
}

/// Events from the schedule poller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScheduleEvent {
    /// A schedule entry matched and was dispatched.
    Fired {
        hour: u32,
        minute: u32,
        kind: EntryKind,
        #[serde(rename = "soundName")]
        sound_name: String,
        devices: Vec<String>,
        timestamp: u64,
    },
    /// A schedule entry matched but could not be played.
    Skipped {
        hour: u32,
        minute: u32,
        reason: String,
        timestamp: u64,
    },
    /// The schedule file was (re)loaded.
    Reloaded { entries: usize, timestamp: u64 },
}
