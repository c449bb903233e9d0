//! Herald Core - shared library for the Herald announcement server.
//!
//! Herald plays one sound on several networked playback agents at once. It
//! measures each agent's round-trip latency, holds back the faster ones so
//! that playback starts together, and reports a per-device outcome.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`registry`]: Read-only device table built from configuration
//! - [`device`]: Remote invocation of device endpoints (HTTP + basic auth)
//! - [`services`]: Latency probing, dispatch, history and the schedule poller
//! - [`schedule`]: Time-of-day schedule file model
//! - [`report`]: Operator-facing dispatch report
//! - [`events`]: Domain events for dispatches and schedule activity
//! - [`api`]: HTTP trigger surface
//! - [`state`]: Configuration types
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`DeviceInvoker`](device::DeviceInvoker): Sending a request to a device
//! - [`EventEmitter`](events::EventEmitter): Emitting domain events
//!
//! Each trait has a default implementation suitable for the standalone
//! server; tests substitute scripted ones.

#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod device;
pub mod error;
pub mod events;
pub mod protocol_constants;
pub mod registry;
pub mod report;
pub mod schedule;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types at the crate root
pub use device::{ClientResponse, DeviceInvoker, HttpDeviceInvoker};
pub use error::{ErrorCode, HeraldError, HeraldResult};
pub use events::{DispatchEvent, EventEmitter, LoggingEventEmitter, NoopEventEmitter, ScheduleEvent};
pub use registry::{Device, DeviceId, DeviceRegistry, RegistryError};
pub use report::{format_report, to_html};
pub use schedule::{EntryKind, Schedule, ScheduleEntry, ScheduleError};
pub use state::{Config, Credentials, DeviceConfig, SchedulerConfig, SyncStrategy};
pub use utils::{now_millis, validate_sound_name};

// Re-export service types
pub use services::{
    compensating_delays, DispatchCoordinator, DispatchRequest, HealthProber, PlaybackHistory,
    Scheduler,
};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
