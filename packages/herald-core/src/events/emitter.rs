//! Event emitter abstraction for decoupling services from transport.
//!
//! Services depend on the [`EventEmitter`] trait rather than on a concrete
//! sink, which keeps them testable and lets a front-end subscribe later.

use super::{DispatchEvent, ScheduleEvent};

/// Trait for emitting domain events without knowledge of transport.
///
/// Implementations are called from concurrent dispatch tasks and must be
/// safe to share.
pub trait EventEmitter: Send + Sync {
    /// Emits a dispatch lifecycle event.
    fn emit_dispatch(&self, event: DispatchEvent);

    /// Emits a schedule poller event.
    fn emit_schedule(&self, event: ScheduleEvent);
}

/// No-op emitter for testing or when nothing listens.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_dispatch(&self, _event: DispatchEvent) {}

    fn emit_schedule(&self, _event: ScheduleEvent) {}
}

/// Logging emitter, the default for the standalone server.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_dispatch(&self, event: DispatchEvent) {
        tracing::debug!(?event, "dispatch_event");
    }

    fn emit_schedule(&self, event: ScheduleEvent) {
        tracing::debug!(?event, "schedule_event");
    }
}
