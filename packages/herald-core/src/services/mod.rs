//! Application services layer.
//!
//! This module contains the business logic services that orchestrate
//! between the API layer and infrastructure (device/, registry).

pub mod dispatch_coordinator;
pub mod health_prober;
pub mod history;
pub mod scheduler;

pub use dispatch_coordinator::{compensating_delays, DispatchCoordinator, DispatchRequest};
pub use health_prober::HealthProber;
pub use history::PlaybackHistory;
pub use scheduler::Scheduler;
