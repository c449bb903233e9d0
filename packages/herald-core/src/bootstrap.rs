//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where all
//! services are instantiated and wired together. All dependency
//! relationships are visible here, and service creation stays out of the
//! handlers that use them.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::device::{DeviceInvoker, HttpDeviceInvoker};
use crate::error::{HeraldError, HeraldResult};
use crate::events::{EventEmitter, LoggingEventEmitter};
use crate::protocol_constants::DEVICE_REQUEST_TIMEOUT_SECS;
use crate::registry::DeviceRegistry;
use crate::schedule::Schedule;
use crate::services::{DispatchCoordinator, PlaybackHistory, Scheduler};
use crate::state::Config;

/// Container for all bootstrapped services.
///
/// Consumed by [`AppState`](crate::api::AppState) to build the API state.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Read-only device table.
    pub registry: Arc<DeviceRegistry>,
    /// Dispatch engine (probe, delay, play, report).
    pub coordinator: Arc<DispatchCoordinator>,
    /// Playback history log.
    pub history: Arc<PlaybackHistory>,
    /// Schedule poller.
    pub scheduler: Arc<Scheduler>,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
}

impl BootstrappedServices {
    /// Spawns the schedule poller.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_background_tasks(&self) -> JoinHandle<()> {
        let scheduler = Arc::clone(&self.scheduler);
        tokio::spawn(scheduler.run(self.cancel_token.clone()))
    }

    /// Initiates graceful shutdown of all background tasks.
    pub fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");
        self.cancel_token.cancel();
        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Creates the shared HTTP client for all device communication.
///
/// Created once during bootstrap so every dispatch reuses pooled
/// connections.
fn create_http_client() -> HeraldResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(DEVICE_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| HeraldError::Internal(format!("failed to create HTTP client: {}", e)))
}

/// Bootstraps all application services with their dependencies.
///
/// Services are created in dependency order:
///
/// 1. Device registry (validated against the config)
/// 2. Shared infrastructure (HTTP client, event emitter, cancellation token)
/// 3. Dispatch coordinator (depends on registry and invoker)
/// 4. History and scheduler (depend on the coordinator)
///
/// # Errors
///
/// Returns an error if the config is invalid, the device table cannot be
/// turned into a registry, or the configured schedule file fails to load.
pub fn bootstrap_services(config: &Config) -> HeraldResult<BootstrappedServices> {
    config.validate().map_err(HeraldError::Configuration)?;

    let registry = Arc::new(DeviceRegistry::from_config(
        &config.devices,
        config.device_credentials.as_ref(),
    )?);
    log::info!(
        "[Bootstrap] {} device(s) registered: {:?}",
        registry.len(),
        registry.names()
    );

    let http_client = create_http_client()?;
    let invoker: Arc<dyn DeviceInvoker> = Arc::new(HttpDeviceInvoker::new(http_client));
    let emitter: Arc<dyn EventEmitter> = Arc::new(LoggingEventEmitter);
    let cancel_token = CancellationToken::new();

    let coordinator = Arc::new(DispatchCoordinator::new(
        Arc::clone(&registry),
        invoker,
        Arc::clone(&emitter),
        config.sync_strategy,
    ));

    let history = Arc::new(PlaybackHistory::new(
        config.history_path.clone(),
        config.history_limit,
    ));

    let schedule = match &config.schedule_path {
        Some(path) => {
            let schedule = Schedule::load(path, &registry)?;
            log::info!(
                "[Bootstrap] Loaded {} schedule entries from {}",
                schedule.len(),
                path.display()
            );
            schedule
        }
        None => {
            log::info!("[Bootstrap] No schedule file configured, scheduled playback disabled");
            Schedule::empty()
        }
    };

    let mut scheduler = Scheduler::new(
        schedule,
        Arc::clone(&coordinator),
        Arc::clone(&history),
        emitter,
    )
    .with_sounds(config.chime_sound.clone(), config.songs.clone())
    .with_intervals(
        Duration::from_secs(config.scheduler.idle_interval_secs),
        Duration::from_secs(config.scheduler.fired_interval_secs),
    );
    if let Some(path) = &config.schedule_path {
        scheduler = scheduler.with_schedule_path(path.clone());
    }

    Ok(BootstrappedServices {
        registry,
        coordinator,
        history,
        scheduler: Arc::new(scheduler),
        cancel_token,
    })
}
