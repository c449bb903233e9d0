//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to services.
//! It provides the router construction and server startup functionality.

use std::sync::Arc;

use thiserror::Error;

use crate::bootstrap::BootstrappedServices;
use crate::registry::DeviceRegistry;
use crate::services::{DispatchCoordinator, PlaybackHistory, Scheduler};

pub mod http;
pub mod response;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// This is a thin wrapper that holds references to services.
/// All business logic lives in the services themselves.
#[derive(Clone)]
pub struct AppState {
    /// Runs dispatches; also owns the latency prober.
    pub coordinator: Arc<DispatchCoordinator>,
    /// Read-only device table.
    pub registry: Arc<DeviceRegistry>,
    /// Playback history log.
    pub history: Arc<PlaybackHistory>,
    /// Schedule poller, for reloads.
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn from_services(services: &BootstrappedServices) -> Self {
        Self {
            coordinator: Arc::clone(&services.coordinator),
            registry: Arc::clone(&services.registry),
            history: Arc::clone(&services.history),
            scheduler: Arc::clone(&services.scheduler),
        }
    }
}

/// Binds `0.0.0.0:port` and serves the API until the future is dropped.
pub async fn start_server(state: AppState, port: u16) -> Result<(), ServerError> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Server listening on http://{}", listener.local_addr()?);
    let app = http::create_router(state);

    axum::serve(listener, app).await?;
    Ok(())
}
