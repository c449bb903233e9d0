//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to services for business logic.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;

use crate::api::response::api_success;
use crate::api::AppState;
use crate::error::{HeraldError, HeraldResult};
use crate::protocol_constants::SERVICE_ID;
use crate::registry::DeviceId;
use crate::report::to_html;
use crate::services::DispatchRequest;
use crate::utils::validate_sound_name;

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlayQuery {
    #[serde(default)]
    sound_name: String,
    /// Comma-separated device names.
    #[serde(default)]
    devices: String,
}

fn parse_device_list(raw: &str) -> Vec<DeviceId> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/play", get(handle_play))
        .route("/client-health-check", get(client_health_check))
        .route("/api/devices", get(list_devices))
        .route("/api/history", get(list_history))
        .route("/api/schedule/reload", post(reload_schedule))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe. Always 200 while the process is serving.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "status": "ok",
        "service": SERVICE_ID,
        "devices": state.registry.len(),
        "scheduleEntries": state.scheduler.schedule().len()
    }))
}

/// Manual trigger: `GET /play?sound_name=x.mp3&devices=a,b`.
///
/// The whole request is validated before anything is sent or recorded.
async fn handle_play(
    State(state): State<AppState>,
    Query(query): Query<PlayQuery>,
) -> HeraldResult<Html<String>> {
    let device_ids = parse_device_list(&query.devices);
    if device_ids.is_empty() {
        return Err(HeraldError::InvalidRequest(
            "devices must name at least one device".into(),
        ));
    }
    validate_sound_name(&query.sound_name)?;
    state.registry.resolve(&device_ids)?;

    let reason = format!("manual playback on [{}]", device_ids.join("/"));
    state.history.record_async(&query.sound_name, &reason).await;

    let request = DispatchRequest::new(query.sound_name, device_ids);
    let report = state.coordinator.dispatch_report(&request).await?;
    Ok(Html(to_html(&report)))
}

/// Probes every registered device and reports each outcome.
async fn client_health_check(State(state): State<AppState>) -> impl IntoResponse {
    let devices = state.registry.devices();
    let probes = state.coordinator.prober().probe(devices).await;

    let mut body = Map::new();
    for (device, probe) in devices.iter().zip(&probes) {
        let entry = if probe.is_success() {
            json!({ "status": "ok", "latencyMs": probe.latency_ms })
        } else {
            json!({
                "status": "error",
                "statusCode": probe.status_code,
                "content": probe.response_text,
                "latencyMs": probe.latency_ms
            })
        };
        body.insert(device.id.clone(), entry);
    }
    api_success(Value::Object(body))
}

async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({ "devices": state.registry.names() }))
}

/// History entries, newest first.
async fn list_history(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "enabled": state.history.is_enabled(),
        "entries": state.history.entries()
    }))
}

async fn reload_schedule(State(state): State<AppState>) -> HeraldResult<impl IntoResponse> {
    let entries = state.scheduler.reload().await?;
    Ok(api_success(json!({ "success": true, "entries": entries })))
}
