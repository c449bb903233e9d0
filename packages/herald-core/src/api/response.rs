//! HTTP response helpers for consistent JSON bodies.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// 200 with a JSON body.
pub fn api_success<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(data))
}
