//! Centralized error types for the Herald core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses
//!
//! Device-level failures are deliberately absent: they are recorded in
//! [`ClientResponse`](crate::device::ClientResponse) values, not raised.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::registry::RegistryError;
use crate::schedule::ScheduleError;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateDevice(_) => "duplicate_device",
            Self::InvalidUrl { .. } => "invalid_device_url",
            Self::MissingCredentials(_) => "missing_device_credentials",
        }
    }
}

impl ErrorCode for ScheduleError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "schedule_read_failed",
            Self::Parse(_) => "schedule_parse_failed",
            Self::InvalidEntry { .. } => "invalid_schedule_entry",
            Self::NotConfigured => "schedule_not_configured",
        }
    }
}

/// Application-wide error type for the Herald server.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum HeraldError {
    /// A requested device id is not present in the registry.
    #[error("Unknown device [{device}], available devices: {available:?}")]
    UnknownDevice {
        device: String,
        available: Vec<String>,
    },

    /// Client sent an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Schedule file could not be loaded or is invalid.
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// Server configuration error (bad device table, missing settings).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownDevice { .. } => "unknown_device",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Schedule(_) => "schedule_error",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownDevice { .. } | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Schedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type HeraldResult<T> = Result<T, HeraldError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for HeraldError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for HeraldError {
    fn from(err: RegistryError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<ScheduleError> for HeraldError {
    fn from(err: ScheduleError) -> Self {
        Self::Schedule(err.to_string())
    }
}
