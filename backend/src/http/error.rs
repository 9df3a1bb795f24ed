//! HTTP error handling and response types.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::PointingError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Command suppressed by the cooldown
    TooManyRequests {
        command: &'static str,
        retry_after: Duration,
    },
    /// Pointing engine error
    Pointing(PointingError),
}

/// HTTP status for a pointing engine error.
pub fn status_for(err: &PointingError) -> StatusCode {
    match err {
        PointingError::Parse(_)
        | PointingError::InvalidCoordinate(_)
        | PointingError::Domain(_)
        | PointingError::Format(_) => StatusCode::BAD_REQUEST,
        PointingError::BelowHorizon { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PointingError::NotConnected
        | PointingError::InvalidState { .. }
        | PointingError::Interrupted => StatusCode::CONFLICT,
        PointingError::Device(_) => StatusCode::BAD_GATEWAY,
        PointingError::Sink(_) | PointingError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", msg),
            ),
            AppError::TooManyRequests {
                command,
                retry_after,
            } => {
                let error = ApiError::new("COOLDOWN", format!("{} is cooling down", command))
                    .with_details(format!("retry in {} ms", retry_after.as_millis()));
                let seconds = retry_after_seconds(retry_after).to_string();
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, seconds)],
                    Json(error),
                )
                    .into_response();
            }
            AppError::Pointing(e) => {
                let error = match &e {
                    PointingError::Device(device) => {
                        ApiError::new(e.code(), e.to_string()).with_details(device.context().to_string())
                    }
                    _ => ApiError::new(e.code(), e.to_string()),
                };
                (status_for(&e), error)
            }
        };

        (status, Json(error)).into_response()
    }
}

/// Whole seconds for a `Retry-After` header, rounded up.
fn retry_after_seconds(wait: Duration) -> u64 {
    let secs = wait.as_secs();
    if wait.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

impl From<PointingError> for AppError {
    fn from(err: PointingError) -> Self {
        AppError::Pointing(err)
    }
}
