//! HTTP handlers for the REST API.
//!
//! Each handler maps one control of the mount console onto the
//! [`PointingController`](crate::services::PointingController).

use axum::{extract::State, Json};

use super::dto::{
    CommandResponse, HealthResponse, JogRequest, SlewRequest, SlewResponse, StatusResponse,
    TrackingRequest, TrackingResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::Axis;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn acknowledge(state: &AppState, message: impl Into<String>) -> HandlerResult<CommandResponse> {
    Ok(Json(CommandResponse {
        state: state.controller.state(),
        message: message.into(),
    }))
}

/// Apply the advisory cooldown for `command`.
fn gate(state: &AppState, command: &'static str) -> Result<(), AppError> {
    state
        .gate
        .try_acquire(command)
        .map_err(|retry_after| AppError::TooManyRequests {
            command,
            retry_after,
        })
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        device: state.controller.device().name().to_string(),
        state: state.controller.state(),
    }))
}

// =============================================================================
// Status
// =============================================================================

/// GET /v1/status
///
/// Fresh snapshot read from the mount.
pub async fn get_status(State(state): State<AppState>) -> HandlerResult<StatusResponse> {
    let status = state.controller.snapshot().await?;
    Ok(Json(status.into()))
}

// =============================================================================
// Session
// =============================================================================

/// POST /v1/connect
pub async fn connect(State(state): State<AppState>) -> HandlerResult<CommandResponse> {
    state.controller.connect().await?;
    acknowledge(&state, "connected")
}

/// POST /v1/disconnect
pub async fn disconnect(State(state): State<AppState>) -> HandlerResult<CommandResponse> {
    state.controller.disconnect().await?;
    acknowledge(&state, "disconnected")
}

// =============================================================================
// Motion
// =============================================================================

/// POST /v1/slew
///
/// Returns once the slew has been dispatched; poll `/v1/status` for progress.
pub async fn slew(
    State(state): State<AppState>,
    Json(request): Json<SlewRequest>,
) -> HandlerResult<SlewResponse> {
    gate(&state, "slew")?;
    let target = state.controller.slew(&request.ra, &request.dec).await?;
    Ok(Json(SlewResponse {
        target,
        state: state.controller.state(),
    }))
}

/// POST /v1/abort
pub async fn abort(State(state): State<AppState>) -> HandlerResult<CommandResponse> {
    gate(&state, "abort")?;
    state.controller.abort().await?;
    acknowledge(&state, "aborted")
}

/// POST /v1/tracking
pub async fn set_tracking(
    State(state): State<AppState>,
    Json(request): Json<TrackingRequest>,
) -> HandlerResult<TrackingResponse> {
    state.controller.set_track(request.enabled).await?;
    Ok(Json(TrackingResponse {
        tracking: request.enabled,
        state: state.controller.state(),
    }))
}

/// POST /v1/tracking/toggle
pub async fn toggle_tracking(State(state): State<AppState>) -> HandlerResult<TrackingResponse> {
    let tracking = state.controller.toggle_tracking().await?;
    Ok(Json(TrackingResponse {
        tracking,
        state: state.controller.state(),
    }))
}

/// POST /v1/jog
///
/// Motion continues until `DELETE /v1/jog`.
pub async fn start_jog(
    State(state): State<AppState>,
    Json(request): Json<JogRequest>,
) -> HandlerResult<CommandResponse> {
    let axis: Axis = request.axis.parse().map_err(AppError::BadRequest)?;
    let rate = request.rate.unwrap_or(state.default_jog_rate);
    state.controller.jog(axis, rate).await?;
    acknowledge(&state, format!("jogging {} at {} arcsec/s", axis, rate))
}

/// DELETE /v1/jog
pub async fn stop_jog(State(state): State<AppState>) -> HandlerResult<CommandResponse> {
    state.controller.stop_jog().await?;
    acknowledge(&state, "jog stopped")
}
