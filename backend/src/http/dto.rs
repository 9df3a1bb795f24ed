//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

pub use crate::models::{PointingState, StatusDisplay, TelescopeStatus};
pub use crate::services::SlewTarget;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Mount driver name
    pub device: String,
    pub state: PointingState,
}

/// Live status plus its sexagesimal rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: TelescopeStatus,
    pub display: StatusDisplay,
}

impl From<TelescopeStatus> for StatusResponse {
    fn from(status: TelescopeStatus) -> Self {
        Self {
            display: status.display_fields(),
            status,
        }
    }
}

/// Request body for POST /v1/slew. Both fields are sexagesimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlewRequest {
    /// Right ascension, "H M S"
    pub ra: String,
    /// Declination, "D M S"
    pub dec: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlewResponse {
    pub target: SlewTarget,
    pub state: PointingState,
}

/// Request body for POST /v1/tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub tracking: bool,
    pub state: PointingState,
}

/// Request body for POST /v1/jog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JogRequest {
    /// "north", "south", "east" or "west"
    pub axis: String,
    /// Arcsec/s; the configured default when omitted
    #[serde(default)]
    pub rate: Option<f64>,
}

/// Generic acknowledgement for state-changing commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub state: PointingState,
    pub message: String,
}
