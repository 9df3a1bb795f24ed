//! Error taxonomy for the pointing engine.
//!
//! Command-level failures (`Parse`, `Domain`, `BelowHorizon`, `NotConnected`,
//! ...) are terminal for the command that raised them and leave the
//! controller state untouched. `Device` failures revert the controller to
//! `Idle`. `Sink` failures are recovered by the caller and never stop the
//! polling loop.

use crate::device::DeviceError;
use crate::models::PointingState;

/// Result type for pointing engine operations.
pub type PointingResult<T> = Result<T, PointingError>;

/// Errors raised by the coordinate routines, the controller and the publisher.
#[derive(Debug, thiserror::Error)]
pub enum PointingError {
    /// Malformed sexagesimal input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid formatting request (e.g. negative precision).
    #[error("Format error: {0}")]
    Format(String),

    /// Non-finite numeric input to a transform.
    #[error("Domain error: {0}")]
    Domain(String),

    /// A slew target that failed pre-validation; the device was not touched.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Target is not above the horizon.
    #[error("Object is not above horizon (elevation {elevation:.2}°)")]
    BelowHorizon { elevation: f64 },

    /// Command issued while the controller is disconnected.
    #[error("Telescope is not connected")]
    NotConnected,

    /// Command not accepted in the current state.
    #[error("Cannot {command} while {state}")]
    InvalidState {
        state: PointingState,
        command: &'static str,
    },

    /// An abort or disconnect arrived while the slew was being dispatched;
    /// the motion was withdrawn.
    #[error("Slew interrupted before it started")]
    Interrupted,

    /// Underlying device operation failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Telemetry publish failed.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration could not be read or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PointingError {
    /// Short machine-readable code, used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::Format(_) => "FORMAT_ERROR",
            Self::Domain(_) => "DOMAIN_ERROR",
            Self::InvalidCoordinate(_) => "INVALID_COORDINATE",
            Self::BelowHorizon { .. } => "BELOW_HORIZON",
            Self::NotConnected => "NOT_CONNECTED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Interrupted => "INTERRUPTED",
            Self::Device(_) => "DEVICE_ERROR",
            Self::Sink(_) => "SINK_ERROR",
            Self::Config(_) => "CONFIGURATION_ERROR",
        }
    }
}
