//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use crate::services::{CommandGate, PointingController};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PointingController>,
    /// Advisory cooldown applied to slew and abort requests.
    pub gate: Arc<CommandGate>,
    /// Jog rate used when a request does not name one, arcsec/s.
    pub default_jog_rate: f64,
}

impl AppState {
    pub fn new(controller: Arc<PointingController>, cooldown: Duration, default_jog_rate: f64) -> Self {
        Self {
            controller,
            gate: Arc::new(CommandGate::new(cooldown)),
            default_jog_rate,
        }
    }
}
