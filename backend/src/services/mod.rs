//! Service layer.
//!
//! The pointing controller and everything that drives it: the polling loop,
//! telemetry publishing and the caller-side command cooldown.

pub mod controller;
pub mod cooldown;
pub mod poller;
pub mod telemetry;

pub use controller::{PointingController, SlewTarget};
pub use cooldown::CommandGate;
pub use poller::Poller;
pub use telemetry::{MemorySink, Record, TelemetryPublisher, TelemetryRecord, TelemetrySink};

#[cfg(feature = "http-telemetry")]
pub use telemetry::HttpSink;
