//! # OPD Telescope Pointing Engine
//!
//! Pointing and coordinate engine for an equatorial telescope mount.
//!
//! The crate converts sexagesimal coordinates, computes hour angle and
//! horizontal coordinates for an observer site, drives the mount through a
//! serialized pointing state machine and publishes periodic telemetry.
//!
//! ## Architecture
//!
//! - [`algorithms`]: sexagesimal codec, horizontal transform, sidereal time
//! - [`models`]: angles, observer site, status snapshots, pointing states
//! - [`device`]: the [`MountDevice`](device::MountDevice) capability trait and a simulated mount
//! - [`services`]: pointing controller, polling loop, telemetry publisher
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based REST control surface (feature `http-server`)
//!

// DeviceError carries a structured context for log lines
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod config;
pub mod device;
pub mod error;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::MountConfig;
pub use error::{PointingError, PointingResult};
pub use models::{Angle, AngleUnit, Axis, ObserverSite, PointingState, TelescopeStatus};
pub use services::{PointingController, Poller, TelemetryPublisher};
