//! Mount device layer.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  PointingController (services::controller)   │
//! └───────────────────┬──────────────────────────┘
//!                     │  MountDevice trait
//! ┌───────────────────▼──────────────────────────┐
//! │  SimulatedMount / hardware driver / test double│
//! └──────────────────────────────────────────────┘
//! ```

pub mod abort;
pub mod error;
pub mod factory;
pub mod mount;
pub mod simulator;

pub use abort::AbortSignal;
pub use error::{DeviceError, DeviceResult, ErrorContext};
pub use factory::{DeviceFactory, DeviceType, DEVICE_ENV_VAR};
pub use mount::MountDevice;
pub use simulator::SimulatedMount;
