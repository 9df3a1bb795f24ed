//! Device factory for dependency injection.
//!
//! Creates mount drivers from runtime configuration.

use std::str::FromStr;
use std::sync::Arc;

use super::error::{DeviceError, DeviceResult};
use super::mount::MountDevice;
use super::simulator::SimulatedMount;
use crate::config::MountConfig;

/// Environment variable overriding the configured device type.
pub const DEVICE_ENV_VAR: &str = "MOUNT_DEVICE";

/// Mount driver kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// In-process simulated mount
    Simulator,
}

impl FromStr for DeviceType {
    type Err = String;

    /// Parse device type from string ("simulator", "sim").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulator" | "sim" => Ok(Self::Simulator),
            _ => Err(format!("Unknown device type: {}", s)),
        }
    }
}

impl DeviceType {
    /// Device type from `MOUNT_DEVICE`, falling back to `fallback`.
    pub fn from_env_or(fallback: &str) -> Result<Self, String> {
        match std::env::var(DEVICE_ENV_VAR) {
            Ok(val) => val.parse(),
            Err(_) => fallback.parse(),
        }
    }
}

/// Factory for creating mount device instances.
pub struct DeviceFactory;

impl DeviceFactory {
    /// Create a device of the given type.
    ///
    /// # Errors
    /// `ConfigurationError` when the configuration is not usable for that device.
    pub fn create(device_type: DeviceType, config: &MountConfig) -> DeviceResult<Arc<dyn MountDevice>> {
        match device_type {
            DeviceType::Simulator => Ok(Self::create_simulator(config)?),
        }
    }

    /// Create a simulated mount for the configured site.
    pub fn create_simulator(config: &MountConfig) -> DeviceResult<Arc<SimulatedMount>> {
        let site = config
            .site()
            .map_err(|e| DeviceError::configuration(e.to_string()))?;
        Ok(Arc::new(SimulatedMount::new(site, config.simulator.clone())))
    }

    /// Create the device named by the configuration (or `MOUNT_DEVICE`).
    pub fn from_config(config: &MountConfig) -> DeviceResult<Arc<dyn MountDevice>> {
        let device_type =
            DeviceType::from_env_or(&config.device.device_type).map_err(DeviceError::configuration)?;
        Self::create(device_type, config)
    }
}
