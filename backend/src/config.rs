//! Mount configuration file support.
//!
//! This module reads the engine configuration from a TOML file. Every section
//! is optional; missing values fall back to the Pico dos Dias simulator setup.
//!
//! ```toml
//! [device]
//! type = "simulator"
//!
//! [site]
//! latitude = "-22 32 04"
//! longitude = "-45 34 57"
//!
//! [simulator]
//! slew_rate_deg_per_sec = 3.0
//! meridian_limit_hours = 4.0
//!
//! [telemetry]
//! url = "http://127.0.0.1:5000"
//! timeout_ms = 1000
//!
//! [controller]
//! poll_interval_ms = 500
//! command_cooldown_ms = 3000
//! jog_rate = 10.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PointingError, PointingResult};
use crate::models::{ObserverSite, OPD_LATITUDE, OPD_LONGITUDE};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "MOUNT_CONFIG";

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MountConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub simulator: SimulatorSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub controller: ControllerSettings,
}

/// Device driver selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,
}

/// Observer site, as sexagesimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_latitude")]
    pub latitude: String,
    #[serde(default = "default_longitude")]
    pub longitude: String,
}

/// Simulated mount behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorSettings {
    #[serde(default = "default_slew_rate")]
    pub slew_rate_deg_per_sec: f64,
    #[serde(default = "default_meridian_limit")]
    pub meridian_limit_hours: f64,
    /// Fastest accepted jog rate, arcsec/s.
    #[serde(default = "default_max_jog_rate")]
    pub max_jog_rate: f64,
    /// Starting declination; the mount starts on the meridian at this
    /// declination (the zenith when unset).
    #[serde(default)]
    pub park_declination: Option<f64>,
}

/// Telemetry sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Base URL of the telemetry receiver; publishing is disabled when unset.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_telemetry_path")]
    pub path: String,
    #[serde(default = "default_telemetry_timeout")]
    pub timeout_ms: u64,
}

/// Controller and polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_command_cooldown")]
    pub command_cooldown_ms: u64,
    /// Default jog rate, arcsec/s.
    #[serde(default = "default_jog_rate")]
    pub jog_rate: f64,
}

fn default_device_type() -> String {
    "simulator".to_string()
}

fn default_latitude() -> String {
    OPD_LATITUDE.to_string()
}

fn default_longitude() -> String {
    OPD_LONGITUDE.to_string()
}

fn default_slew_rate() -> f64 {
    3.0
}

fn default_meridian_limit() -> f64 {
    4.0
}

fn default_max_jog_rate() -> f64 {
    3600.0
}

fn default_telemetry_path() -> String {
    "/api/telescope/position".to_string()
}

fn default_telemetry_timeout() -> u64 {
    1000
}

fn default_poll_interval() -> u64 {
    500
}

fn default_command_cooldown() -> u64 {
    3000
}

fn default_jog_rate() -> f64 {
    10.0
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            slew_rate_deg_per_sec: default_slew_rate(),
            meridian_limit_hours: default_meridian_limit(),
            max_jog_rate: default_max_jog_rate(),
            park_declination: None,
        }
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            url: None,
            path: default_telemetry_path(),
            timeout_ms: default_telemetry_timeout(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            command_cooldown_ms: default_command_cooldown(),
            jog_rate: default_jog_rate(),
        }
    }
}

impl MountConfig {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> PointingResult<Self> {
        let config: MountConfig = toml::from_str(content)
            .map_err(|e| PointingError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(MountConfig)` if successful
    /// * `Err(PointingError::Config)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> PointingResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PointingError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `mount.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PointingResult<Self> {
        let search_paths = vec![
            PathBuf::from("mount.toml"),
            PathBuf::from("backend/mount.toml"),
            PathBuf::from("../mount.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PointingError::Config(
            "No mount.toml found in standard locations".to_string(),
        ))
    }

    /// Load configuration for a process.
    ///
    /// Uses the file named by `MOUNT_CONFIG` when set, then the default
    /// locations, then built-in defaults.
    pub fn from_env() -> PointingResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(path);
        }
        match Self::from_default_location() {
            Ok(config) => Ok(config),
            Err(_) => {
                log::info!("No mount.toml found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> PointingResult<()> {
        self.site()?;

        let sim = &self.simulator;
        if !(sim.slew_rate_deg_per_sec.is_finite() && sim.slew_rate_deg_per_sec > 0.0) {
            return Err(PointingError::Config(format!(
                "simulator.slew_rate_deg_per_sec must be positive, got {}",
                sim.slew_rate_deg_per_sec
            )));
        }
        if !(sim.max_jog_rate.is_finite() && sim.max_jog_rate > 0.0) {
            return Err(PointingError::Config(format!(
                "simulator.max_jog_rate must be positive, got {}",
                sim.max_jog_rate
            )));
        }
        if let Some(dec) = sim.park_declination {
            if !(-90.0..=90.0).contains(&dec) {
                return Err(PointingError::Config(format!(
                    "simulator.park_declination {} outside [-90, 90]",
                    dec
                )));
            }
        }
        if self.controller.poll_interval_ms == 0 {
            return Err(PointingError::Config(
                "controller.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(self.controller.jog_rate.is_finite() && self.controller.jog_rate > 0.0) {
            return Err(PointingError::Config(format!(
                "controller.jog_rate must be positive, got {}",
                self.controller.jog_rate
            )));
        }
        Ok(())
    }

    /// Observer site decoded from the sexagesimal settings.
    pub fn site(&self) -> PointingResult<ObserverSite> {
        ObserverSite::from_sexagesimal(&self.site.latitude, &self.site.longitude)
            .map_err(|e| PointingError::Config(format!("Invalid [site]: {}", e)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.controller.poll_interval_ms)
    }

    pub fn command_cooldown(&self) -> Duration {
        Duration::from_millis(self.controller.command_cooldown_ms)
    }

    pub fn telemetry_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry.timeout_ms)
    }
}
