use serde::{Deserialize, Serialize};

use crate::algorithms::sexagesimal;
use crate::error::{PointingError, PointingResult};
use crate::models::AngleUnit;

/// Latitude of Observatório do Pico dos Dias, "-22 32 04".
pub const OPD_LATITUDE: &str = "-22 32 04";
/// Longitude of Observatório do Pico dos Dias, "-45 34 57".
pub const OPD_LONGITUDE: &str = "-45 34 57";

/// Fixed observer location used for every horizontal transform of a session.
///
/// Longitude is positive east of Greenwich.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverSite {
    latitude: f64,
    longitude: f64,
}

impl ObserverSite {
    /// Create a site from decimal degrees.
    ///
    /// # Errors
    /// `Domain` when either value is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> PointingResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(PointingError::Domain(format!(
                "site coordinates must be finite (lat={}, lon={})",
                latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(PointingError::Domain(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=360.0).contains(&longitude) {
            return Err(PointingError::Domain(format!(
                "longitude {} outside [-180, 360]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a site from "±DD MM SS" strings.
    pub fn from_sexagesimal(latitude: &str, longitude: &str) -> PointingResult<Self> {
        let lat = sexagesimal::sexagesimal_to_decimal(latitude, AngleUnit::Degrees)?;
        let lon = sexagesimal::sexagesimal_to_decimal(longitude, AngleUnit::Degrees)?;
        Self::new(lat.degrees(), lon.degrees())
    }

    /// The Pico dos Dias site the simulator was built around.
    pub fn opd() -> Self {
        // -22°32'04" / -45°34'57"
        Self {
            latitude: -(22.0 + 32.0 / 60.0 + 4.0 / 3600.0),
            longitude: -(45.0 + 34.0 / 60.0 + 57.0 / 3600.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Default for ObserverSite {
    fn default() -> Self {
        Self::opd()
    }
}
