use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit an [`Angle`] value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    /// Time-like angle, 24h = 360°.
    Hours,
    /// Arc degrees.
    Degrees,
}

/// A decimal angle tagged with its unit.
///
/// Right ascension, sidereal time and hour angle are carried in hours;
/// declination, latitude, elevation and azimuth in degrees. Keeping the unit
/// next to the value prevents hours from leaking into a degree formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    value: f64,
    unit: AngleUnit,
}

impl Angle {
    pub const fn new(value: f64, unit: AngleUnit) -> Self {
        Self { value, unit }
    }

    pub const fn from_hours(value: f64) -> Self {
        Self::new(value, AngleUnit::Hours)
    }

    pub const fn from_degrees(value: f64) -> Self {
        Self::new(value, AngleUnit::Degrees)
    }

    /// Raw value in the angle's own unit.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    pub fn degrees(&self) -> f64 {
        match self.unit {
            AngleUnit::Degrees => self.value,
            AngleUnit::Hours => self.value * 15.0,
        }
    }

    pub fn hours(&self) -> f64 {
        match self.unit {
            AngleUnit::Hours => self.value,
            AngleUnit::Degrees => self.value / 15.0,
        }
    }

    pub fn radians(&self) -> f64 {
        self.degrees().to_radians()
    }

    /// Same angle re-expressed in `unit`.
    pub fn to_unit(self, unit: AngleUnit) -> Self {
        match unit {
            AngleUnit::Hours => Self::from_hours(self.hours()),
            AngleUnit::Degrees => Self::from_degrees(self.degrees()),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            AngleUnit::Hours => write!(f, "{:.6}h", self.value),
            AngleUnit::Degrees => write!(f, "{:.6}°", self.value),
        }
    }
}
