use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::algorithms::sexagesimal::decimal_to_sexagesimal;

/// Pointing state machine states.
///
/// Owned by the controller; transitions are the only mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointingState {
    Disconnected,
    Idle,
    Slewing,
    Tracking,
    Aborting,
}

impl PointingState {
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for PointingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Idle => "idle",
            Self::Slewing => "slewing",
            Self::Tracking => "tracking",
            Self::Aborting => "aborting",
        };
        f.write_str(s)
    }
}

/// Jog direction. North/South move declination, East/West move right ascension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    North,
    South,
    East,
    West,
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "0" => Ok(Self::North),
            "south" | "s" | "1" => Ok(Self::South),
            "east" | "e" | "2" => Ok(Self::East),
            "west" | "w" | "3" => Ok(Self::West),
            _ => Err(format!("Unknown axis: {}", s)),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        };
        f.write_str(s)
    }
}

/// Raw position report from a mount device.
///
/// The derived fields (`hour_angle`, `elevation`, `azimuth`) are whatever the
/// device computed; the controller recomputes them itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountPosition {
    /// Hours.
    pub right_ascension: f64,
    /// Degrees.
    pub declination: f64,
    /// Local sidereal time, hours.
    pub sidereal_time: f64,
    pub elevation: f64,
    pub azimuth: f64,
    pub hour_angle: f64,
    /// Opaque device-supplied safety margin, hours.
    pub time_limit: f64,
    pub slewing: bool,
    pub tracking: bool,
}

/// Immutable telescope snapshot, produced fresh on every poll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelescopeStatus {
    /// Hours.
    pub right_ascension: f64,
    /// Degrees.
    pub declination: f64,
    /// Hours.
    pub sidereal_time: f64,
    /// Hours, in (-12, 12].
    pub hour_angle: f64,
    /// Degrees.
    pub elevation: f64,
    /// Degrees, north = 0, east = 90.
    pub azimuth: f64,
    /// Hours remaining before the device's safety cutoff.
    pub time_limit: f64,
    pub slewing: bool,
    pub tracking: bool,
    pub connected: bool,
    pub state: PointingState,
}

/// Text fields a front end renders for a [`TelescopeStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDisplay {
    pub right_ascension: String,
    pub declination: String,
    pub sidereal_time: String,
    pub hour_angle: String,
    pub time_limit: String,
    pub elevation: String,
}

impl TelescopeStatus {
    /// Sexagesimal rendering of the snapshot.
    pub fn display_fields(&self) -> StatusDisplay {
        // Precision values are non-negative constants, formatting cannot fail.
        let hms = |v: f64, digits: i32| decimal_to_sexagesimal(v, digits).unwrap_or_default();
        StatusDisplay {
            right_ascension: hms(self.right_ascension, 2),
            declination: hms(self.declination, 1),
            sidereal_time: hms(self.sidereal_time, 2),
            hour_angle: hms(self.hour_angle, 2),
            time_limit: hms(self.time_limit, 0),
            elevation: format!("{:.2}", self.elevation),
        }
    }
}
