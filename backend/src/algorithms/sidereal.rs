//! Local sidereal time from UTC.
//!
//! Uses the linear GMST expression (Meeus / USNO), accurate to ~0.1 s over
//! the present century, which is plenty for pointing a simulated mount.

use chrono::{DateTime, Utc};

use super::sexagesimal::normalize_hours;

/// Julian date of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of J2000.0.
const J2000_JD: f64 = 2_451_545.0;
/// GMST at J2000.0, hours.
const GMST_AT_J2000: f64 = 18.697_374_558;
/// GMST advance per UT day, hours.
const GMST_PER_DAY: f64 = 24.065_709_824_419_08;

/// Sidereal hours elapsed per solar second.
pub const SIDEREAL_HOURS_PER_SECOND: f64 = GMST_PER_DAY / 24.0 / 3600.0;

/// Julian date of a UTC instant.
pub fn julian_date(time: DateTime<Utc>) -> f64 {
    let seconds = time.timestamp() as f64 + time.timestamp_subsec_nanos() as f64 / 1e9;
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

/// Greenwich mean sidereal time in hours, `[0, 24)`.
pub fn greenwich_sidereal_time(time: DateTime<Utc>) -> f64 {
    let days = julian_date(time) - J2000_JD;
    normalize_hours(GMST_AT_J2000 + GMST_PER_DAY * days)
}

/// Local mean sidereal time in hours for an east-positive longitude in degrees.
pub fn local_sidereal_time(time: DateTime<Utc>, longitude_deg: f64) -> f64 {
    normalize_hours(greenwich_sidereal_time(time) + longitude_deg / 15.0)
}
