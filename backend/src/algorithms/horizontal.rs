//! Equatorial to horizontal coordinate transform.
//!
//! Azimuth convention: north = 0°, east = 90°, south = 180°, west = 270°.

use serde::{Deserialize, Serialize};

use super::sexagesimal::hour_angle_from_ra;
use crate::error::{PointingError, PointingResult};
use crate::models::{Angle, ObserverSite};

/// Elevation and azimuth of a target, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoords {
    /// [-90, 90]
    pub elevation: f64,
    /// [0, 360)
    pub azimuth: f64,
}

impl HorizontalCoords {
    /// Visibility gate applied before a slew: elevation in `(0, 90]`.
    pub fn is_above_horizon(&self) -> bool {
        self.elevation > 0.0 && self.elevation <= 90.0
    }
}

/// Compute elevation and azimuth from hour angle, declination and latitude.
///
/// At the geographic poles azimuth is undefined and reported as 0.
///
/// # Errors
/// `Domain` if any input is NaN or infinite.
pub fn elevation_azimuth(
    hour_angle_hours: f64,
    declination_deg: f64,
    latitude_deg: f64,
) -> PointingResult<HorizontalCoords> {
    if !(hour_angle_hours.is_finite() && declination_deg.is_finite() && latitude_deg.is_finite())
    {
        return Err(PointingError::Domain(format!(
            "non-finite input (ha={}, dec={}, lat={})",
            hour_angle_hours, declination_deg, latitude_deg
        )));
    }

    let ha = (hour_angle_hours * 15.0).to_radians();
    let dec = declination_deg.to_radians();
    let lat = latitude_deg.to_radians();

    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_ha, cos_ha) = ha.sin_cos();

    let sin_el = (sin_dec * sin_lat + cos_dec * cos_lat * cos_ha).clamp(-1.0, 1.0);
    let elevation = sin_el.asin().to_degrees();

    let azimuth = if (latitude_deg.abs() - 90.0).abs() < 1e-12 {
        0.0
    } else {
        let y = -cos_dec * sin_ha;
        let x = sin_dec * cos_lat - cos_dec * sin_lat * cos_ha;
        let az = y.atan2(x).to_degrees().rem_euclid(360.0);
        if az >= 360.0 {
            0.0
        } else {
            az
        }
    };

    Ok(HorizontalCoords {
        elevation,
        azimuth,
    })
}

/// Hour angle and horizontal coordinates of an equatorial target seen from
/// `site` at `sidereal_hours`.
pub fn equatorial_to_horizontal(
    ra_hours: f64,
    declination_deg: f64,
    sidereal_hours: f64,
    site: &ObserverSite,
) -> PointingResult<(Angle, HorizontalCoords)> {
    let ha = hour_angle_from_ra(ra_hours, sidereal_hours);
    let coords = elevation_azimuth(ha.hours(), declination_deg, site.latitude())?;
    Ok((ha, coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zenith_when_dec_equals_latitude() {
        let coords = elevation_azimuth(0.0, -22.534, -22.534).unwrap();
        assert!((coords.elevation - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_equator_at_six_hours_is_on_horizon() {
        let coords = elevation_azimuth(6.0, 0.0, 0.0).unwrap();
        assert!(coords.elevation.abs() < 1e-9);
        // positive hour angle sets in the west
        assert!((coords.azimuth - 270.0).abs() < 1e-9);

        let coords = elevation_azimuth(-6.0, 0.0, 0.0).unwrap();
        assert!((coords.azimuth - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_meridian_transit_south_of_zenith() {
        // Southern site, target on the meridian north of the zenith
        let coords = elevation_azimuth(0.0, 0.0, -22.534).unwrap();
        assert!((coords.elevation - 67.466).abs() < 1e-9);
        assert!(coords.azimuth.abs() < 1e-9);

        // Northern site, equatorial target culminates due south
        let coords = elevation_azimuth(0.0, 0.0, 40.0).unwrap();
        assert!((coords.elevation - 50.0).abs() < 1e-9);
        assert!((coords.azimuth - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_culmination_is_below_horizon() {
        let coords = elevation_azimuth(12.0, 10.0, -22.534).unwrap();
        assert!(coords.elevation < 0.0);
        assert!(!coords.is_above_horizon());
    }

    #[test]
    fn test_pole_azimuth_is_zero() {
        let coords = elevation_azimuth(3.0, 45.0, 90.0).unwrap();
        assert_eq!(coords.azimuth, 0.0);
        assert!((coords.elevation - 45.0).abs() < 1e-9);

        let coords = elevation_azimuth(3.0, -10.0, -90.0).unwrap();
        assert_eq!(coords.azimuth, 0.0);
        assert!((coords.elevation - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_inputs_are_domain_errors() {
        for (ha, dec, lat) in [
            (f64::NAN, 0.0, 0.0),
            (0.0, f64::INFINITY, 0.0),
            (0.0, 0.0, f64::NEG_INFINITY),
        ] {
            assert!(matches!(
                elevation_azimuth(ha, dec, lat),
                Err(PointingError::Domain(_))
            ));
        }
    }

    #[test]
    fn test_horizon_gate_bounds() {
        let on_horizon = HorizontalCoords {
            elevation: 0.0,
            azimuth: 90.0,
        };
        assert!(!on_horizon.is_above_horizon());
        let zenith = HorizontalCoords {
            elevation: 90.0,
            azimuth: 0.0,
        };
        assert!(zenith.is_above_horizon());
    }

    #[test]
    fn test_equatorial_to_horizontal_uses_site_latitude() {
        let site = ObserverSite::opd();
        let (ha, coords) =
            equatorial_to_horizontal(5.0, site.latitude(), 5.0, &site).unwrap();
        assert_eq!(ha.hours(), 0.0);
        assert!((coords.elevation - 90.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_outputs_in_range(
            ha in -12.0f64..=12.0,
            dec in -90.0f64..=90.0,
            lat in -90.0f64..=90.0,
        ) {
            let coords = elevation_azimuth(ha, dec, lat).unwrap();
            prop_assert!(coords.elevation >= -90.0 && coords.elevation <= 90.0);
            prop_assert!(coords.azimuth >= 0.0 && coords.azimuth < 360.0);
        }
    }
}
