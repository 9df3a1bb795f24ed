//! Stateless coordinate routines.

pub mod horizontal;
pub mod sexagesimal;
pub mod sidereal;

pub use horizontal::{elevation_azimuth, equatorial_to_horizontal, HorizontalCoords};
pub use sexagesimal::{
    decimal_to_sexagesimal, hour_angle_from_ra, is_well_formed, normalize_hours,
    sexagesimal_to_decimal,
};
