//! Sexagesimal notation and hour-angle helpers.
//!
//! Angles are exchanged with operators as three whitespace-separated fields:
//!
//! ```text
//! HH MM SS.s     right ascension, sidereal time, hour angle
//! ±DD MM SS.s    declination, latitude
//! ```
//!
//! A sign is only accepted in front of the leading field and applies to the
//! whole value, so `-00 30 00` is -0.5. Minutes and seconds must lie in
//! `[0, 60)`.

use crate::error::{PointingError, PointingResult};
use crate::models::{Angle, AngleUnit};

/// Largest number of fractional second digits the formatter accepts.
pub const MAX_DECIMAL_DIGITS: i32 = 9;

struct Fields {
    negative: bool,
    lead: f64,
    minutes: f64,
    seconds: f64,
}

impl Fields {
    fn value(&self) -> f64 {
        let magnitude = self.lead + self.minutes / 60.0 + self.seconds / 3600.0;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

fn parse_unsigned(token: &str, field: &str) -> Result<f64, String> {
    let valid = !token.is_empty()
        && token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !valid {
        return Err(format!("{} field '{}' is not a number", field, token));
    }
    token
        .parse::<f64>()
        .map_err(|e| format!("{} field '{}': {}", field, token, e))
}

fn parse_fields(text: &str) -> Result<Fields, String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err("empty input".to_string());
    }
    if tokens.len() != 3 {
        return Err(format!("expected 3 fields, found {}", tokens.len()));
    }

    let (negative, lead) = match tokens[0].strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, tokens[0].strip_prefix('+').unwrap_or(tokens[0])),
    };
    let lead = parse_unsigned(lead, "leading")?;
    let minutes = parse_unsigned(tokens[1], "minutes")?;
    let seconds = parse_unsigned(tokens[2], "seconds")?;

    if minutes >= 60.0 {
        return Err(format!("minutes {} outside [0, 60)", tokens[1]));
    }
    if seconds >= 60.0 {
        return Err(format!("seconds {} outside [0, 60)", tokens[2]));
    }

    Ok(Fields {
        negative,
        lead,
        minutes,
        seconds,
    })
}

/// Check whether `text` is a well-formed sexagesimal string.
///
/// Applies exactly the checks of [`sexagesimal_to_decimal`] without building
/// an error, so it is cheap to call on every keystroke.
pub fn is_well_formed(text: &str) -> bool {
    parse_fields(text).is_ok()
}

/// Decode a sexagesimal string into a decimal angle of the given unit.
///
/// # Errors
/// `Parse` when the field count is not 3, a field is not numeric, minutes or
/// seconds fall outside `[0, 60)`, or the input is blank.
pub fn sexagesimal_to_decimal(text: &str, unit: AngleUnit) -> PointingResult<Angle> {
    parse_fields(text)
        .map(|fields| Angle::new(fields.value(), unit))
        .map_err(|e| PointingError::Parse(format!("'{}': {}", text.trim(), e)))
}

/// Encode a decimal value as `"[-]LL MM SS.s"`.
///
/// Seconds are rounded to `decimal_digits` places, carrying into minutes and
/// the leading field. The leading field is not wrapped, so 25.5 hours renders
/// as `25 30 00`.
///
/// # Errors
/// `Format` when `decimal_digits` is negative or above [`MAX_DECIMAL_DIGITS`];
/// `Domain` when `value` is not finite.
pub fn decimal_to_sexagesimal(value: f64, decimal_digits: i32) -> PointingResult<String> {
    if decimal_digits < 0 {
        return Err(PointingError::Format(format!(
            "decimal digits must be non-negative, got {}",
            decimal_digits
        )));
    }
    if decimal_digits > MAX_DECIMAL_DIGITS {
        return Err(PointingError::Format(format!(
            "decimal digits must be at most {}, got {}",
            MAX_DECIMAL_DIGITS, decimal_digits
        )));
    }
    if !value.is_finite() {
        return Err(PointingError::Domain(format!(
            "cannot format non-finite value {}",
            value
        )));
    }

    let digits = decimal_digits as usize;
    let scale = 10u128.pow(decimal_digits as u32);
    let total = (value.abs() * 3600.0 * scale as f64).round() as u128;

    let per_minute = 60 * scale;
    let per_lead = 60 * per_minute;
    let lead = total / per_lead;
    let minutes = (total % per_lead) / per_minute;
    let second_units = total % per_minute;
    let seconds = second_units as f64 / scale as f64;

    let sign = if value < 0.0 && total > 0 { "-" } else { "" };
    let width = if digits > 0 { digits + 3 } else { 2 };
    Ok(format!(
        "{}{:02} {:02} {:0width$.prec$}",
        sign,
        lead,
        minutes,
        seconds,
        width = width,
        prec = digits
    ))
}

/// Hour angle of a target: `lst - ra`, normalized into `(-12, 12]` hours.
pub fn hour_angle_from_ra(ra_hours: f64, sidereal_hours: f64) -> Angle {
    let mut ha = (sidereal_hours - ra_hours).rem_euclid(24.0);
    if ha > 12.0 {
        ha -= 24.0;
    }
    Angle::from_hours(ha)
}

/// Wrap an hour value into `[0, 24)`.
pub fn normalize_hours(hours: f64) -> f64 {
    let h = hours.rem_euclid(24.0);
    if h >= 24.0 {
        0.0
    } else {
        h
    }
}
