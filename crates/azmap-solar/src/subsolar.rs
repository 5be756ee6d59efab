//! Subsolar point from a UTC instant.
//!
//! Declination follows a single cosine harmonic of the day of year and the
//! longitude moves a steady 15° per hour from 0° at noon UTC. There is no
//! equation-of-time term, so the sun can be off by a few degrees of
//! longitude; that is fine for a shading overlay.

use std::f64::consts::TAU;

use azmap_projection::{GeoPoint, angular_separation, normalize_longitude};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Axial tilt used as the declination amplitude, in degrees.
const DECLINATION_AMPLITUDE_DEG: f64 = 23.44;
/// Days from January 1 to the December solstice phase of the harmonic.
const SOLSTICE_OFFSET_DAYS: f64 = 10.0;
const DAYS_PER_YEAR: f64 = 365.25;
const DEGREES_PER_HOUR: f64 = 15.0;

/// The point on Earth directly under the sun, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsolarPoint {
    /// Latitude, equal to the solar declination.
    pub lat: f64,
    /// Longitude in `[-180, 180]`.
    pub lon: f64,
}

impl SubsolarPoint {
    /// Sun position at `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        let hours = utc_hours(instant);
        let day = f64::from(instant.ordinal0()) + hours / 24.0;

        let lat = -DECLINATION_AMPLITUDE_DEG * (TAU * (day + SOLSTICE_OFFSET_DAYS) / DAYS_PER_YEAR).cos();
        let lon = normalize_longitude(-(hours - 12.0) * DEGREES_PER_HOUR);

        Self { lat, lon }
    }

    /// The sun position as a geographic point.
    #[inline]
    pub fn as_geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

impl From<SubsolarPoint> for GeoPoint {
    fn from(p: SubsolarPoint) -> Self {
        p.as_geo_point()
    }
}

/// Fractional hours since midnight UTC.
fn utc_hours(instant: DateTime<Utc>) -> f64 {
    let seconds = f64::from(instant.num_seconds_from_midnight())
        + f64::from(instant.nanosecond() % 1_000_000_000) * 1e-9;
    seconds / 3600.0
}

/// Solar zenith angle in degrees at `point`: its angular distance from the
/// subsolar point. Above 90° the sun is below the horizon.
pub fn solar_zenith_angle(point: GeoPoint, sun: &SubsolarPoint) -> f64 {
    angular_separation(point, sun.as_geo_point()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_noon_utc_is_over_greenwich() {
        for (y, m, d) in [(2024, 1, 1), (2024, 6, 21), (2025, 9, 23), (2026, 12, 31)] {
            let sun = SubsolarPoint::at(utc(y, m, d, 12, 0, 0));
            assert!(sun.lon.abs() < 1e-6, "{y}-{m}-{d}: lon {}", sun.lon);
        }
    }

    #[test]
    fn test_longitude_moves_west_fifteen_degrees_per_hour() {
        let sun = SubsolarPoint::at(utc(2024, 3, 20, 18, 0, 0));
        assert!((sun.lon - -90.0).abs() < 1e-9);
        let sun = SubsolarPoint::at(utc(2024, 3, 20, 6, 30, 0));
        assert!((sun.lon - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_stays_in_range() {
        for h in 0..24 {
            let sun = SubsolarPoint::at(utc(2024, 5, 5, h, 59, 59));
            assert!((-180.0..=180.0).contains(&sun.lon), "hour {h}: {}", sun.lon);
        }
    }

    #[test]
    fn test_declination_at_solstices() {
        let june = SubsolarPoint::at(utc(2024, 6, 20, 12, 0, 0));
        assert!((june.lat - 23.44).abs() < 0.05, "june {}", june.lat);
        let december = SubsolarPoint::at(utc(2024, 12, 21, 12, 0, 0));
        assert!((december.lat + 23.44).abs() < 0.05, "december {}", december.lat);
    }

    #[test]
    fn test_declination_near_zero_at_equinox() {
        let march = SubsolarPoint::at(utc(2025, 3, 21, 0, 0, 0));
        assert!(march.lat.abs() < 1.5, "march {}", march.lat);
    }

    #[test]
    fn test_zenith_angle() {
        let sun = SubsolarPoint { lat: 0.0, lon: 0.0 };
        assert!(solar_zenith_angle(GeoPoint::new(0.0, 0.0), &sun).abs() < 1e-9);
        assert!((solar_zenith_angle(GeoPoint::new(0.0, 90.0), &sun) - 90.0).abs() < 1e-9);
        assert!((solar_zenith_angle(GeoPoint::new(0.0, 180.0), &sun) - 180.0).abs() < 1e-9);
        assert!((solar_zenith_angle(GeoPoint::NORTH_POLE, &sun) - 90.0).abs() < 1e-9);
    }
}
