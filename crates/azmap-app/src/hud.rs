//! Text shown alongside the map: location labels, distance and bearings,
//! and the clock line.

use std::fmt;

use azmap_projection::{GeoPoint, azimuth, distance};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// `"12.34N, 1.23W"`: two decimals, hemisphere letters instead of signs.
pub fn format_coord(point: GeoPoint) -> String {
    let ns = if point.lat >= 0.0 { 'N' } else { 'S' };
    let ew = if point.lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.2}{ns}, {:.2}{ew}", point.lat.abs(), point.lon.abs())
}

/// `"Name (12.34N, 1.23W)"`, or just the coordinates when there is no name.
pub fn location_label(name: Option<&str>, point: GeoPoint) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("{name} ({})", format_coord(point)),
        None => format_coord(point),
    }
}

/// Great-circle distance and bearings between the center and the target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathSummary {
    pub distance_km: f64,
    /// Initial bearing from the center toward the target, degrees.
    pub azimuth_to: f64,
    /// Initial bearing from the target back toward the center, degrees.
    pub azimuth_from: f64,
}

impl PathSummary {
    pub fn between(center: GeoPoint, target: GeoPoint) -> Self {
        Self {
            distance_km: distance(center.lat, center.lon, target.lat, target.lon),
            azimuth_to: azimuth(center.lat, center.lon, target.lat, target.lon),
            azimuth_from: azimuth(target.lat, target.lon, center.lat, center.lon),
        }
    }
}

impl fmt::Display for PathSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dist: {:.1} km  Az to: {:.1}°  Az from: {:.1}°",
            self.distance_km, self.azimuth_to, self.azimuth_from
        )
    }
}

/// `"Local: 14:03:09  UTC: 12:03:09"`.
pub fn clock_line(now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&Local);
    format!("Local: {}  UTC: {}", local.format("%H:%M:%S"), now.format("%H:%M:%S"))
}
