//! Geographic positions and their unit-sphere vectors.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// A geographic position in degrees on the spherical earth.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// The north pole.
    pub const NORTH_POLE: GeoPoint = GeoPoint::new(90.0, 0.0);

    /// Create a point from latitude and longitude in degrees.
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a point from a `(longitude, latitude)` pair, the order used by
    /// shapefiles and GeoJSON.
    #[inline]
    pub const fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a point from user input, wrapping the longitude into
    /// `[-180, 180]`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] for a non-finite value
    /// or a latitude outside `[-90, 90]`.
    pub fn wrapped(lat: f64, lon: f64) -> Result<Self, ProjectionError> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::InvalidCoordinate { lat, lon });
        }
        Ok(Self::new(lat, normalize_longitude(lon)))
    }

    /// Returns `true` if both components are finite, the latitude lies in
    /// `[-90, 90]` and the longitude in `[-180, 180]`.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Unit vector on the sphere: `+X` through (0°, 0°), `+Y` through
    /// (0°, 90°E), `+Z` through the north pole.
    #[must_use]
    pub fn to_unit_vector(&self) -> DVec3 {
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Inverse of [`to_unit_vector`](Self::to_unit_vector). The input does not
    /// need to be normalized.
    #[must_use]
    pub fn from_unit_vector(v: DVec3) -> Self {
        let lat = v.z.atan2(v.x.hypot(v.y)).to_degrees();
        let lon = v.y.atan2(v.x).to_degrees();
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Interprets the tuple as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Wrap a longitude into `[-180, 180]`. `180` itself is preserved.
#[must_use]
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
