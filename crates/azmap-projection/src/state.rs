//! Projection state: mode, center, and the forward/inverse mappings.
//!
//! A [`ProjectionState`] is a small `Copy` value. Every projection call reads
//! it explicitly, so independent views can keep their own state and a caller
//! can hand a snapshot to another thread without sharing anything mutable.

use std::f64::consts::PI;

use glam::DVec2;

use crate::error::ProjectionError;
use crate::mode::ProjectionMode;
use crate::point::{GeoPoint, normalize_longitude};

/// Mean earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance from the center to its antipode, the outer rim of the azimuthal
/// equidistant disc (about 20015 km).
pub const AZEQ_MAX_RADIUS_KM: f64 = PI * EARTH_RADIUS_KM;

/// Angular tolerance (radians) for "same point" and "exact antipode".
const ANGLE_EPSILON: f64 = 1e-10;

/// Floor applied to `cos(c)` when a far-side point is pulled onto the
/// orthographic horizon.
const HORIZON_COS_FLOOR: f64 = 1e-6;

/// Per-point trigonometry shared by the forward formulas.
struct Direction {
    /// Cosine of the angular distance from the center, clamped to `[-1, 1]`.
    cos_c: f64,
    /// `cos(lat)·sin(Δlon)`, the east component scaled by `sin(c)`.
    east: f64,
    /// `cos(lat0)·sin(lat) − sin(lat0)·cos(lat)·cos(Δlon)`, the north
    /// component scaled by `sin(c)`.
    north: f64,
}

/// Current projection mode and center, with cached center trigonometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionState {
    mode: ProjectionMode,
    center: GeoPoint,
    center_lon_rad: f64,
    sin_center_lat: f64,
    cos_center_lat: f64,
}

impl Default for ProjectionState {
    fn default() -> Self {
        Self::from_valid_center(ProjectionMode::default(), GeoPoint::default())
    }
}

impl ProjectionState {
    /// Create a state for `mode` centered on `center`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] if the latitude is
    /// outside `[-90, 90]` or either component is not finite.
    pub fn new(mode: ProjectionMode, center: GeoPoint) -> Result<Self, ProjectionError> {
        let center = GeoPoint::wrapped(center.lat, center.lon)?;
        Ok(Self::from_valid_center(mode, center))
    }

    fn from_valid_center(mode: ProjectionMode, center: GeoPoint) -> Self {
        let (sin_center_lat, cos_center_lat) = center.lat.to_radians().sin_cos();
        Self {
            mode,
            center,
            center_lon_rad: center.lon.to_radians(),
            sin_center_lat,
            cos_center_lat,
        }
    }

    /// Switch projection model. The center is unchanged.
    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    /// Current projection model.
    #[inline]
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Move the projection center. The cached trigonometry is refreshed in
    /// the same step; on error the state is left untouched.
    ///
    /// Longitudes outside `[-180, 180]` are wrapped.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] for a latitude outside
    /// `[-90, 90]` or non-finite input.
    pub fn set_center(&mut self, lat: f64, lon: f64) -> Result<(), ProjectionError> {
        let center = GeoPoint::wrapped(lat, lon)?;
        *self = Self::from_valid_center(self.mode, center);
        Ok(())
    }

    /// Current center in degrees.
    #[inline]
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Radius of the projected disc for the current mode, in km.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.mode.radius_km()
    }

    fn direction(&self, lat: f64, lon: f64) -> Direction {
        let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
        let (sin_dlon, cos_dlon) = (lon.to_radians() - self.center_lon_rad).sin_cos();

        let cos_c = (self.sin_center_lat * sin_lat + self.cos_center_lat * cos_lat * cos_dlon)
            .clamp(-1.0, 1.0);

        Direction {
            cos_c,
            east: cos_lat * sin_dlon,
            north: self.cos_center_lat * sin_lat - self.sin_center_lat * cos_lat * cos_dlon,
        }
    }

    /// Project a geographic point (degrees) to planar km relative to the
    /// center.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::AntipodalUndefined`] when the point is on
    /// the far hemisphere in orthographic mode, or exactly at the antipode
    /// in azimuthal equidistant mode.
    pub fn forward(&self, lat: f64, lon: f64) -> Result<DVec2, ProjectionError> {
        let dir = self.direction(lat, lon);

        match self.mode {
            ProjectionMode::Orthographic => {
                if dir.cos_c <= 0.0 {
                    return Err(ProjectionError::AntipodalUndefined);
                }
                Ok(DVec2::new(dir.east, dir.north) * EARTH_RADIUS_KM)
            }
            ProjectionMode::AzimuthalEquidistant => {
                let c = dir.cos_c.acos();
                if c < ANGLE_EPSILON {
                    return Ok(DVec2::ZERO);
                }
                if PI - c < ANGLE_EPSILON {
                    return Err(ProjectionError::AntipodalUndefined);
                }
                let k = (c / c.sin()) * EARTH_RADIUS_KM;
                Ok(DVec2::new(dir.east, dir.north) * k)
            }
        }
    }

    /// [`forward`](Self::forward) taking a [`GeoPoint`].
    #[inline]
    pub fn forward_point(&self, point: GeoPoint) -> Result<DVec2, ProjectionError> {
        self.forward(point.lat, point.lon)
    }

    /// Like [`forward`](Self::forward), but never fails.
    ///
    /// A point without a planar image is pulled onto the disc boundary along
    /// its true bearing from the center. In orthographic mode this is the
    /// image of the point at `cos(c) = ε`, a hair inside the horizon circle;
    /// in azimuthal equidistant mode it is the outer rim. The exact
    /// antipode has no bearing and is placed at bearing 180°.
    pub fn forward_clamped(&self, lat: f64, lon: f64) -> DVec2 {
        if let Ok(p) = self.forward(lat, lon) {
            return p;
        }

        let dir = self.direction(lat, lon);
        let bearing = DVec2::new(dir.east, dir.north);
        let unit = if bearing.length() < ANGLE_EPSILON {
            DVec2::NEG_Y
        } else {
            bearing.normalize()
        };

        let rim = match self.mode {
            ProjectionMode::Orthographic => {
                EARTH_RADIUS_KM * (1.0 - HORIZON_COS_FLOOR * HORIZON_COS_FLOOR).sqrt()
            }
            ProjectionMode::AzimuthalEquidistant => AZEQ_MAX_RADIUS_KM,
        };
        unit * rim
    }

    /// [`forward_clamped`](Self::forward_clamped) taking a [`GeoPoint`].
    #[inline]
    pub fn forward_clamped_point(&self, point: GeoPoint) -> DVec2 {
        self.forward_clamped(point.lat, point.lon)
    }

    /// Returns `true` if `point` has a planar image under the current mode.
    #[inline]
    pub fn is_visible(&self, point: GeoPoint) -> bool {
        self.forward(point.lat, point.lon).is_ok()
    }

    /// Recover the geographic point (degrees) at planar km `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::OutOfDomain`] when `(x, y)` lies beyond the
    /// radius of the current mode.
    pub fn inverse(&self, x: f64, y: f64) -> Result<GeoPoint, ProjectionError> {
        let rho = x.hypot(y);
        let max = self.radius();
        if !rho.is_finite() || rho > max {
            return Err(ProjectionError::OutOfDomain {
                rho_km: rho,
                max_km: max,
            });
        }

        if rho < ANGLE_EPSILON {
            return Ok(self.center);
        }

        let c = match self.mode {
            ProjectionMode::Orthographic => (rho / EARTH_RADIUS_KM).min(1.0).asin(),
            ProjectionMode::AzimuthalEquidistant => rho / EARTH_RADIUS_KM,
        };
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_center_lat + y * sin_c * self.cos_center_lat / rho)
            .clamp(-1.0, 1.0)
            .asin();

        let dlon = if self.cos_center_lat.abs() < ANGLE_EPSILON {
            // Polar center: every meridian radiates straight out.
            let toward = if self.center.lat > 0.0 { -y } else { y };
            x.atan2(toward)
        } else {
            (x * sin_c).atan2(
                rho * self.cos_center_lat * cos_c - y * self.sin_center_lat * sin_c,
            )
        };

        Ok(GeoPoint::new(
            lat.to_degrees(),
            normalize_longitude((self.center_lon_rad + dlon).to_degrees()),
        ))
    }
}
