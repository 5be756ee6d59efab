//! Spherical geodesy: great-circle distance, bearing, and arc interpolation.

use std::f64::consts::PI;

use glam::DVec3;

use crate::point::GeoPoint;
use crate::state::EARTH_RADIUS_KM;

/// Angular tolerance (radians) below which two points coincide or are
/// treated as exact antipodes.
const ARC_EPSILON: f64 = 1e-10;

/// Great-circle distance in km between two points given in degrees
/// (haversine formula).
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let half_lat = (dlat / 2.0).sin();
    let half_lon = (dlon / 2.0).sin();
    let a = half_lat * half_lat
        + lat1.to_radians().cos() * lat2.to_radians().cos() * half_lon * half_lon;
    2.0 * EARTH_RADIUS_KM * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial bearing in degrees `[0, 360)` from point 1 toward point 2,
/// measured clockwise from north.
pub fn azimuth(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    let az = y.atan2(x).to_degrees().rem_euclid(360.0);
    if az >= 360.0 { 0.0 } else { az }
}

/// Angular separation in radians between two points.
///
/// Uses `atan2(|a × b|, a · b)` on the unit vectors, which stays accurate for
/// nearly coincident and nearly antipodal pairs where `acos` loses precision.
pub fn angular_separation(a: GeoPoint, b: GeoPoint) -> f64 {
    vector_separation(a.to_unit_vector(), b.to_unit_vector())
}

#[inline]
fn vector_separation(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ArcKind {
    /// Endpoints coincide; every parameter maps to the start point.
    Coincident,
    /// Ordinary arc interpolated with slerp weights.
    Regular { sin_angle: f64 },
    /// Endpoints are antipodal, so the great circle is not unique. The arc
    /// leaves the start point along `tangent`.
    Antipodal { tangent: DVec3 },
}

/// The shorter great-circle arc between two points, parameterized by
/// `t ∈ [0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GreatArc {
    from: DVec3,
    to: DVec3,
    angle: f64,
    kind: ArcKind,
}

impl GreatArc {
    /// Build the arc from `from` to `to`.
    ///
    /// Antipodal endpoints have no unique shortest path; the arc then follows
    /// the start point's meridian northward (toward longitude 0 when starting
    /// at a pole).
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        let a = from.to_unit_vector();
        let b = to.to_unit_vector();
        let angle = vector_separation(a, b);

        let kind = if angle < ARC_EPSILON {
            ArcKind::Coincident
        } else {
            let sin_angle = angle.sin();
            if sin_angle < ARC_EPSILON {
                ArcKind::Antipodal {
                    tangent: departure_tangent(a),
                }
            } else {
                ArcKind::Regular { sin_angle }
            }
        };

        Self {
            from: a,
            to: b,
            angle,
            kind,
        }
    }

    /// Central angle of the arc in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Arc length in km.
    #[inline]
    pub fn length_km(&self) -> f64 {
        self.angle * EARTH_RADIUS_KM
    }

    /// Returns `true` if both endpoints are the same point.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        matches!(self.kind, ArcKind::Coincident)
    }

    /// Returns `true` if the endpoints are antipodal.
    #[inline]
    pub fn is_antipodal(&self) -> bool {
        matches!(self.kind, ArcKind::Antipodal { .. })
    }

    /// Unit vector at parameter `t` (0 = start, 1 = end).
    pub fn vector_at(&self, t: f64) -> DVec3 {
        match self.kind {
            ArcKind::Coincident => self.from,
            ArcKind::Regular { sin_angle } => {
                let a = ((1.0 - t) * self.angle).sin() / sin_angle;
                let b = (t * self.angle).sin() / sin_angle;
                self.from * a + self.to * b
            }
            ArcKind::Antipodal { tangent } => {
                let (s, c) = (t * PI).sin_cos();
                self.from * c + tangent * s
            }
        }
    }

    /// Geographic point at parameter `t` (0 = start, 1 = end).
    #[inline]
    pub fn point_at(&self, t: f64) -> GeoPoint {
        GeoPoint::from_unit_vector(self.vector_at(t))
    }
}

/// Northward unit tangent at `p`, or the tangent toward longitude 0 at a pole.
fn departure_tangent(p: DVec3) -> DVec3 {
    let north = DVec3::Z - p * p.z;
    if north.length() > ARC_EPSILON {
        return north.normalize();
    }
    (DVec3::X - p * p.x).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (40.4, -3.7), (-89.9, 179.9), (90.0, 0.0)] {
            assert_eq!(distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_distance_symmetry() {
        let pairs = [
            ((40.4168, -3.7038), (51.5074, -0.1278)),
            ((-33.9, 151.2), (35.7, 139.7)),
            ((0.0, -179.5), (0.0, 179.5)),
            ((89.0, 0.0), (-89.0, 180.0)),
        ];
        for ((a_lat, a_lon), (b_lat, b_lon)) in pairs {
            let ab = distance(a_lat, a_lon, b_lat, b_lon);
            let ba = distance(b_lat, b_lon, a_lat, a_lon);
            assert!((ab - ba).abs() <= ab * 1e-6, "{ab} vs {ba}");
        }
    }

    #[test]
    fn test_quarter_meridian_distance_and_azimuth() {
        let d = distance(0.0, 0.0, 0.0, 90.0);
        assert!((d - 10007.543).abs() < 0.01, "distance was {d}");
        let az = azimuth(0.0, 0.0, 0.0, 90.0);
        assert!((az - 90.0).abs() < 1e-9, "azimuth was {az}");
    }

    #[test]
    fn test_azimuth_cardinal_directions() {
        assert!(azimuth(0.0, 0.0, 10.0, 0.0).abs() < 1e-9);
        assert!((azimuth(0.0, 0.0, -10.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((azimuth(0.0, 0.0, 0.0, -10.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_azimuth_range() {
        for lon in (-180..180).step_by(15) {
            let az = azimuth(10.0, 20.0, -30.0, lon as f64);
            assert!((0.0..360.0).contains(&az), "azimuth {az} out of range");
        }
    }

    #[test]
    fn test_angular_separation_matches_distance() {
        let a = GeoPoint::new(40.4168, -3.7038);
        let b = GeoPoint::new(-33.9, 151.2);
        let sep = angular_separation(a, b) * EARTH_RADIUS_KM;
        let d = distance(a.lat, a.lon, b.lat, b.lon);
        assert!((sep - d).abs() < 1e-6, "{sep} vs {d}");
    }

    #[test]
    fn test_arc_endpoints_and_midpoint() {
        let arc = GreatArc::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 90.0));
        let start = arc.point_at(0.0);
        let end = arc.point_at(1.0);
        let mid = arc.point_at(0.5);
        assert!(start.lat.abs() < 1e-9 && start.lon.abs() < 1e-9);
        assert!(end.lat.abs() < 1e-9 && (end.lon - 90.0).abs() < 1e-9);
        assert!(mid.lat.abs() < 1e-9 && (mid.lon - 45.0).abs() < 1e-9);
        assert!((arc.length_km() - 10007.543).abs() < 0.01);
    }

    #[test]
    fn test_arc_points_stay_on_unit_sphere() {
        let arc = GreatArc::new(GeoPoint::new(40.4, -3.7), GeoPoint::new(-33.9, 151.2));
        for i in 0..=20 {
            let v = arc.vector_at(i as f64 / 20.0);
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_arc_coincident() {
        let p = GeoPoint::new(12.0, 34.0);
        let arc = GreatArc::new(p, p);
        assert!(arc.is_degenerate());
        let q = arc.point_at(0.7);
        assert!((q.lat - 12.0).abs() < 1e-9 && (q.lon - 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_coincident_for_arbitrary_points() {
        let mut lat = -88.7;
        while lat < 89.0 {
            let mut lon = -179.3;
            while lon < 180.0 {
                let p = GeoPoint::new(lat, lon);
                let arc = GreatArc::new(p, p);
                assert!(arc.is_degenerate(), "({lat}, {lon}) angle {}", arc.angle());
                assert_eq!(angular_separation(p, p), 0.0);
                lon += 10.37;
            }
            lat += 10.13;
        }
    }

    #[test]
    fn test_small_separation_is_resolved() {
        // One metre apart is far below what acos near 1 can resolve.
        let a = GeoPoint::new(47.123, 8.456);
        let b = GeoPoint::new(47.123 + 1e-3 / 111.195, 8.456);
        let sep = angular_separation(a, b) * EARTH_RADIUS_KM;
        assert!((sep - 1e-3).abs() < 1e-6, "separation was {sep} km");
        assert!(!GreatArc::new(a, b).is_degenerate());
    }

    #[test]
    fn test_arc_antipodal_follows_meridian() {
        let arc = GreatArc::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(arc.is_antipodal());
        let mid = arc.point_at(0.5);
        assert!((mid.lat - 90.0).abs() < 1e-6, "midpoint was {mid:?}");
        let end = arc.point_at(1.0);
        assert!(end.lat.abs() < 1e-6);
        assert!((end.lon.abs() - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_arc_antipodal_from_pole() {
        let arc = GreatArc::new(GeoPoint::NORTH_POLE, GeoPoint::new(-90.0, 0.0));
        assert!(arc.is_antipodal());
        let mid = arc.point_at(0.5);
        assert!(mid.lat.abs() < 1e-6 && mid.lon.abs() < 1e-6, "midpoint was {mid:?}");
    }
}
