//! Night shading mesh over the visible disc.
//!
//! A polar grid of [`ANGULAR_DIVISIONS`] × [`RADIAL_DIVISIONS`] cells covers
//! the disc. Each grid vertex is inverse-projected and shaded by its solar
//! zenith angle; cells that are fully lit are left out, so the mesh only
//! covers the terminator band and the night side.

use std::f64::consts::TAU;

use azmap_geometry::GeometryError;
use azmap_projection::ProjectionState;
use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use serde::Serialize;
use tracing::debug;

use crate::subsolar::{SubsolarPoint, solar_zenith_angle};

/// Grid columns around the disc.
pub const ANGULAR_DIVISIONS: usize = 180;
/// Grid rows from the center to the rim.
pub const RADIAL_DIVISIONS: usize = 60;
/// Darkness of the full night side. Kept below 1 so the map shows through.
pub const MAX_ALPHA: f32 = 0.75;

/// Distance the outermost grid row is pulled inside the disc boundary, in km.
const RIM_INSET_KM: f64 = 0.5;
/// Zenith angle where shading starts.
const TWILIGHT_START_DEG: f64 = 80.0;
/// Zenith angle where full darkness is reached.
const TWILIGHT_END_DEG: f64 = 108.0;

/// One mesh vertex: planar position in km plus darkness.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize)]
pub struct NightVertex {
    /// Projected position in km.
    pub position: [f32; 2],
    /// Darkness in `[0, MAX_ALPHA]`.
    pub alpha: f32,
}

impl NightVertex {
    fn new(p: DVec2, alpha: f32) -> Self {
        Self {
            position: [p.x as f32, p.y as f32],
            alpha,
        }
    }
}

/// Darkness for a solar zenith angle in degrees.
///
/// Zero up to 80°, [`MAX_ALPHA`] from 108°, and a smoothstep ramp between.
pub fn zenith_to_alpha(zenith_deg: f64) -> f32 {
    let t = smoothstep(TWILIGHT_START_DEG, TWILIGHT_END_DEG, zenith_deg);
    (t * f64::from(MAX_ALPHA)) as f32
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Triangle list with per-vertex alpha, rebuilt wholesale on every update.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NightMesh {
    vertices: Vec<NightVertex>,
    sun: Option<SubsolarPoint>,
    /// Alpha per grid vertex, row-major by radius. Reused across rebuilds.
    #[serde(skip)]
    alpha_grid: Vec<f32>,
}

impl NightMesh {
    /// Create an empty mesh with no sun.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangle vertices, three per triangle.
    #[inline]
    pub fn vertices(&self) -> &[NightVertex] {
        &self.vertices
    }

    /// Number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Sun position used by the last successful rebuild.
    #[inline]
    pub fn sun(&self) -> Option<SubsolarPoint> {
        self.sun
    }

    /// Raw vertex bytes for upload to a GPU buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Upper bound on the vertex count of one build.
    pub const fn max_vertices() -> usize {
        ANGULAR_DIVISIONS * 3 + ANGULAR_DIVISIONS * (RADIAL_DIVISIONS - 1) * 6
    }

    /// Rebuild the mesh for the current projection and sun position.
    ///
    /// Must be called after any center or mode change as well as when the
    /// sun moves.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if a buffer cannot grow;
    /// the mesh is then left empty.
    pub fn rebuild(&mut self, state: &ProjectionState, sun: SubsolarPoint) -> Result<(), GeometryError> {
        if let Err(e) = self.build(state, sun) {
            self.vertices.clear();
            self.sun = None;
            return Err(e);
        }
        self.sun = Some(sun);

        debug!(
            mode = %state.mode(),
            sun_lat = sun.lat,
            sun_lon = sun.lon,
            triangles = self.triangle_count(),
            "rebuilt night mesh"
        );
        Ok(())
    }

    fn build(&mut self, state: &ProjectionState, sun: SubsolarPoint) -> Result<(), GeometryError> {
        self.vertices.clear();
        self.alpha_grid.clear();
        self.alpha_grid.try_reserve((RADIAL_DIVISIONS + 1) * ANGULAR_DIVISIONS)?;

        let dr = (state.radius() - RIM_INSET_KM) / RADIAL_DIVISIONS as f64;
        let directions: Vec<DVec2> = (0..ANGULAR_DIVISIONS)
            .map(|ai| DVec2::from_angle(TAU * ai as f64 / ANGULAR_DIVISIONS as f64))
            .collect();

        // The center row is one point; shade it once.
        let center_alpha = zenith_to_alpha(solar_zenith_angle(state.center(), &sun));
        self.alpha_grid
            .extend(std::iter::repeat_n(center_alpha, ANGULAR_DIVISIONS));
        for ri in 1..=RADIAL_DIVISIONS {
            let r = ri as f64 * dr;
            for dir in &directions {
                let p = *dir * r;
                let alpha = match state.inverse(p.x, p.y) {
                    Ok(point) => zenith_to_alpha(solar_zenith_angle(point, &sun)),
                    Err(_) => MAX_ALPHA,
                };
                self.alpha_grid.push(alpha);
            }
        }

        let alpha = |ri: usize, ai: usize| self.alpha_grid[ri * ANGULAR_DIVISIONS + ai % ANGULAR_DIVISIONS];
        let at = |ri: usize, ai: usize| directions[ai % ANGULAR_DIVISIONS] * (ri as f64 * dr);

        let mut out = Vec::new();
        out.try_reserve(Self::max_vertices())?;

        for ai in 0..ANGULAR_DIVISIONS {
            let next = ai + 1;

            let fan = [alpha(0, ai), alpha(1, ai), alpha(1, next)];
            if fan.iter().any(|&a| a > 0.0) {
                out.push(NightVertex::new(DVec2::ZERO, fan[0]));
                out.push(NightVertex::new(at(1, ai), fan[1]));
                out.push(NightVertex::new(at(1, next), fan[2]));
            }

            for ri in 1..RADIAL_DIVISIONS {
                let a00 = alpha(ri, ai);
                let a01 = alpha(ri, next);
                let a10 = alpha(ri + 1, ai);
                let a11 = alpha(ri + 1, next);
                if a00 == 0.0 && a01 == 0.0 && a10 == 0.0 && a11 == 0.0 {
                    continue;
                }

                let v00 = NightVertex::new(at(ri, ai), a00);
                let v01 = NightVertex::new(at(ri, next), a01);
                let v10 = NightVertex::new(at(ri + 1, ai), a10);
                let v11 = NightVertex::new(at(ri + 1, next), a11);
                out.extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
            }
        }

        self.vertices = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmap_projection::{AZEQ_MAX_RADIUS_KM, EARTH_RADIUS_KM, GeoPoint, ProjectionMode};

    fn state(mode: ProjectionMode, lat: f64, lon: f64) -> ProjectionState {
        ProjectionState::new(mode, GeoPoint::new(lat, lon)).unwrap()
    }

    fn radius(v: &NightVertex) -> f64 {
        f64::from(v.position[0]).hypot(f64::from(v.position[1]))
    }

    #[test]
    fn test_alpha_curve() {
        assert_eq!(zenith_to_alpha(0.0), 0.0);
        assert_eq!(zenith_to_alpha(80.0), 0.0);
        assert!((zenith_to_alpha(94.0) - 0.375).abs() < 1e-6);
        assert!((zenith_to_alpha(108.0) - MAX_ALPHA).abs() < 1e-6);
        assert!((zenith_to_alpha(180.0) - MAX_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_curve_is_monotonic() {
        let mut prev = 0.0;
        for z in 0..=180 {
            let a = zenith_to_alpha(f64::from(z));
            assert!(a >= prev, "alpha dropped at zenith {z}");
            prev = a;
        }
    }

    #[test]
    fn test_lit_cells_are_skipped() {
        // Sun straight above the center: everything within 80° of it is lit.
        let s = state(ProjectionMode::AzimuthalEquidistant, 20.0, 30.0);
        let sun = SubsolarPoint { lat: 20.0, lon: 30.0 };
        let mut mesh = NightMesh::new();
        mesh.rebuild(&s, sun).unwrap();

        assert!(!mesh.is_empty());
        assert!(mesh.vertices().len() < NightMesh::max_vertices());
        assert_eq!(mesh.vertices().len() % 3, 0);

        let lit_radius = 80f64.to_radians() * EARTH_RADIUS_KM;
        for tri in mesh.vertices().chunks(3) {
            assert!(tri.iter().any(|v| v.alpha > 0.0), "fully lit triangle emitted");
            // Nothing deep inside the lit disc survives.
            assert!(tri.iter().any(|v| radius(v) > lit_radius - 400.0));
        }
    }

    #[test]
    fn test_night_side_center_emits_fan() {
        let s = state(ProjectionMode::AzimuthalEquidistant, 0.0, 0.0);
        let sun = SubsolarPoint { lat: 0.0, lon: 180.0 };
        let mut mesh = NightMesh::new();
        mesh.rebuild(&s, sun).unwrap();

        let first = mesh.vertices()[0];
        assert_eq!(first.position, [0.0, 0.0]);
        assert!((first.alpha - MAX_ALPHA).abs() < 1e-6);
        for v in mesh.vertices() {
            assert!((0.0..=MAX_ALPHA).contains(&v.alpha));
            assert!(radius(v) <= AZEQ_MAX_RADIUS_KM);
        }
    }

    #[test]
    fn test_ortho_mesh_inside_horizon() {
        let s = state(ProjectionMode::Orthographic, 45.0, -100.0);
        let sun = SubsolarPoint::at(chrono::DateTime::UNIX_EPOCH);
        let mut mesh = NightMesh::new();
        mesh.rebuild(&s, sun).unwrap();
        assert!(!mesh.is_empty());
        for v in mesh.vertices() {
            assert!(radius(v) < EARTH_RADIUS_KM);
        }
        assert_eq!(mesh.sun(), Some(sun));
    }

    #[test]
    fn test_rebuild_replaces_mesh() {
        let s = state(ProjectionMode::Orthographic, 0.0, 0.0);
        let mut mesh = NightMesh::new();
        mesh.rebuild(&s, SubsolarPoint { lat: 0.0, lon: 180.0 }).unwrap();
        let dark = mesh.triangle_count();
        assert_eq!(dark, NightMesh::max_vertices() / 3);
        mesh.rebuild(&s, SubsolarPoint { lat: 0.0, lon: 0.0 }).unwrap();
        assert!(mesh.triangle_count() < dark);
    }

    #[test]
    fn test_vertex_bytes_layout() {
        assert_eq!(std::mem::size_of::<NightVertex>(), 12);
        let s = ProjectionState::default();
        let mut mesh = NightMesh::new();
        mesh.rebuild(&s, SubsolarPoint { lat: 0.0, lon: 180.0 }).unwrap();
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertices().len() * 12);
    }
}
