//! Reference-line overlay for the current projection mode.
//!
//! Azimuthal equidistant mode draws a polar grid: range rings every
//! [`RING_SPACING_KM`] and radial bearing lines every 30°. Orthographic mode
//! draws a geographic graticule of parallels and meridians.

use std::f64::consts::TAU;

use azmap_projection::{GeoPoint, ProjectionMode, ProjectionState};
use glam::DVec2;
use tracing::debug;

use crate::error::GeometryError;
use crate::horizon::horizon_crossing;
use crate::projected::ProjectedGeometry;

/// Distance between azimuthal range rings.
const RING_SPACING_KM: f64 = 5000.0;
/// Vertices per range ring, not counting the closing vertex.
const RING_DIVISIONS: usize = 72;
/// Bearing step between radial lines.
const RADIAL_STEP_DEG: i32 = 30;

/// Latitude of the outermost parallels drawn in orthographic mode.
const PARALLEL_LIMIT_DEG: i32 = 60;
/// Spacing of parallels and of meridians.
const LINE_STEP_DEG: i32 = 30;
/// Sampling step along each parallel or meridian.
const SAMPLE_STEP_DEG: i32 = 5;

/// Build options for [`Graticule`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraticuleOptions {
    /// In orthographic mode, end each line at its exact horizon crossing
    /// instead of at the last visible sample.
    pub extend_to_horizon: bool,
}

/// Graticule geometry, rebuilt whenever the center or mode changes.
#[derive(Clone, Debug, Default)]
pub struct Graticule {
    options: GraticuleOptions,
    geometry: ProjectedGeometry,
}

impl Graticule {
    /// Create an empty graticule; call [`rebuild`](Self::rebuild) to fill it.
    pub fn new(options: GraticuleOptions) -> Self {
        Self {
            options,
            geometry: ProjectedGeometry::new(),
        }
    }

    /// Geometry from the last rebuild.
    #[inline]
    pub fn geometry(&self) -> &ProjectedGeometry {
        &self.geometry
    }

    /// Discard the previous lines and build the grid for `state`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if the buffer cannot
    /// grow; the geometry is left empty.
    pub fn rebuild(&mut self, state: &ProjectionState) -> Result<(), GeometryError> {
        let result = match state.mode() {
            ProjectionMode::AzimuthalEquidistant => build_polar_grid(state, &mut self.geometry),
            ProjectionMode::Orthographic => {
                build_geographic_grid(state, self.options, &mut self.geometry)
            }
        };
        if let Err(e) = result {
            self.geometry.clear();
            return Err(e);
        }

        debug!(
            mode = %state.mode(),
            vertices = self.geometry.vertex_count(),
            segments = self.geometry.segment_count(),
            "rebuilt graticule"
        );
        Ok(())
    }
}

fn build_polar_grid(state: &ProjectionState, out: &mut ProjectedGeometry) -> Result<(), GeometryError> {
    let max_radius = state.radius();
    let rings = (max_radius / RING_SPACING_KM).floor() as usize;
    let radials = (360 / RADIAL_STEP_DEG) as usize;
    out.reset_with_capacity(rings * (RING_DIVISIONS + 1) + radials * 2, rings + radials)?;

    for k in 1..=rings {
        let r = k as f64 * RING_SPACING_KM;
        let start = out.vertex_count();
        // The last vertex repeats the first to close the strip.
        for i in 0..=RING_DIVISIONS {
            let theta = TAU * (i % RING_DIVISIONS) as f64 / RING_DIVISIONS as f64;
            out.push_vertex(DVec2::from_angle(theta) * r)?;
        }
        out.push_segment(start, RING_DIVISIONS + 1)?;
    }

    for bearing in (0..360).step_by(RADIAL_STEP_DEG as usize) {
        let (sin_b, cos_b) = f64::from(bearing).to_radians().sin_cos();
        let start = out.vertex_count();
        out.push_vertex(DVec2::ZERO)?;
        out.push_vertex(DVec2::new(sin_b, cos_b) * max_radius)?;
        out.push_segment(start, 2)?;
    }
    Ok(())
}

fn build_geographic_grid(
    state: &ProjectionState,
    options: GraticuleOptions,
    out: &mut ProjectedGeometry,
) -> Result<(), GeometryError> {
    let parallels = (-PARALLEL_LIMIT_DEG..=PARALLEL_LIMIT_DEG).step_by(LINE_STEP_DEG as usize);
    let meridians = (-180..180).step_by(LINE_STEP_DEG as usize);
    let along_parallel = || (-180..=180).step_by(SAMPLE_STEP_DEG as usize);
    let along_meridian = || (-90..=90).step_by(SAMPLE_STEP_DEG as usize);

    let estimate = parallels.clone().count() * along_parallel().count()
        + meridians.clone().count() * along_meridian().count();
    out.reset_with_capacity(estimate, parallels.clone().count() + meridians.clone().count())?;

    for lat in parallels {
        let samples = along_parallel().map(|lon| GeoPoint::new(f64::from(lat), f64::from(lon)));
        trace_line(state, samples, options.extend_to_horizon, out)?;
    }
    for lon in meridians {
        let samples = along_meridian().map(|lat| GeoPoint::new(f64::from(lat), f64::from(lon)));
        trace_line(state, samples, options.extend_to_horizon, out)?;
    }
    Ok(())
}

/// Project one sampled line, starting a new segment after every gap. Runs
/// shorter than two vertices are discarded.
fn trace_line(
    state: &ProjectionState,
    samples: impl Iterator<Item = GeoPoint>,
    extend: bool,
    out: &mut ProjectedGeometry,
) -> Result<(), GeometryError> {
    let mut run_start = out.vertex_count();
    let mut prev: Option<(GeoPoint, bool)> = None;

    for point in samples {
        match state.forward_point(point) {
            Ok(p) => {
                if extend && let Some((hidden, false)) = prev {
                    out.push_vertex(horizon_crossing(state, point, hidden))?;
                }
                out.push_vertex(p)?;
                prev = Some((point, true));
            }
            Err(_) => {
                if extend && let Some((visible, true)) = prev {
                    out.push_vertex(horizon_crossing(state, visible, point))?;
                }
                out.close_run(run_start, 2)?;
                run_start = out.vertex_count();
                prev = Some((point, false));
            }
        }
    }
    out.close_run(run_start, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmap_projection::{AZEQ_MAX_RADIUS_KM, EARTH_RADIUS_KM};

    fn radius(v: [f32; 2]) -> f64 {
        (v[0] as f64).hypot(v[1] as f64)
    }

    fn build(mode: ProjectionMode, lat: f64, lon: f64, options: GraticuleOptions) -> Graticule {
        let state = ProjectionState::new(mode, GeoPoint::new(lat, lon)).unwrap();
        let mut graticule = Graticule::new(options);
        graticule.rebuild(&state).unwrap();
        graticule
    }

    #[test]
    fn test_polar_grid_layout() {
        let g = build(ProjectionMode::AzimuthalEquidistant, 51.5, -0.1, GraticuleOptions::default());
        let geometry = g.geometry();
        // 4 range rings (5000..20000 km) plus 12 radials.
        assert_eq!(geometry.segment_count(), 16);

        for (k, ring) in geometry.iter_segments().take(4).enumerate() {
            assert_eq!(ring.len(), RING_DIVISIONS + 1);
            let expected = (k + 1) as f64 * RING_SPACING_KM;
            for v in ring {
                assert!((radius(*v) - expected).abs() < 0.01, "ring {k} radius {}", radius(*v));
            }
            assert_eq!(ring.first(), ring.last());
        }

        for radial in geometry.iter_segments().skip(4) {
            assert_eq!(radial.len(), 2);
            assert_eq!(radial[0], [0.0, 0.0]);
            assert!((radius(radial[1]) - AZEQ_MAX_RADIUS_KM).abs() < 0.01);
        }
    }

    #[test]
    fn test_polar_grid_is_independent_of_center() {
        let a = build(ProjectionMode::AzimuthalEquidistant, 0.0, 0.0, GraticuleOptions::default());
        let b = build(ProjectionMode::AzimuthalEquidistant, -33.9, 151.2, GraticuleOptions::default());
        assert_eq!(a.geometry(), b.geometry());
    }

    #[test]
    fn test_geographic_grid_truncates_at_horizon() {
        let g = build(ProjectionMode::Orthographic, 0.0, 2.0, GraticuleOptions::default());
        let geometry = g.geometry();

        // 5 parallels, then the 6 meridians on the near side.
        assert_eq!(geometry.segment_count(), 11);
        for parallel in geometry.iter_segments().take(5) {
            assert_eq!(parallel.len(), 36);
        }
        for meridian in geometry.iter_segments().skip(5) {
            assert_eq!(meridian.len(), 37);
        }
        for v in geometry.vertices() {
            assert!(radius(*v) <= EARTH_RADIUS_KM + 1e-3);
        }
    }

    #[test]
    fn test_geographic_grid_extended_to_horizon() {
        let options = GraticuleOptions {
            extend_to_horizon: true,
        };
        let g = build(ProjectionMode::Orthographic, 0.0, 2.0, options);
        let geometry = g.geometry();

        assert_eq!(geometry.segment_count(), 11);
        // Every parallel now ends exactly on the horizon circle.
        for parallel in geometry.iter_segments().take(5) {
            assert_eq!(parallel.len(), 38);
            for end in [parallel[0], parallel[37]] {
                assert!(
                    (radius(end) - EARTH_RADIUS_KM).abs() < 0.05,
                    "parallel end radius {}",
                    radius(end)
                );
            }
        }
        for meridian in geometry.iter_segments().skip(5) {
            assert_eq!(meridian.len(), 37);
        }
    }

    #[test]
    fn test_geographic_grid_from_pole() {
        let g = build(ProjectionMode::Orthographic, 89.0, 0.0, GraticuleOptions::default());
        let geometry = g.geometry();
        // 30N and 60N whole, the near half of the equator (lon -90..=90), and the northern
        // part of all 12 meridians. Southern parallels are not drawn.
        assert_eq!(geometry.segment_count(), 3 + 12);
        assert_eq!(geometry.segments()[0].count, 37);
        assert_eq!(geometry.segments()[1].count, 73);
        assert!(geometry.iter_segments().all(|s| s.len() >= 2));
    }

    #[test]
    fn test_rebuild_after_mode_change() {
        let mut state = ProjectionState::default();
        let mut graticule = Graticule::default();
        graticule.rebuild(&state).unwrap();
        assert_eq!(graticule.geometry().segment_count(), 16);

        state.set_mode(ProjectionMode::Orthographic);
        graticule.rebuild(&state).unwrap();
        assert_ne!(graticule.geometry().segment_count(), 16);
        assert!(
            graticule
                .geometry()
                .vertices()
                .iter()
                .all(|v| radius(*v) <= EARTH_RADIUS_KM + 1e-3)
        );
    }
}
