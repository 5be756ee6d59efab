//! Reprojection of raw ring collections into drawable geometry.
//!
//! Two strategies, chosen by how the result is drawn:
//!
//! - **Split** (open polylines such as coastlines and borders): every vertex is
//!   projected and a ring is cut wherever consecutive images jump further than
//!   a threshold, which removes chords across the antipodal wrap.
//! - **Clip** (closed land polygons): each ring is clipped at the horizon,
//!   inserting one boundary vertex per crossing, so the result stays a valid
//!   polygon fan.

use azmap_projection::ProjectionState;
use glam::DVec2;
use tracing::{debug, warn};

use crate::error::GeometryError;
use crate::horizon::horizon_crossing;
use crate::projected::ProjectedGeometry;
use crate::ring::RingSet;

/// Jump between consecutive projected vertices (km) above which a polyline
/// is cut.
pub const DEFAULT_SPLIT_THRESHOLD_KM: f64 = 5000.0;

/// A clipped ring needs this many vertices to remain a polygon.
const MIN_POLYGON_VERTICES: usize = 3;

/// How a [`MapDataProjector`] post-processes projected rings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectionStrategy {
    /// Keep every vertex; cut rings at jumps longer than `threshold_km`.
    Split {
        /// Maximum planar distance between consecutive vertices of a segment.
        threshold_km: f64,
    },
    /// Clip closed rings at the horizon.
    Clip,
}

impl ProjectionStrategy {
    /// Split strategy with the default threshold.
    pub const fn split() -> Self {
        Self::Split {
            threshold_km: DEFAULT_SPLIT_THRESHOLD_KM,
        }
    }
}

impl Default for ProjectionStrategy {
    fn default() -> Self {
        Self::split()
    }
}

/// Statistics from one [`MapDataProjector::reproject`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Vertices in the rebuilt buffer.
    pub vertex_count: usize,
    /// Segments in the rebuilt table.
    pub segment_count: usize,
    /// Indices of input rings discarded as degenerate (clip strategy only).
    pub degenerate_rings: Vec<usize>,
    /// Segments dropped because the segment limit was reached.
    pub dropped_segments: usize,
    /// Segment limit in force during the rebuild.
    pub segment_limit: Option<usize>,
}

impl RebuildReport {
    /// The truncation as a [`GeometryError::CapacityExceeded`], if any
    /// segments were dropped.
    pub fn capacity_error(&self) -> Option<GeometryError> {
        let limit = self.segment_limit?;
        (self.dropped_segments > 0).then_some(GeometryError::CapacityExceeded {
            limit,
            requested: self.segment_count + self.dropped_segments,
        })
    }
}

/// Projects a [`RingSet`] under the current projection state and keeps the
/// result in a reusable buffer.
#[derive(Clone, Debug, Default)]
pub struct MapDataProjector {
    strategy: ProjectionStrategy,
    geometry: ProjectedGeometry,
    /// Per-vertex images for the clip strategy, reused across rebuilds.
    scratch: Vec<Option<DVec2>>,
}

impl MapDataProjector {
    /// Create a projector with no segment limit.
    pub fn new(strategy: ProjectionStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Create a projector that keeps at most `limit` segments per rebuild.
    pub fn with_segment_limit(strategy: ProjectionStrategy, limit: usize) -> Self {
        Self {
            strategy,
            geometry: ProjectedGeometry::with_segment_limit(limit),
            scratch: Vec::new(),
        }
    }

    /// Current strategy.
    #[inline]
    pub fn strategy(&self) -> ProjectionStrategy {
        self.strategy
    }

    /// Geometry produced by the last successful rebuild.
    #[inline]
    pub fn geometry(&self) -> &ProjectedGeometry {
        &self.geometry
    }

    /// Discard the previous geometry and project `rings` under `state`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AllocationFailure`] if a buffer cannot grow. The
    /// geometry is then left empty so the caller can skip drawing this layer.
    pub fn reproject(
        &mut self,
        state: &ProjectionState,
        rings: &RingSet,
    ) -> Result<RebuildReport, GeometryError> {
        let result = match self.strategy {
            ProjectionStrategy::Split { threshold_km } => {
                split_rings(state, rings, threshold_km, &mut self.geometry)
            }
            ProjectionStrategy::Clip => {
                clip_rings(state, rings, &mut self.geometry, &mut self.scratch)
            }
        };

        let degenerate_rings = match result {
            Ok(degenerate) => degenerate,
            Err(e) => {
                self.geometry.clear();
                warn!(error = %e, "reprojection failed, layer left empty");
                return Err(e);
            }
        };

        let report = RebuildReport {
            vertex_count: self.geometry.vertex_count(),
            segment_count: self.geometry.segment_count(),
            degenerate_rings,
            dropped_segments: self.geometry.dropped_segments(),
            segment_limit: self.geometry.segment_limit(),
        };

        if let Some(err) = report.capacity_error() {
            warn!(%err, "segment table truncated");
        }
        debug!(
            mode = %state.mode(),
            rings = rings.len(),
            vertices = report.vertex_count,
            segments = report.segment_count,
            degenerate = report.degenerate_rings.len(),
            "reprojected layer"
        );
        Ok(report)
    }
}

fn flush_run(out: &mut ProjectedGeometry, start: usize, end: usize) -> Result<(), GeometryError> {
    if end >= start + 2 {
        out.push_segment(start, end - start)?;
    }
    Ok(())
}

/// Split strategy. The vertex buffer mirrors the input one-to-one; only the
/// segment table changes shape. A vertex without an image (far side in
/// orthographic mode, exact antipode otherwise) is stored at its clamped
/// position but belongs to no segment.
fn split_rings(
    state: &ProjectionState,
    rings: &RingSet,
    threshold_km: f64,
    out: &mut ProjectedGeometry,
) -> Result<Vec<usize>, GeometryError> {
    out.reset_with_capacity(rings.vertex_count(), rings.len())?;
    let threshold_sq = threshold_km * threshold_km;

    for ring in rings.rings() {
        let base = out.vertex_count();
        let mut run_start = base;
        let mut prev: Option<DVec2> = None;

        for (offset, point) in ring.points().iter().enumerate() {
            let index = base + offset;
            match state.forward_point(*point) {
                Ok(p) => {
                    if let Some(q) = prev
                        && (p - q).length_squared() > threshold_sq
                    {
                        flush_run(out, run_start, index)?;
                        run_start = index;
                    }
                    out.push_vertex(p)?;
                    prev = Some(p);
                }
                Err(_) => {
                    flush_run(out, run_start, index)?;
                    out.push_vertex(state.forward_clamped_point(*point))?;
                    run_start = index + 1;
                    prev = None;
                }
            }
        }

        flush_run(out, run_start, base + ring.len())?;
    }

    Ok(Vec::new())
}

/// Clip strategy. Returns the indices of rings that produced no polygon.
fn clip_rings(
    state: &ProjectionState,
    rings: &RingSet,
    out: &mut ProjectedGeometry,
    images: &mut Vec<Option<DVec2>>,
) -> Result<Vec<usize>, GeometryError> {
    out.reset_with_capacity(rings.vertex_count() + 2 * rings.len(), rings.len())?;
    let mut degenerate = Vec::new();

    for (index, ring) in rings.rings().iter().enumerate() {
        let points = ring.points();
        images.clear();
        images.try_reserve(points.len())?;
        images.extend(points.iter().map(|p| state.forward_point(*p).ok()));

        let visible = images.iter().filter(|img| img.is_some()).count();
        if visible == 0 {
            degenerate.push(index);
            continue;
        }

        let start = out.vertex_count();
        if visible == points.len() {
            for p in images.iter().flatten() {
                out.push_vertex(*p)?;
            }
        } else {
            let n = points.len();
            for i in 0..n {
                let j = (i + 1) % n;
                if let Some(p) = images[i] {
                    out.push_vertex(p)?;
                }
                match (images[i].is_some(), images[j].is_some()) {
                    (true, false) => out.push_vertex(horizon_crossing(state, points[i], points[j]))?,
                    (false, true) => out.push_vertex(horizon_crossing(state, points[j], points[i]))?,
                    _ => {}
                }
            }
        }

        let count = out.vertex_count() - start;
        if count < MIN_POLYGON_VERTICES {
            out.truncate_vertices(start);
            degenerate.push(index);
            continue;
        }
        out.push_segment(start, count)?;
    }

    Ok(degenerate)
}
