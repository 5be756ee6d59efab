//! Great-circle path between two points.

use azmap_projection::{GeoPoint, GreatArc, ProjectionState};
use tracing::debug;

use crate::error::GeometryError;
use crate::projected::ProjectedGeometry;

/// Number of samples along a projected great-circle path, endpoints included.
pub const GREAT_CIRCLE_SAMPLES: usize = 101;

/// Replace the contents of `out` with the projected great-circle path from
/// `from` to `to` as one segment.
///
/// Samples are projected with
/// [`forward_clamped`](ProjectionState::forward_clamped), so a path running
/// onto the far hemisphere hugs the horizon instead of disappearing.
///
/// # Errors
///
/// Returns [`GeometryError::AllocationFailure`] if `out` cannot grow; `out`
/// is then left empty.
pub fn project_great_circle(
    state: &ProjectionState,
    from: GeoPoint,
    to: GeoPoint,
    out: &mut ProjectedGeometry,
) -> Result<(), GeometryError> {
    let arc = GreatArc::new(from, to);
    let samples = if arc.is_degenerate() {
        1
    } else {
        GREAT_CIRCLE_SAMPLES
    };

    let result = trace_arc(state, &arc, samples, out);
    if result.is_err() {
        out.clear();
    }
    result?;

    debug!(
        length_km = arc.length_km(),
        antipodal = arc.is_antipodal(),
        vertices = out.vertex_count(),
        "projected great circle"
    );
    Ok(())
}

fn trace_arc(
    state: &ProjectionState,
    arc: &GreatArc,
    samples: usize,
    out: &mut ProjectedGeometry,
) -> Result<(), GeometryError> {
    out.reset_with_capacity(samples, 1)?;
    let last = samples.saturating_sub(1).max(1) as f64;
    for i in 0..samples {
        out.push_vertex(state.forward_clamped_point(arc.point_at(i as f64 / last)))?;
    }
    out.push_segment(0, samples)?;
    Ok(())
}
