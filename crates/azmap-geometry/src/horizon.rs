//! Locating where a great-circle edge crosses the projection horizon.
//!
//! Ring clipping and the horizon-extended graticule both call
//! [`horizon_crossing`], so every boundary point in the map comes from the
//! same bisection.

use azmap_projection::{GeoPoint, GreatArc, ProjectionState};
use glam::DVec2;

/// Bisection steps used to bracket a horizon crossing. Each step halves the
/// bracket along the edge, so 24 steps resolve a 90° edge to under 1 m.
pub const CROSSING_ITERATIONS: u32 = 24;

/// Planar point where the edge from `visible` to `hidden` leaves the visible
/// part of the globe.
///
/// `visible` must project successfully and `hidden` must not. The edge is
/// interpolated along its great circle; each iteration projects the midpoint
/// of the bracket and keeps the half that still straddles the horizon. The
/// final point goes through
/// [`forward_clamped`](ProjectionState::forward_clamped), so it lies at or
/// just inside the disc boundary.
pub fn horizon_crossing(state: &ProjectionState, visible: GeoPoint, hidden: GeoPoint) -> DVec2 {
    let arc = GreatArc::new(visible, hidden);
    let mut inside = 0.0_f64;
    let mut outside = 1.0_f64;

    for _ in 0..CROSSING_ITERATIONS {
        let mid = 0.5 * (inside + outside);
        if state.is_visible(arc.point_at(mid)) {
            inside = mid;
        } else {
            outside = mid;
        }
    }

    state.forward_clamped_point(arc.point_at(0.5 * (inside + outside)))
}
