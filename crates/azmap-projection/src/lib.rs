//! Spherical map projections centered on an arbitrary point.
//!
//! Two interchangeable models are supported: azimuthal equidistant (true
//! distance and bearing from the center) and orthographic (the visible
//! hemisphere seen from infinitely far away). All planar coordinates are
//! kilometers relative to the projection center.

mod error;
mod geodesy;
mod mode;
mod point;
mod state;

pub use error::{ParseModeError, ProjectionError};
pub use geodesy::{GreatArc, angular_separation, azimuth, distance};
pub use mode::ProjectionMode;
pub use point::{GeoPoint, normalize_longitude};
pub use state::{AZEQ_MAX_RADIUS_KM, EARTH_RADIUS_KM, ProjectionState};
