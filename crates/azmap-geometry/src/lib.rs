//! Projected map geometry: polyline splitting, polygon ring clipping,
//! graticules, and great-circle paths.
//!
//! Every builder writes into a [`ProjectedGeometry`]: a flat vertex buffer in
//! km plus a table of `(start, count)` segments, each drawable on its own as a
//! line strip or polygon fan. Rebuilds reuse the buffer's allocation and take
//! `&mut self`, so no borrow of the previous contents can survive a rebuild.

mod error;
mod graticule;
mod great_circle;
mod horizon;
mod projected;
mod projector;
mod ring;

pub use error::GeometryError;
pub use graticule::{Graticule, GraticuleOptions};
pub use great_circle::{GREAT_CIRCLE_SAMPLES, project_great_circle};
pub use horizon::{CROSSING_ITERATIONS, horizon_crossing};
pub use projected::{ProjectedGeometry, Segment};
pub use projector::{DEFAULT_SPLIT_THRESHOLD_KM, MapDataProjector, ProjectionStrategy, RebuildReport};
pub use ring::{GeoRing, RingSet};
