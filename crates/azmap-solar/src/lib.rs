//! Sun position and the day/night shading overlay.
//!
//! [`SubsolarPoint`] places the sun from a UTC instant with a coarse
//! single-harmonic model. [`NightMesh`] turns it into a translucent triangle
//! mesh over the visible disc, darkening points by their solar zenith angle.

mod mesh;
mod subsolar;

pub use mesh::{ANGULAR_DIVISIONS, MAX_ALPHA, NightMesh, NightVertex, RADIAL_DIVISIONS, zenith_to_alpha};
pub use subsolar::{SubsolarPoint, solar_zenith_angle};
