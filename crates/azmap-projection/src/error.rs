//! Projection error types.

/// Errors produced by forward and inverse projection.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// The point has no planar image: it lies on the far hemisphere
    /// (orthographic) or exactly at the antipode (azimuthal equidistant).
    #[error("point has no image under the current projection (beyond the horizon)")]
    AntipodalUndefined,

    /// The planar point lies outside the disc the current mode can invert.
    #[error("planar point is {rho_km:.1} km from center, beyond the {max_km:.1} km projection radius")]
    OutOfDomain {
        /// Distance of the rejected point from the origin, in km.
        rho_km: f64,
        /// Largest invertible distance for the mode, in km.
        max_km: f64,
    },

    /// A latitude outside `[-90, 90]` or a non-finite coordinate.
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate {
        /// Rejected latitude in degrees.
        lat: f64,
        /// Rejected longitude in degrees.
        lon: f64,
    },
}

/// Error returned when a projection mode name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown projection mode '{0}' (expected 'azeq' or 'ortho')")]
pub struct ParseModeError(pub String);
