//! Projection model selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseModeError;
use crate::state::{AZEQ_MAX_RADIUS_KM, EARTH_RADIUS_KM};

/// Selects which projection formulas map geographic points to the plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Preserves true distance and bearing from the center. The whole globe
    /// fits in a disc of radius `π·R`.
    #[default]
    AzimuthalEquidistant,
    /// View of the sphere from infinite distance. Only the hemisphere facing
    /// the viewer is visible, inside a disc of radius `R`.
    Orthographic,
}

impl ProjectionMode {
    /// Both modes, in toggle order.
    pub const ALL: [ProjectionMode; 2] = [Self::AzimuthalEquidistant, Self::Orthographic];

    /// Radius of the projected disc for this mode, in km.
    #[inline]
    #[must_use]
    pub fn radius_km(self) -> f64 {
        match self {
            Self::AzimuthalEquidistant => AZEQ_MAX_RADIUS_KM,
            Self::Orthographic => EARTH_RADIUS_KM,
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::AzimuthalEquidistant => Self::Orthographic,
            Self::Orthographic => Self::AzimuthalEquidistant,
        }
    }

    /// Short name used on the command line and in logs.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::AzimuthalEquidistant => "azeq",
            Self::Orthographic => "ortho",
        }
    }
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ProjectionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azeq" | "azimuthal" | "azimuthal-equidistant" | "azimuthal_equidistant" => {
                Ok(Self::AzimuthalEquidistant)
            }
            "ortho" | "orthographic" | "globe" => Ok(Self::Orthographic),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
