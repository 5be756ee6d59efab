//! Resolving the center and target the map opens with.

use azmap_projection::GeoPoint;

use crate::{CliArgs, Config, ConfigError};

/// A location with an optional display name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPoint {
    pub name: Option<String>,
    pub point: GeoPoint,
}

impl NamedPoint {
    fn new(role: &'static str, name: Option<&str>, lat: f64, lon: f64) -> Result<Self, ConfigError> {
        let point = GeoPoint::wrapped(lat, lon)
            .map_err(|_| ConfigError::InvalidCoordinate { role, lat, lon })?;
        Ok(Self {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            point,
        })
    }
}

/// Center and target for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub center: NamedPoint,
    pub target: NamedPoint,
}

impl Config {
    /// Decide the center and target from the command line, falling back to
    /// the configured station for the center.
    ///
    /// Four coordinates give center and target; two give the target only,
    /// with the center taken from [`Config::station`]. A `-c` name overrides
    /// the station name.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingStation`] for two coordinates without a station.
    /// - [`ConfigError::Usage`] for any other coordinate count.
    /// - [`ConfigError::InvalidCoordinate`] for out-of-range values.
    pub fn resolve_launch(&self, args: &CliArgs) -> Result<LaunchPlan, ConfigError> {
        let center_name = args.center_name.as_deref();
        let target_name = args.target_name.as_deref();

        match args.coords.as_slice() {
            &[clat, clon, tlat, tlon] => Ok(LaunchPlan {
                center: NamedPoint::new("center", center_name, clat, clon)?,
                target: NamedPoint::new("target", target_name, tlat, tlon)?,
            }),
            &[tlat, tlon] => {
                let station = self.station.as_ref().ok_or(ConfigError::MissingStation)?;
                let name = center_name.or(Some(station.name.as_str()));
                Ok(LaunchPlan {
                    center: NamedPoint::new("center", name, station.lat, station.lon)?,
                    target: NamedPoint::new("target", target_name, tlat, tlon)?,
                })
            }
            other => Err(ConfigError::Usage { found: other.len() }),
        }
    }
}
