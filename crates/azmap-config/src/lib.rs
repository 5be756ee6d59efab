//! Configuration for the azimuthal map.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. [`Config::resolve_launch`] combines both into the center and
//! target the map opens with.

mod cli;
mod config;
mod error;
mod launch;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, DEFAULT_RING_LIMIT, LayersConfig, NightConfig, StationConfig, ViewConfig,
};
pub use error::ConfigError;
pub use launch::{LaunchPlan, NamedPoint};
