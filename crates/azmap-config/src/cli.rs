//! Command-line argument parsing.

use std::path::PathBuf;

use azmap_projection::ProjectionMode;
use chrono::{DateTime, Utc};
use clap::Parser;

use crate::Config;

/// Azimuthal map command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(
    name = "azmap",
    about = "Azimuthal equidistant and orthographic map centered on any point",
    after_help = "With 2 coordinates the center is the station from config.ron."
)]
pub struct CliArgs {
    /// [CENTER_LAT CENTER_LON] TARGET_LAT TARGET_LON, in degrees.
    #[arg(value_name = "COORD", num_args = 0..=4, allow_negative_numbers = true)]
    pub coords: Vec<f64>,

    /// Center location name.
    #[arg(short = 'c', long)]
    pub center_name: Option<String>,

    /// Target location name.
    #[arg(short = 't', long)]
    pub target_name: Option<String>,

    /// Coastline shapefile path override.
    #[arg(short = 's', long)]
    pub shapefile: Option<PathBuf>,

    /// Projection (azeq or ortho).
    #[arg(long)]
    pub mode: Option<ProjectionMode>,

    /// Instant used for the night overlay (RFC 3339); defaults to now.
    #[arg(long)]
    pub time: Option<DateTime<Utc>>,

    /// Write the built map geometry to this JSON file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Keep running, moving the sun (and rewriting the export) every
    /// `night.refresh_seconds`.
    #[arg(long, conflicts_with = "time")]
    pub watch: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.shapefile {
            self.layers.coastline = Some(path.clone());
        }
        if let Some(mode) = args.mode {
            self.view.mode = mode;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
