//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use azmap_projection::ProjectionMode;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rings accepted per data layer before the rest are dropped.
pub const DEFAULT_RING_LIMIT: usize = 4096;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Home station used as the center when only a target is given.
    pub station: Option<StationConfig>,
    /// Projection and view settings.
    pub view: ViewConfig,
    /// Map data sources.
    pub layers: LayersConfig,
    /// Day/night overlay.
    pub night: NightConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// A named home location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StationConfig {
    /// Label shown next to the center marker. May be empty.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Projection the map opens in.
    pub mode: ProjectionMode,
    /// Jump (km) between consecutive projected vertices at which coastline
    /// and border polylines are cut.
    pub split_threshold_km: f64,
    /// End orthographic graticule lines exactly at the horizon.
    pub extend_graticule_to_horizon: bool,
}

/// Map data configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayersConfig {
    /// Coastline shapefile, drawn as split polylines.
    pub coastline: Option<PathBuf>,
    /// Country borders shapefile, drawn as split polylines.
    pub borders: Option<PathBuf>,
    /// Land polygon shapefile, drawn as clipped polygons.
    pub land: Option<PathBuf>,
    /// Maximum rings loaded per layer.
    pub ring_limit: usize,
}

/// Night overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NightConfig {
    /// Draw the night shading.
    pub enabled: bool,
    /// Seconds between sun position updates.
    pub refresh_seconds: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::AzimuthalEquidistant,
            split_threshold_km: 5000.0,
            extend_graticule_to_horizon: false,
        }
    }
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            coastline: None,
            borders: None,
            land: None,
            ring_limit: DEFAULT_RING_LIMIT,
        }
    }
}

impl Default for NightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_seconds: 60,
        }
    }
}

impl NightConfig {
    /// Time between sun updates, never shorter than one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds.max(1))
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
