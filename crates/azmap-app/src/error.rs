//! Application error type.

use std::path::PathBuf;

use azmap_config::ConfigError;
use azmap_projection::ProjectionError;

use crate::platform::PlatformError;
use crate::shapes::LoadError;

/// Errors that stop the application from starting or finishing a run.
///
/// Per-layer geometry failures are not here: they are logged and leave that
/// layer empty.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded or the launch arguments are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Platform directories could not be resolved or created.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A data file could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The launch center or target cannot be projected.
    #[error("invalid launch location: {0}")]
    Projection(#[from] ProjectionError),

    /// Failed to write the geometry export.
    #[error("failed to write export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the geometry export.
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}
