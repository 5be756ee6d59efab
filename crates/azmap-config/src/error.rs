//! Configuration error types.

/// Errors that can occur when loading, saving, or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// Only the target was given on the command line and no home station
    /// is configured to use as the center.
    #[error(
        "2 coordinates given but no station configured; add a `station` to config.ron or pass 4 coordinates"
    )]
    MissingStation,

    /// The command line held a number of coordinates other than 2 or 4.
    #[error("expected 2 or 4 coordinates, got {found}")]
    Usage {
        /// Number of positional coordinates found.
        found: usize,
    },

    /// A coordinate is out of range or not finite.
    #[error("invalid {role} coordinate ({lat}, {lon})")]
    InvalidCoordinate {
        /// Which point was invalid ("center" or "target").
        role: &'static str,
        lat: f64,
        lon: f64,
    },
}
