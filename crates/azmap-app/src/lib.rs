//! Azimuthal map application: session control, data loading, and output.
//!
//! [`MapSession`] owns the projection state and every derived layer, and
//! rebuilds them whenever the center, mode, or sun position changes. The
//! binary wires it to the command line, configuration, and logging.

pub mod error;
pub mod export;
pub mod hud;
pub mod platform;
pub mod session;
pub mod shapes;

pub use error::AppError;
pub use hud::{PathSummary, format_coord, location_label};
pub use platform::{PlatformDirs, PlatformError};
pub use session::{LayerId, MapSession, Markers, SessionOptions};
pub use shapes::{LayerSource, LoadError, layer_sources, load_layers, load_rings};
