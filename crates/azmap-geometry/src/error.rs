//! Geometry error types.

use std::collections::TryReserveError;

/// Errors produced while building projected geometry.
///
/// None of these are fatal to the caller: a failed build degrades one layer,
/// and the next rebuild starts from scratch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// More rings or segments were offered than the configured soft limit.
    /// The excess was dropped; everything up to the limit was kept.
    #[error("capacity exceeded: {requested} items offered, limit is {limit}")]
    CapacityExceeded {
        /// Configured maximum.
        limit: usize,
        /// Number of items that were offered.
        requested: usize,
    },

    /// The vertex or segment buffer could not grow. The layer is left empty.
    #[error("failed to allocate geometry buffer: {0}")]
    AllocationFailure(#[from] TryReserveError),
}
