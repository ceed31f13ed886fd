//! The elevation pool orchestrator.
//!
//! Sits between "a point/tile request" and the configured elevation
//! layers: tracks the layer-catalog revision, locates already-built
//! rasters through the working-set, L2, and weak-registry tiers before
//! paying to rebuild one, and exposes the synchronous query surface that
//! the async sampler wraps.

mod pool;
mod stats;

pub use pool::{ElevationPool, PoolConfig};
pub use stats::{PoolStats, PoolStatsSnapshot};

use thiserror::Error;

/// Errors from pool queries.
///
/// "No data" is deliberately absent: a point or tile outside all layer
/// coverage is an expected outcome reported through the success type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    /// `set_map` was never called, or the bound map has been destroyed.
    #[error("elevation pool is not bound to a live map")]
    NotConfigured,

    /// An async sample was cancelled before its result was observed.
    #[error("sample query was cancelled")]
    Cancelled,
}
