//! Elevation data layers.
//!
//! A layer is a source of elevation data for tiles: typically disk or
//! network backed in a real deployment. This crate only consumes the
//! interface; [`MemoryLayer`] provides an in-process implementation for
//! tests and demos.

mod memory;

pub use memory::MemoryLayer;

use crate::geo::{Extent, TileKey};
use crate::raster::Heightfield;
use thiserror::Error;

/// Errors from layer read operations.
///
/// The pool treats a failing layer as contributing no data and keeps
/// consulting the remaining layers; a single bad layer never aborts a query.
#[derive(Debug, Clone, Error)]
pub enum LayerError {
    /// The layer's backing store failed to produce the tile.
    #[error("layer '{layer}' failed to read tile {tile}: {message}")]
    Read {
        layer: String,
        tile: String,
        message: String,
    },
}

/// A source of elevation data consulted by the pool.
///
/// Layers are stacked in order; where a later layer has valid samples they
/// override earlier layers' samples.
pub trait ElevationLayer: Send + Sync {
    /// Read elevation data covering a tile.
    ///
    /// * `Ok(Some(_))` - a grid of `size × size` samples for the tile's
    ///   extent; cells the layer cannot populate carry the no-data sentinel.
    /// * `Ok(None)` - the layer has no data for this tile. Expected and
    ///   common; not a fault.
    /// * `Err(_)` - the read itself failed (I/O, decode).
    fn read_elevation(&self, key: &TileKey, size: u32) -> Result<Option<Heightfield>, LayerError>;

    /// Monotonic data revision; bumped whenever the layer's content changes.
    fn revision(&self) -> u64;

    /// Layer name for logging and identification.
    fn name(&self) -> &str;

    /// Finest LOD this layer can supply.
    fn max_lod(&self) -> u32;

    /// Geographic coverage footprint.
    fn extent(&self) -> Extent;
}
