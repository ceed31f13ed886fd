//! Geographic primitives and the global tiling scheme.
//!
//! Provides points and extents in WGS84 degrees, the quadtree [`TileKey`]
//! hierarchy, and the [`Profile`] that maps requested ground resolutions to
//! levels of detail.

mod profile;
mod tile;
mod types;

pub use profile::{Profile, DEFAULT_TILE_SIZE};
pub use tile::{TileKey, MAX_LOD};
pub use types::{Extent, GeoError, GeoPoint};
