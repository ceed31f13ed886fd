//! Terrapool - tiered elevation caching for revisioned layer stacks
//!
//! This library answers point and tile elevation queries over an ordered,
//! revisioned stack of elevation layers, while avoiding redundant
//! reconstruction of expensive elevation rasters.
//!
//! # High-Level API
//!
//! The [`pool`] module provides the orchestrator most callers want:
//!
//! ```ignore
//! use std::sync::Arc;
//! use terrapool::geo::GeoPoint;
//! use terrapool::map::Map;
//! use terrapool::pool::ElevationPool;
//!
//! let map = Arc::new(Map::new());
//! map.add_layer(my_layer);
//!
//! let pool = Arc::new(ElevationPool::new());
//! pool.set_map(&map);
//!
//! let sample = pool.get_sample(GeoPoint::new(-122.3, 37.6), None, None)?;
//! if sample.is_valid() {
//!     println!("elevation: {} m", sample.elevation);
//! }
//! ```
//!
//! For background queries, [`sampler::AsyncElevationSampler`] pairs a pool
//! with a bounded set of worker tasks and returns future-valued samples.

pub mod cache;
pub mod geo;
pub mod index;
pub mod layer;
pub mod logging;
pub mod map;
pub mod pool;
pub mod raster;
pub mod sample;
pub mod sampler;

/// Version of the terrapool library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
