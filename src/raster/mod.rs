//! Immutable elevation rasters.
//!
//! A [`Raster`] bundles a merged [`Heightfield`] with an optional
//! [`NormalMap`] and metadata about where it came from. Rasters are built
//! once, shared via `Arc`, and never mutated afterwards.

mod heightfield;
mod normals;

pub use heightfield::{Heightfield, NO_DATA_VALUE};
pub use normals::NormalMap;

use crate::geo::{GeoPoint, TileKey};

/// An owned, shareable, immutable-once-built elevation grid.
///
/// Any number of cache tiers and clients may hold the same `Arc<Raster>`;
/// the instance is destroyed when the last owner releases it.
#[derive(Debug)]
pub struct Raster {
    heightfield: Heightfield,
    normal_map: Option<NormalMap>,
    key: TileKey,
    resolution_m: f64,
}

impl Raster {
    /// Bundle a finished heightfield into a raster.
    pub fn new(
        heightfield: Heightfield,
        normal_map: Option<NormalMap>,
        key: TileKey,
        resolution_m: f64,
    ) -> Self {
        Self {
            heightfield,
            normal_map,
            key,
            resolution_m,
        }
    }

    /// The tile key this raster was built for.
    pub fn key(&self) -> &TileKey {
        &self.key
    }

    /// Achieved ground resolution in meters per cell.
    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    /// The merged elevation grid.
    pub fn heightfield(&self) -> &Heightfield {
        &self.heightfield
    }

    /// Normal map, if one was requested at build time.
    pub fn normal_map(&self) -> Option<&NormalMap> {
        self.normal_map.as_ref()
    }

    /// Sample the elevation at a geographic point.
    ///
    /// Returns `None` when the point is outside the raster's extent or only
    /// no-data cells surround it.
    pub fn sample(&self, point: &GeoPoint) -> Option<f32> {
        self.heightfield.sample(point)
    }
}
