//! Injectable spatial index over layer footprints.
//!
//! The pool asks "what coverage exists near this point?" through the
//! [`SpatialIndex`] trait so the indexing structure (linear scan, grid,
//! tree) stays an implementation choice. Indexes are rebuilt wholesale on
//! every layer-catalog refresh, never patched incrementally, which rules
//! out partial-rebuild races.

mod footprint;

pub use footprint::FootprintIndex;

use crate::geo::{Extent, GeoPoint};

/// Coverage footprint of one layer.
#[derive(Debug, Clone)]
pub struct LayerFootprint {
    /// Geographic bounds the layer can contribute data inside.
    pub extent: Extent,
    /// Finest LOD the layer offers.
    pub max_lod: u32,
}

/// What the layer stack offers at a specific point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointCoverage {
    /// Maximum LOD any covering layer offers here.
    pub max_lod: u32,
    /// Number of layers covering the point.
    pub layer_count: usize,
}

/// Point-queryable index of layer coverage.
pub trait SpatialIndex: Send + Sync {
    /// Replace the indexed footprints wholesale.
    fn rebuild(&self, footprints: Vec<LayerFootprint>);

    /// Coverage available at a point, or `None` when no layer reaches it.
    fn query(&self, point: &GeoPoint) -> Option<PointCoverage>;

    /// Drop all indexed footprints.
    fn clear(&self);
}

/// Compute the coverage an explicit footprint list offers at a point.
///
/// Shared by index implementations and by working-set layer overrides,
/// which bypass the pool's index.
pub fn coverage_at(footprints: &[LayerFootprint], point: &GeoPoint) -> Option<PointCoverage> {
    let mut max_lod = None;
    let mut layer_count = 0;
    for footprint in footprints {
        if footprint.extent.contains(point) {
            layer_count += 1;
            max_lod = Some(max_lod.map_or(footprint.max_lod, |m: u32| m.max(footprint.max_lod)));
        }
    }
    max_lod.map(|max_lod| PointCoverage {
        max_lod,
        layer_count,
    })
}
