//! Caller-owned cache for query-session locality.

use std::sync::Arc;

use super::lru::LruCache;
use super::RevisionedKey;
use crate::layer::ElevationLayer;
use crate::raster::Raster;

/// Default working set capacity in rasters.
pub const DEFAULT_WORKING_SET_CAPACITY: usize = 64;

/// A small, bounded, caller-owned raster cache.
///
/// Passed by mutable reference into pool queries for locality within one
/// session. Single-owner, single-thread-at-a-time: sharing one working set
/// between concurrent callers requires external synchronization, which is
/// why the async sampler keeps a private one per facade rather than sharing
/// the pool's.
///
/// A working set may carry an explicit layer subset overriding the pool's
/// current stack; when unset, queries use whatever the pool's map holds.
pub struct WorkingSet {
    cache: LruCache<RevisionedKey, Arc<Raster>>,
    layers: Option<Vec<Arc<dyn ElevationLayer>>>,
}

impl WorkingSet {
    /// Create a working set with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WORKING_SET_CAPACITY)
    }

    /// Create a working set holding at most `capacity` rasters.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
            layers: None,
        }
    }

    /// Bind this working set to an explicit layer subset.
    ///
    /// Queries through this working set consult only these layers instead
    /// of the pool's current stack.
    pub fn with_layers(mut self, layers: Vec<Arc<dyn ElevationLayer>>) -> Self {
        self.layers = Some(layers);
        self
    }

    /// The explicit layer subset, if one was bound.
    pub fn layers(&self) -> Option<&[Arc<dyn ElevationLayer>]> {
        self.layers.as_deref()
    }

    /// Exact-key lookup, marking recency on a hit.
    pub fn get(&mut self, key: &RevisionedKey) -> Option<Arc<Raster>> {
        self.cache.get(key)
    }

    /// Insert a raster, evicting the least recently used beyond capacity.
    pub fn insert(&mut self, key: RevisionedKey, raster: Arc<Raster>) {
        self.cache.insert(key, raster);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached raster.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for WorkingSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Extent, TileKey};
    use crate::layer::MemoryLayer;
    use crate::raster::Heightfield;

    fn raster(lod: u32, x: u32, y: u32) -> (RevisionedKey, Arc<Raster>) {
        let key = TileKey::new(lod, x, y).unwrap();
        let hf = Heightfield::filled(3, 3, key.extent(), 7.0);
        (
            RevisionedKey::new(key, 1),
            Arc::new(Raster::new(hf, None, key, 30.0)),
        )
    }

    #[test]
    fn test_default_capacity_is_64() {
        let ws = WorkingSet::new();
        assert!(ws.is_empty());
        assert_eq!(ws.cache.capacity(), DEFAULT_WORKING_SET_CAPACITY);
    }

    #[test]
    fn test_insert_then_get_returns_same_instance() {
        let mut ws = WorkingSet::with_capacity(4);
        let (key, raster) = raster(5, 1, 1);
        ws.insert(key, raster.clone());
        let hit = ws.get(&key).unwrap();
        assert!(Arc::ptr_eq(&hit, &raster));
    }

    #[test]
    fn test_capacity_bound_evicts() {
        let mut ws = WorkingSet::with_capacity(2);
        let (k1, r1) = raster(5, 1, 1);
        let (k2, r2) = raster(5, 2, 1);
        let (k3, r3) = raster(5, 3, 1);
        ws.insert(k1, r1);
        ws.insert(k2, r2);
        ws.insert(k3, r3);
        assert_eq!(ws.len(), 2);
        assert!(ws.get(&k1).is_none());
    }

    #[test]
    fn test_layer_subset_binding() {
        let layer: Arc<dyn crate::layer::ElevationLayer> =
            Arc::new(MemoryLayer::constant("sub", Extent::world(), 8, 12.0));
        let ws = WorkingSet::new().with_layers(vec![layer]);
        assert_eq!(ws.layers().unwrap().len(), 1);
        assert!(WorkingSet::new().layers().is_none());
    }
}
