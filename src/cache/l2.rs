//! Pool-owned shared cache tier.

use std::sync::Arc;

use parking_lot::Mutex;

use super::lru::LruCache;
use super::RevisionedKey;
use crate::raster::Raster;

/// Default L2 capacity in rasters.
pub const DEFAULT_L2_CAPACITY: usize = 512;

/// The pool-wide shared raster cache.
///
/// Same shape as a working set but owned by the pool and shared by every
/// caller that passes no working set. The lock is scoped to this tier only,
/// keeping exact-key lookups off the pool's refresh lock.
pub struct L2Cache {
    inner: Mutex<LruCache<RevisionedKey, Arc<Raster>>>,
}

impl L2Cache {
    /// Create an L2 cache holding at most `capacity` rasters.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Exact-key lookup, marking recency on a hit.
    pub fn get(&self, key: &RevisionedKey) -> Option<Arc<Raster>> {
        self.inner.lock().get(key)
    }

    /// Insert a raster, evicting the least recently used beyond capacity.
    pub fn insert(&self, key: RevisionedKey, raster: Arc<Raster>) {
        self.inner.lock().insert(key, raster);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Drop every cached raster.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for L2Cache {
    fn default() -> Self {
        Self::new(DEFAULT_L2_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::TileKey;
    use crate::raster::Heightfield;

    #[test]
    fn test_shared_access_returns_same_instance() {
        let l2 = L2Cache::new(8);
        let tile = TileKey::new(6, 3, 3).unwrap();
        let key = RevisionedKey::new(tile, 4);
        let raster = Arc::new(Raster::new(
            Heightfield::filled(3, 3, tile.extent(), 1.0),
            None,
            tile,
            60.0,
        ));
        l2.insert(key, raster.clone());
        assert!(Arc::ptr_eq(&l2.get(&key).unwrap(), &raster));
        l2.clear();
        assert!(l2.get(&key).is_none());
    }
}
