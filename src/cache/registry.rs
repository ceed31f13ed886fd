//! Process-wide weak index of live rasters.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::trace;

use super::RevisionedKey;
use crate::raster::Raster;

/// Non-owning registry of rasters alive anywhere in the hosting process.
///
/// Purely observational: entries are weak references that self-invalidate
/// once the raster's real owners release it. A dead entry is identical to
/// "not found" and is lazily dropped on the failed resolve; the registry
/// never extends a raster's lifetime and is only emptied wholesale by
/// [`RasterRegistry::clear`].
#[derive(Default)]
pub struct RasterRegistry {
    entries: DashMap<RevisionedKey, Weak<Raster>>,
}

impl RasterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raster's existence without taking ownership.
    pub fn record(&self, key: RevisionedKey, raster: &Arc<Raster>) {
        self.entries.insert(key, Arc::downgrade(raster));
    }

    /// Resolve a key to a strong reference if the raster is still alive.
    pub fn resolve(&self, key: &RevisionedKey) -> Option<Arc<Raster>> {
        // Bind before matching so the shard guard is released first.
        let live = self.entries.get(key).and_then(|weak| weak.upgrade());
        if live.is_none() {
            // Lazy cleanup: a dead weak entry is just a miss.
            let removed = self
                .entries
                .remove_if(key, |_, weak| weak.upgrade().is_none());
            if removed.is_some() {
                trace!(key = %key, "dropped dead registry entry");
            }
        }
        live
    }

    /// Number of recorded entries, live or dead.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logically empty the registry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::TileKey;
    use crate::raster::Heightfield;

    fn raster(tile: TileKey) -> Arc<Raster> {
        Arc::new(Raster::new(
            Heightfield::filled(3, 3, tile.extent(), 9.0),
            None,
            tile,
            100.0,
        ))
    }

    #[test]
    fn test_resolve_live_raster() {
        let registry = RasterRegistry::new();
        let tile = TileKey::new(4, 1, 1).unwrap();
        let key = RevisionedKey::new(tile, 1);
        let owned = raster(tile);
        registry.record(key, &owned);
        let resolved = registry.resolve(&key).unwrap();
        assert!(Arc::ptr_eq(&resolved, &owned));
    }

    #[test]
    fn test_dead_entry_resolves_as_absent() {
        let registry = RasterRegistry::new();
        let tile = TileKey::new(4, 2, 2).unwrap();
        let key = RevisionedKey::new(tile, 1);
        {
            let owned = raster(tile);
            registry.record(key, &owned);
        }
        // The only owner is gone; the weak entry must behave as a miss.
        assert!(registry.resolve(&key).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_does_not_extend_lifetime() {
        let registry = RasterRegistry::new();
        let tile = TileKey::new(4, 3, 1).unwrap();
        let key = RevisionedKey::new(tile, 1);
        let owned = raster(tile);
        registry.record(key, &owned);
        let weak = Arc::downgrade(&owned);
        drop(owned);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_clear_empties_entries() {
        let registry = RasterRegistry::new();
        let tile = TileKey::new(4, 0, 0).unwrap();
        let key = RevisionedKey::new(tile, 1);
        let owned = raster(tile);
        registry.record(key, &owned);
        registry.clear();
        assert!(registry.resolve(&key).is_none());
        assert_eq!(registry.len(), 0);
    }
}
