//! Cache tiers for built rasters.
//!
//! Three tiers with distinct ownership:
//! - [`WorkingSet`]: caller-owned, bounded, LRU; locality for one query
//!   session.
//! - [`L2Cache`]: pool-owned, bounded, LRU; shared by callers that supply no
//!   working set.
//! - [`RasterRegistry`]: process-wide, unbounded, non-owning; observes
//!   rasters alive anywhere in the host without extending their lifetime.

mod l2;
mod lru;
mod registry;
mod working_set;

pub use l2::{L2Cache, DEFAULT_L2_CAPACITY};
pub use lru::LruCache;
pub use registry::RasterRegistry;
pub use working_set::{WorkingSet, DEFAULT_WORKING_SET_CAPACITY};

use crate::geo::TileKey;

/// Cache key pairing a tile with the layer-configuration revision it was
/// built under.
///
/// Keys from different revisions are distinct entries: the same tile under a
/// new revision never collides with its stale predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevisionedKey {
    pub tile: TileKey,
    pub revision: u64,
}

impl RevisionedKey {
    /// Create a key for a tile at a specific catalog revision.
    pub fn new(tile: TileKey, revision: u64) -> Self {
        Self { tile, revision }
    }
}

impl std::fmt::Display for RevisionedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@r{}", self.tile, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_differ_across_revisions() {
        let tile = TileKey::new(8, 10, 20).unwrap();
        let old = RevisionedKey::new(tile, 1);
        let new = RevisionedKey::new(tile, 2);
        assert_ne!(old, new);
        assert_eq!(old, RevisionedKey::new(tile, 1));
    }
}
