//! Default linear-scan spatial index.

use parking_lot::RwLock;
use tracing::debug;

use super::{coverage_at, LayerFootprint, PointCoverage, SpatialIndex};
use crate::geo::GeoPoint;

/// Linear-scan index over layer footprints.
///
/// Layer stacks are small (single digits in practice), so a scan behind a
/// read lock beats any tree for this workload. Swap in another
/// [`SpatialIndex`] implementation if that ever stops being true.
#[derive(Default)]
pub struct FootprintIndex {
    footprints: RwLock<Vec<LayerFootprint>>,
}

impl FootprintIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for FootprintIndex {
    fn rebuild(&self, footprints: Vec<LayerFootprint>) {
        debug!(count = footprints.len(), "rebuilding spatial index");
        *self.footprints.write() = footprints;
    }

    fn query(&self, point: &GeoPoint) -> Option<PointCoverage> {
        coverage_at(&self.footprints.read(), point)
    }

    fn clear(&self) {
        self.footprints.write().clear();
    }
}
