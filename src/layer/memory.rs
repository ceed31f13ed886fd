//! In-memory analytic elevation layer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use super::{ElevationLayer, LayerError};
use crate::geo::{Extent, GeoPoint, TileKey};
use crate::raster::Heightfield;

/// Elevation function evaluated per cell position.
pub type ElevationFn = dyn Fn(f64, f64) -> f32 + Send + Sync;

/// An in-memory elevation layer backed by an analytic function.
///
/// Serves tests and demos: coverage, maximum LOD, and the elevation surface
/// are all configurable, the data revision can be bumped to simulate edits,
/// and reads can be counted, delayed, or forced to fail.
pub struct MemoryLayer {
    name: String,
    extent: Extent,
    max_lod: u32,
    elevation: Box<ElevationFn>,
    revision: AtomicU64,
    reads: AtomicU64,
    fail_reads: AtomicBool,
    read_delay_ms: AtomicU64,
}

impl MemoryLayer {
    /// Create a layer from an elevation function of (lon, lat) degrees.
    pub fn new(
        name: impl Into<String>,
        extent: Extent,
        max_lod: u32,
        elevation: impl Fn(f64, f64) -> f32 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            extent,
            max_lod,
            elevation: Box::new(elevation),
            revision: AtomicU64::new(1),
            reads: AtomicU64::new(0),
            fail_reads: AtomicBool::new(false),
            read_delay_ms: AtomicU64::new(0),
        }
    }

    /// Create a layer serving a constant elevation over its extent.
    pub fn constant(name: impl Into<String>, extent: Extent, max_lod: u32, value: f32) -> Self {
        Self::new(name, extent, max_lod, move |_, _| value)
    }

    /// Mark the layer's data as changed.
    pub fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of `read_elevation` calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Add an artificial latency to every read, widening race windows in
    /// concurrency tests.
    pub fn set_read_delay(&self, delay: Duration) {
        self.read_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

impl ElevationLayer for MemoryLayer {
    fn read_elevation(&self, key: &TileKey, size: u32) -> Result<Option<Heightfield>, LayerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LayerError::Read {
                layer: self.name.clone(),
                tile: key.to_string(),
                message: "injected read failure".to_string(),
            });
        }

        let tile_extent = key.extent();
        if !tile_extent.intersects(&self.extent) {
            return Ok(None);
        }

        let mut hf = Heightfield::no_data(size, size, tile_extent);
        let mut any = false;
        for row in 0..size {
            for col in 0..size {
                let pos = hf.cell_position(col, row);
                if self.extent.contains(&GeoPoint::new(pos.lon, pos.lat)) {
                    hf.set(col, row, (self.elevation)(pos.lon, pos.lat));
                    any = true;
                }
            }
        }

        if any {
            Ok(Some(hf))
        } else {
            Ok(None)
        }
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max_lod(&self) -> u32 {
        self.max_lod
    }

    fn extent(&self) -> Extent {
        self.extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_layer(value: f32) -> MemoryLayer {
        MemoryLayer::constant("test", Extent::world(), 10, value)
    }

    #[test]
    fn test_constant_layer_fills_tile() {
        let layer = world_layer(250.0);
        let key = TileKey::new(4, 3, 5).unwrap();
        let hf = layer.read_elevation(&key, 17).unwrap().unwrap();
        assert_eq!(hf.valid_count(), 17 * 17);
        assert_eq!(hf.get(8, 8), 250.0);
    }

    #[test]
    fn test_no_overlap_yields_none() {
        let layer = MemoryLayer::constant("alps", Extent::new(5.0, 44.0, 14.0, 48.0), 12, 1000.0);
        // Tile over the Pacific.
        let key = TileKey::from_point(&GeoPoint::new(-150.0, 0.0), 6).unwrap();
        assert!(layer.read_elevation(&key, 17).unwrap().is_none());
    }

    #[test]
    fn test_partial_overlap_marks_outside_cells_no_data() {
        let layer = MemoryLayer::constant("east", Extent::new(0.0, -90.0, 180.0, 90.0), 10, 5.0);
        // LOD 0 west tile touches the coverage only along its east edge.
        let key = TileKey::new(0, 0, 0).unwrap();
        let hf = layer.read_elevation(&key, 9).unwrap().unwrap();
        assert!(hf.valid_count() < 9 * 9);
        assert!(hf.valid_count() > 0);
    }

    #[test]
    fn test_injected_failure_and_read_count() {
        let layer = world_layer(1.0);
        let key = TileKey::new(2, 1, 1).unwrap();
        layer.set_fail_reads(true);
        assert!(layer.read_elevation(&key, 9).is_err());
        assert_eq!(layer.read_count(), 1);
    }

    #[test]
    fn test_bump_revision_is_monotonic() {
        let layer = world_layer(1.0);
        let before = layer.revision();
        layer.bump_revision();
        assert!(layer.revision() > before);
    }
}
