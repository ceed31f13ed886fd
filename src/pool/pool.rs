//! Elevation pool implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::stats::{PoolStats, PoolStatsSnapshot};
use super::PoolError;
use crate::cache::{L2Cache, RasterRegistry, RevisionedKey, WorkingSet, DEFAULT_L2_CAPACITY};
use crate::geo::{GeoPoint, Profile, TileKey, DEFAULT_TILE_SIZE, MAX_LOD};
use crate::index::{coverage_at, FootprintIndex, LayerFootprint, PointCoverage, SpatialIndex};
use crate::layer::ElevationLayer;
use crate::map::Map;
use crate::raster::{Heightfield, NormalMap, Raster};
use crate::sample::Sample;

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Raster edge length in samples per tile.
    pub tile_size: u32,
    /// L2 cache capacity in rasters.
    pub l2_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            l2_capacity: DEFAULT_L2_CAPACITY,
        }
    }
}

/// Snapshot of the layer stack under one catalog revision.
struct LayerCatalog {
    layers: Vec<Arc<dyn ElevationLayer>>,
    revision: u64,
}

/// Orchestrator for point and tile elevation queries.
///
/// Owns the L2 cache, the weak raster registry, and the spatial index, and
/// keeps itself synchronized against the bound [`Map`]'s layer revision.
/// Queries are safe from any number of threads; the hot exact-key lookup
/// path stays off the refresh lock.
pub struct ElevationPool {
    map: RwLock<Weak<Map>>,
    catalog: RwLock<Arc<LayerCatalog>>,
    seen_revision: AtomicU64,
    dirty: AtomicBool,
    clear_nonce: AtomicU64,
    refresh_lock: Mutex<()>,
    l2: L2Cache,
    registry: RasterRegistry,
    index: Box<dyn SpatialIndex>,
    in_flight: DashMap<RevisionedKey, Arc<Mutex<()>>>,
    workers: AtomicUsize,
    stats: PoolStats,
    profile: Profile,
}

impl ElevationPool {
    /// Create a pool with default configuration and the default
    /// footprint-scan spatial index.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        Self::with_index(config, Box::new(FootprintIndex::new()))
    }

    /// Create a pool with an injected spatial index implementation.
    pub fn with_index(config: PoolConfig, index: Box<dyn SpatialIndex>) -> Self {
        Self {
            map: RwLock::new(Weak::new()),
            catalog: RwLock::new(Arc::new(LayerCatalog {
                layers: Vec::new(),
                revision: 0,
            })),
            seen_revision: AtomicU64::new(0),
            dirty: AtomicBool::new(true),
            clear_nonce: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
            l2: L2Cache::new(config.l2_capacity),
            registry: RasterRegistry::new(),
            index,
            in_flight: DashMap::new(),
            workers: AtomicUsize::new(0),
            stats: PoolStats::new(),
            profile: Profile::new(config.tile_size),
        }
    }

    /// Bind the pool to a map.
    ///
    /// The pool holds the map weakly: once the map is destroyed, every
    /// subsequent query fails with [`PoolError::NotConfigured`]. A change
    /// subscription marks the pool dirty immediately on structural edits;
    /// the per-query revision check would catch the change regardless.
    pub fn set_map(self: &Arc<Self>, map: &Arc<Map>) {
        *self.map.write() = Arc::downgrade(map);
        self.dirty.store(true, Ordering::Release);

        let pool = Arc::downgrade(self);
        map.subscribe(move || {
            if let Some(pool) = pool.upgrade() {
                pool.dirty.store(true, Ordering::Release);
            }
        });
        info!("elevation pool bound to map");
    }

    /// Sample the elevation at a geographic point.
    ///
    /// When `resolution_m` is given, the query resolves the smallest LOD at
    /// least that fine (clamped to what the layers offer at the point);
    /// otherwise it uses the maximum LOD available there. Missing tiles fall
    /// back to coarser ancestors, so the achieved resolution in the returned
    /// sample may be coarser than requested.
    ///
    /// Returns [`Sample::NO_DATA`] when the point lies outside all layer
    /// coverage; that is an expected outcome, not an error.
    pub fn get_sample(
        &self,
        point: &GeoPoint,
        resolution_m: Option<f64>,
        mut working_set: Option<&mut WorkingSet>,
    ) -> Result<Sample, PoolError> {
        let catalog = self.sync()?;
        let _worker = WorkerGuard::enter(&self.workers);

        let coverage = self.coverage_for(working_set.as_deref(), point);
        let Some(coverage) = coverage else {
            self.stats.record_no_data();
            return Ok(Sample::NO_DATA);
        };

        let max_lod = coverage.max_lod.min(MAX_LOD);
        let lod = match resolution_m {
            Some(res) => self.profile.lod_for_resolution(res, point.lat, max_lod),
            None => max_lod,
        };

        let Ok(key) = TileKey::from_point(point, lod) else {
            self.stats.record_no_data();
            return Ok(Sample::NO_DATA);
        };

        match self.get_tile_inner(&catalog, key, false, true, working_set.as_deref_mut())? {
            Some(raster) => match raster.sample(point) {
                Some(elevation) => Ok(Sample::new(elevation, raster.resolution_m())),
                None => {
                    self.stats.record_no_data();
                    Ok(Sample::NO_DATA)
                }
            },
            None => Ok(Sample::NO_DATA),
        }
    }

    /// Build or look up the raster for a tile.
    ///
    /// Returns `Ok(None)` when no layer has data for the tile, even after
    /// walking up to coarser ancestors when `accept_lower_res` is set. That
    /// is a normal outcome, not a fault.
    pub fn get_tile(
        &self,
        key: TileKey,
        want_normals: bool,
        accept_lower_res: bool,
        working_set: Option<&mut WorkingSet>,
    ) -> Result<Option<Arc<Raster>>, PoolError> {
        let catalog = self.sync()?;
        let _worker = WorkerGuard::enter(&self.workers);
        self.get_tile_inner(&catalog, key, want_normals, accept_lower_res, working_set)
    }

    /// Drop the L2 cache, empty the registry, and force a full resync on
    /// the next query.
    ///
    /// Safe to call concurrently with in-flight queries: they keep the
    /// raster references they already hold, while the bumped clear nonce
    /// moves the catalog revision forward so no post-clear query can match
    /// a pre-clear cache entry.
    pub fn clear(&self) {
        let _guard = self.refresh_lock.lock();
        self.l2.clear();
        self.registry.clear();
        self.index.clear();
        self.clear_nonce.fetch_add(1, Ordering::AcqRel);
        self.dirty.store(true, Ordering::Release);
        info!("elevation pool cleared");
    }

    /// Revision of the layer catalog the pool last synchronized against.
    pub fn catalog_revision(&self) -> u64 {
        self.seen_revision.load(Ordering::Acquire)
    }

    /// Number of queries currently executing.
    pub fn in_flight_queries(&self) -> usize {
        self.workers.load(Ordering::Acquire)
    }

    /// Point-in-time counters for cache hits, builds, and refreshes.
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    /// Synchronize against the map's current revision.
    ///
    /// Lock-free when nothing changed; otherwise double-checked locking
    /// under the refresh lock so racing queries do not rebuild the catalog
    /// redundantly.
    fn sync(&self) -> Result<Arc<LayerCatalog>, PoolError> {
        let map = self.map.read().upgrade().ok_or(PoolError::NotConfigured)?;

        let target = self.target_revision(&map);
        if self.dirty.load(Ordering::Acquire) || self.seen_revision.load(Ordering::Acquire) != target
        {
            let _guard = self.refresh_lock.lock();
            // Re-check: a racer may have refreshed while we waited.
            let target = self.target_revision(&map);
            if self.dirty.load(Ordering::Acquire)
                || self.seen_revision.load(Ordering::Acquire) != target
            {
                let layers = map.elevation_layers();
                let footprints = layers
                    .iter()
                    .map(|layer| LayerFootprint {
                        extent: layer.extent(),
                        max_lod: layer.max_lod(),
                    })
                    .collect();
                self.index.rebuild(footprints);
                *self.catalog.write() = Arc::new(LayerCatalog {
                    layers,
                    revision: target,
                });
                self.seen_revision.store(target, Ordering::Release);
                self.dirty.store(false, Ordering::Release);
                self.stats.record_refresh();
                info!(revision = target, "elevation catalog refreshed");
            }
        }

        Ok(self.catalog.read().clone())
    }

    fn target_revision(&self, map: &Map) -> u64 {
        map.revision()
            .wrapping_add(self.clear_nonce.load(Ordering::Acquire))
    }

    /// Coverage at a point, honoring a working set's layer override.
    fn coverage_for(
        &self,
        working_set: Option<&WorkingSet>,
        point: &GeoPoint,
    ) -> Option<PointCoverage> {
        match working_set.and_then(|ws| ws.layers()) {
            Some(subset) => {
                let footprints: Vec<LayerFootprint> = subset
                    .iter()
                    .map(|layer| LayerFootprint {
                        extent: layer.extent(),
                        max_lod: layer.max_lod(),
                    })
                    .collect();
                coverage_at(&footprints, point)
            }
            None => self.index.query(point),
        }
    }

    fn get_tile_inner(
        &self,
        catalog: &LayerCatalog,
        key: TileKey,
        want_normals: bool,
        accept_lower_res: bool,
        mut working_set: Option<&mut WorkingSet>,
    ) -> Result<Option<Arc<Raster>>, PoolError> {
        let (layers, scoped): (Vec<Arc<dyn ElevationLayer>>, bool) =
            match working_set.as_ref().and_then(|ws| ws.layers()) {
                Some(subset) => (subset.to_vec(), true),
                None => (catalog.layers.clone(), false),
            };

        let mut current = key;
        loop {
            let rkey = RevisionedKey::new(current, catalog.revision);
            if let Some(raster) =
                self.lookup_or_build(rkey, want_normals, &layers, working_set.as_deref_mut(), scoped)
            {
                return Ok(Some(raster));
            }
            if !accept_lower_res {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        self.stats.record_no_data();
        debug!(key = %key, accept_lower_res, "no elevation data for tile");
        Ok(None)
    }

    /// Tiered lookup: working set, L2, weak registry, then a deduplicated
    /// build. Every hit is written back into the tiers above it.
    ///
    /// `scoped` marks a query answered from a working set's explicit layer
    /// subset. Such rasters describe a different layer configuration than
    /// the shared key space, so they never touch the L2 or the registry in
    /// either direction; they live only in that working set.
    fn lookup_or_build(
        &self,
        rkey: RevisionedKey,
        want_normals: bool,
        layers: &[Arc<dyn ElevationLayer>],
        mut working_set: Option<&mut WorkingSet>,
        scoped: bool,
    ) -> Option<Arc<Raster>> {
        // Tier 1: caller-owned working set.
        if let Some(ws) = working_set.as_deref_mut() {
            if let Some(raster) = ws.get(&rkey) {
                self.stats.record_working_set_hit();
                return Some(raster);
            }
        }

        if scoped {
            let raster = self.build_raster(&rkey, want_normals, layers)?;
            if let Some(ws) = working_set {
                ws.insert(rkey, raster.clone());
            }
            return Some(raster);
        }

        // Tier 2: pool-owned L2.
        if let Some(raster) = self.l2.get(&rkey) {
            self.stats.record_l2_hit();
            if let Some(ws) = working_set.as_deref_mut() {
                ws.insert(rkey, raster.clone());
            }
            return Some(raster);
        }

        // Tier 3: weak registry; re-own the raster into L2 on a hit.
        if let Some(raster) = self.registry.resolve(&rkey) {
            self.stats.record_registry_hit();
            debug!(key = %rkey, "reusing raster found in weak registry");
            self.l2.insert(rkey, raster.clone());
            if let Some(ws) = working_set.as_deref_mut() {
                ws.insert(rkey, raster.clone());
            }
            return Some(raster);
        }

        // Tier 4: build, deduplicated per key. The first locker builds;
        // racers block on the slot and find the result in L2.
        let slot = self
            .in_flight
            .entry(rkey)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _build_guard = slot.lock();

        let raced = if let Some(raster) = self.l2.get(&rkey) {
            self.stats.record_l2_hit();
            Some(raster)
        } else if let Some(raster) = self.registry.resolve(&rkey) {
            self.stats.record_registry_hit();
            Some(raster)
        } else {
            None
        };
        if let Some(raster) = raced {
            if let Some(ws) = working_set.as_deref_mut() {
                ws.insert(rkey, raster.clone());
            }
            return Some(raster);
        }

        let built = self.build_raster(&rkey, want_normals, layers);
        // Publish before releasing the slot: a caller arriving after the
        // remove must find the raster when it re-checks the caches.
        if let Some(raster) = &built {
            self.registry.record(rkey, raster);
            self.l2.insert(rkey, raster.clone());
        }
        self.in_flight.remove(&rkey);

        let raster = built?;
        if let Some(ws) = working_set {
            ws.insert(rkey, raster.clone());
        }
        Some(raster)
    }

    /// Assemble a raster by consulting every layer in stack order.
    ///
    /// Later layers override earlier ones where their samples are valid;
    /// a failing layer contributes nothing and the remaining layers are
    /// still consulted.
    fn build_raster(
        &self,
        rkey: &RevisionedKey,
        want_normals: bool,
        layers: &[Arc<dyn ElevationLayer>],
    ) -> Option<Arc<Raster>> {
        let tile = rkey.tile;
        let size = self.profile.tile_size();
        let mut merged = Heightfield::no_data(size, size, tile.extent());
        let mut any_data = false;

        for layer in layers {
            if tile.lod() > layer.max_lod() {
                continue;
            }
            match layer.read_elevation(&tile, size) {
                Ok(Some(hf)) => {
                    merged.overlay(&hf);
                    any_data = true;
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        layer = layer.name(),
                        key = %rkey,
                        %error,
                        "layer read failed; continuing without its contribution"
                    );
                }
            }
        }

        if !any_data {
            return None;
        }

        let normal_map = want_normals.then(|| NormalMap::from_heightfield(&merged));
        let resolution = self
            .profile
            .resolution_m(tile.lod(), tile.extent().center().lat);
        self.stats.record_build();
        debug!(key = %rkey, resolution_m = resolution, "built elevation raster");
        Some(Arc::new(Raster::new(merged, normal_map, tile, resolution)))
    }
}

impl Default for ElevationPool {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII increment of the in-flight query gauge.
struct WorkerGuard<'a>(&'a AtomicUsize);

impl<'a> WorkerGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
