//! The ordered, revisioned layer-stack container.
//!
//! A [`Map`] owns the elevation layer stack and derives a monotonic
//! revision from the layer count, order, and per-layer data revisions.
//! Structural changes notify registered subscribers; the pool additionally
//! pull-checks the revision at the top of every query, so the push
//! notification is an optimization rather than a correctness requirement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::layer::ElevationLayer;

type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Ordered stack of elevation layers with change tracking.
///
/// Thread-safe: layers may be added or removed while queries are running;
/// readers take a snapshot of the stack.
#[derive(Default)]
pub struct Map {
    layers: RwLock<Vec<Arc<dyn ElevationLayer>>>,
    structural_revision: AtomicU64,
    callbacks: Mutex<Vec<ChangeCallback>>,
}

impl Map {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer to the top of the stack.
    ///
    /// Later layers take priority where their data is valid.
    pub fn add_layer(&self, layer: Arc<dyn ElevationLayer>) {
        debug!(layer = layer.name(), "adding elevation layer");
        self.layers.write().push(layer);
        self.mark_changed(0);
    }

    /// Remove the first layer with the given name. Returns whether a layer
    /// was removed.
    pub fn remove_layer(&self, name: &str) -> bool {
        let removed = {
            let mut layers = self.layers.write();
            match layers.iter().position(|l| l.name() == name) {
                Some(idx) => Some(layers.remove(idx)),
                None => None,
            }
        };
        match removed {
            Some(layer) => {
                debug!(layer = name, "removed elevation layer");
                // Compensate for the removed layer's revision leaving the
                // sum, keeping the derived revision non-decreasing.
                self.mark_changed(layer.revision());
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current layer stack, in priority order.
    pub fn elevation_layers(&self) -> Vec<Arc<dyn ElevationLayer>> {
        self.layers.read().clone()
    }

    /// Number of layers in the stack.
    pub fn layer_count(&self) -> usize {
        self.layers.read().len()
    }

    /// Current revision of the layer configuration.
    ///
    /// Monotonically non-decreasing: derived from the structural counter
    /// plus every layer's own data revision, so both stack edits and
    /// per-layer data changes move it forward.
    pub fn revision(&self) -> u64 {
        let structural = self.structural_revision.load(Ordering::Acquire);
        let layers = self.layers.read();
        layers
            .iter()
            .fold(structural, |acc, layer| acc.wrapping_add(layer.revision()))
    }

    /// Register a callback invoked on every structural change.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.callbacks.lock().push(Box::new(callback));
    }

    fn mark_changed(&self, compensation: u64) {
        self.structural_revision
            .fetch_add(compensation + 1, Ordering::AcqRel);
        for callback in self.callbacks.lock().iter() {
            callback();
        }
    }
}
