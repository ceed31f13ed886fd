//! Pool hit/miss/build counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for pool activity.
///
/// Cheap to bump from any thread; read as a [`PoolStatsSnapshot`].
#[derive(Debug, Default)]
pub struct PoolStats {
    working_set_hits: AtomicU64,
    l2_hits: AtomicU64,
    registry_hits: AtomicU64,
    builds: AtomicU64,
    no_data: AtomicU64,
    refreshes: AtomicU64,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_working_set_hit(&self) {
        self.working_set_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_l2_hit(&self) {
        self.l2_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_registry_hit(&self) {
        self.registry_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_build(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_no_data(&self) {
        self.no_data.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough point-in-time view of the counters.
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            working_set_hits: self.working_set_hits.load(Ordering::Relaxed),
            l2_hits: self.l2_hits.load(Ordering::Relaxed),
            registry_hits: self.registry_hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            no_data: self.no_data.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`PoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    pub working_set_hits: u64,
    pub l2_hits: u64,
    pub registry_hits: u64,
    pub builds: u64,
    pub no_data: u64,
    pub refreshes: u64,
}

impl PoolStatsSnapshot {
    /// Cache hits across all tiers.
    pub fn total_hits(&self) -> u64 {
        self.working_set_hits + self.l2_hits + self.registry_hits
    }
}
