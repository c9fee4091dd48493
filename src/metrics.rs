//! Store Metrics
//!
//! Operation counters for a single store.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    sets: AtomicU64,
    removals: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    scans: AtomicU64,
    evictions: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a point lookup
    pub(crate) fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    /// Number of `set` calls, bulk-loaded entries included
    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Number of successful explicit removals
    pub fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    /// Number of entries removed because they expired
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that returned a value
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }

    /// Get a summary of metrics
    pub fn summary(&self) -> String {
        format!(
            "Sets: {} | Removals: {} | Lookups: hits={}, misses={} ({:.1}%) | Scans: {} | Evictions: {}",
            self.sets(),
            self.removals(),
            self.hits(),
            self.misses(),
            self.hit_ratio() * 100.0,
            self.scans(),
            self.evictions()
        )
    }
}
