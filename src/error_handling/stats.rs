//! Lookup statistics tracking.
//!
//! Thread-safe counters for provider failures and cache behavior during IP
//! resolution.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ProviderFailure;

/// Thread-safe lookup statistics tracker.
///
/// All failure categories are initialized to zero on creation. Shared across
/// resolver clones through `Arc`.
pub struct LookupStats {
    failures: HashMap<ProviderFailure, AtomicUsize>,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    degraded: AtomicUsize,
}

impl LookupStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for failure in ProviderFailure::iter() {
            failures.insert(failure, AtomicUsize::new(0));
        }

        LookupStats {
            failures,
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            degraded: AtomicUsize::new(0),
        }
    }

    /// Increment a provider failure counter.
    pub fn increment_failure(&self, failure: ProviderFailure) {
        if let Some(counter) = self.failures.get(&failure) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                failure
            );
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a resolution that ended with the sentinel result.
    pub fn record_degraded(&self) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_failure_count(&self, failure: ProviderFailure) -> usize {
        self.failures
            .get(&failure)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::SeqCst)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::SeqCst)
    }

    pub fn degraded(&self) -> usize {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Logs non-zero counters at debug level.
    pub fn log_summary(&self) {
        log::debug!(
            "IP lookup: {} cache hit(s), {} cache miss(es), {} degraded result(s)",
            self.cache_hits(),
            self.cache_misses(),
            self.degraded()
        );
        for failure in ProviderFailure::iter() {
            let count = self.get_failure_count(failure);
            if count > 0 {
                log::debug!("   {}: {}", failure, count);
            }
        }
    }
}

impl Default for LookupStats {
    fn default() -> Self {
        Self::new()
    }
}
