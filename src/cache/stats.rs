//! Per-namespace cache counters.

use serde::Serialize;

/// Counters for one [`ExpiringCache`](super::ExpiringCache) namespace.
///
/// A read is exactly one of: memory hit, mirror hit, miss. Expired entries
/// purged on read count both as an expiration and as a miss.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    /// Subset of `hits` answered by the durable mirror
    pub mirror_hits: u64,
    pub misses: u64,
    /// Entries dropped by the capacity bound
    pub evictions: u64,
    /// Entries dropped because their lifetime ran out
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// `hits / (hits + misses)`; a cache nobody has read from reports 0.0.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_mirror_hit(&mut self) {
        self.record_hit();
        self.mirror_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_mirror_hit_counts_as_hit() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_mirror_hit();
        stats.record_miss();
        stats.record_miss();

        assert_eq!(stats.hits, 2);
        assert_eq!(stats.mirror_hits, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_removals_tracked_separately() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_expirations(3);
        stats.record_expirations(0);

        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 3);
        assert_eq!(stats.misses, 0);
    }
}
