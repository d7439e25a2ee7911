//! Usage statistics for the bucket heap
//!
//! Counters are kept by [`BucketHeap`](super::BucketHeap) when the `tracking`
//! feature is enabled.

/// Bucket heap usage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub total_buckets: usize,
    pub used_buckets: usize,
    /// Successful allocations since the heap was built.
    pub allocations: usize,
    /// Releases that returned a bucket to the pool.
    pub releases: usize,
    pub failed_allocations: usize,
    /// Releases of foreign or already freed pointers.
    pub ignored_releases: usize,
    /// Bytes actually requested by the live allocations. The rest of their
    /// buckets is internal fragmentation.
    pub live_requested_bytes: usize,
}

impl UsageStats {
    /// Creates zeroed counters.
    pub const fn new() -> Self {
        Self {
            total_buckets: 0,
            used_buckets: 0,
            allocations: 0,
            releases: 0,
            failed_allocations: 0,
            ignored_releases: 0,
            live_requested_bytes: 0,
        }
    }

    /// Buckets not loaned out.
    pub fn free_buckets(&self) -> usize {
        self.total_buckets - self.used_buckets
    }

    /// Bytes loaned out but not requested, given the bucket size.
    pub fn wasted_bytes(&self, bucket_size: usize) -> usize {
        (self.used_buckets * bucket_size).saturating_sub(self.live_requested_bytes)
    }
}

/// Writes heap usage summaries to the log
pub struct UsageReporter;

impl UsageReporter {
    /// Log a summary of `stats` for a heap of `bucket_size`-byte buckets
    #[allow(unused_variables)]
    pub fn report(bucket_size: usize, stats: &UsageStats) {
        #[cfg(feature = "log")]
        use log::info;
        info!("========================================");
        info!(
            "Buckets: {} used / {} total ({} bytes each)",
            stats.used_buckets, stats.total_buckets, bucket_size
        );
        info!("  Free buckets: {}", stats.free_buckets());
        info!(
            "  Allocations: {} ok, {} failed",
            stats.allocations, stats.failed_allocations
        );
        info!(
            "  Releases: {} ok, {} ignored",
            stats.releases, stats.ignored_releases
        );
        info!(
            "  Requested bytes: {} (wasted {})",
            stats.live_requested_bytes,
            stats.wasted_bytes(bucket_size)
        );
        info!("========================================");
    }
}
