//! Bucket allocator implementation.
//!
//! This module implements the fixed pool of equally sized buckets, its
//! occupancy table, and the first-fit heap that loans buckets out.

pub mod bucket_heap;
pub mod occupancy;
pub mod storage;
#[cfg(feature = "tracking")]
pub mod stats;

// Re-export public types
pub use bucket_heap::BucketHeap;
pub use occupancy::OccupancyTable;
#[cfg(feature = "tracking")]
pub use stats::{UsageReporter, UsageStats};
pub use storage::{Bucket, BucketPool};
