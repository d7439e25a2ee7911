//! Fixed-bucket slab allocator
//!
//! This crate implements a minimal memory allocator that serves every request
//! from a fixed pool of equally sized buckets:
//! - `N` buckets of `C` bytes each, allocated once and never resized
//! - A parallel occupancy table, one flag per bucket
//! - First-fit by index: the lowest free bucket always wins
//! - A lock-guarded hook type that can be registered as the process allocator
//!
//! A request larger than one bucket is rejected no matter how many buckets are
//! free, and a request smaller than one bucket still consumes a whole bucket.

#![no_std]

extern crate alloc;

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

// Logging support - conditionally import log crate
#[cfg(feature = "log")]
extern crate log;

// Stub macros when log is disabled - these become no-ops
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Capacity of a single bucket in bytes (one 4 KiB page).
pub const DEFAULT_BUCKET_SIZE: usize = 0x1000;

/// Number of buckets in the pool.
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Alignment of every bucket base address.
///
/// Requests whose layout demands a stricter alignment cannot be served.
pub const BUCKET_ALIGN: usize = 16;

/// The error type used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The request is larger than a bucket, needs a stricter alignment than a
    /// bucket provides, or every bucket is already loaned out.
    OutOfMemory,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

impl core::error::Error for AllocError {}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;

/// Byte-granularity allocator.
///
/// Methods take `&self`: memory handed out stays owned by the caller, so an
/// implementation must never need exclusive access to it.
pub trait ByteAllocator {
    /// Allocate memory with the given size (in bytes) and alignment.
    fn alloc(&self, layout: Layout) -> AllocResult<NonNull<u8>>;

    /// Deallocate memory at the given position, size, and alignment.
    fn dealloc(&self, pos: NonNull<u8>, layout: Layout);

    /// Returns total memory size in bytes.
    fn total_bytes(&self) -> usize;

    /// Returns allocated memory size in bytes.
    fn used_bytes(&self) -> usize;

    /// Returns available memory size in bytes.
    fn available_bytes(&self) -> usize;
}

/// Checks whether the address has the demanded alignment.
///
/// Equivalent to `addr % align == 0`, but the alignment must be a power of two.
#[inline]
const fn is_aligned(base_addr: usize, align: usize) -> bool {
    base_addr & (align - 1) == 0
}

pub mod bucket;
#[cfg(feature = "tracking")]
pub use bucket::{UsageReporter, UsageStats};
pub use bucket::{Bucket, BucketHeap, BucketPool, OccupancyTable};

pub mod global_allocator;
pub use global_allocator::GlobalBucketAllocator;
