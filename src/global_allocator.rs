//! Global allocator hooks for the bucket heap.
//!
//! [`GlobalBucketAllocator`] is the process-level boundary: `alloc` and
//! `release` delegate to a [`BucketHeap`], whose lock serializes them, and the type
//! implements [`GlobalAlloc`](core::alloc::GlobalAlloc) so a program can
//! register it explicitly:
//!
//! ```rust,ignore
//! use bucket_slab_allocator::GlobalBucketAllocator;
//!
//! #[global_allocator]
//! static HEAP: GlobalBucketAllocator = GlobalBucketAllocator::new();
//! ```

use core::alloc::Layout;
use core::ptr::NonNull;

#[cfg(feature = "tracking")]
use super::bucket::{UsageReporter, UsageStats};
use super::bucket::BucketHeap;
use crate::{AllocResult, ByteAllocator};

#[cfg(feature = "log")]
use log::{debug, trace, warn};

/// Bucket heap exposing the allocation and release hooks
pub struct GlobalBucketAllocator<
    const C: usize = { crate::DEFAULT_BUCKET_SIZE },
    const N: usize = { crate::DEFAULT_BUCKET_COUNT },
> {
    heap: BucketHeap<C, N>,
}

impl<const C: usize, const N: usize> GlobalBucketAllocator<C, N> {
    /// Creates the hooks over a heap with every bucket free.
    pub const fn new() -> Self {
        Self {
            heap: BucketHeap::new(),
        }
    }

    /// Allocation hook: loans out the lowest free bucket for `size` bytes.
    pub fn alloc(&self, size: usize) -> AllocResult<NonNull<u8>> {
        let result = self.heap.allocate(size);
        match result {
            Ok(_ptr) => {
                debug!("bucket heap: {} bytes at {:p}", size, _ptr);
            }
            Err(_e) => {
                warn!("bucket heap: request of {} bytes failed: {}", size, _e);
            }
        }
        result
    }

    /// Release hook: returns the bucket at `ptr`, ignoring unknown pointers.
    pub fn release(&self, ptr: *mut u8) {
        if self.heap.free(ptr) {
            debug!("bucket heap: released {:p}", ptr);
        } else {
            trace!("bucket heap: ignored release of {:p}", ptr);
        }
    }

    /// Base address of the pool.
    pub fn base(&self) -> usize {
        self.heap.base()
    }

    /// Base address of bucket `index`, `None` when out of range.
    pub fn bucket_addr(&self, index: usize) -> Option<usize> {
        self.heap.bucket_addr(index)
    }

    /// Whether bucket `index` is loaned out.
    pub fn is_used(&self, index: usize) -> bool {
        self.heap.is_used(index)
    }

    /// Number of buckets loaned out.
    pub fn used_buckets(&self) -> usize {
        self.heap.used_buckets()
    }

    /// Number of buckets available.
    pub fn free_buckets(&self) -> usize {
        self.heap.free_buckets()
    }

    /// Capacity of one bucket, `C`.
    pub const fn bucket_size(&self) -> usize {
        C
    }

    /// Number of buckets, `N`.
    pub const fn bucket_count(&self) -> usize {
        N
    }

    /// Distance between neighbouring bucket bases.
    pub const fn stride(&self) -> usize {
        self.heap.stride()
    }
}

impl<const C: usize, const N: usize> GlobalBucketAllocator<C, N> {
    /// Get heap usage statistics
    #[cfg(feature = "tracking")]
    pub fn stats(&self) -> UsageStats {
        self.heap.stats()
    }

    /// Log a usage summary
    #[cfg(feature = "tracking")]
    pub fn report(&self) {
        let stats = self.stats();
        UsageReporter::report(C, &stats);
    }
}

impl<const C: usize, const N: usize> Default for GlobalBucketAllocator<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

// Nothing on this path logs: a logger that allocates would re-enter the heap.
unsafe impl<const C: usize, const N: usize> core::alloc::GlobalAlloc
    for GlobalBucketAllocator<C, N>
{
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        match ByteAllocator::alloc(&self.heap, layout) {
            Ok(ptr) => ptr.as_ptr(),
            Err(_) => core::ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.heap.free(ptr);
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        // The whole bucket already belongs to `ptr`.
        if self.heap.resize(ptr, new_size) {
            return ptr;
        }
        core::ptr::null_mut()
    }
}
