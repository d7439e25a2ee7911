//! Bucket heap implementation.
//!
//! [`BucketHeap`] owns a [`BucketPool`] of `N` buckets of `C` bytes and a
//! parallel [`OccupancyTable`]. Both are sized at compile time and never change
//! length. Allocation picks the lowest free bucket; release finds the bucket
//! whose base equals the pointer. Both are linear scans.
//!
//! Every operation takes `&self`. The bookkeeping sits behind a `SpinNoIrq`
//! lock so scan-and-mark is atomic, and the bucket bytes are only reached
//! through raw pointers, so live allocations stay valid across heap calls.

use core::alloc::Layout;
use core::ptr::NonNull;

use kspin::SpinNoIrq;

#[cfg(feature = "tracking")]
use super::stats::UsageStats;
use super::{occupancy::OccupancyTable, storage::BucketPool};
use crate::{AllocError, AllocResult, ByteAllocator, BUCKET_ALIGN};

/// Bookkeeping guarded by the heap lock
struct Ledger<const N: usize> {
    used: OccupancyTable<N>,
    #[cfg(feature = "tracking")]
    requested: [usize; N],
    #[cfg(feature = "tracking")]
    stats: UsageStats,
}

impl<const N: usize> Ledger<N> {
    const fn new() -> Self {
        Self {
            used: OccupancyTable::new(),
            #[cfg(feature = "tracking")]
            requested: [0; N],
            #[cfg(feature = "tracking")]
            stats: UsageStats::new(),
        }
    }

    #[allow(unused_variables)]
    fn take(&mut self, index: usize, bytes: usize) {
        self.used.mark_used(index);
        #[cfg(feature = "tracking")]
        {
            self.requested[index] = bytes;
            self.stats.allocations += 1;
            self.stats.live_requested_bytes += bytes;
        }
    }

    fn give_back(&mut self, index: usize) -> bool {
        let released = self.used.mark_free(index);
        #[cfg(feature = "tracking")]
        if released {
            self.stats.releases += 1;
            self.stats.live_requested_bytes -= core::mem::take(&mut self.requested[index]);
        }
        released
    }

    fn fail(&mut self) -> AllocError {
        #[cfg(feature = "tracking")]
        {
            self.stats.failed_allocations += 1;
        }
        AllocError::OutOfMemory
    }

    fn ignore(&mut self) {
        #[cfg(feature = "tracking")]
        {
            self.stats.ignored_releases += 1;
        }
    }
}

/// Fixed pool of `N` buckets, `C` bytes each.
///
/// The heap hands out pointers into its own storage, so it must stay in place
/// while any allocation is live. Keep it in a `static` or behind a `Box`.
pub struct BucketHeap<
    const C: usize = { crate::DEFAULT_BUCKET_SIZE },
    const N: usize = { crate::DEFAULT_BUCKET_COUNT },
> {
    pool: BucketPool<C, N>,
    ledger: SpinNoIrq<Ledger<N>>,
}

impl<const C: usize, const N: usize> BucketHeap<C, N> {
    const VALID_CONFIG: () = assert!(
        C > 0 && N > 0,
        "bucket heap needs a non-zero bucket size and bucket count"
    );

    /// Creates a heap with every bucket free.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CONFIG;
        Self {
            pool: BucketPool::new(),
            ledger: SpinNoIrq::new(Ledger::new()),
        }
    }

    /// Loans out the lowest free bucket.
    ///
    /// Fails with [`AllocError::OutOfMemory`] when `bytes` exceeds the bucket
    /// size or every bucket is in use. The bucket is not zeroed, it still holds
    /// whatever its previous owner wrote.
    pub fn allocate(&self, bytes: usize) -> AllocResult<NonNull<u8>> {
        let mut ledger = self.ledger.lock();
        if bytes > C {
            return Err(ledger.fail());
        }

        let Some(index) = ledger.used.first_free() else {
            return Err(ledger.fail());
        };
        ledger.take(index, bytes);
        drop(ledger);

        let ptr = self.pool.bucket_ptr(index);
        debug_assert!(crate::is_aligned(ptr.as_ptr() as usize, BUCKET_ALIGN));
        Ok(ptr)
    }

    /// Returns the bucket whose base is `ptr` to the pool.
    ///
    /// Pointers that are not a bucket base, and buckets that are already free,
    /// are ignored. Returns whether a bucket went from used to free.
    pub fn free(&self, ptr: *mut u8) -> bool {
        let index = self.pool.index_of(ptr);
        let mut ledger = self.ledger.lock();
        match index {
            Some(index) if ledger.give_back(index) => true,
            _ => {
                ledger.ignore();
                false
            }
        }
    }

    /// Re-sizes the live allocation at `ptr` in place.
    ///
    /// The bucket already holds `C` bytes, so this only succeeds when
    /// `new_size <= C` and `ptr` is the base of a bucket in use.
    #[allow(unused_variables, unused_mut)]
    pub fn resize(&self, ptr: *mut u8, new_size: usize) -> bool {
        if new_size > C {
            return false;
        }
        let Some(index) = self.pool.index_of(ptr) else {
            return false;
        };

        let mut ledger = self.ledger.lock();
        if !ledger.used.is_used(index) {
            return false;
        }
        #[cfg(feature = "tracking")]
        {
            let old = core::mem::replace(&mut ledger.requested[index], new_size);
            ledger.stats.live_requested_bytes = ledger.stats.live_requested_bytes - old + new_size;
        }
        true
    }

    /// Index of the bucket whose base address is exactly `ptr`.
    pub fn index_of(&self, ptr: *const u8) -> Option<usize> {
        self.pool.index_of(ptr)
    }

    /// Whether `ptr` is exactly the base of one of the buckets.
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.index_of(ptr).is_some()
    }

    /// Base address of the whole pool, which is also the base of bucket 0.
    pub fn base(&self) -> usize {
        self.pool.base()
    }

    /// Base address of bucket `index`, `None` when out of range.
    pub fn bucket_addr(&self, index: usize) -> Option<usize> {
        self.pool.bucket_addr(index)
    }

    /// Whether bucket `index` is loaned out. Out-of-range indices read as free.
    pub fn is_used(&self, index: usize) -> bool {
        self.ledger.lock().used.is_used(index)
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
        super::Bucket::<C>::STRIDE
    }

    /// Number of buckets loaned out.
    pub fn used_buckets(&self) -> usize {
        self.ledger.lock().used.used_count()
    }

    /// Number of buckets available.
    pub fn free_buckets(&self) -> usize {
        self.ledger.lock().used.free_count()
    }

    /// Snapshot of the occupancy flags, one per bucket.
    pub fn occupancy(&self) -> [bool; N] {
        self.ledger.lock().used.as_array()
    }

    /// Get heap usage statistics
    #[cfg(feature = "tracking")]
    pub fn stats(&self) -> UsageStats {
        let ledger = self.ledger.lock();
        UsageStats {
            total_buckets: N,
            used_buckets: ledger.used.used_count(),
            ..ledger.stats
        }
    }
}

impl<const C: usize, const N: usize> Default for BucketHeap<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize, const N: usize> ByteAllocator for BucketHeap<C, N> {
    fn alloc(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        if layout.align() > BUCKET_ALIGN {
            return Err(self.ledger.lock().fail());
        }
        self.allocate(layout.size())
    }

    fn dealloc(&self, pos: NonNull<u8>, _layout: Layout) {
        self.free(pos.as_ptr());
    }

    fn total_bytes(&self) -> usize {
        N * C
    }

    fn used_bytes(&self) -> usize {
        self.used_buckets() * C
    }

    fn available_bytes(&self) -> usize {
        self.free_buckets() * C
    }
}
