//! Bucket storage.
//!
//! A [`Bucket`] is the unit the heap loans out: `C` raw bytes at an address
//! aligned to [`BUCKET_ALIGN`](crate::BUCKET_ALIGN). A [`BucketPool`] is the
//! fixed row of `N` buckets.
//!
//! Bucket bytes belong to whoever holds the bucket, so the pool is only ever
//! reached through shared references and hands out raw pointers derived from
//! [`UnsafeCell::get`]. Nothing in the crate takes `&mut` over bucket bytes.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

/// One fixed-capacity region of the pool.
#[repr(C, align(16))]
pub struct Bucket<const C: usize = { crate::DEFAULT_BUCKET_SIZE }> {
    data: UnsafeCell<[MaybeUninit<u8>; C]>,
}

const _: () = assert!(core::mem::align_of::<Bucket<1>>() == crate::BUCKET_ALIGN);

impl<const C: usize> Bucket<C> {
    /// Bytes a single bucket can hold.
    pub const CAPACITY: usize = C;

    /// Distance in bytes between the bases of two neighbouring buckets.
    pub const STRIDE: usize = core::mem::size_of::<Self>();

    const EMPTY: Self = Self::new();

    /// Creates an uninitialized bucket.
    pub const fn new() -> Self {
        Self {
            data: UnsafeCell::new([MaybeUninit::uninit(); C]),
        }
    }

    /// Base address of the bucket data.
    #[inline]
    pub fn addr(&self) -> usize {
        self.data.get() as usize
    }

    /// Pointer handed out to the owner of this bucket.
    #[inline]
    pub fn as_non_null(&self) -> NonNull<u8> {
        // SAFETY: `UnsafeCell::get` never returns null.
        unsafe { NonNull::new_unchecked(self.data.get().cast()) }
    }
}

impl<const C: usize> Default for Bucket<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// `N` buckets laid out back to back, `Bucket::<C>::STRIDE` bytes apart.
pub struct BucketPool<const C: usize, const N: usize> {
    buckets: [Bucket<C>; N],
}

// SAFETY: the pool never reads or writes bucket bytes itself. It only hands
// out raw pointers, and the occupancy table guarding it gives each bucket a
// single owner at a time.
unsafe impl<const C: usize, const N: usize> Sync for BucketPool<C, N> {}

impl<const C: usize, const N: usize> BucketPool<C, N> {
    /// Creates a pool of `N` uninitialized buckets.
    pub const fn new() -> Self {
        Self {
            buckets: [Bucket::<C>::EMPTY; N],
        }
    }

    /// Base address of the pool, which is also the base of bucket 0.
    pub fn base(&self) -> usize {
        self.buckets.as_ptr() as usize
    }

    /// Base address of bucket `index`, `None` when out of range.
    pub fn bucket_addr(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(Bucket::addr)
    }

    /// Pointer to bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    pub fn bucket_ptr(&self, index: usize) -> NonNull<u8> {
        self.buckets[index].as_non_null()
    }

    /// Index of the bucket whose base address is exactly `ptr`.
    pub fn index_of(&self, ptr: *const u8) -> Option<usize> {
        let addr = ptr as usize;
        self.buckets.iter().position(|bucket| bucket.addr() == addr)
    }
}

impl<const C: usize, const N: usize> Default for BucketPool<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
