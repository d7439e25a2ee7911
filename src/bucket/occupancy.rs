//! Occupancy table implementation.
//!
//! One flag per bucket, index `i` describing bucket `i`. A flag is set while
//! the bucket is loaned out and clear otherwise. Out-of-range indices read as
//! free and are never marked.

/// Per-bucket in-use flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyTable<const N: usize = { crate::DEFAULT_BUCKET_COUNT }> {
    used: [bool; N],
}

impl<const N: usize> OccupancyTable<N> {
    /// Creates a table with every bucket free.
    pub const fn new() -> Self {
        Self { used: [false; N] }
    }

    /// Number of entries, always `N`.
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the table has no entries at all.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Lowest index whose flag is clear.
    pub fn first_free(&self) -> Option<usize> {
        self.used.iter().position(|&used| !used)
    }

    /// Whether bucket `index` is loaned out.
    pub fn is_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    /// Sets the flag of bucket `index`, returns whether it was clear.
    pub fn mark_used(&mut self, index: usize) -> bool {
        match self.used.get_mut(index) {
            Some(used) => !core::mem::replace(used, true),
            None => false,
        }
    }

    /// Clears the flag of bucket `index`, returns whether it was set.
    pub fn mark_free(&mut self, index: usize) -> bool {
        match self.used.get_mut(index) {
            Some(used) => core::mem::replace(used, false),
            None => false,
        }
    }

    /// Number of buckets loaned out.
    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|&&used| used).count()
    }

    /// Number of buckets available.
    pub fn free_count(&self) -> usize {
        N - self.used_count()
    }

    /// The flags, one per bucket.
    pub fn as_array(&self) -> [bool; N] {
        self.used
    }
}

impl<const N: usize> Default for OccupancyTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
