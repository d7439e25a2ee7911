//! Integration tests for the bucket allocator crate
//!
//! Walks the heap through the reference scenarios with ten buckets of
//! 4096 bytes, both directly and through the global hooks.

#![no_std]

extern crate alloc;
extern crate bucket_slab_allocator;

use alloc::boxed::Box;
use alloc::vec::Vec;
use bucket_slab_allocator::{
    AllocError, BucketHeap, ByteAllocator, GlobalBucketAllocator, DEFAULT_BUCKET_COUNT,
    DEFAULT_BUCKET_SIZE,
};
use core::alloc::{GlobalAlloc, Layout};

/// Build a heap with the reference configuration
fn new_heap() -> Box<BucketHeap> {
    Box::new(BucketHeap::new())
}

#[test]
fn test_reference_configuration() {
    let heap = new_heap();
    assert_eq!(heap.bucket_size(), 4096);
    assert_eq!(heap.bucket_count(), 10);
    assert_eq!(heap.bucket_size(), DEFAULT_BUCKET_SIZE);
    assert_eq!(heap.bucket_count(), DEFAULT_BUCKET_COUNT);
    assert_eq!(heap.stride(), DEFAULT_BUCKET_SIZE);
    assert_eq!(heap.total_bytes(), 10 * 4096);
}

#[test]
fn test_two_small_objects_then_free() {
    let heap = new_heap();

    // Scenario 1: two 4-byte objects land in buckets 0 and 1
    let breakfast = heap.allocate(4).unwrap();
    let dinner = heap.allocate(4).unwrap();
    assert_eq!(
        dinner.as_ptr() as usize - breakfast.as_ptr() as usize,
        heap.stride()
    );
    let used: Vec<usize> = heap
        .occupancy()
        .iter()
        .enumerate()
        .filter_map(|(index, &used)| used.then_some(index))
        .collect();
    assert_eq!(used, [0, 1]);

    // Scenario 2: freeing both returns the table to all-free
    heap.free(breakfast.as_ptr());
    heap.free(dinner.as_ptr());
    assert!(heap.occupancy().iter().all(|&used| !used));
}

#[test]
fn test_exhaust_with_single_bytes() {
    let heap = new_heap();

    // Scenario 3: ten single-byte objects fill buckets 0-9 in order
    let mut ptrs = Vec::new();
    for index in 0..10 {
        let ptr = heap.allocate(1).unwrap();
        assert_eq!(Some(ptr.as_ptr() as usize), heap.bucket_addr(index));
        ptrs.push(ptr);
    }
    assert!(heap.occupancy().iter().all(|&used| used));
    for pair in ptrs.windows(2) {
        assert_eq!(
            pair[1].as_ptr() as usize - pair[0].as_ptr() as usize,
            heap.stride()
        );
    }

    // Scenario 4: the eleventh fails
    assert_eq!(heap.allocate(1), Err(AllocError::OutOfMemory));

    // Freeing any bucket makes room again, at that bucket
    heap.free(ptrs[6].as_ptr());
    assert_eq!(heap.allocate(1), Ok(ptrs[6]));
}

#[test]
fn test_oversized_request_always_fails() {
    let heap = new_heap();

    // Scenario 5: 5000 bytes fail on an empty heap
    assert_eq!(heap.allocate(5000), Err(AllocError::OutOfMemory));
    assert_eq!(heap.used_buckets(), 0);

    // And on a partially used one
    let ptr = heap.allocate(1).unwrap();
    assert_eq!(heap.allocate(5000), Err(AllocError::OutOfMemory));
    assert_eq!(heap.used_buckets(), 1);
    heap.free(ptr.as_ptr());
}

#[test]
fn test_invalid_release_does_not_corrupt_table() {
    let heap = new_heap();
    let ptrs: Vec<_> = (0..3).map(|_| heap.allocate(16).unwrap()).collect();
    let snapshot = heap.occupancy();

    let (base, stride) = (heap.base(), heap.stride());
    let mut outside = Box::new(0u64);
    heap.free(&mut *outside as *mut u64 as *mut u8);
    heap.free((base + stride * 10) as *mut u8);
    heap.free((base + 8) as *mut u8);
    assert_eq!(heap.occupancy(), snapshot);

    heap.free(ptrs[0].as_ptr());
    heap.free(ptrs[0].as_ptr());
    assert_eq!(heap.used_buckets(), 2);
    assert!(!heap.is_used(0));
    assert!(heap.is_used(1));
    assert!(heap.is_used(2));
}

#[test]
fn test_layout_interface() {
    let heap = new_heap();

    let layout = Layout::new::<[u64; 4]>();
    let ptr = heap.alloc(layout).unwrap();
    assert_eq!(ptr.as_ptr() as usize, heap.base());
    assert_eq!(heap.used_bytes(), 4096);
    assert_eq!(heap.available_bytes(), 9 * 4096);

    let big = Layout::from_size_align(4097, 8).unwrap();
    assert_eq!(heap.alloc(big), Err(AllocError::OutOfMemory));

    let page_aligned = Layout::from_size_align(8, 4096).unwrap();
    assert_eq!(heap.alloc(page_aligned), Err(AllocError::OutOfMemory));

    heap.dealloc(ptr, layout);
    assert_eq!(heap.used_bytes(), 0);
}

#[test]
fn test_global_hooks() {
    static HEAP: GlobalBucketAllocator = GlobalBucketAllocator::new();

    let breakfast = HEAP.alloc(4).unwrap();
    let dinner = HEAP.alloc(4).unwrap();
    unsafe {
        breakfast.cast::<u32>().as_ptr().write(0xC0FFEE);
        dinner.cast::<u32>().as_ptr().write(0xDEADBEEF);
        assert_eq!(breakfast.cast::<u32>().as_ptr().read(), 0xC0FFEE);
        assert_eq!(dinner.cast::<u32>().as_ptr().read(), 0xDEADBEEF);
    }
    assert_eq!(breakfast.as_ptr() as usize, HEAP.base());
    assert_eq!(
        dinner.as_ptr() as usize - breakfast.as_ptr() as usize,
        HEAP.stride()
    );

    HEAP.release(breakfast.as_ptr());
    HEAP.release(dinner.as_ptr());
    assert_eq!(HEAP.used_buckets(), 0);

    let mut count = 0;
    while HEAP.alloc(1).is_ok() {
        count += 1;
    }
    assert_eq!(count, HEAP.bucket_count());
    assert_eq!(HEAP.free_buckets(), 0);
}

#[test]
fn test_hook_pointers_stay_valid_across_calls() {
    static HEAP: GlobalBucketAllocator<64, 4> = GlobalBucketAllocator::new();

    let a = HEAP.alloc(8).unwrap().cast::<u64>();
    let c = HEAP.alloc(8).unwrap();
    unsafe { a.as_ptr().write(1) };

    // Allocation B and the release of C must not disturb A
    let b = HEAP.alloc(8).unwrap().cast::<u64>();
    HEAP.release(c.as_ptr());
    unsafe {
        b.as_ptr().write(3);
        a.as_ptr().write(2);
        assert_eq!(a.as_ptr().read(), 2);
        assert_eq!(b.as_ptr().read(), 3);
    }
    assert_eq!(HEAP.used_buckets(), 2);
}

#[test]
fn test_global_alloc_boxes_values() {
    static HEAP: GlobalBucketAllocator<256, 4> = GlobalBucketAllocator::new();

    let layout = Layout::new::<[u32; 8]>();
    unsafe {
        let ptr = GlobalAlloc::alloc(&HEAP, layout) as *mut [u32; 8];
        assert!(!ptr.is_null());
        ptr.write([7; 8]);
        assert_eq!((*ptr)[7], 7);

        let zeroed = HEAP.alloc_zeroed(layout) as *mut [u32; 8];
        assert_eq!(*zeroed, [0; 8]);

        HEAP.dealloc(ptr as *mut u8, layout);
        HEAP.dealloc(zeroed as *mut u8, layout);
    }
    assert_eq!(HEAP.used_buckets(), 0);
}

#[cfg(feature = "tracking")]
#[test]
fn test_global_usage_stats() {
    static HEAP: GlobalBucketAllocator<128, 3> = GlobalBucketAllocator::new();

    let a = HEAP.alloc(100).unwrap();
    let _ = HEAP.alloc(200);
    HEAP.release(a.as_ptr());
    HEAP.release(a.as_ptr());
    HEAP.report();

    let stats = HEAP.stats();
    assert_eq!(stats.total_buckets, 3);
    assert_eq!(stats.used_buckets, 0);
    assert_eq!(stats.allocations, 1);
    assert_eq!(stats.failed_allocations, 1);
    assert_eq!(stats.releases, 1);
    assert_eq!(stats.ignored_releases, 1);
}
