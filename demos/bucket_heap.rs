use std::ptr;

use bucket_slab_allocator::{AllocError, GlobalBucketAllocator};

// Every `Box`, `Vec` and `String` in this program is served from ten
// 4 KiB buckets, including the ones the standard library makes for itself.
#[global_allocator]
static HEAP: GlobalBucketAllocator = GlobalBucketAllocator::new();

/// Index of the bucket that holds `addr`.
fn bucket_index(addr: usize) -> usize {
    (addr - HEAP.base()) / HEAP.stride()
}

fn main() {
    // The first bucket handed out below is the lowest one still free. The
    // runtime may already hold a few buckets (stdout's buffer, for one).
    println!("Buckets:   {:#x}", HEAP.base());
    println!(
        "In use before main allocates: {} of {}",
        HEAP.used_buckets(),
        HEAP.bucket_count()
    );

    let breakfast = Box::new(0xC0FFEE_u32);
    let dinner = Box::new(0xDEADBEEF_u32);
    let breakfast_addr = ptr::from_ref(&*breakfast) as usize;
    let dinner_addr = ptr::from_ref(&*dinner) as usize;

    println!(
        "Breakfast: {:#x} 0x{:X} (bucket {})",
        breakfast_addr,
        *breakfast,
        bucket_index(breakfast_addr)
    );
    println!(
        "Dinner:    {:#x} 0x{:X} (bucket {})",
        dinner_addr,
        *dinner,
        bucket_index(dinner_addr)
    );
    println!("Distance:  {:#x} bytes", dinner_addr.abs_diff(breakfast_addr));

    drop(breakfast);
    drop(dinner);

    // A failing `Box::new` would abort the process, so the exhaustion loop
    // goes through the hook directly and gets the error back.
    loop {
        match HEAP.alloc(1) {
            Ok(_) => println!("Allocated a byte."),
            Err(AllocError::OutOfMemory) => {
                println!("OutOfMemory caught.");
                break;
            }
        }
    }
}
