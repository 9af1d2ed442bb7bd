//! Heap accounting allocator.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Global allocator wrapper that counts live heap bytes.
///
/// Delegates to the system allocator. Install it with `#[global_allocator]`
/// and hand the static to
/// [`ProcessMemory::with_tracking_allocator`](super::ProcessMemory::with_tracking_allocator).
pub struct TrackingAllocator {
    allocated: AtomicUsize,
}

impl TrackingAllocator {
    /// Create an allocator with a zero counter.
    pub const fn new() -> Self {
        Self {
            allocated: AtomicUsize::new(0),
        }
    }

    /// Bytes currently allocated through this allocator.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed) as u64
    }
}

impl Default for TrackingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: every call is forwarded unchanged to `System`; only the counter is added.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            self.allocated.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            self.allocated.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        self.allocated.fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size >= old_size {
                self.allocated
                    .fetch_add(new_size - old_size, Ordering::Relaxed);
            } else {
                self.allocated
                    .fetch_sub(old_size - new_size, Ordering::Relaxed);
            }
        }
        new_ptr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_live_bytes() {
        let allocator = TrackingAllocator::new();
        let layout = Layout::from_size_align(256, 8).unwrap();

        unsafe {
            let ptr = allocator.alloc(layout);
            assert!(!ptr.is_null());
            assert_eq!(allocator.allocated_bytes(), 256);

            let zeroed = allocator.alloc_zeroed(layout);
            assert!(!zeroed.is_null());
            assert_eq!(allocator.allocated_bytes(), 512);

            allocator.dealloc(zeroed, layout);
            assert_eq!(allocator.allocated_bytes(), 256);

            let grown = allocator.realloc(ptr, layout, 1024);
            assert!(!grown.is_null());
            assert_eq!(allocator.allocated_bytes(), 1024);

            let grown_layout = Layout::from_size_align(1024, 8).unwrap();
            let shrunk = allocator.realloc(grown, grown_layout, 128);
            assert!(!shrunk.is_null());
            assert_eq!(allocator.allocated_bytes(), 128);

            allocator.dealloc(shrunk, Layout::from_size_align(128, 8).unwrap());
        }

        assert_eq!(allocator.allocated_bytes(), 0);
    }
}
