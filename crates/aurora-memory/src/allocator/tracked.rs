//! Usage-tracking allocator decorator.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::{
    AllocResult, Allocator, AllocatorStats, AtomicAllocatorStats, MemoryUsage,
    ThreadSafeAllocator,
};

/// Transparent wrapper recording live bytes and peak use of another
/// allocator.
///
/// Counters charge the usable size granted on allocation and release the same
/// amount on deallocation, so once every outstanding allocation has been
/// freed through the tracker, [`TrackedAllocator::used_memory`] reads zero.
#[derive(Debug, Default)]
pub struct TrackedAllocator<A> {
    inner: A,
    stats: AtomicAllocatorStats,
}

impl<A> TrackedAllocator<A> {
    /// Wraps `inner` with usage tracking.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            stats: AtomicAllocatorStats::new(),
        }
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Mutable access to the wrapped allocator.
    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.inner
    }

    /// Consumes the tracker and returns the wrapped allocator.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Bytes currently allocated through this tracker.
    pub fn used_memory(&self) -> usize {
        self.stats.current_allocated()
    }

    /// Highest live-byte count observed so far.
    pub fn peak_allocated_bytes(&self) -> usize {
        self.stats.peak_allocated()
    }

    /// Number of successful allocations.
    pub fn allocation_count(&self) -> usize {
        self.stats.snapshot().allocation_count
    }

    /// Number of deallocations.
    pub fn deallocation_count(&self) -> usize {
        self.stats.snapshot().deallocation_count
    }

    /// Number of failed allocation attempts.
    pub fn failed_allocations(&self) -> usize {
        self.stats.snapshot().failed_allocations
    }

    /// Snapshot of every counter.
    pub fn statistics(&self) -> AllocatorStats {
        self.stats.snapshot()
    }

    /// Resets the counters while leaving live allocations untouched.
    pub fn reset_statistics(&self) {
        self.stats.reset();
    }
}

unsafe impl<A: Allocator> Allocator for TrackedAllocator<A> {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        match unsafe { self.inner.allocate(layout) } {
            Ok(ptr) => {
                self.stats.record_allocation(ptr.len());
                Ok(ptr)
            }
            Err(err) => {
                self.stats.record_failure();
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) };
        self.stats.record_deallocation(layout.size());
    }
}

/// Usage reporting stays transparent: the live-byte count is the tracker's
/// own counter, while the capacity channel forwards to the inner allocator.
impl<A: MemoryUsage> MemoryUsage for TrackedAllocator<A> {
    fn used_memory(&self) -> usize {
        self.stats.current_allocated()
    }

    fn available_memory(&self) -> Option<usize> {
        self.inner.available_memory()
    }

    fn total_memory(&self) -> Option<usize> {
        self.inner.total_memory()
    }
}

unsafe impl<A: ThreadSafeAllocator> ThreadSafeAllocator for TrackedAllocator<A> {}

/// Convenience for wrapping any allocator with tracking.
pub trait TrackExt: Sized {
    /// Wraps this allocator with usage tracking.
    fn with_tracking(self) -> TrackedAllocator<Self>;
}

impl<A> TrackExt for A {
    fn with_tracking(self) -> TrackedAllocator<Self> {
        TrackedAllocator::new(self)
    }
}
