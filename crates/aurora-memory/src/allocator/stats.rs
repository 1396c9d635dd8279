//! Allocation counters shared by the tracking decorator.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::utils::atomic_max;

/// Point-in-time snapshot of an allocator's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Bytes currently allocated.
    pub allocated_bytes: usize,
    /// Highest value `allocated_bytes` has reached.
    pub peak_allocated_bytes: usize,
    /// Successful allocations.
    pub allocation_count: usize,
    /// Deallocations.
    pub deallocation_count: usize,
    /// Failed allocation attempts.
    pub failed_allocations: usize,
}

impl AllocatorStats {
    /// Whether more allocations than deallocations are outstanding.
    #[must_use]
    pub fn has_active_allocations(&self) -> bool {
        self.allocation_count > self.deallocation_count
    }
}

/// Thread-safe counter set behind the snapshot.
#[derive(Debug, Default)]
pub struct AtomicAllocatorStats {
    allocated_bytes: AtomicUsize,
    peak_allocated_bytes: AtomicUsize,
    allocation_count: AtomicUsize,
    deallocation_count: AtomicUsize,
    failed_allocations: AtomicUsize,
}

impl AtomicAllocatorStats {
    pub const fn new() -> Self {
        Self {
            allocated_bytes: AtomicUsize::new(0),
            peak_allocated_bytes: AtomicUsize::new(0),
            allocation_count: AtomicUsize::new(0),
            deallocation_count: AtomicUsize::new(0),
            failed_allocations: AtomicUsize::new(0),
        }
    }

    /// Records a successful allocation of `size` usable bytes.
    pub fn record_allocation(&self, size: usize) {
        self.allocation_count.fetch_add(1, Ordering::Relaxed);
        let live = self.allocated_bytes.fetch_add(size, Ordering::AcqRel) + size;
        atomic_max(&self.peak_allocated_bytes, live);
    }

    /// Records a deallocation of `size` usable bytes.
    pub fn record_deallocation(&self, size: usize) {
        self.deallocation_count.fetch_add(1, Ordering::Relaxed);
        self.allocated_bytes.fetch_sub(size, Ordering::AcqRel);
    }

    /// Records a failed allocation attempt.
    pub fn record_failure(&self) {
        self.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Bytes currently allocated.
    pub fn current_allocated(&self) -> usize {
        self.allocated_bytes.load(Ordering::Acquire)
    }

    /// Peak of `current_allocated` since construction or the last reset.
    pub fn peak_allocated(&self) -> usize {
        self.peak_allocated_bytes.load(Ordering::Relaxed)
    }

    /// Consistent snapshot of all counters.
    pub fn snapshot(&self) -> AllocatorStats {
        AllocatorStats {
            allocated_bytes: self.allocated_bytes.load(Ordering::Acquire),
            peak_allocated_bytes: self.peak_allocated_bytes.load(Ordering::Relaxed),
            allocation_count: self.allocation_count.load(Ordering::Relaxed),
            deallocation_count: self.deallocation_count.load(Ordering::Relaxed),
            failed_allocations: self.failed_allocations.load(Ordering::Relaxed),
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.allocated_bytes.store(0, Ordering::Release);
        self.peak_allocated_bytes.store(0, Ordering::Relaxed);
        self.allocation_count.store(0, Ordering::Relaxed);
        self.deallocation_count.store(0, Ordering::Relaxed);
        self.failed_allocations.store(0, Ordering::Relaxed);
    }
}
