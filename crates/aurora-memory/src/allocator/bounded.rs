//! Byte-budgeted allocator decorator.

use core::alloc::Layout;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{AllocResult, Allocator, AllocError, MemoryUsage, SystemAllocator, ThreadSafeAllocator};

/// Wraps another allocator and refuses requests beyond a fixed byte budget.
///
/// The budget counts live usable bytes: every successful allocation charges
/// exactly the usable size it granted, and every deallocation releases the
/// same amount. Once all outstanding allocations are freed, a request for the
/// full capacity succeeds again regardless of the allocation history;
/// fragmentation inside the inner allocator is invisible at this layer.
///
/// Exceeding the budget is the only failure mode this decorator introduces;
/// inner-allocator failures pass through unchanged and leave the budget
/// untouched.
#[derive(Debug)]
pub struct BoundedAllocator<A = SystemAllocator> {
    inner: A,
    capacity: usize,
    used: AtomicUsize,
}

impl BoundedAllocator {
    /// Creates a system-backed allocator with a budget of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, SystemAllocator::new())
    }
}

impl<A> BoundedAllocator<A> {
    /// Creates a budgeted wrapper around `inner`.
    pub fn with_inner(capacity: usize, inner: A) -> Self {
        Self {
            inner,
            capacity,
            used: AtomicUsize::new(0),
        }
    }

    /// The byte budget.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live bytes currently charged against the budget.
    #[inline]
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    /// Bytes still available under the budget.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.used()
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner allocator.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Reserves `size` bytes against the budget, failing without side
    /// effects when the budget would be exceeded.
    fn reserve(&self, size: usize) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let next = used.checked_add(size)?;
                (next <= self.capacity).then_some(next)
            })
            .is_ok()
    }

    fn release(&self, size: usize) {
        self.used.fetch_sub(size, Ordering::AcqRel);
    }
}

unsafe impl<A: Allocator> Allocator for BoundedAllocator<A> {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        let size = layout.size();
        if !self.reserve(size) {
            #[cfg(feature = "logging")]
            tracing::debug!(
                requested = size,
                used = self.used(),
                capacity = self.capacity,
                "allocation refused: budget exceeded"
            );
            return Err(AllocError::capacity_exceeded(layout));
        }

        match unsafe { self.inner.allocate(layout) } {
            Ok(ptr) => {
                // The budget charge must match what deallocate will release,
                // so the charge is the layout size even if the inner
                // allocator over-provisioned.
                Ok(NonNull::slice_from_raw_parts(ptr.cast(), size))
            }
            Err(err) => {
                self.release(size);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) };
        self.release(layout.size());
    }
}

impl<A> MemoryUsage for BoundedAllocator<A> {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.available())
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.capacity)
    }
}

unsafe impl<A: ThreadSafeAllocator> ThreadSafeAllocator for BoundedAllocator<A> {}
