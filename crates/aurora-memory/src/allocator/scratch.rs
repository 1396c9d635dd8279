//! Monotonic scratch allocator over a single owned region.

use core::alloc::Layout;
use core::cell::UnsafeCell;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{AllocError, AllocResult, Allocator, MemoryUsage, ThreadSafeAllocator};
use crate::utils::align_up;

/// Interior-mutable region wrapper. Synchronization happens through the
/// atomic cursor: once an offset range is claimed, exactly one caller may
/// touch it.
#[repr(transparent)]
struct RegionCell<T: ?Sized>(UnsafeCell<T>);

unsafe impl<T: ?Sized> Sync for RegionCell<T> {}
unsafe impl<T: ?Sized + Send> Send for RegionCell<T> {}

impl<T: ?Sized> RegionCell<T> {
    fn get(&self) -> *mut T {
        self.0.get()
    }
}

/// Bump allocator over one contiguous heap region.
///
/// Allocation advances a monotonic cursor; individual regions are never
/// reclaimed. [`Allocator::deallocate`] is a no-op, and the whole region is
/// released when the allocator is dropped. The region's total size stays
/// observable through [`MemoryUsage::total_memory`].
pub struct ScratchAllocator {
    memory: Box<RegionCell<[u8]>>,
    capacity: usize,
    /// Byte offset of the next free position, `0..=capacity`. Monotonically
    /// non-decreasing for the lifetime of the allocator.
    cursor: AtomicUsize,
}

impl ScratchAllocator {
    /// Creates a scratch allocator over a fresh heap region of `capacity`
    /// bytes.
    ///
    /// # Errors
    /// Zero capacity is rejected as an invalid layout.
    pub fn new(capacity: usize) -> AllocResult<Self> {
        if capacity == 0 {
            return Err(AllocError::invalid_layout());
        }

        let boxed = vec![0u8; capacity].into_boxed_slice();
        let len = boxed.len();
        let ptr = Box::into_raw(boxed) as *mut u8;
        // RegionCell is repr(transparent) over its contents, so the box can
        // be reinterpreted without changing layout.
        let memory: Box<RegionCell<[u8]>> = unsafe {
            Box::from_raw(core::ptr::slice_from_raw_parts_mut(ptr, len) as *mut RegionCell<[u8]>)
        };

        Ok(Self {
            memory,
            capacity,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Total size of the region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, including alignment padding.
    #[inline]
    pub fn used(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Bytes remaining before the region is exhausted.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.used()
    }

    #[inline]
    fn base_addr(&self) -> usize {
        unsafe { (*self.memory.get()).as_ptr() as usize }
    }

    fn try_bump(&self, layout: Layout) -> Option<NonNull<u8>> {
        let base = self.base_addr();
        loop {
            let current = self.cursor.load(Ordering::Acquire);
            let aligned = align_up(base.checked_add(current)?, layout.align()) - base;
            let next = aligned.checked_add(layout.size())?;
            if next > self.capacity {
                // A failed request must leave the cursor where it was.
                return None;
            }

            if self
                .cursor
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let ptr = unsafe { (*self.memory.get()).as_mut_ptr().add(aligned) };
                return Some(unsafe { NonNull::new_unchecked(ptr) });
            }
        }
    }
}

unsafe impl Allocator for ScratchAllocator {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            let dangling = unsafe { NonNull::new_unchecked(layout.align() as *mut u8) };
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }

        match self.try_bump(layout) {
            Some(ptr) => Ok(NonNull::slice_from_raw_parts(ptr, layout.size())),
            None => {
                #[cfg(feature = "logging")]
                tracing::debug!(
                    requested = layout.size(),
                    used = self.used(),
                    capacity = self.capacity,
                    "scratch region exhausted"
                );
                Err(AllocError::out_of_memory(layout))
            }
        }
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        // Individual regions are not reclaimed; the allocator frees the
        // whole region on drop.
    }
}

unsafe impl ThreadSafeAllocator for ScratchAllocator {}

impl MemoryUsage for ScratchAllocator {
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

impl core::fmt::Debug for ScratchAllocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScratchAllocator")
            .field("capacity", &self.capacity)
            .field("used", &self.used())
            .finish()
    }
}
