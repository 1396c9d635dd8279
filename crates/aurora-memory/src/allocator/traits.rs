//! Core allocator traits.
//!
//! The contract is three operations: allocate, free, and size reporting.
//! `allocate` hands back the usable size with the allocation itself (the
//! length of the returned slice pointer), and fixed-region allocators expose
//! their total capacity through [`MemoryUsage`].

use core::alloc::Layout;
use core::ptr::NonNull;

use super::{AllocError, AllocErrorKind, AllocResult};

/// Polymorphic memory allocation contract.
///
/// The trait is object safe: the per-thread allocator stack stores erased
/// `dyn Allocator` handles.
///
/// # Safety
///
/// Implementors must ensure that:
/// - returned pointers are valid for reads and writes of the reported usable
///   size and honor the requested alignment,
/// - `deallocate` is only called with pointers produced by the same instance
///   and the layout they were allocated with,
/// - a region is released at most once.
pub unsafe trait Allocator {
    /// Allocates memory for `layout`.
    ///
    /// The length of the returned slice is the usable size of the region,
    /// always at least `layout.size()`. Zero-sized requests yield a dangling,
    /// well-aligned pointer.
    ///
    /// # Safety
    /// The returned memory is uninitialized and must be initialized before
    /// use.
    ///
    /// # Errors
    /// Returns an error when the request cannot be satisfied; no allocation
    /// takes place in that case.
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Releases a region previously returned by this allocator.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator with `layout`
    /// - the region must not be used after this call
    /// - double frees are undefined behavior
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves an allocation to a new layout, preserving the common prefix.
    ///
    /// The default implementation allocates fresh storage, copies
    /// `min(old, new)` bytes, and releases the old region. Implementations
    /// with cheaper paths may override it.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator with `old_layout`
    /// - on success the old pointer becomes invalid
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> AllocResult<NonNull<[u8]>> {
        if new_layout.size() == 0 {
            unsafe { self.deallocate(ptr, old_layout) };
            return Ok(NonNull::slice_from_raw_parts(NonNull::dangling(), 0));
        }

        let new_ptr = unsafe { self.allocate(new_layout)? };
        let copy_size = old_layout.size().min(new_layout.size());
        if copy_size > 0 {
            unsafe {
                core::ptr::copy_nonoverlapping(
                    ptr.as_ptr(),
                    new_ptr.as_ptr() as *mut u8,
                    copy_size,
                );
            }
        }
        unsafe { self.deallocate(ptr, old_layout) };
        Ok(new_ptr)
    }
}

/// Marker for allocators that can be shared between threads.
///
/// # Safety
/// Implementors must synchronize all internal state so that concurrent
/// allocation and deallocation from different threads is sound.
pub unsafe trait ThreadSafeAllocator: Allocator + Send + Sync {}

/// Memory usage reporting.
///
/// Fixed-region allocators report their capacity here; it is the channel
/// through which a region's total size stays observable without holding any
/// particular allocation.
pub trait MemoryUsage {
    /// Bytes currently allocated and not yet released.
    fn used_memory(&self) -> usize;

    /// Bytes still available, or `None` when the allocator has no inherent
    /// limit.
    fn available_memory(&self) -> Option<usize>;

    /// Total capacity, or `None` when unlimited.
    fn total_memory(&self) -> Option<usize> {
        self.available_memory().map(|available| self.used_memory() + available)
    }
}

/// Typed allocation helpers layered over the raw byte contract.
///
/// Blanket-implemented for every allocator; the construction layer in
/// [`crate::context`] builds on these.
pub trait TypedAllocExt: Allocator {
    /// Allocates uninitialized storage for a single `T`.
    ///
    /// # Safety
    /// The returned pointer must be initialized before use and released with
    /// [`TypedAllocExt::dealloc_one`] on the same allocator.
    #[inline]
    unsafe fn alloc_one<T>(&self) -> AllocResult<NonNull<T>> {
        let ptr = unsafe { self.allocate(Layout::new::<T>())? };
        Ok(ptr.cast())
    }

    /// Releases storage obtained from [`TypedAllocExt::alloc_one`].
    ///
    /// # Safety
    /// - `ptr` must come from `alloc_one::<T>` on this allocator
    /// - the value must already have been dropped
    #[inline]
    unsafe fn dealloc_one<T>(&self, ptr: NonNull<T>) {
        unsafe { self.deallocate(ptr.cast(), Layout::new::<T>()) };
    }

    /// Allocates uninitialized storage for `n` contiguous `T`s.
    ///
    /// # Safety
    /// Same contract as [`TypedAllocExt::alloc_one`], with deallocation via
    /// [`TypedAllocExt::dealloc_array`] using the same `n`.
    #[inline]
    unsafe fn alloc_array<T>(&self, n: usize) -> AllocResult<NonNull<T>> {
        if n == 0 {
            return Ok(NonNull::dangling());
        }
        let layout = Layout::array::<T>(n)
            .map_err(|_| AllocError::new(AllocErrorKind::SizeOverflow))?;
        let ptr = unsafe { self.allocate(layout)? };
        Ok(ptr.cast())
    }

    /// Releases storage obtained from [`TypedAllocExt::alloc_array`].
    ///
    /// # Safety
    /// - `ptr` and `n` must match the original allocation
    /// - all elements must already have been dropped
    #[inline]
    unsafe fn dealloc_array<T>(&self, ptr: NonNull<T>, n: usize) {
        if n == 0 {
            return;
        }
        if let Ok(layout) = Layout::array::<T>(n) {
            unsafe { self.deallocate(ptr.cast(), layout) };
        }
    }
}

impl<A: Allocator + ?Sized> TypedAllocExt for A {}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        unsafe { (**self).allocate(layout) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> AllocResult<NonNull<[u8]>> {
        unsafe { (**self).reallocate(ptr, old_layout, new_layout) }
    }
}

impl<A: MemoryUsage + ?Sized> MemoryUsage for &A {
    fn used_memory(&self) -> usize {
        (**self).used_memory()
    }

    fn available_memory(&self) -> Option<usize> {
        (**self).available_memory()
    }

    fn total_memory(&self) -> Option<usize> {
        (**self).total_memory()
    }
}
