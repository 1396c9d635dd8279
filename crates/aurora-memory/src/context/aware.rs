//! Typed construction through the allocator stack.
//!
//! Two construction paths exist:
//!
//! - **Plain values** ([`create`]/[`destroy`]) go through the process default
//!   allocator and carry no allocator field, so their footprint stays
//!   `size_of::<T>()`.
//! - **Allocator-aware values** ([`create_aware`]/[`destroy_aware`]) capture
//!   the current allocator at construction (usually by embedding
//!   [`AllocatorBound`]) and route every allocation they make, including
//!   their own storage, through that captured handle for their entire
//!   lifetime, even if the thread's stack changes afterwards.

use core::ptr::NonNull;

use super::{AllocatorRef, current, default_allocator};
use crate::allocator::{AllocResult, TypedAllocExt};

/// Types that capture the ambient allocator at construction.
///
/// Implementations normally embed an [`AllocatorBound`] and return its
/// handle. The handle returned here must stay fixed for the value's
/// lifetime, unless deliberately rebound.
pub trait AllocatorAware {
    /// The allocator captured when this value was constructed.
    fn allocator(&self) -> AllocatorRef;
}

/// Embeddable field that captures the current allocator when created.
///
/// `Default` captures [`current`](super::current), so `#[derive(Default)]`
/// on the embedding struct is enough to opt in.
#[derive(Clone, Copy, Debug)]
pub struct AllocatorBound {
    alloc: AllocatorRef,
}

impl AllocatorBound {
    /// Captures the calling thread's current allocator.
    pub fn capture() -> Self {
        Self { alloc: current() }
    }

    /// The captured handle.
    #[inline]
    pub fn allocator(&self) -> AllocatorRef {
        self.alloc
    }

    /// Deliberately rebinds the captured handle.
    pub fn rebind(&mut self, alloc: AllocatorRef) {
        self.alloc = alloc;
    }
}

impl Default for AllocatorBound {
    fn default() -> Self {
        Self::capture()
    }
}

/// Allocates storage from the process default allocator and moves `value`
/// into it.
///
/// Plain values are deliberately invisible to whatever allocator sits on the
/// calling thread's stack; a tracker installed for the scope observes none of
/// their traffic.
///
/// # Errors
/// Returns the allocation failure unchanged; `value` is dropped in that case.
pub fn create<T>(value: T) -> AllocResult<NonNull<T>> {
    let alloc = default_allocator();
    let ptr = unsafe { alloc.alloc_one::<T>()? };
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

/// Drops the value in place and releases its storage through the process
/// default allocator.
///
/// # Safety
/// - `ptr` must come from [`create`] and not have been destroyed before
/// - the value must not be used afterwards
pub unsafe fn destroy<T>(ptr: NonNull<T>) {
    let alloc = default_allocator();
    unsafe {
        core::ptr::drop_in_place(ptr.as_ptr());
        alloc.dealloc_one(ptr);
    }
}

/// Allocates storage through the value's captured allocator and moves
/// `value` into it.
///
/// The storage comes from `value.allocator()`, the handle the value captured
/// at its construction site, so storage and internal allocations live and
/// die through the same allocator.
///
/// # Errors
/// Returns the allocation failure unchanged; `value` is dropped in that case
/// (releasing its internal allocations through its captured allocator).
pub fn create_aware<T: AllocatorAware>(value: T) -> AllocResult<NonNull<T>> {
    let alloc = value.allocator();
    let ptr = unsafe { alloc.alloc_one::<T>()? };
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

/// Drops an allocator-aware value in place and releases its storage through
/// the allocator the value captured.
///
/// # Safety
/// - `ptr` must come from [`create_aware`] and not have been destroyed
///   before
/// - the value must not be used afterwards
pub unsafe fn destroy_aware<T: AllocatorAware>(ptr: NonNull<T>) {
    let alloc = unsafe { ptr.as_ref().allocator() };
    unsafe {
        core::ptr::drop_in_place(ptr.as_ptr());
        alloc.dealloc_one(ptr);
    }
}
