//! Per-thread allocator stack.
//!
//! Every thread owns an independent stack of allocator handles. The typed
//! construction layer and allocator-aware containers consult [`current`] to
//! pick up whatever allocator the enclosing scope installed, without any
//! change at the call site. When the stack is empty, a process-wide
//! [`SystemAllocator`] is used.
//!
//! Scopes install an allocator with the RAII [`ScopedAllocator`] guard or the
//! closure-based [`with_allocator`]; both guarantee the matching pop on every
//! exit path.

mod aware;

pub use aware::{AllocatorAware, AllocatorBound, create, create_aware, destroy, destroy_aware};

use core::alloc::Layout;
use core::cell::RefCell;
use core::marker::PhantomData;
use core::ptr::NonNull;

use once_cell::sync::OnceCell;

use crate::allocator::{AllocResult, Allocator, SystemAllocator};

/// Non-owning, copyable handle to an allocator.
///
/// The handle erases the allocator's concrete type so heterogeneous
/// allocators can share one stack. It does not extend the allocator's
/// lifetime: whoever puts a handle into circulation must keep the allocator
/// alive for as long as the handle may be used (the [`ScopedAllocator`] guard
/// enforces this through its borrow).
#[derive(Clone, Copy, Debug)]
pub struct AllocatorRef {
    ptr: NonNull<dyn Allocator>,
}

impl AllocatorRef {
    /// Creates a handle from a reference that lives for the whole program.
    pub fn from_static(alloc: &'static dyn Allocator) -> Self {
        Self {
            ptr: NonNull::from(alloc),
        }
    }

    /// Creates a handle from a borrowed allocator, erasing the lifetime.
    ///
    /// # Safety
    /// The referent must outlive every use of the returned handle, including
    /// any time the handle spends on an allocator stack and inside
    /// allocator-aware objects that captured it.
    pub unsafe fn from_raw(alloc: &(dyn Allocator + '_)) -> Self {
        let raw: *const (dyn Allocator + '_) = alloc;
        // Lifetime erasure only; the layout of the fat pointer is unchanged.
        let raw: *mut dyn Allocator = unsafe { core::mem::transmute(raw) };
        Self {
            ptr: unsafe { NonNull::new_unchecked(raw) },
        }
    }

    /// Whether two handles refer to the same allocator instance.
    #[inline]
    pub fn ptr_eq(self, other: AllocatorRef) -> bool {
        core::ptr::addr_eq(self.ptr.as_ptr(), other.ptr.as_ptr())
    }

    /// Address of the referenced allocator, for identity checks across
    /// thread boundaries where the handle itself cannot travel.
    #[inline]
    pub fn addr(self) -> usize {
        self.ptr.as_ptr().cast::<u8>() as usize
    }
}

unsafe impl Allocator for AllocatorRef {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        unsafe { self.ptr.as_ref().allocate(layout) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.ptr.as_ref().deallocate(ptr, layout) }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> AllocResult<NonNull<[u8]>> {
        unsafe { self.ptr.as_ref().reallocate(ptr, old_layout, new_layout) }
    }
}

thread_local! {
    static STACK: RefCell<Vec<AllocatorRef>> = const { RefCell::new(Vec::new()) };
}

static DEFAULT_ALLOCATOR: OnceCell<SystemAllocator> = OnceCell::new();

/// The process-wide fallback allocator.
pub fn default_allocator() -> AllocatorRef {
    AllocatorRef::from_static(DEFAULT_ALLOCATOR.get_or_init(SystemAllocator::new))
}

/// Top of the calling thread's allocator stack, or the process-wide default
/// when the stack is empty. Never fails.
pub fn current() -> AllocatorRef {
    STACK
        .with(|stack| stack.borrow().last().copied())
        .unwrap_or_else(default_allocator)
}

/// Number of entries on the calling thread's stack.
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

/// Pushes a handle onto the calling thread's stack.
///
/// Prefer [`ScopedAllocator`] or [`with_allocator`], which pair the push with
/// the matching pop on every exit path.
///
/// # Safety
/// The referenced allocator must stay alive until the entry is popped and no
/// allocation obtained through it remains in use.
pub unsafe fn push(alloc: AllocatorRef) {
    STACK.with(|stack| stack.borrow_mut().push(alloc));
    #[cfg(feature = "logging")]
    tracing::trace!(depth = depth(), "allocator pushed");
}

/// Removes and returns the top of the calling thread's stack.
///
/// # Panics
/// Panics when the stack is empty; an unbalanced pop is always a bug in the
/// caller.
pub fn pop() -> AllocatorRef {
    let popped = STACK
        .with(|stack| stack.borrow_mut().pop())
        .expect("allocator stack underflow: pop called on an empty stack");
    #[cfg(feature = "logging")]
    tracing::trace!(depth = depth(), "allocator popped");
    popped
}

/// RAII guard installing an allocator for the enclosing scope.
///
/// Pushes on construction and pops exactly one entry on drop, so pushes and
/// pops stay balanced on every exit path, including panics. Nested guards
/// produce LIFO nesting of the stack. The guard is neither clonable nor
/// sendable; it must be dropped on the thread that created it.
///
/// Leaking the guard (`mem::forget`) leaves the entry on the stack; the
/// allocator must then outlive the thread.
pub struct ScopedAllocator<'a> {
    entry: AllocatorRef,
    _borrow: PhantomData<&'a dyn Allocator>,
    _not_send: PhantomData<*mut ()>,
}

impl<'a> ScopedAllocator<'a> {
    /// Installs `alloc` on the calling thread's stack for this scope.
    pub fn new(alloc: &'a (dyn Allocator + 'a)) -> Self {
        // The guard borrows the allocator for 'a and pops on drop, so the
        // erased handle cannot outlive its referent through the stack.
        let entry = unsafe { AllocatorRef::from_raw(alloc) };
        unsafe { push(entry) };
        Self {
            entry,
            _borrow: PhantomData,
            _not_send: PhantomData,
        }
    }

    /// Handle for the installed allocator.
    pub fn allocator(&self) -> AllocatorRef {
        self.entry
    }
}

impl Drop for ScopedAllocator<'_> {
    fn drop(&mut self) {
        let _popped = pop();
        debug_assert!(
            _popped.ptr_eq(self.entry),
            "scoped allocator popped a foreign stack entry"
        );
    }
}

/// Runs `f` with `alloc` installed as the calling thread's current
/// allocator.
pub fn with_allocator<R>(alloc: &dyn Allocator, f: impl FnOnce() -> R) -> R {
    let _scope = ScopedAllocator::new(alloc);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::BoundedAllocator;

    #[test]
    fn empty_stack_falls_back_to_default() {
        assert_eq!(depth(), 0);
        assert!(current().ptr_eq(default_allocator()));
    }

    #[test]
    fn push_pop_discipline() {
        let bounded = BoundedAllocator::new(1000);
        let handle = unsafe { AllocatorRef::from_raw(&bounded) };

        unsafe { push(handle) };
        assert!(current().ptr_eq(handle));

        let popped = pop();
        assert!(popped.ptr_eq(handle));
        assert!(!current().ptr_eq(handle));
    }

    #[test]
    fn scoped_guard_restores_previous_top() {
        let outer = BoundedAllocator::new(1000);
        let inner = BoundedAllocator::new(500);

        let outer_scope = ScopedAllocator::new(&outer);
        assert!(current().ptr_eq(outer_scope.allocator()));
        {
            let inner_scope = ScopedAllocator::new(&inner);
            assert!(current().ptr_eq(inner_scope.allocator()));
        }
        assert!(current().ptr_eq(outer_scope.allocator()));
    }

    #[test]
    fn guard_pops_on_panic() {
        let bounded = BoundedAllocator::new(64);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = ScopedAllocator::new(&bounded);
            panic!("unwind through the guard");
        }));
        assert!(result.is_err());
        assert_eq!(depth(), 0);
    }

    #[test]
    fn with_allocator_scopes_the_closure() {
        let bounded = BoundedAllocator::new(256);
        let inside = with_allocator(&bounded, || current().addr());
        assert_eq!(inside, (&raw const bounded).cast::<u8>() as usize);
        assert!(!current().ptr_eq(unsafe { AllocatorRef::from_raw(&bounded) }));
    }

    #[test]
    fn stacks_are_thread_isolated() {
        let bounded = BoundedAllocator::new(1000);
        let scope = ScopedAllocator::new(&bounded);
        let top_addr = scope.allocator().addr();
        assert_eq!(current().addr(), top_addr);

        let observed = std::thread::spawn(move || current().addr()).join().unwrap();
        assert_ne!(observed, top_addr);
        assert_eq!(observed, default_allocator().addr());

        drop(scope);
        assert_ne!(current().addr(), top_addr);
    }
}
