//! End-to-end scenarios across the allocator stack, the typed construction
//! layer, and the value types.

use core::alloc::Layout;
use core::ptr::NonNull;

use aurora_memory::utils::{MAX_SCALAR_ALIGN, is_aligned_ptr};
use aurora_memory::{
    Allocator, AllocatorAware, AllocatorBound, AllocatorRef, BoundedAllocator, Buffer,
    InlineAllocator, MemoryUsage, ScopedAllocator, ScratchAllocator, SystemAllocator, TrackExt,
    create, create_aware, current, default_allocator, destroy, destroy_aware,
};

fn byte_layout(size: usize) -> Layout {
    Layout::from_size_align(size, MAX_SCALAR_ALIGN).unwrap()
}

#[test]
fn bounded_capacity_is_honest() {
    let bounded = BoundedAllocator::new(1000);

    // The full budget is usable, repeatedly.
    for _ in 0..2 {
        unsafe {
            let ptr = bounded.allocate(byte_layout(1000)).unwrap();
            assert!(ptr.len() >= 1000);
            bounded.deallocate(ptr.cast(), byte_layout(1000));
        }
    }

    // Partial allocations compose up to the budget.
    unsafe {
        let a = bounded.allocate(byte_layout(900)).unwrap();
        let b = bounded.allocate(byte_layout(100)).unwrap();
        bounded.deallocate(a.cast(), byte_layout(900));
        bounded.deallocate(b.cast(), byte_layout(100));
    }

    // One byte over the budget fails.
    unsafe {
        assert!(bounded.allocate(byte_layout(1001)).is_err());

        let a = bounded.allocate(byte_layout(900)).unwrap();
        assert!(bounded.allocate(byte_layout(101)).is_err());
        bounded.deallocate(a.cast(), byte_layout(900));
    }
}

#[test]
fn stack_is_isolated_between_threads() {
    let bounded = BoundedAllocator::new(1000);
    let scope = ScopedAllocator::new(&bounded);
    let top = scope.allocator().addr();
    assert_eq!(current().addr(), top);

    // A concurrently observing thread sees its own (empty) stack.
    let handle = std::thread::spawn(move || current().addr());
    let observed = handle.join().unwrap();
    assert_ne!(observed, top);
    assert_eq!(observed, default_allocator().addr());

    drop(scope);
    assert_ne!(current().addr(), top);
}

#[test]
fn plain_values_use_the_default_pool() {
    let tracker = SystemAllocator::new().with_tracking();
    let _scope = ScopedAllocator::new(&tracker);

    let value = create(42i32).unwrap();
    assert_eq!(unsafe { *value.as_ptr() }, 42);
    // Plain values do not touch the scoped tracker.
    assert_eq!(tracker.used_memory(), 0);

    unsafe { destroy(value) };
    assert_eq!(tracker.used_memory(), 0);
}

/// Allocator-aware type that acquires a payload through its captured
/// allocator at construction.
struct Blob {
    bound: AllocatorBound,
    payload: NonNull<u8>,
    payload_len: usize,
}

impl Blob {
    fn new(payload_len: usize) -> Self {
        let bound = AllocatorBound::capture();
        let payload = unsafe {
            bound
                .allocator()
                .allocate(byte_layout(payload_len))
                .unwrap()
                .cast()
        };
        Self {
            bound,
            payload,
            payload_len,
        }
    }
}

impl AllocatorAware for Blob {
    fn allocator(&self) -> AllocatorRef {
        self.bound.allocator()
    }
}

impl Drop for Blob {
    fn drop(&mut self) {
        unsafe {
            self.bound
                .allocator()
                .deallocate(self.payload, byte_layout(self.payload_len));
        }
    }
}

#[test]
fn aware_values_route_through_their_captured_allocator() {
    let tracker = SystemAllocator::new().with_tracking();
    let scope = ScopedAllocator::new(&tracker);

    let blob = create_aware(Blob::new(100)).unwrap();
    assert!(tracker.used_memory() >= 100);
    assert!(unsafe { blob.as_ref().allocator() }.ptr_eq(scope.allocator()));

    unsafe { destroy_aware(blob) };
    assert_eq!(tracker.used_memory(), 0);
}

#[test]
fn inline_allocator_stays_aligned_under_pressure() {
    let inline = InlineAllocator::<1000>::new();

    for round in 0..10 {
        let ptr = unsafe { inline.allocate(byte_layout(3)).unwrap() };
        assert!(is_aligned_ptr(ptr.as_ptr() as *mut u8, MAX_SCALAR_ALIGN));

        // An oversized request fails without disturbing the cursor.
        if round == 4 {
            let used = inline.used();
            assert!(unsafe { inline.allocate(byte_layout(1000)) }.is_err());
            assert_eq!(inline.used(), used);
        }
    }
}

#[test]
fn buffer_value_semantics_balance_under_a_tracker() {
    let tracker = SystemAllocator::new().with_tracking();
    {
        let _scope = ScopedAllocator::new(&tracker);

        let mut b1 = Buffer::with_len(100);
        let mut b2 = Buffer::with_len(200);
        b1[0] = 1;
        b1[99] = 2;
        b2[0] = 3;
        b2[199] = 4;

        let mut b3 = b1.clone();
        assert_eq!(b3.len(), 100);
        assert_eq!(b3.as_slice(), b1.as_slice());

        let b4 = b3.take();
        assert_eq!(b3.len(), 0);
        assert!(b3.as_ptr().is_null());
        assert_eq!(b4[0], 1);
        assert_eq!(b4[99], 2);
    }
    assert_eq!(tracker.used_memory(), 0);
}

#[test]
fn scratch_region_reports_its_size_and_exhausts_cleanly() {
    let scratch = ScratchAllocator::new(512).unwrap();
    assert_eq!(scratch.total_memory(), Some(512));

    unsafe {
        let first = scratch.allocate(byte_layout(256)).unwrap();
        assert!(first.len() >= 256);
        assert!(scratch.allocate(byte_layout(512)).is_err());
        // Deallocation is a no-op; the cursor never rewinds.
        scratch.deallocate(first.cast(), byte_layout(256));
        assert!(scratch.used() >= 256);
    }
}

#[test]
fn nested_scopes_unwind_in_lifo_order() {
    let outer = BoundedAllocator::new(4096);
    let inner = SystemAllocator::new().with_tracking();

    let outer_scope = ScopedAllocator::new(&outer);
    let outer_top = outer_scope.allocator();
    {
        let inner_scope = ScopedAllocator::new(&inner);
        assert!(current().ptr_eq(inner_scope.allocator()));

        let buffer = Buffer::with_len(32);
        assert!(buffer.allocator().ptr_eq(inner_scope.allocator()));
        assert_eq!(inner.used_memory(), 32);
    }
    assert!(current().ptr_eq(outer_top));
    assert_eq!(inner.used_memory(), 0);
}

#[test]
fn buffers_work_over_every_backend() {
    let scratch = ScratchAllocator::new(4096).unwrap();
    let inline = InlineAllocator::<4096>::new();
    let bounded = BoundedAllocator::new(4096);

    let backends: [&dyn Allocator; 3] = [&scratch, &inline, &bounded];
    for backend in backends {
        let _scope = ScopedAllocator::new(backend);
        let mut buffer = Buffer::with_len(128);
        assert_eq!(buffer.len(), 128);
        buffer.fill(0xA5);
        assert!(buffer.as_slice().iter().all(|&b| b == 0xA5));
    }
}
