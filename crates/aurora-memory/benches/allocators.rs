//! Throughput comparison of the allocator backends.

use core::alloc::Layout;

use criterion::{Criterion, criterion_group, criterion_main};

use aurora_memory::utils::MAX_SCALAR_ALIGN;
use aurora_memory::{
    Allocator, BoundedAllocator, InlineAllocator, ScratchAllocator, SystemAllocator,
};

const ALLOC_SIZE: usize = 64;
const BATCH: usize = 256;

fn layout() -> Layout {
    Layout::from_size_align(ALLOC_SIZE, MAX_SCALAR_ALIGN).unwrap()
}

fn bench_system(c: &mut Criterion) {
    let allocator = SystemAllocator::new();
    c.bench_function("system/alloc_free", |b| {
        b.iter(|| unsafe {
            let ptr = allocator.allocate(layout()).unwrap();
            allocator.deallocate(ptr.cast(), layout());
        });
    });
}

fn bench_bounded(c: &mut Criterion) {
    let allocator = BoundedAllocator::new(BATCH * ALLOC_SIZE);
    c.bench_function("bounded/alloc_free", |b| {
        b.iter(|| unsafe {
            let ptr = allocator.allocate(layout()).unwrap();
            allocator.deallocate(ptr.cast(), layout());
        });
    });
}

fn bench_scratch(c: &mut Criterion) {
    c.bench_function("scratch/alloc_batch", |b| {
        b.iter(|| {
            // Headroom for the initial alignment of the heap region.
            let allocator = ScratchAllocator::new(BATCH * ALLOC_SIZE + MAX_SCALAR_ALIGN).unwrap();
            for _ in 0..BATCH {
                unsafe {
                    let _ = allocator.allocate(layout()).unwrap();
                }
            }
        });
    });
}

fn bench_inline(c: &mut Criterion) {
    c.bench_function("inline/alloc_batch", |b| {
        b.iter(|| {
            let allocator = InlineAllocator::<{ BATCH * ALLOC_SIZE }>::new();
            for _ in 0..BATCH {
                unsafe {
                    let _ = allocator.allocate(layout()).unwrap();
                }
            }
        });
    });
}

criterion_group!(
    benches,
    bench_system,
    bench_bounded,
    bench_scratch,
    bench_inline
);
criterion_main!(benches);
