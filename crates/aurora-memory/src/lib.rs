//! # aurora-memory
//!
//! Pluggable memory management: a family of allocators behind one contract,
//! a per-thread allocator stack that lets any scope redirect allocations
//! without touching call sites, and allocator-aware value types built on
//! top.
//!
//! ## Allocators
//!
//! Every backend implements [`Allocator`]: the system heap
//! ([`SystemAllocator`]), a byte-budgeted wrapper ([`BoundedAllocator`]), a
//! monotonic scratch region ([`ScratchAllocator`]), an inline fixed-size
//! region ([`InlineAllocator`]), and a usage-recording decorator
//! ([`TrackedAllocator`]).
//!
//! ## The allocator stack
//!
//! Each thread owns an independent stack of allocator handles. Installing an
//! allocator for a scope redirects everything constructed inside it:
//!
//! ```
//! use aurora_memory::{Buffer, ScopedAllocator, SystemAllocator, TrackExt};
//!
//! let tracker = SystemAllocator::new().with_tracking();
//! {
//!     let _scope = ScopedAllocator::new(&tracker);
//!     let buffer = Buffer::with_len(256);
//!     assert_eq!(tracker.used_memory(), 256);
//!     drop(buffer);
//! }
//! assert_eq!(tracker.used_memory(), 0);
//! ```
//!
//! Objects capture the allocator active at their construction and keep using
//! it for their whole lifetime, even when the stack changes afterwards.

pub mod allocator;
pub mod buffer;
pub mod context;
pub mod outcome;
pub mod utils;

pub use allocator::{
    AllocError, AllocErrorKind, AllocResult, Allocator, AllocatorStats, BoundedAllocator,
    InlineAllocator, MemoryUsage, ScratchAllocator, SystemAllocator, ThreadSafeAllocator,
    TrackExt, TrackedAllocator, TypedAllocExt,
};
pub use buffer::Buffer;
pub use context::{
    AllocatorAware, AllocatorBound, AllocatorRef, ScopedAllocator, create, create_aware, current,
    default_allocator, destroy, destroy_aware, with_allocator,
};
pub use outcome::Outcome;
