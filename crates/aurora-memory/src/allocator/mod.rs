//! Allocator family: one polymorphic contract, several backing strategies.
//!
//! - [`SystemAllocator`] delegates to the platform heap
//! - [`BoundedAllocator`] gates another allocator behind a byte budget
//! - [`ScratchAllocator`] bumps through one owned heap region
//! - [`InlineAllocator`] bumps through a region embedded in the object
//! - [`TrackedAllocator`] records live bytes and peak use of its inner
//!   allocator

mod bounded;
mod error;
mod inline;
mod scratch;
mod stats;
mod system;
mod tracked;
mod traits;

pub use bounded::BoundedAllocator;
pub use error::{AllocError, AllocErrorKind, AllocResult};
pub use inline::InlineAllocator;
pub use scratch::ScratchAllocator;
pub use stats::{AllocatorStats, AtomicAllocatorStats};
pub use system::SystemAllocator;
pub use tracked::{TrackExt, TrackedAllocator};
pub use traits::{Allocator, MemoryUsage, ThreadSafeAllocator, TypedAllocExt};
