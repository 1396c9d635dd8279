//! Allocation error type shared by every allocator in the crate.

use core::alloc::Layout;
use core::fmt;

/// Classification of allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum AllocErrorKind {
    /// The backing store could not satisfy the request.
    #[error("out of memory")]
    OutOfMemory,
    /// A byte budget would have been exceeded.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// Size arithmetic overflowed.
    #[error("size overflow")]
    SizeOverflow,
    /// Alignment is not a power of two.
    #[error("invalid alignment")]
    InvalidAlignment,
    /// Layout parameters are invalid for this allocator.
    #[error("invalid layout")]
    InvalidLayout,
}

/// Error returned by failed allocator operations.
///
/// Carries the failure kind and, when known, the layout that could not be
/// satisfied. Nothing is recovered internally; callers decide whether to
/// retry with a different allocator or surface the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    kind: AllocErrorKind,
    layout: Option<Layout>,
}

impl AllocError {
    /// Creates an error of the given kind without layout information.
    #[inline]
    pub const fn new(kind: AllocErrorKind) -> Self {
        Self { kind, layout: None }
    }

    /// Creates an error of the given kind for a specific layout.
    #[inline]
    pub const fn with_layout(kind: AllocErrorKind, layout: Layout) -> Self {
        Self {
            kind,
            layout: Some(layout),
        }
    }

    /// Out-of-memory failure for `layout`.
    #[inline]
    pub const fn out_of_memory(layout: Layout) -> Self {
        Self::with_layout(AllocErrorKind::OutOfMemory, layout)
    }

    /// Budget failure for `layout`.
    #[inline]
    pub const fn capacity_exceeded(layout: Layout) -> Self {
        Self::with_layout(AllocErrorKind::CapacityExceeded, layout)
    }

    /// Size arithmetic overflow for `layout`.
    #[inline]
    pub const fn size_overflow(layout: Layout) -> Self {
        Self::with_layout(AllocErrorKind::SizeOverflow, layout)
    }

    /// Invalid layout parameters.
    #[inline]
    pub const fn invalid_layout() -> Self {
        Self::new(AllocErrorKind::InvalidLayout)
    }

    /// The failure kind.
    #[inline]
    pub const fn kind(&self) -> AllocErrorKind {
        self.kind
    }

    /// Layout of the failed request, if recorded.
    #[inline]
    pub const fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// Whether this is an out-of-memory failure.
    #[inline]
    pub const fn is_out_of_memory(&self) -> bool {
        matches!(self.kind, AllocErrorKind::OutOfMemory)
    }

    /// Whether this is a budget failure.
    #[inline]
    pub const fn is_capacity_exceeded(&self) -> bool {
        matches!(self.kind, AllocErrorKind::CapacityExceeded)
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layout {
            Some(layout) => write!(
                f,
                "memory allocation failed ({}): {} bytes with alignment {}",
                self.kind,
                layout.size(),
                layout.align()
            ),
            None => write!(f, "memory allocation failed ({})", self.kind),
        }
    }
}

impl std::error::Error for AllocError {}

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;
