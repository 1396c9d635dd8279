//! Owning byte buffer allocated through the allocator stack.

use core::alloc::Layout;
use core::ops::{Index, IndexMut};
use core::ptr::NonNull;
use core::slice;

use crate::allocator::{AllocError, AllocResult, Allocator};
use crate::context::{self, AllocatorAware, AllocatorRef};
use crate::utils::MAX_SCALAR_ALIGN;

fn byte_layout(len: usize) -> AllocResult<Layout> {
    Layout::from_size_align(len, MAX_SCALAR_ALIGN).map_err(|_| AllocError::invalid_layout())
}

/// Owning byte region whose storage comes from the current allocator.
///
/// The allocator at the top of the calling thread's stack is captured at
/// construction and used for the buffer's whole lifetime: storage is freed
/// through it on drop, long after the stack may have changed. Cloning
/// allocates fresh storage from the *cloning* scope's allocator: a copy
/// belongs to the scope that made it, not to the source's.
///
/// An empty buffer holds no storage: `len() == 0` exactly when no pointer is
/// held.
pub struct Buffer {
    data: Option<NonNull<u8>>,
    len: usize,
    alloc: AllocatorRef,
}

impl Buffer {
    /// Creates an empty buffer. No storage is allocated.
    pub fn new() -> Self {
        Self {
            data: None,
            len: 0,
            alloc: context::current(),
        }
    }

    /// Allocates a buffer of `len` bytes through the current allocator.
    ///
    /// On allocation failure the buffer is left in the empty state; callers
    /// verify via [`len`](Buffer::len) or [`is_empty`](Buffer::is_empty).
    /// Use [`try_with_len`](Buffer::try_with_len) to observe the error.
    pub fn with_len(len: usize) -> Self {
        Self::try_with_len(len).unwrap_or_else(|_| Self::new())
    }

    /// Allocates a buffer of `len` bytes through the current allocator,
    /// surfacing the allocation error.
    ///
    /// # Errors
    /// Propagates the allocator's failure; nothing is allocated in that
    /// case.
    pub fn try_with_len(len: usize) -> AllocResult<Self> {
        if len == 0 {
            return Ok(Self::new());
        }

        let alloc = context::current();
        let layout = byte_layout(len)?;
        let ptr = unsafe { alloc.allocate(layout)? };
        Ok(Self {
            data: Some(ptr.cast()),
            len,
            alloc,
        })
    }

    /// Number of bytes owned by the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer owns no storage.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Base pointer, or null for an empty buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data
            .map_or(core::ptr::null(), |ptr| ptr.as_ptr() as *const u8)
    }

    /// Mutable base pointer, or null for an empty buffer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.map_or(core::ptr::null_mut(), NonNull::as_ptr)
    }

    /// The bytes as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self.data {
            Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// The bytes as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.data {
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Sets every byte to `value`.
    pub fn fill(&mut self, value: u8) {
        self.as_mut_slice().fill(value);
    }

    /// Moves the contents out, leaving this buffer empty.
    ///
    /// The returned buffer keeps the original storage and captured
    /// allocator; `self` ends up with `len() == 0` and no pointer.
    pub fn take(&mut self) -> Buffer {
        core::mem::take(self)
    }

    fn release(&mut self) {
        if let Some(ptr) = self.data.take() {
            if let Ok(layout) = byte_layout(self.len) {
                unsafe { self.alloc.deallocate(ptr, layout) };
            }
            self.len = 0;
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        let mut copy = Buffer::with_len(self.len);
        if copy.len == self.len {
            copy.as_mut_slice().copy_from_slice(self.as_slice());
        }
        copy
    }
}

impl AllocatorAware for Buffer {
    fn allocator(&self) -> AllocatorRef {
        self.alloc
    }
}

impl Index<usize> for Buffer {
    type Output = u8;

    #[inline]
    fn index(&self, index: usize) -> &u8 {
        &self.as_slice()[index]
    }
}

impl IndexMut<usize> for Buffer {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.as_mut_slice()[index]
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer").field("len", &self.len).finish()
    }
}
