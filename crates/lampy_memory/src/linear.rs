//! Monotonic bump allocator over a fixed byte buffer.
//!
//! `deallocate` is always a no-op; only a whole-buffer [`reset`](Allocator::reset)
//! reclaims space. Single-threaded per arena — callers sharing one across
//! threads must serialize externally or get one arena per thread from
//! [`crate::MemorySystem`].

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::allocator::{align_up, is_power_of_two, Allocator, MAX_SCALAR_ALIGN};
use crate::tag::MemoryTag;
use crate::{AllocError, Result};

pub struct LinearAllocator {
    base: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    head: usize,
    tag: MemoryTag,
}

// SAFETY: the buffer is exclusively owned and never aliased outside `&mut self` access.
unsafe impl Send for LinearAllocator {}

impl LinearAllocator {
    pub fn new(capacity: usize, tag: MemoryTag) -> Result<Self> {
        if capacity == 0 {
            return Err(AllocError::ZeroCapacity);
        }
        let layout = Layout::from_size_align(capacity, MAX_SCALAR_ALIGN)
            .expect("capacity + max scalar align must form a valid layout");
        // SAFETY: layout.size() is non-zero, checked above.
        let ptr = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(ptr).expect("global allocator exhausted");
        Ok(Self {
            base,
            layout,
            capacity,
            head: 0,
            tag,
        })
    }

    /// Current bump-pointer offset from the arena base, usable as a restore
    /// point by callers that want partial rollback without a full reset
    /// (the allocator itself only supports whole-buffer reset per contract).
    #[must_use]
    pub fn offset(&self) -> usize {
        self.head
    }
}

impl Allocator for LinearAllocator {
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        if !is_power_of_two(alignment) {
            log::error!("LinearAllocator::allocate: alignment {alignment} is not a power of two");
            return None;
        }

        // SAFETY: base + head never exceeds capacity (checked below before advancing).
        let current = unsafe { self.base.as_ptr().add(self.head) } as usize;
        let aligned = align_up(current, alignment);
        let padding = aligned - current;
        let end = self.head + padding + size;
        if end > self.capacity {
            return None;
        }

        // SAFETY: `aligned` is within [base, base + capacity).
        let ptr = unsafe { self.base.as_ptr().add(self.head + padding) };
        self.head = end;
        NonNull::new(ptr)
    }

    fn deallocate(&mut self, _ptr: NonNull<u8>) {
        // Contract: individual deallocation is a no-op for linear allocators.
    }

    fn used(&self) -> usize {
        self.head
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn tag(&self) -> MemoryTag {
        self.tag
    }

    fn owns(&self, ptr: NonNull<u8>) -> bool {
        let start = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr < start + self.capacity
    }

    fn reset(&mut self) {
        self.head = 0;
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

impl Drop for LinearAllocator {
    fn drop(&mut self) {
        // SAFETY: `base`/`layout` match the values used in `alloc::alloc`.
        unsafe {
            alloc::dealloc(self.base.as_ptr(), self.layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_allocates_sequentially_and_respects_alignment() {
        let mut arena = LinearAllocator::new(1024, MemoryTag::Temp).unwrap();
        let a = arena.allocate(10, 4).unwrap();
        let b = arena.allocate(10, 16).unwrap();
        assert_eq!(b.as_ptr() as usize % 16, 0);
        assert!(arena.owns(a));
        assert!(arena.owns(b));
        assert_ne!(a, b);
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut arena = LinearAllocator::new(16, MemoryTag::Temp).unwrap();
        assert!(arena.allocate(8, 1).is_some());
        assert!(arena.allocate(16, 1).is_none());
    }

    #[test]
    fn deallocate_is_noop_only_reset_reclaims() {
        let mut arena = LinearAllocator::new(16, MemoryTag::Temp).unwrap();
        let p = arena.allocate(16, 1).unwrap();
        arena.deallocate(p);
        assert_eq!(arena.used(), 16);
        arena.reset();
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn zero_byte_allocation_returns_none() {
        let mut arena = LinearAllocator::new(16, MemoryTag::Temp).unwrap();
        assert!(arena.allocate(0, 1).is_none());
    }

    #[test]
    fn zero_capacity_is_a_contract_error() {
        assert!(matches!(
            LinearAllocator::new(0, MemoryTag::Temp),
            Err(AllocError::ZeroCapacity)
        ));
    }
}
