//! Fixed-size block allocator over a fixed byte buffer.
//!
//! Free blocks form an intrusive singly-linked free list threaded through
//! the block memory itself — no separate bookkeeping storage. Single
//! threaded per arena, as with [`crate::LinearAllocator`] and
//! [`crate::StackAllocator`].

use std::alloc::{self, Layout};
use std::mem::size_of;
use std::ptr::NonNull;

use crate::allocator::{is_power_of_two, Allocator, MAX_SCALAR_ALIGN};
use crate::tag::MemoryTag;
use crate::{AllocError, Result};

pub struct PoolAllocator {
    base: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    block_size: usize,
    block_count: usize,
    free_head: Option<usize>,
    used_blocks: usize,
    tag: MemoryTag,
}

unsafe impl Send for PoolAllocator {}

impl PoolAllocator {
    pub fn new(block_size: usize, block_count: usize, tag: MemoryTag) -> Result<Self> {
        let min = size_of::<usize>();
        if block_size < min {
            return Err(AllocError::BlockTooSmall {
                block_size,
                min,
            });
        }
        if block_count == 0 {
            return Err(AllocError::ZeroCapacity);
        }
        let capacity = block_size * block_count;
        let layout = Layout::from_size_align(capacity, MAX_SCALAR_ALIGN.max(size_of::<usize>()))
            .expect("capacity + alignment must form a valid layout");
        // SAFETY: layout.size() is non-zero (block_size, block_count both checked above).
        let ptr = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(ptr).expect("global allocator exhausted");

        let mut pool = Self {
            base,
            layout,
            capacity,
            block_size,
            block_count,
            free_head: None,
            used_blocks: 0,
            tag,
        };
        pool.rebuild_free_list();
        Ok(pool)
    }

    fn rebuild_free_list(&mut self) {
        // Thread each free block's first `sizeof(usize)` bytes to the next
        // free block's offset, terminated by `usize::MAX`.
        for i in (0..self.block_count).rev() {
            let next = if i + 1 == self.block_count {
                usize::MAX
            } else {
                (i + 1) * self.block_size
            };
            // SAFETY: offset `i * block_size` is within the arena and
            // `block_size >= size_of::<usize>()`.
            unsafe {
                self.base
                    .as_ptr()
                    .add(i * self.block_size)
                    .cast::<usize>()
                    .write_unaligned(next);
            }
        }
        self.free_head = Some(0);
        self.used_blocks = 0;
    }

    /// Number of currently free blocks.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.block_count - self.used_blocks
    }

    fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        let start = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        if addr < start || addr >= start + self.capacity {
            return None;
        }
        let off = addr - start;
        if off % self.block_size != 0 {
            return None;
        }
        Some(off)
    }
}

impl Allocator for PoolAllocator {
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        if !is_power_of_two(alignment) {
            log::error!("PoolAllocator::allocate: alignment {alignment} is not a power of two");
            return None;
        }
        if size > self.block_size {
            return None;
        }
        let head = self.free_head?;
        // SAFETY: `head` is a valid free-list node offset maintained by this allocator.
        let next = unsafe {
            self.base
                .as_ptr()
                .add(head)
                .cast::<usize>()
                .read_unaligned()
        };
        self.free_head = if next == usize::MAX { None } else { Some(next) };
        self.used_blocks += 1;
        // SAFETY: `head` is within [0, capacity).
        NonNull::new(unsafe { self.base.as_ptr().add(head) })
    }

    fn deallocate(&mut self, ptr: NonNull<u8>) {
        let Some(off) = self.offset_of(ptr) else {
            log::error!("PoolAllocator::deallocate: pointer not owned by this pool, ignoring");
            return;
        };
        let next = self.free_head.map_or(usize::MAX, |h| h);
        // SAFETY: `off` is a valid block offset, `block_size >= sizeof(usize)`.
        unsafe {
            self.base
                .as_ptr()
                .add(off)
                .cast::<usize>()
                .write_unaligned(next);
        }
        self.free_head = Some(off);
        self.used_blocks = self.used_blocks.saturating_sub(1);
    }

    fn used(&self) -> usize {
        self.used_blocks * self.block_size
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn tag(&self) -> MemoryTag {
        self.tag
    }

    fn owns(&self, ptr: NonNull<u8>) -> bool {
        self.offset_of(ptr).is_some()
    }

    fn reset(&mut self) {
        self.rebuild_free_list();
    }

    fn name(&self) -> &'static str {
        "pool"
    }
}

impl Drop for PoolAllocator {
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
    fn exhaustion_at_capacity_and_recovery_after_free() {
        let mut pool = PoolAllocator::new(64, 1024, MemoryTag::Render).unwrap();
        let mut ptrs = Vec::with_capacity(1024);
        for _ in 0..1024 {
            ptrs.push(pool.allocate(64, 8).unwrap());
        }
        assert!(pool.allocate(64, 8).is_none());
        assert_eq!(pool.used(), 64 * 1024);

        pool.deallocate(ptrs[500]);
        assert!(pool.allocate(64, 8).is_some());
    }

    #[test]
    fn oversized_allocation_fails() {
        let mut pool = PoolAllocator::new(32, 4, MemoryTag::Render).unwrap();
        assert!(pool.allocate(64, 8).is_none());
    }

    #[test]
    fn block_smaller_than_pointer_is_a_contract_error() {
        assert!(matches!(
            PoolAllocator::new(1, 4, MemoryTag::Render),
            Err(AllocError::BlockTooSmall { .. })
        ));
    }

    #[test]
    fn ownership_requires_block_aligned_offset() {
        let mut pool = PoolAllocator::new(64, 4, MemoryTag::Render).unwrap();
        let p = pool.allocate(64, 8).unwrap();
        assert!(pool.owns(p));
        // SAFETY: still inside the arena, just not block-aligned.
        let misaligned = unsafe { NonNull::new_unchecked(p.as_ptr().add(1)) };
        assert!(!pool.owns(misaligned));
    }

    #[test]
    fn deallocate_unowned_pointer_is_ignored() {
        let mut pool = PoolAllocator::new(64, 4, MemoryTag::Render).unwrap();
        let other = PoolAllocator::new(64, 4, MemoryTag::Render).unwrap();
        let foreign = other.base;
        pool.deallocate(foreign);
        assert_eq!(pool.used(), 0);
    }
}
