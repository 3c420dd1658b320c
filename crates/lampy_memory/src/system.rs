//! Process-wide owner of the frame and persistent allocators, and a factory
//! for secondary allocators whose backing buffers it keeps alive until
//! [`MemorySystem::shutdown`].
//!
//! REDESIGN FLAGS (spec.md §9) replaces the teacher-pattern process-wide
//! singleton with an explicitly constructed handle: callers build one
//! `MemorySystem` at startup and thread it through, rather than reaching a
//! global.

use std::ptr::NonNull;

use parking_lot::Mutex;

use crate::allocator::Allocator;
use crate::free_list::FreeListAllocator;
use crate::linear::LinearAllocator;
use crate::pool::PoolAllocator;
use crate::stack::StackAllocator;
use crate::stats::{AllocatorStats, MemoryStatistics};
use crate::tag::MemoryTag;
use crate::Result;

const DEFAULT_FRAME_BYTES: usize = 2 * 1024 * 1024;
const DEFAULT_PERSISTENT_BYTES: usize = 64 * 1024 * 1024;

/// Startup configuration for [`MemorySystem`], following spec.md §4.2's
/// stated defaults (2 MiB frame / 64 MiB persistent).
#[derive(Debug, Clone, Copy)]
pub struct MemorySystemConfig {
    pub frame_bytes: usize,
    pub persistent_bytes: usize,
}

impl Default for MemorySystemConfig {
    fn default() -> Self {
        Self {
            frame_bytes: DEFAULT_FRAME_BYTES,
            persistent_bytes: DEFAULT_PERSISTENT_BYTES,
        }
    }
}

/// Opaque reference to a secondary allocator created through
/// [`MemorySystem::create_linear_allocator`] and friends. The caller must
/// not use a handle after [`MemorySystem::shutdown`] has been called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocatorHandle(usize);

pub struct MemorySystem {
    frame: Mutex<LinearAllocator>,
    persistent: Mutex<FreeListAllocator>,
    registry: Mutex<Vec<Mutex<Box<dyn Allocator + Send>>>>,
    stats: Mutex<MemoryStatistics>,
}

impl MemorySystem {
    /// Allocates the frame and persistent arenas and registers them.
    /// Intended to run exactly once per process lifetime.
    pub fn startup(config: MemorySystemConfig) -> Result<Self> {
        let frame = LinearAllocator::new(config.frame_bytes, MemoryTag::Temp)?;
        let persistent = FreeListAllocator::new(config.persistent_bytes, MemoryTag::Unknown)?;
        Ok(Self {
            frame: Mutex::new(frame),
            persistent: Mutex::new(persistent),
            registry: Mutex::new(Vec::new()),
            stats: Mutex::new(MemoryStatistics::new()),
        })
    }

    fn register(&self, allocator: Box<dyn Allocator + Send>) -> AllocatorHandle {
        let mut registry = self.registry.lock();
        let idx = registry.len();
        registry.push(Mutex::new(allocator));
        AllocatorHandle(idx)
    }

    pub fn create_linear_allocator(&self, capacity: usize, tag: MemoryTag) -> Result<AllocatorHandle> {
        let allocator = LinearAllocator::new(capacity, tag)?;
        Ok(self.register(Box::new(allocator)))
    }

    pub fn create_stack_allocator(&self, capacity: usize, tag: MemoryTag) -> Result<AllocatorHandle> {
        let allocator = StackAllocator::new(capacity, tag)?;
        Ok(self.register(Box::new(allocator)))
    }

    pub fn create_pool_allocator(
        &self,
        block_size: usize,
        block_count: usize,
        tag: MemoryTag,
    ) -> Result<AllocatorHandle> {
        let allocator = PoolAllocator::new(block_size, block_count, tag)?;
        Ok(self.register(Box::new(allocator)))
    }

    pub fn create_free_list_allocator(&self, capacity: usize, tag: MemoryTag) -> Result<AllocatorHandle> {
        let allocator = FreeListAllocator::new(capacity, tag)?;
        Ok(self.register(Box::new(allocator)))
    }

    /// Allocates `size` bytes through a previously created secondary
    /// allocator, recording the result in the global tag statistics.
    pub fn allocate_from(&self, handle: AllocatorHandle, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        let registry = self.registry.lock();
        let slot = registry.get(handle.0)?;
        let mut allocator = slot.lock();
        let tag = allocator.tag();
        let ptr = allocator.allocate(size, alignment);
        if let Some(_p) = ptr {
            self.stats.lock().record_alloc(tag, size);
        }
        ptr
    }

    pub fn deallocate_from(&self, handle: AllocatorHandle, ptr: NonNull<u8>, size: usize) {
        let registry = self.registry.lock();
        let Some(slot) = registry.get(handle.0) else {
            log::error!("MemorySystem::deallocate_from: unknown allocator handle, ignoring");
            return;
        };
        let mut allocator = slot.lock();
        let tag = allocator.tag();
        allocator.deallocate(ptr);
        self.stats.lock().record_dealloc(tag, size);
    }

    /// Routes a tagged allocation: `Temp` prefers the frame allocator and
    /// falls back to the persistent allocator on exhaustion; every other
    /// tag always goes to the persistent allocator (spec.md §4.2).
    pub fn allocate_memory(&self, size: usize, alignment: usize, tag: MemoryTag) -> Option<NonNull<u8>> {
        let ptr = if tag == MemoryTag::Temp {
            let mut frame = self.frame.lock();
            frame
                .allocate(size, alignment)
                .or_else(|| self.persistent.lock().allocate(size, alignment))
        } else {
            self.persistent.lock().allocate(size, alignment)
        };
        if ptr.is_some() {
            self.stats.lock().record_alloc(tag, size);
        }
        ptr
    }

    /// Best-effort deallocation matching `allocate_memory`'s routing.
    /// `Temp`-tagged pointers are never individually freed (linear
    /// allocator contract); everything else goes to the persistent
    /// allocator.
    pub fn deallocate_memory(&self, ptr: NonNull<u8>, size: usize, tag: MemoryTag) {
        if tag == MemoryTag::Temp {
            return;
        }
        self.persistent.lock().deallocate(ptr);
        self.stats.lock().record_dealloc(tag, size);
    }

    /// Resets the frame allocator, recording the reclaimed bytes as a
    /// single bulk deallocation against the `Temp` tag.
    pub fn reset_frame_allocator(&self) {
        let mut frame = self.frame.lock();
        let reclaimed = frame.used();
        frame.reset();
        if reclaimed > 0 {
            self.stats.lock().record_dealloc(MemoryTag::Temp, reclaimed);
        }
    }

    #[must_use]
    pub fn statistics(&self) -> rustc_hash::FxHashMap<MemoryTag, AllocatorStats> {
        self.stats.lock().snapshot()
    }

    #[must_use]
    pub fn statistics_for(&self, tag: MemoryTag) -> AllocatorStats {
        self.stats.lock().snapshot_tag(tag)
    }

    /// Logs any non-zero per-tag residual as a leak, then drops every
    /// registered allocator (and this system itself). Intended to run
    /// exactly once, last among subsystem teardowns (spec.md §5).
    pub fn shutdown(self) {
        let leaks = self.stats.lock().leaked_tags();
        for (tag, bytes) in leaks {
            log::error!("MemorySystem::shutdown: leaked {bytes} bytes tagged {}", tag.name());
        }
        // Dropping `self` here releases the frame/persistent arenas and
        // every registered secondary allocator's backing buffer.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_with_defaults_succeeds() {
        let system = MemorySystem::startup(MemorySystemConfig::default()).unwrap();
        assert!(system.allocate_memory(64, 8, MemoryTag::Render).is_some());
    }

    #[test]
    fn reset_frame_allocator_zeroes_used() {
        let system = MemorySystem::startup(MemorySystemConfig {
            frame_bytes: 4096,
            persistent_bytes: 4096,
        })
        .unwrap();
        system.allocate_memory(512, 8, MemoryTag::Temp);
        system.reset_frame_allocator();
        assert_eq!(system.frame.lock().used(), 0);
    }

    #[test]
    fn temp_tag_falls_back_to_persistent_on_frame_exhaustion() {
        let system = MemorySystem::startup(MemorySystemConfig {
            frame_bytes: 64,
            persistent_bytes: 4096,
        })
        .unwrap();
        // First fills the tiny frame arena, second must fall back.
        assert!(system.allocate_memory(48, 8, MemoryTag::Temp).is_some());
        assert!(system.allocate_memory(48, 8, MemoryTag::Temp).is_some());
    }

    #[test]
    fn secondary_pool_allocator_round_trips() {
        let system = MemorySystem::startup(MemorySystemConfig::default()).unwrap();
        let handle = system
            .create_pool_allocator(64, 16, MemoryTag::Physics)
            .unwrap();
        let p = system.allocate_from(handle, 64, 8).unwrap();
        system.deallocate_from(handle, p, 64);
    }

    #[test]
    fn leak_is_visible_in_statistics_before_shutdown() {
        let system = MemorySystem::startup(MemorySystemConfig::default()).unwrap();
        system.allocate_memory(128, 8, MemoryTag::Script);
        assert_eq!(system.statistics_for(MemoryTag::Script).allocated, 128);
        system.shutdown();
    }
}
