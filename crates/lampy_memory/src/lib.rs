//! Tagged, pluggable allocator hierarchy feeding every other engine subsystem.
//!
//! Four allocator flavors (linear, stack, pool, free-list) share the
//! [`Allocator`] capability trait. [`MemorySystem`] owns the process-wide
//! frame and persistent allocators and is the factory for secondary
//! allocators whose backing buffers it keeps alive.

mod allocator;
mod free_list;
mod linear;
mod pool;
mod stack;
mod stats;
mod system;
mod tag;

pub use allocator::{AllocError, Allocator};
pub use free_list::FreeListAllocator;
pub use linear::LinearAllocator;
pub use pool::PoolAllocator;
pub use stack::{Marker, StackAllocator};
pub use stats::{AllocatorStats, MemoryStatistics};
pub use system::{AllocatorHandle, MemorySystem, MemorySystemConfig};
pub use tag::MemoryTag;

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, AllocError>;
