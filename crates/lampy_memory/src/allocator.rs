use std::ptr::NonNull;

use crate::tag::MemoryTag;

/// A contract breach detected at the allocator boundary — never a normal
/// exhaustion, which is reported as `None` from `allocate` instead.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("alignment {0} is not a power of two")]
    AlignmentNotPowerOfTwo(usize),
    #[error("allocator capacity must be non-zero")]
    ZeroCapacity,
    #[error("block size {block_size} is smaller than a pointer ({min})")]
    BlockTooSmall { block_size: usize, min: usize },
}

#[inline]
#[must_use]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Maximum alignment any scalar type on the host platform requires; the
/// default used when a caller doesn't specify one.
pub const MAX_SCALAR_ALIGN: usize = std::mem::align_of::<u128>();

/// Capability shared by every allocator flavor in the hierarchy.
///
/// Implementors never panic or throw on exhaustion: `allocate` returns
/// `None` and the caller decides whether to fall back to a more permissive
/// allocator. Alignment violations (not a power of two) are contract
/// breaches, not exhaustion, and are reported through [`AllocError`] by the
/// constructors that take an alignment up front; `allocate` itself treats a
/// bad alignment as a logged no-op returning `None`, since it must never
/// unwind.
pub trait Allocator {
    /// Allocates `size` bytes aligned to `alignment` (must be a power of
    /// two), or returns `None` if the request cannot be satisfied.
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>>;

    /// Releases a previously returned pointer. A no-op for allocators whose
    /// contract says so (linear, stack); ignored (and logged) for a pointer
    /// this allocator does not own.
    fn deallocate(&mut self, ptr: NonNull<u8>);

    /// Bytes currently considered live by this allocator.
    fn used(&self) -> usize;

    /// Total bytes backing this allocator's arena.
    fn capacity(&self) -> usize;

    /// The tag this allocator's allocations are attributed to.
    fn tag(&self) -> MemoryTag;

    /// O(1) membership test: does `ptr` fall within this allocator's arena
    /// (and, where applicable, at a block-aligned offset)?
    fn owns(&self, ptr: NonNull<u8>) -> bool;

    /// Invalidates every live pointer previously returned. Default: no-op.
    /// Callers are responsible for not dereferencing pointers after reset.
    fn reset(&mut self) {}

    /// Diagnostic label, not part of the functional contract.
    fn name(&self) -> &'static str;
}

#[inline]
#[must_use]
pub(crate) fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(is_power_of_two(alignment));
    (value + alignment - 1) & !(alignment - 1)
}
