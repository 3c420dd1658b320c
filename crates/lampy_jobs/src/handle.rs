//! Move-only counter handle joining a set of submitted jobs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared atomic counter backing one or more [`JobHandle`]s. Kept separate
/// so the completion callback baked into a submitted job can hold a cheap
/// clone of just the counter without making `JobHandle` itself `Clone`.
#[derive(Clone)]
pub(crate) struct Counter(Arc<AtomicUsize>);

impl Counter {
    fn new() -> Self {
        Self(Arc::new(AtomicUsize::new(0)))
    }

    pub(crate) fn increment(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn decrement(&self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }

    fn load(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Joins a set of jobs submitted under it. Pending jobs increment the
/// counter on submission and decrement it on completion; [`JobHandle::wait`]
/// spins while the counter is non-zero.
///
/// Move-only: a handle is either owned by the caller that will wait on it,
/// or consumed by [`crate::JobSystem::submit`] to produce a fresh one.
/// Submitting additional jobs against an existing handle takes it by
/// reference (`submit_on`) rather than requiring a clone.
pub struct JobHandle {
    counter: Counter,
}

impl JobHandle {
    pub(crate) fn new() -> Self {
        Self {
            counter: Counter::new(),
        }
    }

    pub(crate) fn counter(&self) -> Counter {
        self.counter.clone()
    }

    /// Bytes-free spin wait: yields the current thread between checks.
    /// Correct from any thread, but does not help drain the pool the way
    /// [`crate::JobSystem::wait`] does from a worker thread — prefer that
    /// when a `JobSystem` is in scope.
    pub fn wait(&self) {
        while self.counter.load() > 0 {
            std::thread::yield_now();
        }
    }

    /// Non-blocking check: `true` once every job submitted under this
    /// handle has completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.counter.load() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_starts_and_ends_done() {
        let handle = JobHandle::new();
        assert!(handle.is_done());
        handle.counter.increment();
        assert!(!handle.is_done());
        handle.counter.decrement();
        assert!(handle.is_done());
    }
}
