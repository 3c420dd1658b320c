//! Work-stealing thread pool feeding every other engine subsystem.
//!
//! One [`Worker`](worker) thread per physical core by default, each owning
//! a [`crossbeam_deque`] deque. [`JobHandle`] joins a set of submitted
//! jobs; [`JobSystem::parallel_for`] is the lock-stepped fan-out built on
//! top of submit/wait.
//!
//! No cancellation primitive is provided (spec.md §4.3) — long-running job
//! bodies must poll an externally owned flag.

mod handle;
mod system;
mod worker;

pub use handle::JobHandle;
pub use system::{JobSystem, JobSystemConfig};
