//! Per-worker deque, the steal loop, and the thread-local bookkeeping that
//! lets a job body submit further jobs onto its own thread's deque.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

use crossbeam_deque::{Injector, Steal, Stealer, Worker as Deque};
use rand::Rng;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    /// Set for the lifetime of a worker thread's `worker_loop`; `None` on
    /// every other thread (including the thread that owns the `JobSystem`).
    static CURRENT_WORKER: Cell<Option<usize>> = const { Cell::new(None) };
    static LOCAL_DEQUE: std::cell::RefCell<Option<Deque<Job>>> = const { std::cell::RefCell::new(None) };
}

/// Returns this thread's worker index, if it is one of the `JobSystem`'s
/// own worker threads.
pub(crate) fn current_worker_index() -> Option<usize> {
    CURRENT_WORKER.with(Cell::get)
}

/// Pushes a job onto the calling worker thread's own deque. Panics if
/// called from a non-worker thread — callers must check
/// [`current_worker_index`] first.
pub(crate) fn push_local(job: Job) {
    LOCAL_DEQUE.with(|cell| {
        let borrow = cell.borrow();
        let deque = borrow.as_ref().expect("push_local called off a worker thread");
        deque.push(job);
    });
}

/// State shared by every worker thread and the `JobSystem` handle that
/// spawned them.
pub(crate) struct WorkerShared {
    pub(crate) stealers: Vec<Stealer<Job>>,
    /// One injector per worker, used for submissions from outside the pool
    /// (round-robin) since a `crossbeam_deque::Worker` can only be pushed
    /// to by its owning thread.
    pub(crate) injectors: Vec<Injector<Job>>,
    pub(crate) running: AtomicBool,
    pub(crate) round_robin: AtomicUsize,
    park_mutex: Mutex<()>,
    park_cvar: Condvar,
}

impl WorkerShared {
    pub(crate) fn new(worker_count: usize, stealers: Vec<Stealer<Job>>) -> Self {
        let injectors = (0..worker_count).map(|_| Injector::new()).collect();
        Self {
            stealers,
            injectors,
            running: AtomicBool::new(true),
            round_robin: AtomicUsize::new(0),
            park_mutex: Mutex::new(()),
            park_cvar: Condvar::new(),
        }
    }

    pub(crate) fn next_round_robin(&self) -> usize {
        self.round_robin.fetch_add(1, Ordering::Relaxed) % self.injectors.len().max(1)
    }

    pub(crate) fn wake_all(&self) {
        let _guard = self.park_mutex.lock().unwrap();
        self.park_cvar.notify_all();
    }

    fn park_briefly(&self) {
        let guard = self.park_mutex.lock().unwrap();
        let _ = self
            .park_cvar
            .wait_timeout(guard, std::time::Duration::from_micros(200))
            .unwrap();
    }

    /// Attempts to run exactly one job: own deque first, then this worker's
    /// injector, then a steal from a random peer. Returns whether a job ran.
    pub(crate) fn try_run_one(&self, index: usize) -> bool {
        let popped = LOCAL_DEQUE.with(|cell| {
            let borrow = cell.borrow();
            borrow.as_ref().and_then(Deque::pop)
        });
        if let Some(job) = popped {
            job();
            return true;
        }

        loop {
            match self.injectors[index].steal() {
                Steal::Success(job) => {
                    job();
                    return true;
                }
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }

        if self.stealers.len() > 1 {
            let mut rng = rand::thread_rng();
            let start = rng.gen_range(0..self.stealers.len());
            for offset in 0..self.stealers.len() {
                let peer = (start + offset) % self.stealers.len();
                if peer == index {
                    continue;
                }
                loop {
                    match self.stealers[peer].steal() {
                        Steal::Success(job) => {
                            job();
                            return true;
                        }
                        Steal::Retry => continue,
                        Steal::Empty => break,
                    }
                }
            }
        }
        false
    }
}

/// Entry point run on every spawned worker thread.
pub(crate) fn worker_loop(shared: std::sync::Arc<WorkerShared>, index: usize, deque: Deque<Job>) {
    CURRENT_WORKER.with(|c| c.set(Some(index)));
    LOCAL_DEQUE.with(|cell| *cell.borrow_mut() = Some(deque));

    while shared.running.load(Ordering::Acquire) {
        if !shared.try_run_one(index) {
            shared.park_briefly();
        }
    }

    // Drain whatever remains so in-flight handles still reach zero even
    // across a racing shutdown.
    while shared.try_run_one(index) {}
}
