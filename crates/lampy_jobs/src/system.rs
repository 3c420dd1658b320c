//! Work-stealing thread pool: one worker thread per physical core (by
//! default), submission by counter handle, and a lock-stepped
//! `parallel_for`.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_deque::Worker as Deque;

use crate::handle::JobHandle;
use crate::worker::{self, WorkerShared};

const DEFAULT_GRAIN: usize = 64;

/// Startup configuration for [`JobSystem`].
#[derive(Debug, Clone, Copy)]
pub struct JobSystemConfig {
    /// Number of worker threads to spawn. Defaults to
    /// `std::thread::available_parallelism()`.
    pub worker_count: usize,
}

impl Default for JobSystemConfig {
    fn default() -> Self {
        Self {
            worker_count: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

/// Scheduling model: parallel threads, work stealing. Spawns
/// `config.worker_count` OS threads at construction and joins them on
/// drop, so callers get RAII cleanup matching the rest of the engine's
/// owning-handle pattern.
pub struct JobSystem {
    shared: Arc<WorkerShared>,
    threads: Vec<JoinHandle<()>>,
    worker_count: usize,
}

impl JobSystem {
    #[must_use]
    pub fn new(config: JobSystemConfig) -> Self {
        let worker_count = config.worker_count.max(1);

        // Build every worker's deque up front so their stealers can be
        // handed to `WorkerShared` before any thread starts — every
        // worker must be able to steal from every peer from iteration one.
        let deques: Vec<Deque<worker::Job>> = (0..worker_count).map(|_| Deque::new_lifo()).collect();
        let stealers = deques.iter().map(Deque::stealer).collect();
        let shared = Arc::new(WorkerShared::new(worker_count, stealers));

        let threads = deques
            .into_iter()
            .enumerate()
            .map(|(index, deque)| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("lampy-job-worker-{index}"))
                    .spawn(move || worker::worker_loop(shared, index, deque))
                    .expect("failed to spawn job worker thread")
            })
            .collect();

        Self {
            shared,
            threads,
            worker_count,
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Submits a job, returning a freshly minted handle that reaches zero
    /// once the job completes.
    pub fn submit<F>(&self, job: F) -> JobHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = JobHandle::new();
        self.submit_on(job, &handle);
        handle
    }

    /// Submits a job under an externally supplied handle, incrementing its
    /// counter rather than minting a new one.
    pub fn submit_on<F>(&self, job: F, handle: &JobHandle)
    where
        F: FnOnce() + Send + 'static,
    {
        let counter = handle.counter();
        counter.increment();
        let wrapped: worker::Job = Box::new(move || {
            job();
            counter.decrement();
        });

        if worker::current_worker_index().is_some() {
            worker::push_local(wrapped);
        } else {
            let target = self.shared.next_round_robin();
            self.shared.injectors[target].push(wrapped);
        }
        self.shared.wake_all();
    }

    /// Blocks until `handle`'s counter reaches zero. A worker thread keeps
    /// executing and stealing while it waits; any other caller yields.
    pub fn wait(&self, handle: &JobHandle) {
        if let Some(index) = worker::current_worker_index() {
            while !handle.is_done() {
                if !self.shared.try_run_one(index) {
                    std::thread::yield_now();
                }
            }
        } else {
            handle.wait();
        }
    }

    /// Partitions `[begin, end)` into chunks of
    /// `max(grain, (end - begin) / (2 * worker_count))`, submits each chunk
    /// under one shared handle, and waits. Degrades to a sequential loop on
    /// the caller if the pool has no workers.
    pub fn parallel_for<F>(&self, begin: usize, end: usize, f: F, grain: usize)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        if begin >= end {
            return;
        }
        if self.worker_count == 0 {
            for i in begin..end {
                f(i);
            }
            return;
        }

        let grain = if grain == 0 { DEFAULT_GRAIN } else { grain };
        let chunk = grain
            .max((end - begin) / (2 * self.worker_count).max(1))
            .max(1);

        let handle = JobHandle::new();
        let f = Arc::new(f);
        let mut start = begin;
        while start < end {
            let stop = (start + chunk).min(end);
            let f = Arc::clone(&f);
            self.submit_on(
                move || {
                    for i in start..stop {
                        f(i);
                    }
                },
                &handle,
            );
            start = stop;
        }
        self.wait(&handle);
    }

    /// `parallel_for` with the default grain size (64).
    pub fn parallel_for_default<F>(&self, begin: usize, end: usize, f: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.parallel_for(begin, end, f, DEFAULT_GRAIN);
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        self.shared
            .running
            .store(false, std::sync::atomic::Ordering::Release);
        self.shared.wake_all();
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn submit_and_wait_runs_job_exactly_once() {
        let jobs = JobSystem::new(JobSystemConfig { worker_count: 2 });
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let handle = jobs.submit(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        jobs.wait(&handle);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn parallel_for_visits_every_index_exactly_once() {
        let jobs = JobSystem::new(JobSystemConfig { worker_count: 4 });
        let n = 10_000usize;
        let results: Arc<Vec<AtomicUsize>> = Arc::new((0..n).map(|_| AtomicUsize::new(0)).collect());
        let r = Arc::clone(&results);
        jobs.parallel_for(
            0,
            n,
            move |i| {
                r[i].store(i * i, Ordering::SeqCst);
            },
            128,
        );
        let sum: u64 = results.iter().map(|v| v.load(Ordering::SeqCst) as u64).sum();
        assert_eq!(sum, 333_283_335_000);
        for (i, v) in results.iter().enumerate() {
            assert_eq!(v.load(Ordering::SeqCst), i * i);
        }
    }

    #[test]
    fn shared_handle_joins_multiple_submissions() {
        let jobs = JobSystem::new(JobSystemConfig { worker_count: 2 });
        let handle = JobHandle::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..8 {
            let c = Arc::clone(&counter);
            jobs.submit_on(
                move || {
                    c.fetch_add(1, Ordering::SeqCst);
                },
                &handle,
            );
        }
        jobs.wait(&handle);
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
