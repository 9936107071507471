//! Bounded-concurrency work queue
//!
//! Thumbnail generation fans out to many small render jobs; running them all
//! at once starves the interactive view. This queue caps concurrency with a
//! fixed worker pool and explicit shared state — no module-level counters —
//! and is deliberately decoupled from any rendering context: jobs are plain
//! closures over data they own.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    shutting_down: bool,
}

struct QueueShared {
    state: Mutex<QueueState>,
    available: Condvar,
}

/// A task queue executing jobs on a fixed number of worker threads
pub struct WorkQueue {
    shared: Arc<QueueShared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    /// Default worker count for thumbnail generation
    pub const DEFAULT_WORKERS: usize = 2;

    /// Create a queue with the given worker limit (minimum 1)
    pub fn new(worker_limit: usize) -> Self {
        let shared = Arc::new(QueueShared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                shutting_down: false,
            }),
            available: Condvar::new(),
        });

        let workers = (0..worker_limit.max(1))
            .map(|index| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("workqueue-{index}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn work queue worker")
            })
            .collect();

        Self { shared, workers }
    }

    /// Enqueue a job for execution on the next free worker
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().expect("work queue lock poisoned");
        if state.shutting_down {
            debug!("work queue: rejecting job submitted after shutdown");
            return;
        }
        state.jobs.push_back(Box::new(job));
        drop(state);
        self.shared.available.notify_one();
    }

    /// Number of jobs waiting to start (running jobs excluded)
    pub fn pending(&self) -> usize {
        self.shared
            .state
            .lock()
            .expect("work queue lock poisoned")
            .jobs
            .len()
    }

    /// Drain remaining jobs and join all workers
    pub fn shutdown(mut self) {
        self.begin_shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    fn begin_shutdown(&self) {
        let mut state = self.shared.state.lock().expect("work queue lock poisoned");
        state.shutting_down = true;
        drop(state);
        self.shared.available.notify_all();
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.begin_shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &QueueShared) {
    loop {
        let job = {
            let mut state = shared.state.lock().expect("work queue lock poisoned");
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    break job;
                }
                if state.shutting_down {
                    return;
                }
                state = shared
                    .available
                    .wait(state)
                    .expect("work queue lock poisoned");
            }
        };
        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_all_jobs_run_before_shutdown_returns() {
        let queue = WorkQueue::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..40 {
            let counter = Arc::clone(&counter);
            queue.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 40);
    }

    #[test]
    fn test_concurrency_never_exceeds_worker_limit() {
        let queue = WorkQueue::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..16 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            queue.submit(move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }
        queue.shutdown();
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_zero_worker_request_still_executes() {
        let queue = WorkQueue::new(0);
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        queue.submit(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        queue.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pending_reflects_queued_jobs() {
        let queue = WorkQueue::new(1);
        let gate = Arc::new(Mutex::new(()));
        let held = gate.lock().unwrap();

        let blocker = Arc::clone(&gate);
        queue.submit(move || {
            drop(blocker.lock().unwrap());
        });
        // Give the worker a moment to pick up the blocking job.
        std::thread::sleep(Duration::from_millis(20));
        queue.submit(|| {});
        queue.submit(|| {});
        assert_eq!(queue.pending(), 2);

        drop(held);
        queue.shutdown();
    }
}
