use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};
use serde::Serialize;

use super::job::{self, Job, JobHandle, Task};
use super::state::{PoolStats, Shared};
use super::worker::spawn_worker;
use super::ThreadPool;
use crate::{PoolConfig, PoolError, Result, ShutdownPolicy};

/// A thread pool that starts with a few workers and grows on demand.
///
/// `create` spawns `initial_threads` workers up front. Each submission
/// wakes an idle worker if there is one, and spawns another worker when
/// pending jobs outnumber idle workers and the pool is below
/// `max_threads`. Workers never exit before [`shutdown`](Self::shutdown),
/// so spawned threads are reused for later jobs.
///
/// Dropping the pool shuts it down if that has not happened yet.
pub struct DynamicThreadPool {
    shared: Arc<Shared>,
}

/// What [`DynamicThreadPool::shutdown`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Queued jobs dropped without running.
    pub discarded: usize,
    /// Worker threads joined.
    pub workers_joined: usize,
    /// Worker threads left running because `shutdown` was called from
    /// that worker; each exits once its current job returns.
    pub workers_detached: usize,
}

impl DynamicThreadPool {
    /// Creates a pool with `initial_threads` workers that may grow to
    /// `max_threads`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `0 < initial_threads <= max_threads`;
    /// `ResourceExhausted` if a worker thread cannot be spawned, in which
    /// case the workers already spawned are shut down and joined.
    pub fn create(max_threads: usize, initial_threads: usize) -> Result<Self> {
        DynamicThreadPool::with_config(PoolConfig::new(max_threads, initial_threads))
    }

    /// Creates a pool from a full configuration.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let initial_threads = config.initial_threads;
        let pool = DynamicThreadPool {
            shared: Arc::new(Shared::new(config)),
        };

        let mut state = pool.shared.lock();
        for _ in 0..initial_threads {
            if let Err(e) = spawn_worker(&pool.shared, &mut state) {
                drop(state);
                error!("Failed to spawn initial worker: {}", e);
                if let Err(e) = pool.shutdown() {
                    error!("Failed to unwind partially created pool: {}", e);
                }
                return Err(PoolError::ResourceExhausted(e));
            }
        }
        drop(state);

        info!(
            "Created thread pool with {} of at most {} workers",
            initial_threads,
            pool.shared.max_threads()
        );
        Ok(pool)
    }

    /// Submits `f` to be called with `arg` on a worker thread.
    ///
    /// # Errors
    ///
    /// `AlreadyShutdown` once [`shutdown`](Self::shutdown) has begun; the
    /// job is not run.
    pub fn submit<F, A>(&self, f: F, arg: A) -> Result<()>
    where
        F: FnOnce(A) + Send + 'static,
        A: Send + 'static,
    {
        self.enqueue(job::bind(f, arg))
    }

    /// Submits a closure to run on a worker thread.
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Box::new(job))
    }

    /// Submits `f(arg)` and returns a handle to its outcome.
    pub fn submit_with_handle<F, A, R>(&self, f: F, arg: A) -> Result<JobHandle<R>>
    where
        F: FnOnce(A) -> R + Send + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        let (task, handle) = job::bind_with_handle(f, arg);
        self.enqueue(task)?;
        Ok(handle)
    }

    fn enqueue(&self, task: Task) -> Result<()> {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(PoolError::AlreadyShutdown);
        }

        let id = state.next_job_id;
        state.next_job_id += 1;
        state.submitted += 1;
        state.queue.push(Job::new(id, task));

        if state.idle_threads < state.queue.len() && state.live_threads < self.shared.max_threads()
        {
            // The job stays queued either way; a busy worker picks it up later.
            if let Err(e) = spawn_worker(&self.shared, &mut state) {
                warn!("Failed to spawn worker for job {}, leaving it queued: {}", id, e);
            }
        }

        let wake = state.idle_threads > 0;
        drop(state);
        if wake {
            self.shared.notify_one();
        }
        debug!("Submitted job {}", id);
        Ok(())
    }

    /// Stops the pool and joins every worker thread.
    ///
    /// Under [`ShutdownPolicy::Discard`] queued jobs are dropped unexecuted
    /// and counted in the report; under [`ShutdownPolicy::Drain`] workers
    /// run them before exiting. Jobs already executing always finish.
    ///
    /// If called from one of the pool's own workers, that worker is not
    /// joined; it exits once its current job returns and is counted in
    /// [`ShutdownReport::workers_detached`].
    ///
    /// # Errors
    ///
    /// `DoubleShutdown` if the pool was already shut down.
    pub fn shutdown(&self) -> Result<ShutdownReport> {
        let (handles, discarded_jobs) = {
            let mut state = self.shared.lock();
            if state.shutdown {
                return Err(PoolError::DoubleShutdown);
            }
            state.shutdown = true;

            let discarded_jobs = match self.shared.config.shutdown_policy {
                ShutdownPolicy::Discard => state.queue.take_all(),
                ShutdownPolicy::Drain => Vec::new(),
            };
            state.discarded += discarded_jobs.len() as u64;

            let handles: Vec<_> = state
                .workers
                .iter_mut()
                .filter_map(|w| w.handle.take().map(|h| (w.id, h)))
                .collect();
            (handles, discarded_jobs)
        };
        self.shared.notify_all();

        let discarded = discarded_jobs.len();
        info!(
            "Shutting down thread pool: {} workers, {} queued jobs discarded",
            handles.len(),
            discarded
        );

        let current = thread::current().id();
        let mut workers_joined = 0;
        let mut workers_detached = 0;
        for (id, handle) in handles {
            if handle.thread().id() == current {
                warn!("Worker {} shut down its own pool; it exits after its current job", id);
                workers_detached += 1;
                continue;
            }
            if handle.join().is_err() {
                error!("Worker {} terminated abnormally", id);
            }
            workers_joined += 1;
        }

        // Dropping a job drops its captures, which may panic; workers are
        // already joined by now.
        for discarded_job in discarded_jobs {
            let job_id = discarded_job.id();
            debug!("Discarding job {} on shutdown", job_id);
            let dropped = panic::catch_unwind(AssertUnwindSafe(move || drop(discarded_job)));
            if let Err(payload) = dropped {
                error!(
                    "Discarded job {} panicked while being dropped: {}",
                    job_id,
                    job::panic_message(&*payload)
                );
            }
        }

        Ok(ShutdownReport {
            discarded,
            workers_joined,
            workers_detached,
        })
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has begun.
    pub fn is_shutdown(&self) -> bool {
        self.shared.lock().shutdown
    }

    /// Returns a snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock();
        PoolStats::capture(&state, self.shared.max_threads())
    }

    /// The configuration this pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }
}

impl ThreadPool for DynamicThreadPool {
    /// Creates a pool with one initial worker that grows to `threads`.
    fn new(threads: u32) -> Result<Self> {
        DynamicThreadPool::create(threads as usize, 1)
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        DynamicThreadPool::spawn(self, job)
    }
}

impl Drop for DynamicThreadPool {
    fn drop(&mut self) {
        if self.is_shutdown() {
            return;
        }
        if let Err(e) = self.shutdown() {
            error!("Failed to shut down thread pool: {}", e);
        }
    }
}
