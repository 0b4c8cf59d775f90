use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::queue::JobQueue;
use super::worker::{WorkerEntry, WorkerState};
use crate::PoolConfig;

/// State shared between the pool handle and its workers.
///
/// `state` is the only lock in the pool and `work_available` is the only
/// condition variable; it is always waited on with `state` held.
pub(crate) struct Shared {
    state: Mutex<PoolState>,
    work_available: Condvar,
    pub(crate) config: PoolConfig,
}

impl Shared {
    pub(crate) fn new(config: PoolConfig) -> Self {
        Shared {
            state: Mutex::new(PoolState::new()),
            work_available: Condvar::new(),
            config,
        }
    }

    pub(crate) fn max_threads(&self) -> usize {
        self.config.max_threads
    }

    /// Locks the pool state.
    ///
    /// Jobs never run under this lock, so a poisoned lock still guards
    /// consistent state and is recovered rather than propagated.
    pub(crate) fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait<'a>(&self, guard: MutexGuard<'a, PoolState>) -> MutexGuard<'a, PoolState> {
        self.work_available
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn notify_one(&self) {
        self.work_available.notify_one();
    }

    pub(crate) fn notify_all(&self) {
        self.work_available.notify_all();
    }
}

/// Everything guarded by the pool lock.
///
/// `queue.len()` and `live_threads` are independent: one counts pending
/// jobs, the other counts worker threads that have not exited yet.
pub(crate) struct PoolState {
    pub(crate) queue: JobQueue,
    pub(crate) live_threads: usize,
    pub(crate) idle_threads: usize,
    pub(crate) shutdown: bool,
    /// Indexed by worker id.
    pub(crate) workers: Vec<WorkerEntry>,
    pub(crate) next_job_id: u64,
    pub(crate) submitted: u64,
    pub(crate) completed: u64,
    pub(crate) panicked: u64,
    pub(crate) discarded: u64,
}

impl PoolState {
    fn new() -> Self {
        PoolState {
            queue: JobQueue::new(),
            live_threads: 0,
            idle_threads: 0,
            shutdown: false,
            workers: Vec::new(),
            next_job_id: 0,
            submitted: 0,
            completed: 0,
            panicked: 0,
            discarded: 0,
        }
    }

    pub(crate) fn set_worker_state(&mut self, id: usize, state: WorkerState) {
        if let Some(worker) = self.workers.get_mut(id) {
            worker.state = state;
        }
    }

    pub(crate) fn busy_threads(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| w.state == WorkerState::Executing)
            .count()
    }
}

/// A point-in-time snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Configured upper bound on live workers.
    pub max_threads: usize,
    /// Workers spawned and not yet exited.
    pub live_threads: usize,
    /// Workers blocked waiting for a job.
    pub idle_threads: usize,
    /// Workers currently running a job.
    pub busy_threads: usize,
    /// Jobs waiting in the queue.
    pub queued_jobs: usize,
    /// Jobs accepted by `submit`.
    pub submitted: u64,
    /// Jobs that ran to completion.
    pub completed: u64,
    /// Jobs that panicked.
    pub panicked: u64,
    /// Jobs dropped unexecuted at shutdown.
    pub discarded: u64,
}

impl PoolStats {
    pub(crate) fn capture(state: &PoolState, max_threads: usize) -> Self {
        PoolStats {
            max_threads,
            live_threads: state.live_threads,
            idle_threads: state.idle_threads,
            busy_threads: state.busy_threads(),
            queued_jobs: state.queue.len(),
            submitted: state.submitted,
            completed: state.completed,
            panicked: state.panicked,
            discarded: state.discarded,
        }
    }
}
