use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::job::panic_message;
use super::state::{PoolState, Shared};

/// What a worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Idle,
    Executing,
    Exiting,
}

/// The pool's record of one worker thread.
///
/// `handle` is taken by shutdown for joining; the entry itself stays so
/// worker ids remain valid indices.
pub(crate) struct WorkerEntry {
    pub(crate) id: usize,
    pub(crate) handle: Option<JoinHandle<()>>,
    pub(crate) state: WorkerState,
}

/// Spawns a worker thread and records it in `state`.
///
/// Must be called with the pool lock held, `state` being the guarded
/// state. The new thread blocks on that lock until the caller releases it.
pub(crate) fn spawn_worker(shared: &Arc<Shared>, state: &mut PoolState) -> io::Result<()> {
    let id = state.workers.len();

    let mut builder = thread::Builder::new().name(format!("{}-{id}", shared.config.thread_name));
    if let Some(stack_size) = shared.config.stack_size {
        builder = builder.stack_size(stack_size);
    }

    let worker_shared = Arc::clone(shared);
    let handle = builder.spawn(move || run_worker(id, worker_shared))?;

    state.workers.push(WorkerEntry {
        id,
        handle: Some(handle),
        state: WorkerState::Idle,
    });
    state.live_threads += 1;
    debug!(
        "Spawned worker {id} ({} of {} live)",
        state.live_threads,
        shared.max_threads()
    );
    Ok(())
}

/// The worker loop: run queued jobs, otherwise wait; exit once shut down
/// and nothing is left to run.
fn run_worker(id: usize, shared: Arc<Shared>) {
    let mut state = shared.lock();

    loop {
        if let Some(job) = state.queue.pop() {
            state.set_worker_state(id, WorkerState::Executing);
            drop(state);

            let job_id = job.id();
            debug!("Worker {id} executing job {job_id}");
            // Catch panics so the worker loop continues
            let result = panic::catch_unwind(AssertUnwindSafe(|| job.run()));
            if let Err(payload) = &result {
                error!(
                    "Worker {id}: job {job_id} panicked: {}",
                    panic_message(&**payload)
                );
            }

            state = shared.lock();
            match result {
                Ok(()) => state.completed += 1,
                Err(_) => state.panicked += 1,
            }
            continue;
        }

        if state.shutdown {
            break;
        }

        state.set_worker_state(id, WorkerState::Idle);
        state.idle_threads += 1;
        state = shared.wait(state);
        state.idle_threads -= 1;
    }

    state.set_worker_state(id, WorkerState::Exiting);
    state.live_threads -= 1;
    debug!("Worker {id}: pool shut down, exiting");
}
