use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};

/// The boxed callable a worker runs.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// A queued unit of work.
///
/// A job has exactly one owner at a time: the submitter, then the queue,
/// then the worker that dequeued it. It is dropped right after it runs,
/// or without running if the pool discards it at shutdown.
pub(crate) struct Job {
    id: u64,
    task: Task,
}

impl Job {
    pub(crate) fn new(id: u64, task: Task) -> Self {
        Job { id, task }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Consumes the job and runs its callable on the current thread.
    pub(crate) fn run(self) {
        (self.task)()
    }
}

/// Binds a callable to its argument.
pub(crate) fn bind<F, A>(f: F, arg: A) -> Task
where
    F: FnOnce(A) + Send + 'static,
    A: Send + 'static,
{
    Box::new(move || f(arg))
}

/// Binds a callable to its argument and wires its result to a [`JobHandle`].
///
/// A panic inside `f` is reported through the handle and then resumed, so
/// the worker still sees and counts it.
pub(crate) fn bind_with_handle<F, A, R>(f: F, arg: A) -> (Task, JobHandle<R>)
where
    F: FnOnce(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    let task: Task = Box::new(move || {
        match panic::catch_unwind(AssertUnwindSafe(move || f(arg))) {
            Ok(value) => {
                let _ = tx.send(JobOutcome::Completed(value));
            }
            Err(payload) => {
                let _ = tx.send(JobOutcome::Panicked(panic_message(&*payload)));
                panic::resume_unwind(payload);
            }
        }
    });
    (task, JobHandle { rx })
}

/// Extracts the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

/// How a job submitted with a handle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome<R> {
    /// The job ran and returned a value.
    Completed(R),
    /// The job panicked; carries the panic message.
    Panicked(String),
    /// The pool shut down before the job was dequeued.
    Discarded,
}

/// Receives the outcome of a job submitted with
/// [`DynamicThreadPool::submit_with_handle`](crate::DynamicThreadPool::submit_with_handle).
#[derive(Debug)]
pub struct JobHandle<R> {
    rx: Receiver<JobOutcome<R>>,
}

impl<R> JobHandle<R> {
    /// Blocks until the job has completed, panicked or been discarded.
    pub fn wait(self) -> JobOutcome<R> {
        self.rx.recv().unwrap_or(JobOutcome::Discarded)
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<JobOutcome<R>> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(JobOutcome::Discarded),
        }
    }

    /// Returns the outcome if the job has finished, without blocking.
    pub fn try_outcome(&self) -> Option<JobOutcome<R>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(JobOutcome::Discarded),
        }
    }
}
