use crate::Result;

/// A thread pool for executing jobs concurrently.
///
/// Implementors manage a pool of worker threads and distribute
/// incoming jobs across them.
pub trait ThreadPool {
    /// Creates a new thread pool that runs at most `threads` jobs at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created (e.g., invalid size).
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Spawns a function into the thread pool.
    ///
    /// The function will be executed by one of the threads in the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool no longer accepts jobs.
    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;
}

mod dynamic;
mod job;
mod queue;
mod state;
mod worker;

pub use self::dynamic::{DynamicThreadPool, ShutdownReport};
pub use self::job::{JobHandle, JobOutcome};
pub use self::state::PoolStats;
