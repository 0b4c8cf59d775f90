#![deny(missing_docs)]

//! A bounded worker-thread pool that grows lazily.
//!
//! A [`DynamicThreadPool`] starts with a configured number of worker
//! threads and spawns more on demand, up to a fixed maximum, reusing idle
//! workers before spawning new ones. Every worker is joined on shutdown.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use growpool::{DynamicThreadPool, JobOutcome};
//!
//! let pool = DynamicThreadPool::create(4, 2).unwrap();
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! let handle = pool
//!     .submit_with_handle(
//!         |counter: Arc<AtomicUsize>| counter.fetch_add(1, Ordering::SeqCst) + 1,
//!         Arc::clone(&counter),
//!     )
//!     .unwrap();
//! assert_eq!(handle.wait(), JobOutcome::Completed(1));
//!
//! pool.shutdown().unwrap();
//! assert_eq!(pool.stats().live_threads, 0);
//! ```

mod config;
mod error;
/// Thread pool implementation.
pub mod thread_pool;

pub use config::{PoolConfig, ShutdownPolicy};
pub use error::{PoolError, Result};
pub use thread_pool::{
    DynamicThreadPool, JobHandle, JobOutcome, PoolStats, ShutdownReport, ThreadPool,
};
