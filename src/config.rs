use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PoolError, Result};

const DEFAULT_INITIAL_THREADS: usize = 1;
const DEFAULT_THREAD_NAME: &str = "pool-worker";

/// What happens to jobs still queued when the pool shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Queued jobs are dropped without running and reported as discarded.
    #[default]
    Discard,
    /// Workers keep running queued jobs until the queue is empty.
    Drain,
}

/// Configuration of a [`DynamicThreadPool`](crate::DynamicThreadPool).
///
/// Every field has a default, so a JSON file only needs the fields it
/// wants to override:
///
/// ```json
/// { "max_threads": 8, "initial_threads": 2, "shutdown_policy": "drain" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on live worker threads.
    pub max_threads: usize,
    /// Workers spawned eagerly by `create`.
    pub initial_threads: usize,
    /// Prefix for worker thread names; the worker id is appended.
    pub thread_name: String,
    /// Stack size for worker threads, in bytes. `None` uses the platform default.
    pub stack_size: Option<usize>,
    /// Policy for jobs still queued at shutdown.
    pub shutdown_policy: ShutdownPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let max_threads = num_cpus::get().max(1);
        PoolConfig {
            max_threads,
            initial_threads: DEFAULT_INITIAL_THREADS,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
            shutdown_policy: ShutdownPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Creates a configuration with the given limits and defaults elsewhere.
    pub fn new(max_threads: usize, initial_threads: usize) -> Self {
        PoolConfig {
            max_threads,
            initial_threads,
            ..PoolConfig::default()
        }
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: PoolConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Sets the thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the worker stack size.
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Sets the shutdown policy.
    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    /// Checks `0 < initial_threads <= max_threads`.
    pub fn validate(&self) -> Result<()> {
        if self.max_threads == 0 {
            return Err(PoolError::InvalidArgument(
                "max_threads must be greater than zero".to_owned(),
            ));
        }
        if self.initial_threads == 0 || self.initial_threads > self.max_threads {
            return Err(PoolError::InvalidArgument(format!(
                "initial_threads must be in 1..={}, got {}",
                self.max_threads, self.initial_threads
            )));
        }
        if self.thread_name.as_bytes().contains(&0) {
            return Err(PoolError::InvalidArgument(
                "thread name must not contain null bytes".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_limits() {
        assert!(matches!(
            PoolConfig::new(0, 0).validate(),
            Err(PoolError::InvalidArgument(_))
        ));
        assert!(matches!(
            PoolConfig::new(4, 0).validate(),
            Err(PoolError::InvalidArgument(_))
        ));
        assert!(matches!(
            PoolConfig::new(2, 3).validate(),
            Err(PoolError::InvalidArgument(_))
        ));
        assert!(PoolConfig::new(1, 1).validate().is_ok());
        assert!(PoolConfig::new(8, 8).validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: PoolConfig =
            serde_json::from_str(r#"{ "max_threads": 6, "shutdown_policy": "drain" }"#).unwrap();
        assert_eq!(config.max_threads, 6);
        assert_eq!(config.initial_threads, DEFAULT_INITIAL_THREADS);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.stack_size, None);
        assert_eq!(config.shutdown_policy, ShutdownPolicy::Drain);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let res = serde_json::from_str::<PoolConfig>(r#"{ "shutdown_policy": "finish" }"#);
        assert!(res.is_err());
    }
}
