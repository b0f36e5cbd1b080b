//! Timeout and cancellation utilities for symbol enumeration.
//!
//! Enumeration drains an engine-provided stream on whichever thread calls it.
//! [`EnumerationGuard`] is checked between symbols so a slow or runaway engine
//! can be stopped either by a deadline or by a [`CancellationToken`].

use crate::error::{Result, SymbolViewError};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Default time guard for a single enumeration, in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Shared cancellation flag checked between enumerated symbols.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Timeout configuration for async operations
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Whether to log timeout warnings
    pub log_warnings: bool,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_secs(seconds),
            log_warnings: true,
            operation_name: operation.into(),
        }
    }

    pub fn default_timeout(operation: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, operation)
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        "Starting operation '{}' with timeout of {}s",
        config.operation_name,
        config.duration.as_secs()
    );

    match timeout(config.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            if config.log_warnings {
                error!(
                    "Operation '{}' timed out after {}s",
                    config.operation_name,
                    config.duration.as_secs()
                );
            }

            Err(SymbolViewError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}

/// Per-symbol guard for draining an enumeration stream.
///
/// Cancellation is observed on every check; the wall clock is only sampled
/// every `check_interval` symbols. A guard built with zero seconds has no
/// deadline.
pub struct EnumerationGuard {
    start: Instant,
    max_duration: Option<Duration>,
    check_interval: usize,
    iteration_count: usize,
    token: Option<CancellationToken>,
    operation_name: String,
}

impl EnumerationGuard {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            max_duration: (seconds > 0).then(|| Duration::from_secs(seconds)),
            check_interval: 1024,
            iteration_count: 0,
            token: None,
            operation_name: operation.into(),
        }
    }

    /// Set the check interval (how often to sample the clock)
    pub fn with_check_interval(mut self, interval: usize) -> Self {
        self.check_interval = interval.max(1);
        self
    }

    /// Replace the deadline with a sub-second one
    pub fn with_max_duration(mut self, max: Duration) -> Self {
        self.max_duration = Some(max);
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Check cancellation and the deadline. Call once per drained symbol.
    pub fn check(&mut self) -> Result<()> {
        self.iteration_count += 1;

        if let Some(token) = &self.token {
            if token.is_cancelled() {
                debug!(
                    "Operation '{}' cancelled after {} symbols",
                    self.operation_name, self.iteration_count
                );
                return Err(SymbolViewError::Cancelled);
            }
        }

        if self.iteration_count % self.check_interval == 0 {
            let elapsed = self.start.elapsed();

            if self.max_duration.is_some_and(|max| elapsed > max) {
                error!(
                    "Operation '{}' timed out after {} symbols and {:?}",
                    self.operation_name, self.iteration_count, elapsed
                );

                return Err(SymbolViewError::Timeout {
                    seconds: elapsed.as_secs(),
                });
            }

            if elapsed.as_secs() > 30 && self.iteration_count % (self.check_interval * 10) == 0 {
                warn!(
                    "Operation '{}' still running after {} symbols ({:?})",
                    self.operation_name, self.iteration_count, elapsed
                );
            }
        }

        Ok(())
    }

    /// Number of symbols checked so far
    pub fn iterations(&self) -> usize {
        self.iteration_count
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
