//! Bounded retry policy.
//!
//! Wraps `tokio_retry` so that every retried operation in the pipeline uses the
//! same shape: a fixed number of extra attempts separated by a fixed backoff,
//! and a record of how many attempts were actually made.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    /// Pause before each retry.
    pub backoff: Duration,
}

/// Result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// Final result: the first success, or the last error.
    pub result: Result<T, E>,
    /// Attempts made, including the final one.
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self { retries, backoff }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        FixedInterval::new(self.backoff).take(self.retries as usize)
    }

    /// Runs `operation` until it succeeds or the attempt budget is spent.
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = AtomicU32::new(0);
        let result = Retry::spawn(self.strategy(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            operation(attempt)
        })
        .await;

        RetryOutcome {
            result,
            attempts: attempts.load(Ordering::SeqCst),
        }
    }
}
