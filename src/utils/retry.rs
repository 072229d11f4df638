//! Explicit retry wrapper for operations exposed to rare write races.
//!
//! A [`RetryPolicy`] names how many times to retry and which
//! [`ErrorKind`]s are worth retrying. Call sites opt in by wrapping the whole
//! operation:
//!
//! ```ignore
//! let policy = RetryPolicy::new(3, [ErrorKind::DuplicateKeyConflict])?;
//! let link = policy.run(|| async { create_link().await }).await?;
//! ```
//!
//! The operation is re-executed from scratch on every attempt, so anything
//! derived inside it (a fresh key, a fresh code) is derived again.

use std::collections::HashSet;
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

use crate::error::{AppError, ErrorKind};

/// Retry configuration. Construct it with [`RetryPolicy::new`], which
/// rejects policies that could never retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    retry_on: HashSet<ErrorKind>,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing up to `max_retries` retries on failures whose
    /// cause chain contains one of `retry_on`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if `max_retries` is 0 or
    /// `retry_on` is empty.
    pub fn new(
        max_retries: usize,
        retry_on: impl IntoIterator<Item = ErrorKind>,
    ) -> Result<Self, AppError> {
        if max_retries == 0 {
            return Err(AppError::configuration(
                "retry policy max_retries must be greater than 0",
            ));
        }

        let retry_on: HashSet<ErrorKind> = retry_on.into_iter().collect();
        if retry_on.is_empty() {
            return Err(AppError::configuration(
                "retry policy must name at least one retryable error kind",
            ));
        }

        Ok(Self {
            max_retries,
            retry_on,
            delay: Duration::ZERO,
        })
    }

    /// The policy used around short URL creation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if `max_retries` is 0.
    pub fn on_duplicate_key(max_retries: usize) -> Result<Self, AppError> {
        Self::new(max_retries, [ErrorKind::DuplicateKeyConflict])
    }

    /// Sets a fixed pause between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Returns true if `err` or any error in its `source()` chain has a
    /// retryable kind.
    pub fn is_retryable(&self, err: &(dyn StdError + 'static)) -> bool {
        std::iter::successors(Some(err), |e| (*e).source())
            .filter_map(|e| e.downcast_ref::<AppError>())
            .any(|e| self.retry_on.contains(&e.kind()))
    }

    /// Runs `operation`, re-running it while it fails with a retryable error
    /// and the retry budget lasts.
    ///
    /// Makes at most `1 + max_retries` attempts. The final failure is
    /// returned exactly as the operation produced it.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StdError + 'static,
    {
        let strategy = FixedInterval::new(self.delay).take(self.max_retries);
        let mut failures = 0usize;

        let condition = |err: &E| {
            failures += 1;
            let retryable = self.is_retryable(err);

            if !retryable {
                debug!(error = %err, "Failure is not retryable");
            } else if failures <= self.max_retries {
                metrics::counter!("retry_attempts_total").increment(1);
                warn!(
                    attempt = failures,
                    max_retries = self.max_retries,
                    error = %err,
                    "Retryable failure, retrying"
                );
            } else {
                warn!(attempts = failures, error = %err, "Retry budget exhausted");
            }

            retryable
        };

        RetryIf::spawn(strategy, operation, condition).await
    }
}
