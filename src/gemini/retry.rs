// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded exponential backoff around a fallible async attempt

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry configuration for outbound calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts before giving up
    pub max_retries: u32,
    /// Delay after the first failed attempt; doubles after each further failure
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Number of attempts actually made; a zero budget still makes one call
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

/// Result of a single attempt, tagged for the retry driver
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    /// The attempt produced a usable value
    Success(T),
    /// Transient failure; another attempt may succeed
    Retryable(E),
    /// Permanent failure; retrying cannot help
    Fatal(E),
}

/// Terminal failure of a retry loop
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Failure observed on the final attempt
        last: E,
    },
    /// An attempt failed with a fatal error and the loop stopped
    Fatal {
        /// Attempt on which the fatal error occurred
        attempt: u32,
        /// The error itself
        error: E,
    },
}

/// Drive `attempt_fn` until it succeeds, fails fatally, or the budget runs out
///
/// `attempt_fn` receives the 1-based attempt number. Between retryable
/// failures the driver sleeps `initial_delay`, then `2 * initial_delay`, and so
/// on. The sleep suspends only the calling task.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut attempt_fn: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match attempt_fn(attempt).await {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::Fatal(error) => return Err(RetryError::Fatal { attempt, error }),
            AttemptOutcome::Retryable(error) => {
                if attempt >= attempts {
                    warn!("Attempt {}/{} failed, giving up: {}", attempt, attempts, error);
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt, attempts, error, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
