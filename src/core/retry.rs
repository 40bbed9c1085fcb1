//! Fixed-budget retry driver.
//!
//! Runs an async operation up to `max_attempts` times with a constant delay
//! between attempts. No backoff growth and no jitter.
//!
//! ```text
//! Attempting{n} --ok--> Succeeded
//!       |
//!      err, n == max --> ExhaustedRetries
//!       |
//!      err, n <  max --> sleep(delay) --> Attempting{n+1}
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::AlertError;

/// Retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Waiting on attempt number `attempt` (1-based).
    Attempting { attempt: u32 },
    Succeeded,
    /// Terminal: the budget is spent.
    ExhaustedRetries,
}

impl RetryState {
    /// Advance after an attempt finished.
    #[must_use]
    pub const fn next(self, policy: &RetryPolicy, succeeded: bool) -> Self {
        match self {
            Self::Attempting { attempt } => {
                if succeeded {
                    Self::Succeeded
                } else if attempt >= policy.max_attempts {
                    Self::ExhaustedRetries
                } else {
                    Self::Attempting {
                        attempt: attempt + 1,
                    }
                }
            }
            terminal => terminal,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Attempting { .. })
    }
}

/// Result of a driver run.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: AlertError },
}

impl<T> RetryOutcome<T> {
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// Collapse into a `Result`, mapping exhaustion to `RetryBudgetExhausted`.
    ///
    /// # Errors
    ///
    /// Returns `RetryBudgetExhausted` when every attempt failed.
    pub fn into_result(self) -> crate::error::Result<T> {
        match self {
            Self::Succeeded { value, .. } => Ok(value),
            Self::Exhausted {
                attempts,
                last_error,
            } => Err(AlertError::RetryBudgetExhausted {
                attempts,
                last_error: Box::new(last_error),
            }),
        }
    }
}

/// Run `op` under `policy` until it succeeds or the budget is spent.
///
/// `op` receives the 1-based attempt number. A policy with `max_attempts == 0`
/// still makes one attempt.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = crate::error::Result<T>>,
{
    let policy = RetryPolicy {
        max_attempts: policy.max_attempts.max(1),
        ..*policy
    };
    let mut attempt = 1;

    loop {
        let start = Instant::now();
        let result = op(attempt).await;
        let duration_ms = start.elapsed().as_millis();

        let state = RetryState::Attempting { attempt }.next(&policy, result.is_ok());

        match (result, state) {
            (Ok(value), _) => {
                tracing::debug!(attempt, duration_ms, "Attempt succeeded");
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            (Err(e), RetryState::Attempting { attempt: next }) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_secs = policy.delay.as_secs_f64(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt = next;
            }
            (Err(e), _) => {
                tracing::error!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Attempt failed, retry budget exhausted"
                );
                return RetryOutcome::Exhausted {
                    attempts: attempt,
                    last_error: e,
                };
            }
        }
    }
}
