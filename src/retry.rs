// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Retry helpers for remote fetches.
///
/// A badge run performs a single short request per source, so the policy is
/// small: a few attempts with exponential backoff capped at a ceiling.
use std::time::Duration;

use masterror::AppError;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff policy applied to a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one (default: 3).
    pub max_attempts:     u32,
    /// Delay before the second attempt in milliseconds (default: 500).
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after each failure (default: 2.0).
    pub backoff_factor:   f64,
    /// Upper bound for a single delay in milliseconds (default: 4000).
    pub max_delay_ms:     u64
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts:     3,
            initial_delay_ms: 500,
            backoff_factor:   2.0,
            max_delay_ms:     4_000
        }
    }
}

impl RetryPolicy {
    /// Policy that performs exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delays slept between consecutive attempts.
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay_ms = self.initial_delay_ms.min(self.max_delay_ms);
        for _ in 1..self.max_attempts.max(1) {
            delays.push(Duration::from_millis(delay_ms));
            delay_ms = ((delay_ms as f64 * self.backoff_factor) as u64).min(self.max_delay_ms);
        }
        delays
    }
}

/// Runs `f` until it succeeds or the policy is exhausted.
///
/// # Errors
///
/// Returns the last error when every attempt fails.
///
/// # Example
///
/// ```no_run
/// use masterror::AppError;
/// use randbadge::retry::{RetryPolicy, retry_with_backoff};
///
/// # async fn example() -> Result<(), AppError> {
/// let body = retry_with_backoff(&RetryPolicy::default(), "stackoverflow feed", || async {
///     Ok::<_, AppError>("<feed/>".to_owned())
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut f: F
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>
{
    let delays = policy.delays();
    let attempts = delays.len() + 1;

    for attempt in 1..=attempts {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(delay) = delays.get(attempt - 1) else {
                    warn!("{} failed after {} attempts: {}", operation_name, attempts, error);
                    return Err(error);
                };
                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name,
                    attempt,
                    attempts,
                    error,
                    delay.as_millis()
                );
                sleep(*delay).await;
            }
        }
    }

    Err(AppError::internal(format!("{operation_name} was never attempted")))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering}
    };

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms: 5,
            backoff_factor: 2.0,
            max_delay_ms: 20
        }
    }

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 4_000);
    }

    #[test]
    fn delays_grow_exponentially_and_respect_ceiling() {
        let policy = RetryPolicy {
            max_attempts:     5,
            initial_delay_ms: 1_000,
            backoff_factor:   3.0,
            max_delay_ms:     5_000
        };
        let delays: Vec<u64> = policy
            .delays()
            .into_iter()
            .map(|delay| delay.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1_000, 3_000, 5_000, 5_000]);
        assert!(RetryPolicy::no_retry().delays().is_empty());
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let result = retry_with_backoff(&fast_policy(3), "test", || async {
            Ok::<_, AppError>(42)
        })
        .await
        .expect("should succeed");
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();

        let result = retry_with_backoff(&fast_policy(3), "test", move || {
            let calls = calls.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(AppError::service("temporary failure"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .expect("should succeed after retries");

        assert_eq!(result, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();

        let result = retry_with_backoff(&fast_policy(2), "test", move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(AppError::service("persistent failure"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
