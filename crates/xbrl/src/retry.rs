//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use xbrl_core::{Result, XbrlError};

/// Retry policy applied around upstream calls.
///
/// Only errors with [`XbrlError::is_retryable`] are retried. The delay before
/// retry `n` (0-based) is the error's `retry_after` if it carries one,
/// otherwise `base_delay * 2^n`, and never more than `max_delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 behave as 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sets the total number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Returns the delay before retry `attempt` (0-based) after `error`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &XbrlError) -> Duration {
        let delay = error.retry_after().unwrap_or_else(|| {
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt))
        });
        delay.min(self.max_delay)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. The last error is returned unchanged.
    ///
    /// # Errors
    /// Returns the error from the final attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt, &e);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "Retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn transient() -> XbrlError {
        XbrlError::TransientNetwork("connection reset".to_string())
    }

    #[test]
    fn test_delay_for_backoff_and_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, &transient()), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1, &transient()), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, &transient()), Duration::from_secs(2));
        assert_eq!(policy.delay_for(10, &transient()), Duration::from_secs(30));
        assert_eq!(policy.delay_for(40, &transient()), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_for_honours_retry_after() {
        let policy = RetryPolicy::default();
        let limited = XbrlError::RateLimited {
            provider: "SEC EDGAR".to_string(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(policy.delay_for(0, &limited), Duration::from_secs(7));

        let long = XbrlError::RateLimited {
            provider: "SEC EDGAR".to_string(),
            retry_after: Some(Duration::from_secs(600)),
        };
        assert_eq!(policy.delay_for(0, &long), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run("fetch", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err(transient()) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 500ms then 1s
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = RetryPolicy::default()
            .run("fetch", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;

        assert!(matches!(result, Err(XbrlError::TransientNetwork(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = RetryPolicy::default()
            .run("fetch", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(XbrlError::NotFound("CIK0000000000".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(XbrlError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_policy_single_attempt() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = RetryPolicy::none()
            .run("fetch", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
