//! Bounded retry with linear backoff.
//!
//! One policy type is shared by the session manager, the extractors and the
//! store. Attempts run sequentially; after failed attempt `n` the policy
//! sleeps `base_delay * n` before attempt `n + 1`. Errors that are not
//! retryable are returned immediately.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Classifies errors as transient (worth another attempt) or not.
pub trait Retryable {
    /// True if another attempt may succeed.
    fn is_retryable(&self) -> bool;
}

/// Maximum attempts plus the base of the linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay unit; the wait after attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay slept after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `op` under this policy using the error's own [`Retryable`] verdict.
    ///
    /// `op` receives the 1-based attempt number. Each attempt must release
    /// whatever it acquired before returning.
    pub async fn run<T, E, F, Fut>(&self, label: &str, op: F) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_if(label, Retryable::is_retryable, op).await
    }

    /// Run `op` under this policy with an explicit retryable-error predicate.
    pub async fn run_if<T, E, P, F, Fut>(
        &self,
        label: &str,
        is_retryable: P,
        mut op: F,
    ) -> Result<T, E>
    where
        E: Display,
        P: Fn(&E) -> bool,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !is_retryable(&e) => {
                    warn!("{} failed with non-retryable error: {}", label, e);
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    error!("{} failed after {} attempts: {}", label, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                        label, attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2), Duration::from_secs(10));
        assert_eq!(policy.delay_after(3), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_makes_exactly_max_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), TestError> = RetryPolicy::new(3, Duration::from_secs(2))
            .run("always failing", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Transient)
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), TestError::Transient);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = RetryPolicy::new(3, Duration::from_secs(2))
            .run("flaky", |attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(TestError::Transient)
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_propagates_immediately() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), TestError> = RetryPolicy::new(3, Duration::from_secs(2))
            .run("fatal", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Fatal)
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), TestError::Fatal);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_attempts() {
        let start = tokio::time::Instant::now();

        let _: Result<(), TestError> = RetryPolicy::new(3, Duration::from_secs(2))
            .run("timed", |_| async { Err(TestError::Transient) })
            .await;

        // 2s after attempt 1, 4s after attempt 2, nothing after the last
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_runs_once() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let _: Result<(), TestError> = RetryPolicy::new(0, Duration::from_secs(1))
            .run("zero", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Transient)
                }
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_predicate() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), &str> = RetryPolicy::new(4, Duration::from_millis(10))
            .run_if(
                "predicate",
                |e: &&str| *e == "again",
                |_| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err("again")
                    }
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }
}
