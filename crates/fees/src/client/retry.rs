//! Backoff-driven retry executor.
//!
//! Re-executes a fallible operation, classifying which failures are worth
//! retrying. Delays grow by `backoff_multiplier` up to `max_delay`. The
//! classification defaults to [`FeeError::is_retryable`] and can be
//! overridden per policy.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::FeeError;
use crate::time::{Sleeper, TokioSleeper};

/// Default number of retries after the initial attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Default upper bound on a single delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Default backoff multiplier.
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Retry policy configuration. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct RetryPolicyConfig {
    /// Retries after the initial attempt (total attempts = retries + 1).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

type RetryPredicate = Arc<dyn Fn(&FeeError) -> bool + Send + Sync>;

/// Retry executor with exponential backoff.
pub struct RetryPolicy {
    config: RetryPolicyConfig,
    retryable: RetryPredicate,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryPolicy {
    /// Create a policy with default settings.
    pub fn new() -> Self {
        Self::with_config(RetryPolicyConfig::default())
    }

    /// Create a policy with custom configuration.
    pub fn with_config(config: RetryPolicyConfig) -> Self {
        Self {
            config,
            retryable: Arc::new(|error: &FeeError| error.is_retryable()),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the retry classification.
    pub fn with_retryable<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&FeeError) -> bool + Send + Sync + 'static,
    {
        self.retryable = Arc::new(predicate);
        self
    }

    /// Replace the delay source.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run `operation`, retrying on transient failures.
    ///
    /// Returns the first success, or the last error once the attempts are
    /// exhausted or the error is classified as not retryable. Rethrow is
    /// immediate in both cases, with no trailing delay.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, FeeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FeeError>>,
    {
        let mut delay = self.config.initial_delay;
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.config.max_retries || !(self.retryable)(&error) {
                        debug!("Giving up after {} attempt(s): {error}", attempt + 1);
                        return Err(error);
                    }

                    warn!(
                        "Attempt {} failed ({error}), retrying in {:?}",
                        attempt + 1,
                        delay
                    );
                    self.sleeper.sleep(delay).await;
                    delay = next_delay(delay, self.config.backoff_multiplier, self.config.max_delay);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

fn next_delay(current: Duration, multiplier: f64, max: Duration) -> Duration {
    current.mul_f64(multiplier).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::test_support::RecordingSleeper;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn policy(config: RetryPolicyConfig) -> (RetryPolicy, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::new());
        let policy = RetryPolicy::with_config(config).with_sleeper(sleeper.clone());
        (policy, sleeper)
    }

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let (policy, sleeper) = policy(RetryPolicyConfig::default());

        let result = policy
            .execute(|| async { Ok::<u32, FeeError>(7) })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_backoff_sequence_is_capped() {
        let (policy, sleeper) = policy(RetryPolicyConfig {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(800),
            backoff_multiplier: 2.0,
        });

        let result = policy
            .execute(|| async { Err::<(), FeeError>(FeeError::Http { status: 503 }) })
            .await;

        assert!(result.is_err());
        assert_eq!(
            sleeper.recorded(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(800),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_retryable_error_rethrows_immediately() {
        let (policy, sleeper) = policy(RetryPolicyConfig::default());

        let attempts = AtomicUsize::new(0);
        let result = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), FeeError>(FeeError::NotFound)
            })
            .await;

        assert!(matches!(result, Err(FeeError::NotFound)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_retryable_errors_are_reattempted() {
        let (policy, _sleeper) = policy(RetryPolicyConfig::default());

        let attempts = AtomicUsize::new(0);
        let result = policy
            .execute(|| async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FeeError::Network("connection refused".to_string()))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_error() {
        let (policy, sleeper) = policy(RetryPolicyConfig {
            max_retries: 2,
            ..Default::default()
        });

        let attempts = AtomicUsize::new(0);
        let result = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), FeeError>(FeeError::RateLimited)
            })
            .await;

        assert!(matches!(result, Err(FeeError::RateLimited)));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_default_classification_matches_error_taxonomy() {
        let (policy, _sleeper) = policy(RetryPolicyConfig {
            max_retries: 1,
            ..Default::default()
        });

        // 503 is retried once, then the last error comes back.
        let attempts = AtomicUsize::new(0);
        policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), FeeError>(FeeError::Http { status: 503 })
            })
            .await
            .ok();
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        // 429 is retried.
        let attempts = AtomicUsize::new(0);
        policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), FeeError>(FeeError::RateLimited)
            })
            .await
            .ok();
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        // 404 is not.
        let attempts = AtomicUsize::new(0);
        policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), FeeError>(FeeError::NotFound)
            })
            .await
            .ok();
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_predicate_overrides_default() {
        let (policy, _sleeper) = policy(RetryPolicyConfig {
            max_retries: 1,
            ..Default::default()
        });
        let policy = policy.with_retryable(|_| false);

        let attempts = AtomicUsize::new(0);
        let result = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), FeeError>(FeeError::Timeout)
            })
            .await;

        assert!(matches!(result, Err(FeeError::Timeout)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
