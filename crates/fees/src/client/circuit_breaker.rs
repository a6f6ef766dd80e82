//! Circuit breaker guarding the fee engine.
//!
//! Tracks consecutive failures against the engine and fails fast once it
//! is deemed unhealthy. The circuit has three states:
//!
//! - **Closed**: normal operation, calls go through.
//! - **Open**: the engine is failing, calls are rejected without being made.
//! - **HalfOpen**: testing recovery with trial calls.
//!
//! One instance guards one downstream dependency. State is in-memory and
//! resets on process restart.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::errors::FeeError;
use crate::time::{Clock, SystemClock};

/// Default number of failures before opening the circuit.
const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time to wait before a trial call is allowed through.
const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of trial successes needed to close the circuit.
const DEFAULT_SUCCESS_THRESHOLD: u32 = 3;

/// Default window within which consecutive failures must fall to open.
const DEFAULT_MONITORING_PERIOD: Duration = Duration::from_secs(120);

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    /// Normal operation - calls go through.
    Closed,
    /// The engine is failing - calls are rejected without being made.
    Open {
        /// When the circuit opened (or last re-opened).
        since: Instant,
    },
    /// Testing recovery - calls go through while successes accumulate.
    HalfOpen {
        /// Consecutive trial successes so far.
        successes: u32,
    },
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open { .. } => write!(f, "Open"),
            Self::HalfOpen { .. } => write!(f, "HalfOpen"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Number of failures before opening the circuit.
    pub failure_threshold: u32,
    /// Time to wait before testing recovery.
    pub recovery_timeout: Duration,
    /// Number of trial successes needed to close from HalfOpen.
    pub success_threshold: u32,
    /// Failures only count toward opening while they arrive within this
    /// window of the previous one.
    pub monitoring_period: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            monitoring_period: DEFAULT_MONITORING_PERIOD,
        }
    }
}

/// Internal breaker bookkeeping.
#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

impl Breaker {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
        }
    }
}

/// Circuit breaker for the fee engine.
///
/// Shared across every concurrent call; each state transition happens
/// under the lock with no `await` point interposed, so transitions are
/// atomic with respect to other logical tasks.
pub struct CircuitBreaker {
    inner: Mutex<Breaker>,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    /// Create a breaker with default settings.
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom configuration.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a breaker with a custom time source.
    pub fn with_clock(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Breaker::new()),
            config,
            clock,
        }
    }

    /// Lock the breaker state, recovering from poison if necessary.
    ///
    /// The worst case of recovering is a slightly incorrect circuit
    /// state, which beats panicking.
    fn lock(&self) -> MutexGuard<'_, Breaker> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Run `operation` under the breaker.
    ///
    /// While the circuit is open and the recovery timeout has not
    /// elapsed, the operation is not invoked and
    /// [`FeeError::CircuitOpen`] is returned with no counter mutation.
    /// Once the timeout elapses the circuit moves to HalfOpen and the
    /// call becomes a trial. The operation's own error is always
    /// propagated; the breaker never swallows it.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, FeeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FeeError>>,
    {
        self.before_call()?;

        match operation().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(error) => {
                self.on_failure();
                Err(error)
            }
        }
    }

    fn before_call(&self) -> Result<(), FeeError> {
        let now = self.clock.now();
        let mut breaker = self.lock();

        if let CircuitState::Open { since } = breaker.state {
            if now.duration_since(since) <= self.config.recovery_timeout {
                debug!("Circuit breaker: open, rejecting call to the fee engine");
                return Err(FeeError::CircuitOpen);
            }
            info!("Circuit breaker: recovery timeout elapsed, letting a trial call through");
            breaker.state = CircuitState::HalfOpen { successes: 0 };
        }

        Ok(())
    }

    fn on_success(&self) {
        let mut breaker = self.lock();
        breaker.failure_count = 0;

        if let CircuitState::HalfOpen { successes } = breaker.state {
            let successes = successes + 1;
            if successes >= self.config.success_threshold {
                info!("Circuit breaker: closing after {successes} trial successes");
                breaker.state = CircuitState::Closed;
            } else {
                debug!(
                    "Circuit breaker: trial success {successes}/{}",
                    self.config.success_threshold
                );
                breaker.state = CircuitState::HalfOpen { successes };
            }
        }
    }

    fn on_failure(&self) {
        let now = self.clock.now();
        let mut breaker = self.lock();

        let previous_failure = breaker.last_failure.replace(now);
        breaker.failure_count += 1;

        match breaker.state {
            CircuitState::HalfOpen { .. } => {
                // A single failed trial aborts recovery.
                warn!("Circuit breaker: trial call failed, reopening");
                breaker.state = CircuitState::Open { since: now };
            }
            CircuitState::Closed => {
                let within_window = previous_failure
                    .map(|at| now.duration_since(at) <= self.config.monitoring_period)
                    .unwrap_or(true);

                if breaker.failure_count >= self.config.failure_threshold && within_window {
                    warn!(
                        "Circuit breaker: opening after {} failures",
                        breaker.failure_count
                    );
                    breaker.state = CircuitState::Open { since: now };
                } else {
                    debug!(
                        "Circuit breaker: failure {}/{}",
                        breaker.failure_count, self.config.failure_threshold
                    );
                }
            }
            CircuitState::Open { .. } => {}
        }
    }

    /// Current state, for health reporting.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Whether the circuit is currently open.
    pub fn is_open(&self) -> bool {
        matches!(self.lock().state, CircuitState::Open { .. })
    }

    /// Number of recorded failures since the last success.
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Force the circuit closed and zero the counters.
    pub fn reset(&self) {
        let mut breaker = self.lock();
        info!("Circuit breaker: manually reset");
        breaker.state = CircuitState::Closed;
        breaker.failure_count = 0;
        breaker.last_failure = None;
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::test_support::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn breaker_with(config: CircuitBreakerConfig) -> (CircuitBreaker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let breaker = CircuitBreaker::with_clock(config, clock.clone());
        (breaker, clock)
    }

    async fn fail(breaker: &CircuitBreaker) -> Result<(), FeeError> {
        breaker
            .execute(|| async { Err::<(), FeeError>(FeeError::Http { status: 503 }) })
            .await
    }

    async fn succeed(breaker: &CircuitBreaker) -> Result<(), FeeError> {
        breaker.execute(|| async { Ok::<(), FeeError>(()) }).await
    }

    #[tokio::test]
    async fn test_circuit_starts_closed() {
        let (breaker, _clock) = breaker_with(CircuitBreakerConfig::default());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(!breaker.is_open());
        assert!(succeed(&breaker).await.is_ok());
    }

    #[tokio::test]
    async fn test_circuit_opens_after_threshold() {
        let (breaker, _clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 3,
            ..Default::default()
        });

        assert!(fail(&breaker).await.is_err());
        assert!(fail(&breaker).await.is_err());
        assert!(!breaker.is_open());

        assert!(fail(&breaker).await.is_err());
        assert!(breaker.is_open());
    }

    #[tokio::test]
    async fn test_stale_failures_do_not_open() {
        let (breaker, clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 3,
            monitoring_period: Duration::from_secs(120),
            ..Default::default()
        });

        fail(&breaker).await.ok();
        clock.advance(Duration::from_secs(1));
        fail(&breaker).await.ok();

        // The third failure arrives long after the second.
        clock.advance(Duration::from_secs(200));
        fail(&breaker).await.ok();

        assert!(!breaker.is_open());
        assert_eq!(breaker.failure_count(), 3);
    }

    #[tokio::test]
    async fn test_open_circuit_fails_fast_without_invoking() {
        let (breaker, _clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 1,
            ..Default::default()
        });

        fail(&breaker).await.ok();
        assert!(breaker.is_open());

        let invoked = AtomicUsize::new(0);
        let result = breaker
            .execute(|| async {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok::<(), FeeError>(())
            })
            .await;

        assert!(matches!(result, Err(FeeError::CircuitOpen)));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recovery_timeout_lets_a_trial_through() {
        let (breaker, clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::from_secs(60),
            ..Default::default()
        });

        fail(&breaker).await.ok();
        assert!(breaker.is_open());

        clock.advance(Duration::from_secs(61));

        let invoked = AtomicUsize::new(0);
        let result = breaker
            .execute(|| async {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok::<(), FeeError>(())
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
        assert_eq!(breaker.state(), CircuitState::HalfOpen { successes: 1 });
    }

    #[tokio::test]
    async fn test_trial_failure_reopens_immediately() {
        let (breaker, clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::from_secs(60),
            ..Default::default()
        });

        fail(&breaker).await.ok();
        clock.advance(Duration::from_secs(61));

        assert!(fail(&breaker).await.is_err());
        assert!(breaker.is_open());
    }

    #[tokio::test]
    async fn test_success_threshold_closes_the_circuit() {
        let (breaker, clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 3,
            ..Default::default()
        });

        fail(&breaker).await.ok();
        clock.advance(Duration::from_secs(61));

        succeed(&breaker).await.ok();
        succeed(&breaker).await.ok();
        assert_eq!(breaker.state(), CircuitState::HalfOpen { successes: 2 });

        succeed(&breaker).await.ok();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let (breaker, _clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 3,
            ..Default::default()
        });

        fail(&breaker).await.ok();
        fail(&breaker).await.ok();
        assert_eq!(breaker.failure_count(), 2);

        succeed(&breaker).await.ok();
        assert_eq!(breaker.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_operation_error_is_propagated_unchanged() {
        let (breaker, _clock) = breaker_with(CircuitBreakerConfig::default());
        let result = breaker
            .execute(|| async { Err::<(), FeeError>(FeeError::Timeout) })
            .await;
        assert!(matches!(result, Err(FeeError::Timeout)));
    }

    #[tokio::test]
    async fn test_manual_reset() {
        let (breaker, _clock) = breaker_with(CircuitBreakerConfig {
            failure_threshold: 1,
            ..Default::default()
        });

        fail(&breaker).await.ok();
        assert!(breaker.is_open());

        breaker.reset();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
        assert!(succeed(&breaker).await.is_ok());
    }
}
