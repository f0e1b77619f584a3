use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Calls pass through
    Open,     // Calls are rejected until the cooldown elapses
    HalfOpen, // Trial calls decide between Closed and Open
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: usize,
    /// Consecutive HalfOpen successes that close it again
    pub success_threshold: usize,
    pub cooldown: Duration,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Error type for circuit breaker
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("circuit '{name}' is open, retry in {retry_in:?}")]
    Open { name: String, retry_in: Duration },

    #[error(transparent)]
    Inner(E),
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    consecutive_failures: usize,
    consecutive_successes: usize,
    opened_at: Option<Instant>,
}

/// Stops calling an upstream that keeps failing.
///
/// State lives behind a std mutex that is never held across an await.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Runs `call` unless the circuit is open; its outcome feeds the state machine.
    pub async fn call<F, T, E>(&self, call: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.admit()?;

        match call.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitBreakerError::Inner(e))
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn admit<E>(&self) -> Result<(), CircuitBreakerError<E>> {
        let mut inner = self.lock();
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or(Duration::MAX);
        if elapsed >= self.config.cooldown {
            info!("CircuitBreaker [{}]: Open -> HalfOpen", self.name);
            inner.state = CircuitState::HalfOpen;
            inner.consecutive_successes = 0;
            return Ok(());
        }

        Err(CircuitBreakerError::Open {
            name: self.name.clone(),
            retry_in: self.config.cooldown - elapsed,
        })
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        if inner.state == CircuitState::HalfOpen {
            inner.consecutive_successes += 1;
            if inner.consecutive_successes >= self.config.success_threshold {
                info!(
                    "CircuitBreaker [{}]: HalfOpen -> Closed after {} successes",
                    self.name, inner.consecutive_successes
                );
                inner.state = CircuitState::Closed;
                inner.consecutive_successes = 0;
                inner.opened_at = None;
            }
        }
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        inner.consecutive_successes = 0;

        let trip = match inner.state {
            CircuitState::Closed => inner.consecutive_failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => {
                warn!("CircuitBreaker [{}]: Trial call failed, reopening", self.name);
                true
            }
            CircuitState::Open => false,
        };

        if trip {
            if inner.state == CircuitState::Closed {
                error!(
                    "CircuitBreaker [{}]: Closed -> Open after {} failures",
                    self.name, inner.consecutive_failures
                );
            }
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("CircuitBreaker [{}]: Lock poisoned, recovering", self.name);
                poisoned.into_inner()
            }
        }
    }
}
