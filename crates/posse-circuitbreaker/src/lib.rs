//! Circuit breaker for syndication dispatch.
//!
//! One breaker instance exists per dispatch target and fails fast when that
//! platform looks unhealthy, so a known-down platform is not hammered with
//! retries.
//!
//! ## States
//! - **Closed**: calls pass through, failures are counted within a rolling
//!   window
//! - **Open**: calls fail immediately with [`CircuitBreakerError::Open`]
//! - **HalfOpen**: exactly one probe call is admitted; everyone else fails
//!   fast until the probe resolves
//!
//! The trip policy is count-within-rolling-window (`failure_threshold`
//! failures inside `failure_window`). The open → half-open transition is
//! lazy: it happens on the first call attempted after the cooldown, no
//! background timer involved.
//!
//! # Usage
//!
//! ```rust
//! use posse_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::new(
//!     CircuitBreakerConfig::builder()
//!         .failure_threshold(5)
//!         .cooldown(Duration::from_secs(60))
//!         .name("discord")
//!         .build(),
//! );
//!
//! let result: Result<&str, _> = breaker.call(|| async { Ok::<_, String>("sent") }).await;
//! # let _ = result;
//! # }
//! ```
//!
//! ## Feature flags
//! - `metrics`: call/transition counters and a state gauge via the `metrics` crate
//! - `tracing`: state transitions via the `tracing` crate

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

mod circuit;
mod config;
mod error;
mod events;

pub use circuit::CircuitState;
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;

use circuit::Circuit;

/// A shared, per-platform circuit breaker.
///
/// Cheap to clone; clones share the same circuit state.
#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Inner>,
}

struct Inner {
    circuit: Mutex<Circuit>,
    state_atomic: Arc<AtomicU8>,
    config: CircuitBreakerConfig,
}

/// Frees the half-open probe slot if the probe future is dropped before
/// its outcome is recorded (deadline abandonment).
struct ProbeGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut circuit = self.inner.circuit.lock().expect("circuit lock poisoned");
            circuit.release_probe();
        }
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            inner: Arc::new(Inner {
                circuit: Mutex::new(Circuit::new(Arc::clone(&state_atomic))),
                state_atomic,
                config,
            }),
        }
    }

    /// Runs `op` through the breaker.
    ///
    /// Rejected calls return [`CircuitBreakerError::Open`] without invoking
    /// `op`; permitted calls have their outcome recorded (every `Err`
    /// counts as a failure).
    pub async fn call<T, E, F, Fut>(&self, op: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let was_half_open = {
            let mut circuit = self.inner.circuit.lock().expect("circuit lock poisoned");
            if !circuit.try_acquire(&self.inner.config, Instant::now()) {
                #[cfg(feature = "tracing")]
                tracing::debug!(breaker = %self.inner.config.name, "circuit open, call rejected");
                return Err(CircuitBreakerError::Open);
            }
            circuit.state() == CircuitState::HalfOpen
        };

        let mut guard = ProbeGuard {
            inner: self.inner.as_ref(),
            armed: was_half_open,
        };

        let result = op().await;

        guard.armed = false;
        let mut circuit = self.inner.circuit.lock().expect("circuit lock poisoned");
        match &result {
            Ok(_) => circuit.record_success(&self.inner.config, Instant::now()),
            Err(_) => circuit.record_failure(&self.inner.config, Instant::now()),
        }

        result.map_err(CircuitBreakerError::Inner)
    }

    /// Current state, read lock-free from the atomic mirror.
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.inner.state_atomic.load(Ordering::Acquire))
    }

    /// Whether the breaker is currently open.
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Failures currently within the observation window.
    pub fn failure_count(&self) -> usize {
        let mut circuit = self.inner.circuit.lock().expect("circuit lock poisoned");
        circuit.failure_count(&self.inner.config, Instant::now())
    }

    /// Forces the circuit open (e.g. for maintenance windows).
    pub fn force_open(&self) {
        let mut circuit = self.inner.circuit.lock().expect("circuit lock poisoned");
        circuit.force_open(&self.inner.config, Instant::now());
    }

    /// Forces the circuit closed.
    pub fn force_closed(&self) {
        let mut circuit = self.inner.circuit.lock().expect("circuit lock poisoned");
        circuit.force_closed(&self.inner.config, Instant::now());
    }

    /// Resets the circuit to closed and clears the failure window.
    pub fn reset(&self) {
        self.force_closed();
    }

    /// Name of this breaker instance.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }
}
