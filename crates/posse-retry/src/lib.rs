//! Graduated retry for syndication dispatch.
//!
//! Wraps an async operation with a bounded attempt schedule: transient
//! failures consume backoff delays, terminal failures short-circuit
//! immediately and propagate unmodified. Exhaustion carries the full
//! attempt history for the audit trail.
//!
//! # Usage
//!
//! ```rust
//! use posse_retry::{RetryConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy: RetryPolicy<String> = RetryPolicy::new(
//!     RetryConfig::builder()
//!         .max_attempts(3)
//!         .exponential_backoff(Duration::from_millis(100))
//!         .retry_on(|e: &String| e != "permanent")
//!         .build(),
//! );
//!
//! let result = policy.execute(|| async { Ok::<_, String>("sent") }).await;
//! # let _ = result;
//! # }
//! ```
//!
//! ## Feature flags
//! - `metrics`: attempt and exhaustion counters via the `metrics` crate
//! - `tracing`: per-retry logging via the `tracing` crate

use chrono::Utc;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[cfg(feature = "metrics")]
use metrics::counter;

mod backoff;
mod config;
mod error;
mod events;

pub use backoff::{ExponentialBackoff, FixedInterval, FnInterval, IntervalFunction};
pub use config::{RetryConfig, RetryConfigBuilder};
pub use error::{RetryAttempt, RetryError};
pub use events::RetryEvent;

/// A reusable retry policy for one error type.
///
/// Cheap to clone; the policy holds no per-call state.
pub struct RetryPolicy<E> {
    config: Arc<RetryConfig<E>>,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: Display> RetryPolicy<E> {
    pub fn new(config: RetryConfig<E>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Runs `op`, retrying retryable failures up to `max_attempts` times.
    ///
    /// Non-retryable failures return [`RetryError::Rejected`] after exactly
    /// one invocation. Exhaustion returns [`RetryError::Exhausted`] with
    /// one [`RetryAttempt`] per attempt made.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let config = &self.config;
        let mut history: Vec<RetryAttempt> = Vec::new();
        let mut attempt = 1usize;

        loop {
            match op().await {
                Ok(value) => {
                    config.event_listeners.emit(&RetryEvent::Success {
                        component: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "policy" => config.name.clone(), "outcome" => "success").increment(1);

                    return Ok(value);
                }
                Err(error) => {
                    if !config.should_retry(&error) {
                        config.event_listeners.emit(&RetryEvent::Rejected {
                            component: config.name.clone(),
                            timestamp: Instant::now(),
                        });

                        #[cfg(feature = "metrics")]
                        counter!("retry_calls_total", "policy" => config.name.clone(), "outcome" => "rejected").increment(1);

                        return Err(RetryError::Rejected(error));
                    }

                    if attempt >= config.max_attempts {
                        history.push(RetryAttempt {
                            attempt: attempt as u32,
                            delay: Duration::ZERO,
                            error: error.to_string(),
                            at: Utc::now(),
                        });

                        config.event_listeners.emit(&RetryEvent::Exhausted {
                            component: config.name.clone(),
                            timestamp: Instant::now(),
                            attempts: attempt,
                        });

                        #[cfg(feature = "metrics")]
                        counter!("retry_calls_total", "policy" => config.name.clone(), "outcome" => "exhausted").increment(1);

                        return Err(RetryError::Exhausted {
                            history,
                            last: error,
                        });
                    }

                    let delay = config.interval_fn.interval_for(attempt - 1);
                    history.push(RetryAttempt {
                        attempt: attempt as u32,
                        delay,
                        error: error.to_string(),
                        at: Utc::now(),
                    });

                    config.event_listeners.emit(&RetryEvent::Retry {
                        component: config.name.clone(),
                        timestamp: Instant::now(),
                        attempt,
                        delay,
                    });

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        policy = %config.name,
                        attempt,
                        ?delay,
                        error = %error,
                        "transient failure, backing off before retry"
                    );

                    #[cfg(feature = "metrics")]
                    counter!("retry_attempts_total", "policy" => config.name.clone()).increment(1);

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Name of this policy instance.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}
