//! Token-bucket rate limiter for syndication dispatch.
//!
//! One limiter instance exists per dispatch target and admits or delays
//! outgoing calls to that platform. Tokens are real-valued and refill
//! continuously; a full bucket admits a burst of `capacity` calls.
//!
//! # Usage
//!
//! ```rust
//! use posse_ratelimiter::{RateLimiter, RateLimiterConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(
//!     RateLimiterConfig::builder()
//!         .capacity(5.0)
//!         .refill_rate(1.0)
//!         .name("mastodon")
//!         .build(),
//! );
//!
//! match limiter.acquire(Duration::from_secs(2)).await {
//!     Ok(waited) => println!("admitted after {waited:?}"),
//!     Err(_) => println!("backpressure: try again later"),
//! }
//! # }
//! ```
//!
//! # Concurrency
//!
//! The refill-and-consume step is a single critical section; waiting
//! happens outside the lock and woken waiters re-contend, so concurrent
//! callers can never over-admit.
//!
//! ## Feature flags
//! - `metrics`: permit counters and wait-time histogram via the `metrics` crate
//! - `tracing`: admission decisions via the `tracing` crate

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};

mod config;
mod error;
mod events;
mod limiter;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimiterError;
pub use events::RateLimiterEvent;

use limiter::TokenBucket;

/// A shared, per-platform token-bucket rate limiter.
///
/// Cheap to clone; clones share the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    bucket: Mutex<TokenBucket>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let bucket = TokenBucket::new(config.capacity, config.refill_rate);
        Self {
            inner: Arc::new(Inner {
                bucket: Mutex::new(bucket),
                config,
            }),
        }
    }

    /// Acquires one token, waiting up to `wait_up_to` for a refill.
    ///
    /// Returns the time spent waiting on success. Fails fast with
    /// [`RateLimiterError::Timeout`] when the next token cannot free up
    /// within the remaining budget, rather than sleeping the budget out.
    pub async fn acquire(&self, wait_up_to: Duration) -> Result<Duration, RateLimiterError> {
        let started = Instant::now();

        loop {
            let now = Instant::now();
            let outcome = {
                let mut bucket = self.inner.bucket.lock().expect("rate limiter lock poisoned");
                bucket.try_take(now)
            };

            match outcome {
                Ok(()) => {
                    let waited = started.elapsed();
                    self.emit_acquired(waited);
                    return Ok(waited);
                }
                Err(next_token) => {
                    let remaining = wait_up_to.saturating_sub(started.elapsed());
                    match next_token {
                        Some(wait) if wait <= remaining => {
                            // A competing caller may steal the refilled
                            // token; loop and re-contend after the sleep.
                            sleep(wait).await;
                        }
                        _ => {
                            self.emit_rejected(wait_up_to);
                            return Err(RateLimiterError::Timeout { wait_up_to });
                        }
                    }
                }
            }
        }
    }

    /// Non-blocking variant: consume a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        let granted = {
            let mut bucket = self.inner.bucket.lock().expect("rate limiter lock poisoned");
            bucket.try_take(Instant::now()).is_ok()
        };
        if granted {
            self.emit_acquired(Duration::ZERO);
        }
        granted
    }

    /// Current token count, after refill.
    pub fn available(&self) -> f64 {
        let mut bucket = self.inner.bucket.lock().expect("rate limiter lock poisoned");
        bucket.available(Instant::now())
    }

    /// Name of this limiter instance.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    fn emit_acquired(&self, waited: Duration) {
        #[cfg(feature = "tracing")]
        tracing::trace!(limiter = %self.inner.config.name, ?waited, "rate limiter granted token");

        #[cfg(feature = "metrics")]
        {
            counter!("ratelimiter_permits_total", "limiter" => self.inner.config.name.clone(), "outcome" => "granted").increment(1);
            histogram!("ratelimiter_wait_seconds", "limiter" => self.inner.config.name.clone())
                .record(waited.as_secs_f64());
        }

        self.inner
            .config
            .event_listeners
            .emit(&RateLimiterEvent::PermitAcquired {
                component: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                waited,
            });
    }

    fn emit_rejected(&self, wait_up_to: Duration) {
        #[cfg(feature = "tracing")]
        tracing::debug!(limiter = %self.inner.config.name, ?wait_up_to, "rate limiter timed out");

        #[cfg(feature = "metrics")]
        counter!("ratelimiter_permits_total", "limiter" => self.inner.config.name.clone(), "outcome" => "rejected").increment(1);

        self.inner
            .config
            .event_listeners
            .emit(&RateLimiterEvent::PermitRejected {
                component: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                wait_up_to,
            });
    }
}
