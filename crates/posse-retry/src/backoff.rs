//! Pluggable backoff strategies.

use rand::RngExt;
use std::time::Duration;

/// Computes the delay before a retry.
///
/// `retry_index` is zero-based: the delay before the first retry is
/// `interval_for(0)`.
pub trait IntervalFunction: Send + Sync {
    fn interval_for(&self, retry_index: usize) -> Duration;
}

/// The same delay before every retry.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl IntervalFunction for FixedInterval {
    fn interval_for(&self, _retry_index: usize) -> Duration {
        self.interval
    }
}

/// Exponential backoff: `base * multiplier^retry_index`, capped at
/// `max_interval`, optionally randomized within a ±`jitter` fraction.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    multiplier: f64,
    max_interval: Duration,
    jitter: Option<f64>,
}

impl ExponentialBackoff {
    /// Creates a backoff with multiplier 2 and a 30 second cap.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            multiplier: 2.0,
            max_interval: Duration::from_secs(30),
            jitter: None,
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Randomizes each delay uniformly within `±fraction` of the computed
    /// value. Fractions are clamped to `[0, 1]`.
    pub fn jitter(mut self, fraction: f64) -> Self {
        self.jitter = Some(fraction.clamp(0.0, 1.0));
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn interval_for(&self, retry_index: usize) -> Duration {
        let scaled = self.base.as_secs_f64() * self.multiplier.powi(retry_index as i32);
        let capped = scaled.min(self.max_interval.as_secs_f64());

        let secs = match self.jitter {
            Some(fraction) if fraction > 0.0 => {
                let spread = capped * fraction;
                rand::rng().random_range((capped - spread)..=(capped + spread))
            }
            _ => capped,
        };

        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// A custom function-based backoff.
pub struct FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn interval_for(&self, retry_index: usize) -> Duration {
        (self.f)(retry_index)
    }
}
