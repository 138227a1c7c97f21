use crate::events::RateLimiterEvent;
use posse_core::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for one platform's token bucket.
pub struct RateLimiterConfig {
    pub(crate) capacity: f64,
    pub(crate) refill_rate: f64,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
    pub(crate) name: String,
}

impl RateLimiterConfig {
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }
}

/// Builder for [`RateLimiterConfig`].
pub struct RateLimiterConfigBuilder {
    capacity: f64,
    refill_rate: f64,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - capacity: 10 tokens (max burst)
    /// - refill_rate: 1 token per second
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            capacity: 10.0,
            refill_rate: 1.0,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the maximum number of tokens the bucket can hold.
    ///
    /// This bounds the burst size: a full bucket admits `capacity` calls
    /// back to back before refill pacing kicks in. A capacity below one
    /// token means no call is ever admitted.
    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the refill rate in tokens per second.
    pub fn refill_rate(mut self, tokens_per_second: f64) -> Self {
        self.refill_rate = tokens_per_second;
        self
    }

    /// Sets the name for this limiter instance (used in events).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a token is acquired.
    ///
    /// Called with the duration the caller waited; close to zero when a
    /// token was immediately available.
    pub fn on_permit_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitAcquired { waited, .. } = event {
                f(*waited);
            }
        }));
        self
    }

    /// Registers a callback when an acquisition times out.
    ///
    /// Called with the wait budget that was exceeded.
    pub fn on_permit_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitRejected { wait_up_to, .. } = event {
                f(*wait_up_to);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RateLimiterConfig {
        RateLimiterConfig {
            capacity: self.capacity,
            refill_rate: self.refill_rate,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
