use std::time::{Duration, Instant};

/// Token-bucket state for one platform.
///
/// Tokens are real-valued and bounded in `[0, capacity]`. Refill happens
/// lazily on each access: `elapsed * refill_rate`, capped at capacity.
#[derive(Debug)]
pub(crate) struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub(crate) fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Refill, then consume one token or report how long until one frees up.
    ///
    /// `Err(None)` means a token can never become available (capacity below
    /// one whole token, or a zero refill rate with an empty bucket).
    pub(crate) fn try_take(&mut self, now: Instant) -> Result<(), Option<Duration>> {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }

        if self.capacity < 1.0 || self.refill_rate <= 0.0 {
            return Err(None);
        }

        let deficit = 1.0 - self.tokens;
        Err(Some(Duration::from_secs_f64(deficit / self.refill_rate)))
    }

    pub(crate) fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.tokens
    }
}
