use posse_core::ComponentEvent;
use std::time::{Duration, Instant};

/// Events emitted by the rate limiter.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A token was consumed, after waiting `waited` (zero on a full bucket).
    PermitAcquired {
        component: String,
        timestamp: Instant,
        waited: Duration,
    },
    /// No token freed up within the caller's wait budget.
    PermitRejected {
        component: String,
        timestamp: Instant,
        wait_up_to: Duration,
    },
}

impl ComponentEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "permit_acquired",
            RateLimiterEvent::PermitRejected { .. } => "permit_rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. }
            | RateLimiterEvent::PermitRejected { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { component, .. }
            | RateLimiterEvent::PermitRejected { component, .. } => component,
        }
    }
}
