use posse_core::ComponentEvent;
use std::time::{Duration, Instant};

/// Events emitted by the retry policy.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A retry is about to happen after the given delay.
    Retry {
        component: String,
        timestamp: Instant,
        attempt: usize,
        delay: Duration,
    },
    /// The operation succeeded, possibly after retries.
    Success {
        component: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// Every permitted attempt failed with a retryable error.
    Exhausted {
        component: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// A non-retryable error short-circuited the schedule.
    Rejected {
        component: String,
        timestamp: Instant,
    },
}

impl ComponentEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::Rejected { .. } => "rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::Rejected { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            RetryEvent::Retry { component, .. }
            | RetryEvent::Success { component, .. }
            | RetryEvent::Exhausted { component, .. }
            | RetryEvent::Rejected { component, .. } => component,
        }
    }
}
