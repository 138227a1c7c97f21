use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`RateLimiter::acquire`](crate::RateLimiter::acquire).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimiterError {
    /// No token freed up within the caller's wait budget.
    #[error("no rate-limit token available within {wait_up_to:?}")]
    Timeout { wait_up_to: Duration },
}
