use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// One attempt in a retry sequence, kept for the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Backoff slept after this attempt (zero for the final one).
    pub delay: Duration,
    /// Display form of the error this attempt produced.
    pub error: String,
    /// Wall-clock time of the failure.
    pub at: DateTime<Utc>,
}

/// Errors returned by [`RetryPolicy::execute`](crate::RetryPolicy::execute).
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every permitted attempt failed with a retryable error.
    #[error("retries exhausted after {} attempts: {last}", .history.len())]
    Exhausted {
        /// The full attempt sequence, oldest first.
        history: Vec<RetryAttempt>,
        /// The final attempt's error.
        last: E,
    },

    /// The first failing attempt was non-retryable; the schedule was never
    /// consumed and the inner error is untouched.
    #[error("non-retryable error: {0}")]
    Rejected(E),
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { history, .. } => history.len() as u32,
            RetryError::Rejected(_) => 1,
        }
    }

    /// The underlying error, however the policy gave up.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Rejected(last) => last,
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Rejected(last) => last,
        }
    }
}
