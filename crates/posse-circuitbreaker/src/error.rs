use thiserror::Error;

/// Errors returned by [`CircuitBreaker::call`](crate::CircuitBreaker::call).
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; the wrapped operation was never invoked.
    ///
    /// This error must reach the orchestrator unmodified: it is terminal
    /// and is never retried.
    #[error("circuit is open; call not permitted")]
    Open,

    /// The wrapped operation ran and failed.
    #[error("wrapped call failed: {0}")]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    /// Whether this error means the circuit rejected the call.
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open)
    }

    /// Returns the wrapped operation's error, if the call was permitted.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            CircuitBreakerError::Open => None,
        }
    }
}
