use crate::circuit::CircuitState;
use posse_core::ComponentEvent;
use std::time::Instant;

/// Events emitted by the circuit breaker.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    /// The breaker moved between states.
    StateTransition {
        component: String,
        timestamp: Instant,
        from: CircuitState,
        to: CircuitState,
    },
    /// A call was allowed through.
    CallPermitted {
        component: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A call was rejected without reaching the wrapped operation.
    CallRejected {
        component: String,
        timestamp: Instant,
    },
    /// A permitted call completed successfully.
    SuccessRecorded {
        component: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A permitted call failed.
    FailureRecorded {
        component: String,
        timestamp: Instant,
        state: CircuitState,
    },
}

impl ComponentEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
            CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
            CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { component, .. }
            | CircuitBreakerEvent::CallPermitted { component, .. }
            | CircuitBreakerEvent::CallRejected { component, .. }
            | CircuitBreakerEvent::SuccessRecorded { component, .. }
            | CircuitBreakerEvent::FailureRecorded { component, .. } => component,
        }
    }
}
