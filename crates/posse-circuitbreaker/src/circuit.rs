use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// Calls pass through; failures are counted.
    Closed = 0,
    /// Calls are rejected immediately; the platform is assumed down.
    Open = 1,
    /// Exactly one probe call is allowed through to test recovery.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// The state machine proper. All mutation happens under the owner's lock;
/// time is passed in so transitions are deterministic under test.
pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    /// Failure timestamps within the rolling observation window.
    failures: VecDeque<Instant>,
    /// When the breaker last entered `Open`.
    opened_at: Instant,
    /// Whether the single half-open probe slot is taken.
    probe_in_flight: bool,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>) -> Self {
        Self {
            state: CircuitState::Closed,
            state_atomic,
            failures: VecDeque::new(),
            opened_at: Instant::now(),
            probe_in_flight: false,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    fn prune_window(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        while let Some(first) = self.failures.front() {
            if now.duration_since(*first) > config.failure_window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }

    /// Failures currently inside the observation window.
    pub(crate) fn failure_count(&mut self, config: &CircuitBreakerConfig, now: Instant) -> usize {
        self.prune_window(config, now);
        self.failures.len()
    }

    /// Decides whether a call may proceed, transitioning lazily out of
    /// `Open` once the cooldown has elapsed. Admission into the half-open
    /// probe slot happens here, atomically with the decision.
    pub(crate) fn try_acquire(&mut self, config: &CircuitBreakerConfig, now: Instant) -> bool {
        match self.state {
            CircuitState::Closed => {
                self.emit_permitted(config, now);
                true
            }
            CircuitState::Open => {
                if now.duration_since(self.opened_at) >= config.cooldown {
                    self.transition_to(CircuitState::HalfOpen, config, now);
                    self.probe_in_flight = true;
                    self.emit_permitted(config, now);
                    true
                } else {
                    self.emit_rejected(config, now);
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.probe_in_flight {
                    self.emit_rejected(config, now);
                    false
                } else {
                    self.probe_in_flight = true;
                    self.emit_permitted(config, now);
                    true
                }
            }
        }
    }

    /// Frees the probe slot after an abandoned half-open call.
    pub(crate) fn release_probe(&mut self) {
        if self.state == CircuitState::HalfOpen {
            self.probe_in_flight = false;
        }
    }

    pub(crate) fn record_success(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::SuccessRecorded {
                component: config.name.clone(),
                timestamp: now,
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "breaker" => config.name.clone(), "outcome" => "success").increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Closed, config, now);
            }
            _ => {
                self.prune_window(config, now);
            }
        }
    }

    pub(crate) fn record_failure(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::FailureRecorded {
                component: config.name.clone(),
                timestamp: now,
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "breaker" => config.name.clone(), "outcome" => "failure").increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                // Probe failed: reopen with a fresh cooldown.
                self.transition_to(CircuitState::Open, config, now);
            }
            _ => {
                self.failures.push_back(now);
                self.prune_window(config, now);
                if self.failures.len() >= config.failure_threshold {
                    self.transition_to(CircuitState::Open, config, now);
                }
            }
        }
    }

    pub(crate) fn force_open(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        self.transition_to(CircuitState::Open, config, now);
    }

    pub(crate) fn force_closed(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        self.transition_to(CircuitState::Closed, config, now);
    }

    fn emit_permitted(&self, config: &CircuitBreakerConfig, now: Instant) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::CallPermitted {
                component: config.name.clone(),
                timestamp: now,
                state: self.state,
            });
    }

    fn emit_rejected(&self, config: &CircuitBreakerConfig, now: Instant) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::CallRejected {
                component: config.name.clone(),
                timestamp: now,
            });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "breaker" => config.name.clone(), "outcome" => "rejected").increment(1);
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig, now: Instant) {
        if self.state == state {
            return;
        }
        let from = self.state;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                component: config.name.clone(),
                timestamp: now,
                from,
                to: state,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(breaker = %config.name, from = ?from, to = ?state, "circuit state transition");

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "breaker" => config.name.clone(),
                "from" => from.as_label(),
                "to" => state.as_label()
            )
            .increment(1);
            gauge!("circuitbreaker_state", "breaker" => config.name.clone()).set(state as u8 as f64);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.probe_in_flight = false;
        match state {
            CircuitState::Open => self.opened_at = now,
            CircuitState::Closed => self.failures.clear(),
            CircuitState::HalfOpen => {}
        }
    }
}
