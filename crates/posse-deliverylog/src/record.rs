use chrono::{DateTime, Utc};
use posse_core::DispatchTarget;
use serde::{Deserialize, Serialize};

/// Terminal outcome of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Dispatch recorded but not yet resolved.
    Pending,
    /// The platform accepted the post.
    Succeeded,
    /// Terminal sender error (auth, validation); never retried.
    FailedPermanent,
    /// Transient failures exhausted the retry schedule.
    FailedExhausted,
    /// A successful delivery already existed; the sender was not invoked.
    SkippedDuplicate,
    /// The platform's circuit was open; the sender was not invoked.
    CircuitOpen,
    /// Local backpressure: no rate-limit token within the wait budget.
    RateLimited,
    /// The per-target deadline elapsed mid-dispatch.
    TimedOut,
}

impl DeliveryStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryStatus::Succeeded)
    }

    /// Whether this outcome counts as a failed delivery for reporting.
    /// Skips are neither successes nor failures.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DeliveryStatus::FailedPermanent
                | DeliveryStatus::FailedExhausted
                | DeliveryStatus::CircuitOpen
                | DeliveryStatus::RateLimited
                | DeliveryStatus::TimedOut
        )
    }
}

/// One persisted dispatch outcome. Append-only: records are never mutated
/// once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub post_id: String,
    pub target: DispatchTarget,
    pub status: DeliveryStatus,
    /// Times the sender was actually invoked (0 when it never was).
    pub attempts: u32,
    /// Identifier assigned by the platform on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Display form of the final error, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable error classification ("auth", "timeout", "circuit-open"…).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn new(
        post_id: impl Into<String>,
        target: DispatchTarget,
        status: DeliveryStatus,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            target,
            status,
            attempts: 0,
            external_id: None,
            error: None,
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_error(mut self, kind: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self.error = Some(message.into());
        self
    }
}
