//! The downstream sender capability.
//!
//! One implementation per platform, outside this workspace's core: the
//! orchestrator only sees a normalized post going in and a [`Receipt`] or a
//! classified [`SenderError`] coming out. Platform payload construction and
//! authentication happen behind this boundary.

use crate::post::Post;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Proof of a successful publish on a downstream platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Identifier assigned by the platform (status id, AT URI, message id…).
    pub external_id: String,
    /// Public URL of the syndicated copy, when the platform exposes one.
    pub url: Option<String>,
    /// Raw response metadata, kept for auditing.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl Receipt {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            url: None,
            raw: serde_json::Value::Null,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A publish failure, classified at the platform boundary.
///
/// The orchestrator never inspects platform payloads; this classification
/// is the entire contract. `Auth` and `Validation` are terminal, the rest
/// are transient.
#[derive(Debug, Clone, Error)]
pub enum SenderError {
    /// Credentials rejected or expired. Terminal.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The platform rejected the post content itself. Terminal.
    #[error("post rejected by platform: {0}")]
    Validation(String),

    /// The platform's own rate limit pushed back. Transient.
    #[error("platform rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// 5xx-equivalent: the platform is up but degraded. Transient.
    #[error("platform unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete in time. Transient.
    #[error("network timeout: {0}")]
    Timeout(String),
}

impl SenderError {
    /// Whether the retry policy may re-attempt after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            SenderError::Auth(_) | SenderError::Validation(_) => false,
            SenderError::RateLimited { .. }
            | SenderError::Unavailable(_)
            | SenderError::Timeout(_) => true,
        }
    }

    /// Stable classification string, recorded in the delivery log.
    pub fn kind(&self) -> &'static str {
        match self {
            SenderError::Auth(_) => "auth",
            SenderError::Validation(_) => "validation",
            SenderError::RateLimited { .. } => "rate-limited",
            SenderError::Unavailable(_) => "unavailable",
            SenderError::Timeout(_) => "timeout",
        }
    }
}

/// Capability to publish a post to one platform.
///
/// Implementations must be safe to call concurrently; the distributor holds
/// them behind `Arc` for the lifetime of the process.
pub trait Sender: Send + Sync {
    fn publish<'a>(&'a self, post: &'a Post) -> BoxFuture<'a, Result<Receipt, SenderError>>;
}
