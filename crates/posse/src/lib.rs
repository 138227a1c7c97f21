//! Publish-once, syndicate-everywhere.
//!
//! `posse` is a resilience-wrapped distribution orchestrator: a post is
//! authored once on the canonical site and fanned out to downstream
//! platforms with no duplicate delivery, bounded request rate per platform,
//! fast failure when a platform is degraded, graduated retry of transient
//! errors, and a durable audit trail of every dispatch attempt.
//!
//! Each registered target owns an independent resilience stack, layered
//! outermost to innermost:
//!
//! ```text
//! dedup check → RateLimiter → CircuitBreaker → RetryPolicy → sender
//! ```
//!
//! The rate limiter keeps bursts away from the platform entirely; the
//! breaker fails fast ahead of the retry schedule so a known-down platform
//! is not hammered; retry sits innermost and only absorbs transient
//! per-call noise once the breaker has judged the platform broadly healthy.
//! Every terminal outcome is appended to the delivery log before being
//! returned.
//!
//! # Usage
//!
//! ```rust,no_run
//! use posse::{
//!     DeliveryLog, DispatchTarget, Distributor, PostDraft, TargetConfig,
//! };
//! use std::sync::Arc;
//!
//! # fn sender() -> Arc<dyn posse::Sender> { unimplemented!() }
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log = Arc::new(DeliveryLog::open("delivery_log.json")?);
//!
//! let distributor = Distributor::builder()
//!     .delivery_log(log)
//!     .register(
//!         DispatchTarget::Mastodon,
//!         sender(),
//!         TargetConfig::for_target(DispatchTarget::Mastodon),
//!     )
//!     .build();
//!
//! let post = distributor.create_post(PostDraft {
//!     id: "essay-001".into(),
//!     title: "On Syndication".into(),
//!     body: "Publish once, syndicate everywhere.".into(),
//!     canonical_url: "https://example.org/essays/001".into(),
//!     media: vec![],
//! })?;
//!
//! let outcomes = distributor
//!     .syndicate(&post, &[DispatchTarget::Mastodon])
//!     .await?;
//! for (target, record) in &outcomes {
//!     println!("{target}: {:?}", record.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//! - `metrics`: forwards the `metrics` feature into every resilience layer

mod config;
mod distributor;
mod error;

pub use config::TargetConfig;
pub use distributor::{Distributor, DistributorBuilder};
pub use error::DistributorError;

pub use posse_core::{
    DispatchTarget, MediaRef, Post, PostDraft, PostError, Receipt, Sender, SenderError,
    UnknownTargetError,
};

pub use posse_circuitbreaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState,
};
pub use posse_deliverylog::{DeliveryLog, DeliveryLogError, DeliveryRecord, DeliveryStatus};
pub use posse_ratelimiter::{RateLimiter, RateLimiterConfig, RateLimiterError};
pub use posse_retry::{
    ExponentialBackoff, FixedInterval, RetryAttempt, RetryConfig, RetryError, RetryPolicy,
};
