use crate::config::TargetConfig;
use crate::error::DistributorError;
use futures::future;
use posse_circuitbreaker::{CircuitBreaker, CircuitBreakerError, CircuitState};
use posse_core::{DispatchTarget, Post, PostDraft, PostError, Sender, SenderError};
use posse_deliverylog::{DeliveryLog, DeliveryRecord, DeliveryStatus};
use posse_ratelimiter::RateLimiter;
use posse_retry::{RetryConfig, RetryError, RetryPolicy};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// One target's resilience stack: built at registration, lives as long as
/// the distributor, never shared across targets.
struct TargetStack {
    sender: Arc<dyn Sender>,
    limiter: RateLimiter,
    breaker: CircuitBreaker,
}

/// The syndication orchestrator.
///
/// Composes dedup, rate limiting, circuit breaking and retry around each
/// registered sender, in that order (outermost first): the limiter keeps
/// bursts away from the breaker and the sender; the breaker fails fast
/// ahead of the retry schedule so a known-down platform is not hammered;
/// retry sits innermost and only absorbs transient per-call noise.
pub struct Distributor {
    targets: HashMap<DispatchTarget, TargetStack>,
    retry: RetryPolicy<SenderError>,
    log: Arc<DeliveryLog>,
    acquire_timeout: Duration,
    call_timeout: Duration,
    target_timeout: Duration,
}

impl Distributor {
    pub fn builder() -> DistributorBuilder {
        DistributorBuilder::new()
    }

    /// Validates and normalizes raw content into a [`Post`].
    pub fn create_post(&self, draft: PostDraft) -> Result<Post, PostError> {
        Post::try_from(draft)
    }

    /// Syndicates `post` to the requested targets, bounded per target by
    /// the configured target timeout.
    ///
    /// Every target is dispatched independently and concurrently; one
    /// target's failure never blocks or aborts another's. The returned map
    /// holds exactly one terminal [`DeliveryRecord`] per requested target,
    /// each appended to the delivery log before this call returns. Only
    /// orchestration invariants (unknown target, log append failure) error
    /// out.
    pub async fn syndicate(
        &self,
        post: &Post,
        targets: &[DispatchTarget],
    ) -> Result<BTreeMap<DispatchTarget, DeliveryRecord>, DistributorError> {
        self.syndicate_with_deadline(post, targets, self.target_timeout)
            .await
    }

    /// [`syndicate`](Self::syndicate) with a caller-supplied per-target
    /// deadline.
    pub async fn syndicate_with_deadline(
        &self,
        post: &Post,
        targets: &[DispatchTarget],
        deadline: Duration,
    ) -> Result<BTreeMap<DispatchTarget, DeliveryRecord>, DistributorError> {
        let requested: BTreeSet<DispatchTarget> = targets.iter().copied().collect();
        for target in &requested {
            if !self.targets.contains_key(target) {
                return Err(DistributorError::UnknownTarget(*target));
            }
        }

        info!(post = post.id(), targets = requested.len(), "syndicating");

        let dispatches = requested
            .iter()
            .map(|target| self.dispatch_one(post, *target, deadline));

        let mut outcomes = BTreeMap::new();
        for result in future::join_all(dispatches).await {
            let record = result?;
            outcomes.insert(record.target, record);
        }
        Ok(outcomes)
    }

    async fn dispatch_one(
        &self,
        post: &Post,
        target: DispatchTarget,
        deadline: Duration,
    ) -> Result<DeliveryRecord, DistributorError> {
        let stack = self
            .targets
            .get(&target)
            .ok_or(DistributorError::UnknownTarget(target))?;

        // Dedup short-circuit: a successfully delivered pair is final.
        if self.log.has_succeeded(post.id(), target) {
            debug!(post = post.id(), %target, "already delivered, skipping");
            let record = DeliveryRecord::new(post.id(), target, DeliveryStatus::SkippedDuplicate);
            self.log.record(record.clone())?;
            return Ok(record);
        }

        let attempts = AtomicU32::new(0);
        let record = match timeout(deadline, self.run_stack(stack, post, target, &attempts)).await
        {
            Ok(record) => record,
            Err(_) => {
                warn!(post = post.id(), %target, ?deadline, "dispatch abandoned at deadline");
                DeliveryRecord::new(post.id(), target, DeliveryStatus::TimedOut)
                    .with_attempts(attempts.load(Ordering::SeqCst))
                    .with_error("deadline", format!("dispatch exceeded {deadline:?}"))
            }
        };

        self.log.record(record.clone())?;
        Ok(record)
    }

    /// The resilience stack proper: limiter, then breaker around retry
    /// around the timed sender call.
    async fn run_stack(
        &self,
        stack: &TargetStack,
        post: &Post,
        target: DispatchTarget,
        attempts: &AtomicU32,
    ) -> DeliveryRecord {
        if stack.limiter.acquire(self.acquire_timeout).await.is_err() {
            debug!(post = post.id(), %target, "local backpressure, dispatch deferred");
            return DeliveryRecord::new(post.id(), target, DeliveryStatus::RateLimited)
                .with_error(
                    "backpressure",
                    format!("no rate-limit token within {:?}", self.acquire_timeout),
                );
        }

        let call_timeout = self.call_timeout;
        let sender = stack.sender.as_ref();
        let publish = || {
            attempts.fetch_add(1, Ordering::SeqCst);
            let call = sender.publish(post);
            async move {
                match timeout(call_timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(SenderError::Timeout(format!(
                        "publish exceeded {call_timeout:?}"
                    ))),
                }
            }
        };

        let outcome = stack.breaker.call(|| self.retry.execute(publish)).await;
        let attempts = attempts.load(Ordering::SeqCst);

        match outcome {
            Ok(receipt) => {
                info!(
                    post = post.id(),
                    %target,
                    attempts,
                    external_id = %receipt.external_id,
                    "delivered"
                );
                DeliveryRecord::new(post.id(), target, DeliveryStatus::Succeeded)
                    .with_attempts(attempts)
                    .with_external_id(receipt.external_id)
            }
            Err(CircuitBreakerError::Open) => {
                warn!(post = post.id(), %target, "circuit open, platform excluded");
                DeliveryRecord::new(post.id(), target, DeliveryStatus::CircuitOpen)
                    .with_error("circuit-open", "circuit is open; call not permitted")
            }
            Err(CircuitBreakerError::Inner(RetryError::Rejected(err))) => {
                warn!(post = post.id(), %target, error = %err, "permanent failure");
                DeliveryRecord::new(post.id(), target, DeliveryStatus::FailedPermanent)
                    .with_attempts(attempts)
                    .with_error(err.kind(), err.to_string())
            }
            Err(CircuitBreakerError::Inner(RetryError::Exhausted { last, history })) => {
                warn!(
                    post = post.id(),
                    %target,
                    attempts = history.len(),
                    error = %last,
                    "retries exhausted"
                );
                DeliveryRecord::new(post.id(), target, DeliveryStatus::FailedExhausted)
                    .with_attempts(attempts)
                    .with_error(last.kind(), last.to_string())
            }
        }
    }

    /// The delivery log backing this distributor.
    pub fn delivery_log(&self) -> &DeliveryLog {
        &self.log
    }

    /// Registered targets, sorted.
    pub fn targets(&self) -> Vec<DispatchTarget> {
        let mut targets: Vec<_> = self.targets.keys().copied().collect();
        targets.sort();
        targets
    }

    /// Current breaker state for a registered target.
    pub fn breaker_state(&self, target: DispatchTarget) -> Option<CircuitState> {
        self.targets.get(&target).map(|stack| stack.breaker.state())
    }
}

/// Builder for [`Distributor`].
pub struct DistributorBuilder {
    targets: HashMap<DispatchTarget, TargetStack>,
    retry: Option<RetryPolicy<SenderError>>,
    log: Option<Arc<DeliveryLog>>,
    acquire_timeout: Duration,
    call_timeout: Duration,
    target_timeout: Duration,
}

impl Default for DistributorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributorBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - delivery log: in-memory (no persistence)
    /// - retry: 3 attempts, exponential backoff from 1 second, retrying
    ///   only transient sender errors
    /// - acquire_timeout: 1 second
    /// - call_timeout: 10 seconds
    /// - target_timeout: 30 seconds
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
            retry: None,
            log: None,
            acquire_timeout: Duration::from_secs(1),
            call_timeout: Duration::from_secs(10),
            target_timeout: Duration::from_secs(30),
        }
    }

    /// Registers a sender for a target, with that target's resilience
    /// configuration. Registering the same target again replaces it.
    pub fn register(
        mut self,
        target: DispatchTarget,
        sender: Arc<dyn Sender>,
        config: TargetConfig,
    ) -> Self {
        self.targets.insert(
            target,
            TargetStack {
                sender,
                limiter: RateLimiter::new(config.rate_limiter),
                breaker: CircuitBreaker::new(config.circuit_breaker),
            },
        );
        self
    }

    /// Sets the shared retry policy (the schedule is stateless, so one
    /// policy serves every target).
    pub fn retry(mut self, policy: RetryPolicy<SenderError>) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Sets the delivery log backing dedup and audit.
    pub fn delivery_log(mut self, log: Arc<DeliveryLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Bounds the wait for a rate-limit token.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Bounds each individual sender call; elapse is classified as a
    /// transient [`SenderError::Timeout`].
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Bounds the whole per-target dispatch, waits and backoffs included.
    pub fn target_timeout(mut self, timeout: Duration) -> Self {
        self.target_timeout = timeout;
        self
    }

    pub fn build(self) -> Distributor {
        let retry = self.retry.unwrap_or_else(|| {
            RetryPolicy::new(
                RetryConfig::builder()
                    .max_attempts(3)
                    .exponential_backoff(Duration::from_secs(1))
                    .retry_on(SenderError::is_retryable)
                    .name("sender")
                    .build(),
            )
        });

        Distributor {
            targets: self.targets,
            retry,
            log: self.log.unwrap_or_else(|| Arc::new(DeliveryLog::in_memory())),
            acquire_timeout: self.acquire_timeout,
            call_timeout: self.call_timeout,
            target_timeout: self.target_timeout,
        }
    }
}
