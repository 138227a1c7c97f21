use super::support::{fast_retry, post, MockSender, X, Y};
use posse::{
    CircuitBreakerConfig, CircuitState, DeliveryStatus, Distributor, RateLimiterConfig,
    SenderError, TargetConfig,
};
use std::time::{Duration, Instant};

/// The breaker wraps the whole retry cycle: an exhausted schedule counts as
/// one breaker failure, not one per attempt.
#[tokio::test]
async fn breaker_counts_retry_cycles_not_attempts() {
    let sender = MockSender::always_failing(|| SenderError::Unavailable("503".into()));
    let config = TargetConfig {
        circuit_breaker: CircuitBreakerConfig::builder()
            .failure_threshold(2)
            .cooldown(Duration::from_secs(300))
            .build(),
        ..TargetConfig::for_target(X)
    };

    let distributor = Distributor::builder()
        .register(X, sender.clone(), config)
        .retry(fast_retry(3))
        .build();

    // First cycle: three attempts, one recorded breaker failure.
    distributor.syndicate(&post("p1"), &[X]).await.unwrap();
    assert_eq!(sender.calls(), 3);
    assert_eq!(distributor.breaker_state(X), Some(CircuitState::Closed));

    // Second cycle trips the threshold of 2.
    distributor.syndicate(&post("p2"), &[X]).await.unwrap();
    assert_eq!(distributor.breaker_state(X), Some(CircuitState::Open));

    // Third post: rejected without reaching the sender or the retry layer.
    let outcomes = distributor.syndicate(&post("p3"), &[X]).await.unwrap();
    assert_eq!(outcomes[&X].status, DeliveryStatus::CircuitOpen);
    assert_eq!(outcomes[&X].attempts, 0);
    assert_eq!(sender.calls(), 6);
}

/// The per-target deadline abandons a dispatch stuck in the sender and
/// leaves other targets alone.
#[tokio::test]
async fn deadline_abandons_a_stuck_target() {
    let sender_x = MockSender::slow(Duration::from_secs(60));
    let sender_y = MockSender::succeeding();

    let distributor = Distributor::builder()
        .register(X, sender_x.clone(), TargetConfig::for_target(X))
        .register(Y, sender_y.clone(), TargetConfig::for_target(Y))
        .retry(fast_retry(3))
        .call_timeout(Duration::from_secs(120))
        .build();

    let started = Instant::now();
    let outcomes = distributor
        .syndicate_with_deadline(&post("p1"), &[X, Y], Duration::from_millis(100))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));

    let record_x = &outcomes[&X];
    assert_eq!(record_x.status, DeliveryStatus::TimedOut);
    assert_eq!(record_x.error_kind.as_deref(), Some("deadline"));

    let record_y = &outcomes[&Y];
    assert_eq!(record_y.status, DeliveryStatus::Succeeded);
}

/// A sender call exceeding the per-call timeout is classified transient
/// and retried.
#[tokio::test]
async fn per_call_timeout_is_retryable() {
    let sender = MockSender::slow(Duration::from_secs(60));
    let distributor = Distributor::builder()
        .register(X, sender.clone(), TargetConfig::for_target(X))
        .retry(fast_retry(2))
        .call_timeout(Duration::from_millis(20))
        .build();

    let outcomes = distributor.syndicate(&post("p1"), &[X]).await.unwrap();

    let record = &outcomes[&X];
    assert_eq!(record.status, DeliveryStatus::FailedExhausted);
    assert_eq!(record.attempts, 2);
    assert_eq!(record.error_kind.as_deref(), Some("timeout"));
    assert_eq!(sender.calls(), 2);
}

/// Local backpressure on one target does not slow a free target: both
/// dispatches run concurrently.
#[tokio::test]
async fn targets_dispatch_concurrently() {
    let sender_x = MockSender::slow(Duration::from_millis(150));
    let sender_y = MockSender::slow(Duration::from_millis(150));

    let distributor = Distributor::builder()
        .register(X, sender_x, TargetConfig::for_target(X))
        .register(Y, sender_y, TargetConfig::for_target(Y))
        .retry(fast_retry(1))
        .build();

    let started = Instant::now();
    let outcomes = distributor.syndicate(&post("p1"), &[X, Y]).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcomes[&X].status, DeliveryStatus::Succeeded);
    assert_eq!(outcomes[&Y].status, DeliveryStatus::Succeeded);
    // Serial dispatch would take at least 300ms.
    assert!(elapsed < Duration::from_millis(280), "took {elapsed:?}");
}

/// An empty bucket delays dispatch by at least the refill interval, and
/// the wait does not consume a retry attempt.
#[tokio::test]
async fn rate_limited_dispatch_waits_for_refill() {
    let sender = MockSender::succeeding();
    let config = TargetConfig {
        rate_limiter: RateLimiterConfig::builder()
            .capacity(1.0)
            .refill_rate(10.0)
            .build(),
        ..TargetConfig::for_target(X)
    };

    let distributor = Distributor::builder()
        .register(X, sender.clone(), config)
        .retry(fast_retry(3))
        .acquire_timeout(Duration::from_secs(1))
        .build();

    distributor.syndicate(&post("p1"), &[X]).await.unwrap();

    // Bucket empty: the second dispatch waits ~100ms for a token.
    let started = Instant::now();
    let outcomes = distributor.syndicate(&post("p2"), &[X]).await.unwrap();

    assert_eq!(outcomes[&X].status, DeliveryStatus::Succeeded);
    assert_eq!(outcomes[&X].attempts, 1);
    assert!(started.elapsed() >= Duration::from_millis(70));
}

/// Every returned outcome is already committed to the delivery log.
#[tokio::test]
async fn outcomes_are_logged_before_return() {
    let distributor = Distributor::builder()
        .register(X, MockSender::succeeding(), TargetConfig::for_target(X))
        .register(
            Y,
            MockSender::always_failing(|| SenderError::Auth("nope".into())),
            TargetConfig::for_target(Y),
        )
        .retry(fast_retry(2))
        .build();

    let post = post("p1");
    let outcomes = distributor.syndicate(&post, &[X, Y]).await.unwrap();

    let logged = distributor.delivery_log().all_for(post.id());
    assert_eq!(logged.len(), 2);
    for record in logged {
        assert_eq!(&record, &outcomes[&record.target]);
    }
}
