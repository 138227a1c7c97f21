use super::support::{fast_retry, init_tracing, post, MockSender, X, Y};
use posse::{
    CircuitBreakerConfig, CircuitState, DeliveryStatus, Distributor, SenderError, TargetConfig,
};
use std::time::Duration;

/// Scenario A: both senders succeed on the first attempt.
#[tokio::test]
async fn both_platforms_succeed_first_attempt() {
    init_tracing();
    let sender_x = MockSender::succeeding();
    let sender_y = MockSender::succeeding();

    let distributor = Distributor::builder()
        .register(X, sender_x.clone(), TargetConfig::for_target(X))
        .register(Y, sender_y.clone(), TargetConfig::for_target(Y))
        .retry(fast_retry(3))
        .build();

    let post = post("essay-001");
    let outcomes = distributor.syndicate(&post, &[X, Y]).await.unwrap();

    for target in [X, Y] {
        let record = &outcomes[&target];
        assert_eq!(record.status, DeliveryStatus::Succeeded);
        assert_eq!(record.attempts, 1);
        assert!(record.external_id.is_some());
    }
    assert_eq!(sender_x.calls(), 1);
    assert_eq!(sender_y.calls(), 1);
    assert_eq!(distributor.delivery_log().len(), 2);
}

/// Scenario B: X fails transiently twice then succeeds with max_attempts 3;
/// Y is unaffected.
#[tokio::test]
async fn transient_failures_recover_within_the_schedule() {
    let sender_x =
        MockSender::failing_first(2, || SenderError::Unavailable("502 bad gateway".into()));
    let sender_y = MockSender::succeeding();

    let distributor = Distributor::builder()
        .register(X, sender_x.clone(), TargetConfig::for_target(X))
        .register(Y, sender_y.clone(), TargetConfig::for_target(Y))
        .retry(fast_retry(3))
        .build();

    let outcomes = distributor.syndicate(&post("essay-002"), &[X, Y]).await.unwrap();

    let record_x = &outcomes[&X];
    assert_eq!(record_x.status, DeliveryStatus::Succeeded);
    assert_eq!(record_x.attempts, 3);
    assert_eq!(sender_x.calls(), 3);

    let record_y = &outcomes[&Y];
    assert_eq!(record_y.status, DeliveryStatus::Succeeded);
    assert_eq!(record_y.attempts, 1);
}

/// Scenario C: X's breaker is open at call time, so the sender is never
/// invoked and Y dispatches normally.
#[tokio::test]
async fn open_circuit_excludes_a_platform() {
    let sender_x = MockSender::always_failing(|| SenderError::Unavailable("down".into()));
    let sender_y = MockSender::succeeding();

    // A single failure trips X's breaker.
    let config_x = TargetConfig {
        circuit_breaker: CircuitBreakerConfig::builder()
            .failure_threshold(1)
            .cooldown(Duration::from_secs(300))
            .name("mastodon")
            .build(),
        ..TargetConfig::for_target(X)
    };

    let distributor = Distributor::builder()
        .register(X, sender_x.clone(), config_x)
        .register(Y, sender_y.clone(), TargetConfig::for_target(Y))
        .retry(fast_retry(1))
        .build();

    let _ = distributor.syndicate(&post("essay-003"), &[X]).await.unwrap();
    assert_eq!(distributor.breaker_state(X), Some(CircuitState::Open));
    let calls_before = sender_x.calls();

    let outcomes = distributor.syndicate(&post("essay-004"), &[X, Y]).await.unwrap();

    let record_x = &outcomes[&X];
    assert_eq!(record_x.status, DeliveryStatus::CircuitOpen);
    assert_eq!(record_x.attempts, 0);
    assert_eq!(record_x.error_kind.as_deref(), Some("circuit-open"));
    assert_eq!(sender_x.calls(), calls_before, "sender never invoked");

    let record_y = &outcomes[&Y];
    assert_eq!(record_y.status, DeliveryStatus::Succeeded);
}

/// Scenario D: re-syndicating an already delivered pair records a skip and
/// never re-invokes the sender.
#[tokio::test]
async fn duplicate_syndication_is_skipped() {
    let sender = MockSender::succeeding();
    let distributor = Distributor::builder()
        .register(X, sender.clone(), TargetConfig::for_target(X))
        .retry(fast_retry(3))
        .build();

    let post = post("essay-005");
    let first = distributor.syndicate(&post, &[X]).await.unwrap();
    assert_eq!(first[&X].status, DeliveryStatus::Succeeded);

    let second = distributor.syndicate(&post, &[X]).await.unwrap();
    assert_eq!(second[&X].status, DeliveryStatus::SkippedDuplicate);
    assert_eq!(second[&X].attempts, 0);
    assert_eq!(sender.calls(), 1);

    // The log keeps both records but only one success for the pair.
    let history = distributor.delivery_log().all_for(post.id());
    assert_eq!(history.len(), 2);
    let successes = history
        .iter()
        .filter(|r| r.status == DeliveryStatus::Succeeded)
        .count();
    assert_eq!(successes, 1);
}

/// Exhausted retries surface as `failed_exhausted` with the attempt count.
#[tokio::test]
async fn exhausted_retries_are_terminal() {
    let sender = MockSender::always_failing(|| SenderError::RateLimited {
        retry_after: Some(Duration::from_secs(30)),
    });
    let distributor = Distributor::builder()
        .register(X, sender.clone(), TargetConfig::for_target(X))
        .retry(fast_retry(3))
        .build();

    let outcomes = distributor.syndicate(&post("essay-006"), &[X]).await.unwrap();

    let record = &outcomes[&X];
    assert_eq!(record.status, DeliveryStatus::FailedExhausted);
    assert_eq!(record.attempts, 3);
    assert_eq!(record.error_kind.as_deref(), Some("rate-limited"));
    assert_eq!(sender.calls(), 3);

    // A failed pair is not deduplicated: the next syndication retries.
    let outcomes = distributor.syndicate(&post("essay-006"), &[X]).await.unwrap();
    assert_eq!(outcomes[&X].status, DeliveryStatus::FailedExhausted);
    assert_eq!(sender.calls(), 6);
}

/// Auth failures are permanent: one attempt, no retry, no breaker probe
/// storm.
#[tokio::test]
async fn auth_failure_is_permanent() {
    let sender = MockSender::always_failing(|| SenderError::Auth("token expired".into()));
    let distributor = Distributor::builder()
        .register(Y, sender.clone(), TargetConfig::for_target(Y))
        .retry(fast_retry(5))
        .build();

    let outcomes = distributor.syndicate(&post("essay-007"), &[Y]).await.unwrap();

    let record = &outcomes[&Y];
    assert_eq!(record.status, DeliveryStatus::FailedPermanent);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.error_kind.as_deref(), Some("auth"));
    assert_eq!(sender.calls(), 1);
}
