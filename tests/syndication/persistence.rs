use super::support::{fast_retry, post, MockSender, X};
use posse::{DeliveryLog, DeliveryStatus, Distributor, TargetConfig};
use std::sync::Arc;

/// Dedup survives a process restart: a fresh distributor over the same log
/// file skips what the previous one delivered.
#[tokio::test]
async fn dedup_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("delivery_log.json");
    let post = post("essay-100");

    let sender = MockSender::succeeding();
    {
        let log = Arc::new(DeliveryLog::open(&log_path).unwrap());
        let distributor = Distributor::builder()
            .delivery_log(log)
            .register(X, sender.clone(), TargetConfig::for_target(X))
            .retry(fast_retry(3))
            .build();
        let outcomes = distributor.syndicate(&post, &[X]).await.unwrap();
        assert_eq!(outcomes[&X].status, DeliveryStatus::Succeeded);
    }

    // "Restart": reload the log from disk into a new distributor.
    let log = Arc::new(DeliveryLog::open(&log_path).unwrap());
    let distributor = Distributor::builder()
        .delivery_log(log)
        .register(X, sender.clone(), TargetConfig::for_target(X))
        .retry(fast_retry(3))
        .build();

    let outcomes = distributor.syndicate(&post, &[X]).await.unwrap();
    assert_eq!(outcomes[&X].status, DeliveryStatus::SkippedDuplicate);
    assert_eq!(sender.calls(), 1);

    // Both the success and the skip are on disk.
    let log = DeliveryLog::open(&log_path).unwrap();
    assert_eq!(log.all_for(post.id()).len(), 2);
}

/// The audit read paths see what the distributor wrote.
#[tokio::test]
async fn audit_queries_reflect_dispatch_history() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("delivery_log.json");
    let log = Arc::new(DeliveryLog::open(&log_path).unwrap());

    let distributor = Distributor::builder()
        .delivery_log(Arc::clone(&log))
        .register(X, MockSender::succeeding(), TargetConfig::for_target(X))
        .retry(fast_retry(3))
        .build();

    for id in ["a", "b", "c"] {
        distributor.syndicate(&post(id), &[X]).await.unwrap();
    }

    assert_eq!(log.len(), 3);
    assert_eq!(log.for_target(X).len(), 3);
    assert!(log.failures().is_empty());
    assert_eq!(log.all_for("b").len(), 1);
}
