//! Mock senders and shared builders for the end-to-end tests.

use futures::future::BoxFuture;
use posse::{
    DispatchTarget, Post, PostDraft, Receipt, RetryConfig, RetryPolicy, Sender, SenderError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A sender scripted to fail its first `fail_first` calls, optionally
/// sleeping before answering. Call counts are observable from the test.
pub struct MockSender {
    calls: AtomicUsize,
    fail_first: usize,
    error: fn() -> SenderError,
    delay: Option<Duration>,
}

impl MockSender {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            error: || SenderError::Unavailable("unused".into()),
            delay: None,
        })
    }

    pub fn failing_first(fail_first: usize, error: fn() -> SenderError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first,
            error,
            delay: None,
        })
    }

    pub fn always_failing(error: fn() -> SenderError) -> Arc<Self> {
        Self::failing_first(usize::MAX, error)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            error: || SenderError::Unavailable("unused".into()),
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sender for MockSender {
    fn publish<'a>(&'a self, post: &'a Post) -> BoxFuture<'a, Result<Receipt, SenderError>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if call < self.fail_first {
                Err((self.error)())
            } else {
                Ok(Receipt::new(format!("{}#{}", post.id(), call + 1))
                    .with_url(format!("https://downstream.example/{}", post.id())))
            }
        })
    }
}

/// A retry policy with test-friendly backoff.
pub fn fast_retry(max_attempts: usize) -> RetryPolicy<SenderError> {
    RetryPolicy::new(
        RetryConfig::builder()
            .max_attempts(max_attempts)
            .fixed_backoff(Duration::from_millis(5))
            .retry_on(SenderError::is_retryable)
            .name("test-sender")
            .build(),
    )
}

pub fn post(id: &str) -> Post {
    Post::try_from(PostDraft {
        id: id.into(),
        title: format!("Post {id}"),
        body: "Publish once, syndicate everywhere.".into(),
        canonical_url: format!("https://example.org/posts/{id}"),
        media: vec![],
    })
    .unwrap()
}

/// Convenience: the two targets most scenarios use.
pub const X: DispatchTarget = DispatchTarget::Mastodon;
pub const Y: DispatchTarget = DispatchTarget::Discord;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
