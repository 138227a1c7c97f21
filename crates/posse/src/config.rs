use posse_circuitbreaker::CircuitBreakerConfig;
use posse_core::DispatchTarget;
use posse_ratelimiter::RateLimiterConfig;

/// Per-target resilience configuration, consumed at registration.
///
/// Each registered target gets its own rate limiter and circuit breaker
/// built from these; the stacks are fully independent across targets.
pub struct TargetConfig {
    pub rate_limiter: RateLimiterConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl TargetConfig {
    /// Component defaults with both instances named after the target.
    pub fn for_target(target: DispatchTarget) -> Self {
        Self {
            rate_limiter: RateLimiterConfig::builder().name(target.as_str()).build(),
            circuit_breaker: CircuitBreakerConfig::builder()
                .name(target.as_str())
                .build(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            rate_limiter: RateLimiterConfig::builder().build(),
            circuit_breaker: CircuitBreakerConfig::builder().build(),
        }
    }
}
