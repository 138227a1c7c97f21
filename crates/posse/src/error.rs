use posse_core::DispatchTarget;
use posse_deliverylog::DeliveryLogError;
use thiserror::Error;

/// Failures of the orchestration machinery itself.
///
/// Per-target dispatch failures never surface here; they come back as
/// delivery records in the outcome map. Only invariant violations (an
/// unregistered target, a log that cannot be appended to) abort a
/// syndication call.
#[derive(Debug, Error)]
pub enum DistributorError {
    #[error("no sender registered for target {0}")]
    UnknownTarget(DispatchTarget),

    #[error("delivery log append failed: {0}")]
    Log(#[from] DeliveryLogError),
}
