use std::path::PathBuf;
use thiserror::Error;

/// Errors from the delivery log's persistence layer.
#[derive(Debug, Error)]
pub enum DeliveryLogError {
    #[error("delivery log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("delivery log serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The committed log file exists but cannot be parsed. Deliberately not
    /// swallowed: resetting to an empty log would silently defeat dedup.
    #[error("delivery log at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
