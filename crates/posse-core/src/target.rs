//! Platform identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A downstream platform a post can be syndicated to.
///
/// Each target owns exactly one rate limiter and one circuit breaker for
/// the lifetime of the distributor. Extending the set is adding a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchTarget {
    Mastodon,
    Discord,
    Bluesky,
    Ghost,
}

impl DispatchTarget {
    /// All known targets, in dispatch-report order.
    pub const ALL: [DispatchTarget; 4] = [
        DispatchTarget::Mastodon,
        DispatchTarget::Discord,
        DispatchTarget::Bluesky,
        DispatchTarget::Ghost,
    ];

    /// Stable wire name, also used as the default component name for the
    /// target's resilience instances.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchTarget::Mastodon => "mastodon",
            DispatchTarget::Discord => "discord",
            DispatchTarget::Bluesky => "bluesky",
            DispatchTarget::Ghost => "ghost",
        }
    }
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a platform name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dispatch target: {0}")]
pub struct UnknownTargetError(pub String);

impl FromStr for DispatchTarget {
    type Err = UnknownTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mastodon" => Ok(DispatchTarget::Mastodon),
            "discord" => Ok(DispatchTarget::Discord),
            "bluesky" => Ok(DispatchTarget::Bluesky),
            "ghost" => Ok(DispatchTarget::Ghost),
            other => Err(UnknownTargetError(other.to_string())),
        }
    }
}
