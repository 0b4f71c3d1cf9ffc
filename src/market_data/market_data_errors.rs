use serde::Serialize;
use thiserror::Error;

/// Per-ticker fetch failure.
///
/// Clone because a single in-flight fetch result is shared by every
/// concurrent waiter on the same symbol.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail")]
pub enum FetchError {
    #[error("provider has no data for {0}")]
    NotFound(String),

    #[error("quote provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("no live quote and no persisted fallback for {0}")]
    NoFallbackAvailable(String),
}

impl FetchError {
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "NotFound",
            FetchError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            FetchError::NoFallbackAvailable(_) => "NoFallbackAvailable",
        }
    }
}
