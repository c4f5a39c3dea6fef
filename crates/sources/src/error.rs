//! Error types for price source operations.

use thiserror::Error;

/// Errors a provider call can produce.
///
/// All of these are soft from the evaluation loop's point of view: the
/// instrument is reported as unavailable and the loop continues.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("no recent data for {0}")]
    NoData(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl SourceError {
    /// True when a retry on a later cycle could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::Http(_)
                | SourceError::Status(_)
                | SourceError::Timeout(_)
                | SourceError::NoData(_)
        )
    }
}
