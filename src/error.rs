//! Engine-level error taxonomy.
//!
//! Booking rejections are not errors: they are ordinary outcomes carried by
//! [`crate::services::booking::BookingOutcome`]. Errors here are the cases
//! where a request cannot be answered at all. An empty slot list is a valid
//! result, not an error.

use thiserror::Error;

use crate::db::repository::RepositoryError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or invalid scheduling configuration (unknown organizer or
    /// event type, malformed weekly rules). Surfaced to the caller as a
    /// 4xx-equivalent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A busy-block, meeting or rule source could not be read. Propagated
    /// as-is: a failed busy-check is never treated as "free".
    #[error("Upstream read failure: {0}")]
    UpstreamRead(#[from] RepositoryError),
}

impl EngineError {
    /// Classify a repository error from a configuration read: missing
    /// records are the caller's configuration problem, everything else is
    /// an upstream failure.
    pub(crate) fn from_config_read(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } | RepositoryError::ValidationError { .. } => {
                EngineError::Configuration(err.to_string())
            }
            other => EngineError::UpstreamRead(other),
        }
    }
}
