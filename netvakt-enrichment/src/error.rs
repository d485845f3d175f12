//! Lookup failure taxonomy.
//!
//! These never propagate past the resolver; they ride along inside
//! `Resolution::Degraded` so callers and tests can see why a value fell
//! back to a placeholder.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup timed out")]
    Timeout,

    #[error("service reported non-success status: {0}")]
    Status(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no API credentials configured")]
    MissingCredentials,
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}
