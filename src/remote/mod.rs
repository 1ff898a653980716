pub mod auth;
pub mod credentials;
pub mod rest;
pub mod store;

use thiserror::Error;

/// Failures surfaced by the remote collaborators.
///
/// Nothing here is fatal: every variant degrades to a logged, one-shot
/// user-facing notice, and a failed call is never retried automatically.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{context}: service returned {status}: {body}")]
    Service {
        context: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Rejected locally before any remote call was made.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// An owner-scoped operation was attempted without a session.
    #[error("not signed in")]
    NoSession,

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response parsed but did not have the promised shape.
    #[error("unexpected response shape: {0}")]
    Unexpected(String),

    #[error("keyring: {0}")]
    Keyring(String),
}

impl StoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
