//! Domain errors for the IssuePilot triage pipeline.

use thiserror::Error;

/// Domain-level errors.
///
/// Background work (sync) logs and swallows these; request-path
/// operations surface them to the caller with matching HTTP status
/// semantics. No variant is fatal to the process.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Network or API failure while fetching from the external tracker.
    /// Pages accumulated before the failure are kept; there is no
    /// automatic retry.
    #[error("Fetch failed: {0}")]
    TransientFetch(String),

    /// Classifier artifacts are missing or unreadable. Requires an
    /// explicit training step; callers must not retry automatically.
    #[error("Classifier model unavailable: train the model first")]
    ModelUnavailable,

    #[error("Issue not found: {0}")]
    IssueNotFound(i64),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
