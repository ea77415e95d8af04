//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller supplied input the domain refuses.
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator (task, channel, external service) is unavailable.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
