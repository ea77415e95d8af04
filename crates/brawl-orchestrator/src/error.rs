//! Orchestration error types.

use brawl_oracle::OracleError;
use thiserror::Error;

/// A judgment round that failed rather than being voided.
#[derive(Debug, Error)]
pub enum RoundError {
    /// The oracle answered, but with no recognizable verdict.
    #[error("round failed: {0}")]
    InvalidVerdict(#[source] OracleError),
}

/// The supervisor actor can no longer take commands.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The supervisor task has exited.
    #[error("match supervisor is not running")]
    Stopped,
}
