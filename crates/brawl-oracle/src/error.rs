//! Oracle and speech error types.

use thiserror::Error;

/// Failures surfaced by an [`Oracle`](crate::Oracle) call.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle could not be reached or the body could not be read.
    #[error("oracle unreachable: {0}")]
    Transport(String),

    /// The oracle answered with a non-2xx status.
    #[error("oracle returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnosis.
        body: String,
    },

    /// The judge response did not end in `p1`, `p2` or `draw`.
    #[error("oracle response has no recognizable verdict: {raw:?}")]
    InvalidResponse {
        /// The complete raw response text.
        raw: String,
    },
}

impl OracleError {
    /// Returns `true` for connection and status failures, which void a
    /// round rather than fail it.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, OracleError::Transport(_) | OracleError::Status { .. })
    }
}

/// Failures surfaced by a [`Speech`](crate::Speech) call.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The speech service could not be reached.
    #[error("speech service unreachable: {0}")]
    Transport(String),

    /// The speech service answered with a non-2xx status.
    #[error("speech service returned status {0}")]
    Status(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_status_are_transport_errors() {
        assert!(OracleError::Transport("refused".into()).is_transport());
        assert!(
            OracleError::Status {
                status: 502,
                body: String::new(),
            }
            .is_transport()
        );
    }

    #[test]
    fn test_invalid_response_is_not_transport() {
        let err = OracleError::InvalidResponse {
            raw: "Something else entirely".into(),
        };
        assert!(!err.is_transport());
        assert!(err.to_string().contains("Something else entirely"));
    }
}
