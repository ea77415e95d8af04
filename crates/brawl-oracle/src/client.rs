//! The oracle call boundary.

use std::time::Duration;

use async_trait::async_trait;
use brawl_core::verdict::Verdict;
use serde::Serialize;
use tracing::debug;

use crate::error::OracleError;
use crate::verdict::parse_verdict;

/// One side of a judge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contender {
    /// Fighter name.
    pub name: String,
    /// Chat submissions backing this fighter.
    pub messages: Vec<String>,
}

/// Input to [`Oracle::judge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgeRequest {
    /// Side 1.
    pub p1: Contender,
    /// Side 2.
    pub p2: Contender,
}

/// A validated judge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    /// Verdict read from the trailing token.
    pub verdict: Verdict,
    /// Full response text, shown to viewers after name substitution.
    pub text: String,
}

/// External text-generation service that judges rounds and narrates sides.
///
/// Both calls are single attempts; callers decide whether to retry.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Judges one round.
    ///
    /// # Errors
    ///
    /// `Transport`/`Status` when the call fails, `InvalidResponse` when the
    /// text carries no verdict.
    async fn judge(&self, request: &JudgeRequest) -> Result<Judgement, OracleError>;

    /// Narrates one side's pending submissions.
    ///
    /// # Errors
    ///
    /// `Transport`/`Status` when the call fails.
    async fn summarize(&self, submissions: &[String]) -> Result<String, OracleError>;
}

/// Body posted to the oracle endpoint; `role` tells the two calls apart.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum OracleRequest<'a> {
    Judge {
        p1: &'a Contender,
        p2: &'a Contender,
    },
    Summarize {
        messages: &'a [String],
    },
}

/// HTTP implementation posting JSON to a single oracle endpoint.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
}

impl HttpOracle {
    /// Creates a client for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Transport` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Transport(format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, body: &OracleRequest<'_>) -> Result<String, OracleError> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(format!("reading body failed: {e}")))?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(status = status.as_u16(), bytes = text.len(), "oracle responded");
        Ok(text)
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn judge(&self, request: &JudgeRequest) -> Result<Judgement, OracleError> {
        let text = self
            .post(&OracleRequest::Judge {
                p1: &request.p1,
                p2: &request.p2,
            })
            .await?;
        let verdict = parse_verdict(&text)?;
        Ok(Judgement { verdict, text })
    }

    async fn summarize(&self, submissions: &[String]) -> Result<String, OracleError> {
        let text = self
            .post(&OracleRequest::Summarize {
                messages: submissions,
            })
            .await?;
        Ok(text.trim().to_owned())
    }
}
