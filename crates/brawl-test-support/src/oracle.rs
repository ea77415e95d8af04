//! Test oracles — mock `Oracle` implementations for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use brawl_oracle::verdict::parse_verdict;
use brawl_oracle::{JudgeRequest, Judgement, Oracle, OracleError};

/// An oracle that replays scripted judge texts and records every call.
///
/// Judge texts go through the real verdict parser, so a scripted text with
/// no trailing verdict yields `OracleError::InvalidResponse`. Once the
/// script is exhausted, `judge` fails with a transport error. `summarize`
/// answers `"<n> moves: <joined submissions>"`.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    judge_texts: Mutex<VecDeque<String>>,
    judge_calls: Mutex<Vec<JudgeRequest>>,
    summarize_calls: Mutex<Vec<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedOracle {
    /// Create an oracle that will answer judge calls with `texts`, in order.
    #[must_use]
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            judge_texts: Mutex::new(texts.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Delay every response by `delay` (tokio time, so pausable in tests).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every judge request received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn judge_calls(&self) -> Vec<JudgeRequest> {
        self.judge_calls.lock().unwrap().clone()
    }

    /// Returns every summarize request received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn summarize_calls(&self) -> Vec<Vec<String>> {
        self.summarize_calls.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn judge(&self, request: &JudgeRequest) -> Result<Judgement, OracleError> {
        self.judge_calls.lock().unwrap().push(request.clone());
        self.pause().await;
        let text = self
            .judge_texts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OracleError::Transport("no scripted reply".into()))?;
        let verdict = parse_verdict(&text)?;
        Ok(Judgement { verdict, text })
    }

    async fn summarize(&self, submissions: &[String]) -> Result<String, OracleError> {
        self.summarize_calls.lock().unwrap().push(submissions.to_vec());
        self.pause().await;
        Ok(format!("{} moves: {}", submissions.len(), submissions.join(", ")))
    }
}

/// An oracle that is always unreachable.
#[derive(Debug, Default)]
pub struct FailingOracle;

#[async_trait]
impl Oracle for FailingOracle {
    async fn judge(&self, _request: &JudgeRequest) -> Result<Judgement, OracleError> {
        Err(OracleError::Transport("connection refused".into()))
    }

    async fn summarize(&self, _submissions: &[String]) -> Result<String, OracleError> {
        Err(OracleError::Transport("connection refused".into()))
    }
}
