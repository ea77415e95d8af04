//! Text-to-speech side channel.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SpeechError;

/// Speaks narration aloud. Best-effort: callers log failures and move on.
#[async_trait]
pub trait Speech: Send + Sync {
    /// Speaks `text`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` when the speech service fails.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// HTTP implementation issuing `GET {base}/tts?text=...`.
#[derive(Debug, Clone)]
pub struct HttpSpeech {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeech {
    /// Creates a client for the speech service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechError::Transport(format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Speech for HttpSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let url = format!("{}/tts", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("text", text)])
            .send()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SpeechError::Status(response.status().as_u16()))
        }
    }
}
