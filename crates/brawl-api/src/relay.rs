//! Forwards display events to an external display service.

use std::sync::Arc;
use std::time::Duration;

use brawl_broadcast::Broadcaster;
use brawl_core::event::EventEnvelope;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AppError;

/// HTTP client posting each event to `{base}/<kind>`.
#[derive(Debug, Clone)]
pub struct DisplayRelay {
    client: reqwest::Client,
    base_url: String,
}

impl DisplayRelay {
    /// Creates a relay for the display service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("display client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Forwards one event. Pings are not forwarded.
    ///
    /// Failures are logged and swallowed; the display keeps whatever it
    /// showed last.
    pub async fn forward(&self, envelope: &EventEnvelope) {
        if envelope.event.is_ping() {
            return;
        }

        let kind = envelope.event.kind();
        let url = format!("{}/{kind}", self.base_url);
        let result = self
            .client
            .post(&url)
            .json(&envelope.event.payload())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => debug!(kind, "display updated"),
            Err(err) => warn!(kind, error = %err, "display update failed"),
        }
    }

    /// Subscribes to `broadcaster` and forwards events until it is dropped.
    pub fn spawn(self, broadcaster: &Arc<Broadcaster>) -> JoinHandle<()> {
        let mut subscription = broadcaster.subscribe();
        tokio::spawn(async move {
            while let Some(envelope) = subscription.recv().await {
                self.forward(&envelope).await;
            }
        })
    }
}
