//! Test speech — `Speech` implementations that record or fail.

use std::sync::Mutex;

use async_trait::async_trait;
use brawl_oracle::{Speech, SpeechError};

/// Records every spoken line.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    /// Lines spoken so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl Speech for RecordingSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

/// A speech service that is always down.
#[derive(Debug, Default)]
pub struct FailingSpeech;

#[async_trait]
impl Speech for FailingSpeech {
    async fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Transport("connection refused".into()))
    }
}
