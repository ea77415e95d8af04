//! Chat ingestion.
//!
//! Turns raw chat lines into inbox submissions and match commands. Never
//! blocks on the loops: submissions go straight into the inboxes, new
//! matches are handed to the supervisor as fire-and-forget commands, and
//! speech requests run on their own task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use brawl_arena::domain::commands::{ChatCommand, is_admin};
use brawl_arena::domain::inbox::Inboxes;
use brawl_oracle::Speech;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::supervisor::SupervisorHandle;

/// One chat line as received from the chat source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Stable submitter identity.
    pub identity: String,
    /// Raw message text.
    pub text: String,
}

/// Routes chat lines to the inboxes, the supervisor and the speech service.
#[derive(Clone)]
pub struct Ingestor {
    inboxes: Arc<Inboxes>,
    supervisor: SupervisorHandle,
    admin: String,
    speech: Option<Arc<dyn Speech>>,
    speak_enabled: Arc<AtomicBool>,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("admin", &self.admin)
            .field("speech", &self.speech.is_some())
            .field("speak_enabled", &self.speak_enabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    /// Creates an ingestor. Only `admin` may declare new matches.
    #[must_use]
    pub fn new(inboxes: Arc<Inboxes>, supervisor: SupervisorHandle, admin: impl Into<String>) -> Self {
        Self {
            inboxes,
            supervisor,
            admin: admin.into(),
            speech: None,
            speak_enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Routes `!speak` requests to `speech`. Without it they are dropped.
    #[must_use]
    pub fn with_speech(mut self, speech: Arc<dyn Speech>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Whether non-admin chatters may currently use `!speak`.
    #[must_use]
    pub fn speak_enabled(&self) -> bool {
        self.speak_enabled.load(Ordering::Relaxed)
    }

    /// Speaks `text` if the sender is the admin or the admin has opened
    /// speech to everyone. An admin request opens it.
    fn speak(&self, identity: &str, text: &str) {
        if is_admin(identity, &self.admin) {
            self.speak_enabled.store(true, Ordering::Relaxed);
        } else if !self.speak_enabled() {
            debug!(identity, "speak request before admin enabled speech");
            return;
        }
        let Some(speech) = self.speech.clone() else {
            debug!(identity, "speak request without a speech service");
            return;
        };

        let text = text.to_owned();
        tokio::spawn(async move {
            if let Err(err) = speech.speak(&text).await {
                warn!(error = %err, "chat speech failed");
            }
        });
    }

    /// Handles one chat line and returns what it was parsed as.
    pub fn handle(&self, message: &ChatMessage) -> ChatCommand {
        let command = ChatCommand::parse(&message.identity, &message.text, &self.admin);
        match &command {
            ChatCommand::Submit { side, text } => {
                if !self.inboxes.submit(*side, &message.identity, text) {
                    debug!(identity = %message.identity, "empty submission dropped");
                }
            }
            ChatCommand::Usage { side } => {
                debug!(identity = %message.identity, %side, "submission without text");
            }
            ChatCommand::NewMatch { p1, p2 } => {
                info!(p1 = %p1, p2 = %p2, "new match requested");
                if let Err(err) = self.supervisor.new_match(p1, p2) {
                    warn!(error = %err, "new match dropped");
                }
            }
            ChatCommand::Speak { text } => self.speak(&message.identity, text),
            ChatCommand::StopSpeak => {
                if self.speak_enabled.swap(false, Ordering::Relaxed) {
                    info!(identity = %message.identity, "chat speech disabled");
                }
            }
            ChatCommand::Ignored => {}
        }
        command
    }
}

/// Spawns a task draining `rx` into `ingestor` until every sender is gone.
pub fn spawn_ingestion(
    mut rx: mpsc::UnboundedReceiver<ChatMessage>,
    ingestor: Ingestor,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            ingestor.handle(&message);
        }
        debug!("chat source closed, ingestion stopped");
    })
}
