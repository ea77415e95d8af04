//! Shared application state.

use std::sync::Arc;

use brawl_arena::application::arena::ArenaView;
use brawl_broadcast::Broadcaster;
use brawl_orchestrator::{ChatMessage, SupervisorHandle};
use tokio::sync::mpsc;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-only view of fighters and inboxes.
    pub arena: ArenaView,
    /// Display event fan-out, subscribed to by `/events`.
    pub broadcaster: Arc<Broadcaster>,
    /// Match supervisor.
    pub supervisor: SupervisorHandle,
    /// Chat ingestion queue.
    pub chat: mpsc::UnboundedSender<ChatMessage>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        arena: ArenaView,
        broadcaster: Arc<Broadcaster>,
        supervisor: SupervisorHandle,
        chat: mpsc::UnboundedSender<ChatMessage>,
    ) -> Self {
        Self {
            arena,
            broadcaster,
            supervisor,
            chat,
        }
    }
}
