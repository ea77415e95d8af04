//! Collaborators shared by both loops.

use std::sync::{Arc, Mutex};

use brawl_broadcast::Broadcaster;
use brawl_core::event::{DisplayEvent, Side};
use brawl_core::rng::DeterministicRng;
use brawl_oracle::{Oracle, Speech};

use crate::config::MatchConfig;

/// Everything a loop needs besides the arena itself.
///
/// All fields are behind `Arc` so a fresh loop can be launched per match
/// from one cloned context.
#[derive(Clone)]
pub struct LoopContext {
    /// Timing knobs.
    pub config: Arc<MatchConfig>,
    /// Judging and summarizing oracle.
    pub oracle: Arc<dyn Oracle>,
    /// Optional text-to-speech for narrations.
    pub speech: Option<Arc<dyn Speech>>,
    /// Display event fan-out.
    pub broadcaster: Arc<Broadcaster>,
    /// Tie-breaker for narration order.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl LoopContext {
    /// Publishes the placeholder `think` text for both sides.
    pub(crate) fn publish_placeholders(&self) {
        for side in Side::BOTH {
            self.broadcaster.publish(DisplayEvent::Think {
                side,
                text: self.config.placeholder_thought.clone(),
            });
        }
    }
}
