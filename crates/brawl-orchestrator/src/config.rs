//! Match timing configuration.

use std::time::Duration;

/// Placeholder narration shown while a side has nothing new.
pub const DEFAULT_PLACEHOLDER_THOUGHT: &str = "what next...";

/// Timing knobs for both loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// Countdown before each round is judged.
    pub round_duration: Duration,
    /// Upper bound on how long a result stays on screen.
    pub read_cap: Duration,
    /// Reading speed used to size the result display time.
    pub read_chars_per_sec: u32,
    /// Pause after a game-over before the fighters are reset.
    pub cooldown: Duration,
    /// Delay between summary cycles.
    pub summary_interval: Duration,
    /// Delay between the two sides' narrations within one cycle.
    pub summary_gap: Duration,
    /// `think` text published for both sides at the start of each round.
    pub placeholder_thought: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(60),
            read_cap: Duration::from_secs(60),
            read_chars_per_sec: 8,
            cooldown: Duration::from_secs(15),
            summary_interval: Duration::from_secs(12),
            summary_gap: Duration::from_secs(5),
            placeholder_thought: DEFAULT_PLACEHOLDER_THOUGHT.to_owned(),
        }
    }
}

impl MatchConfig {
    /// Time to leave `text` on screen: one second per
    /// `read_chars_per_sec` characters, capped at `read_cap`.
    #[must_use]
    pub fn read_time(&self, text: &str) -> Duration {
        let chars = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
        let rate = u64::from(self.read_chars_per_sec.max(1));
        Duration::from_millis(chars.saturating_mul(1_000) / rate).min(self.read_cap)
    }
}
