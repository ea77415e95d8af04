//! Display events and the envelope they travel in.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;

/// One of the two competing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left-hand fighter.
    P1,
    /// Right-hand fighter.
    P2,
}

impl Side {
    /// Both sides, in display order.
    pub const BOTH: [Side; 2] = [Side::P1, Side::P2];

    /// Lowercase wire name (`"p1"` / `"p2"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::P1 => "p1",
            Side::P2 => "p2",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only copy of one fighter's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: u32,
    /// Games won since the last reset.
    pub wins: u32,
}

/// Consolidated names/health/wins for both fighters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Side 1.
    pub p1: FighterSnapshot,
    /// Side 2.
    pub p2: FighterSnapshot,
}

/// State-change notifications pushed to display consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum DisplayEvent {
    /// Fighter names, health and wins.
    State(ScoreBoard),
    /// In-progress narration for one side.
    Think {
        /// The side being narrated.
        side: Side,
        /// Narration text.
        text: String,
    },
    /// A round countdown started.
    RoundStart {
        /// Countdown length in seconds.
        duration_secs: u64,
    },
    /// Result text to render.
    Show {
        /// Text with fighter names substituted.
        text: String,
    },
    /// Clear the result display.
    Hide,
    /// Keepalive.
    Ping {
        /// When the ping was generated.
        timestamp: DateTime<Utc>,
    },
}

impl DisplayEvent {
    /// Returns the wire name of this event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DisplayEvent::State(_) => "state",
            DisplayEvent::Think { .. } => "think",
            DisplayEvent::RoundStart { .. } => "round-start",
            DisplayEvent::Show { .. } => "show",
            DisplayEvent::Hide => "hide",
            DisplayEvent::Ping { .. } => "ping",
        }
    }

    /// Returns `true` for keepalive pings.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        matches!(self, DisplayEvent::Ping { .. })
    }

    /// Serializes the event body (without the kind tag) to JSON.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        let mut tagged =
            serde_json::to_value(self).expect("DisplayEvent serialization is infallible");
        tagged
            .get_mut("data")
            .map_or_else(|| serde_json::json!({}), serde_json::Value::take)
    }
}

/// A published event plus delivery metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// When the event was published.
    pub occurred_at: DateTime<Utc>,
    /// The event itself.
    pub event: DisplayEvent,
}

impl EventEnvelope {
    /// Wraps `event`, stamping it with a fresh id and the clock's time.
    #[must_use]
    pub fn new(event: DisplayEvent, clock: &dyn Clock) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: clock.now(),
            event,
        }
    }

    /// Builds a keepalive ping stamped with the clock's time.
    #[must_use]
    pub fn ping(clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: now,
            event: DisplayEvent::Ping { timestamp: now },
        }
    }
}
