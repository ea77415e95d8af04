//! Round verdicts.

use serde::{Deserialize, Serialize};

use crate::event::Side;

/// Outcome of one judged round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Side 1 won the round.
    P1Wins,
    /// Side 2 won the round.
    P2Wins,
    /// Nobody won; both sides take the hit.
    Draw,
}

impl Verdict {
    /// Sides that lose health under this verdict.
    #[must_use]
    pub fn losers(self) -> &'static [Side] {
        match self {
            Verdict::P1Wins => &[Side::P2],
            Verdict::P2Wins => &[Side::P1],
            Verdict::Draw => &Side::BOTH,
        }
    }
}
