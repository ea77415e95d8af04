//! A single combatant.

use brawl_core::event::FighterSnapshot;
use tracing::info;

/// Name given to both fighters before the first match is declared.
pub const PLACEHOLDER_NAME: &str = "FighterName";

/// One of the two competing sides, with health and win count.
///
/// Health is always within `[0, max_health]`; wins only grow through
/// [`Fighter::add_win`] until an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fighter {
    name: String,
    health: u32,
    wins: u32,
    max_health: u32,
}

impl Fighter {
    /// Creates a fighter at full health with no wins.
    #[must_use]
    pub fn new(name: impl Into<String>, max_health: u32) -> Self {
        Self {
            name: name.into(),
            health: max_health,
            wins: 0,
            max_health,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Games won since the last reset.
    #[must_use]
    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Health a reset restores to.
    #[must_use]
    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Renames the fighter without touching health or wins.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Subtracts `amount` from health, stopping at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        info!(fighter = %self.name, amount, health = self.health, "fighter took damage");
    }

    /// Restores full health.
    pub fn reset_health(&mut self) {
        self.health = self.max_health;
    }

    /// Zeroes the win count.
    pub fn reset_wins(&mut self) {
        self.wins = 0;
    }

    /// Records one game win.
    pub fn add_win(&mut self) {
        self.wins += 1;
        info!(fighter = %self.name, wins = self.wins, "fighter won");
    }

    /// Returns `true` while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Read-only copy for display.
    #[must_use]
    pub fn snapshot(&self) -> FighterSnapshot {
        FighterSnapshot {
            name: self.name.clone(),
            health: self.health,
            wins: self.wins,
        }
    }
}
