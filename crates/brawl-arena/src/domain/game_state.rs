//! The two-fighter game state.

use brawl_core::event::{ScoreBoard, Side};
use brawl_core::verdict::Verdict;
use tracing::info;

use super::fighter::{Fighter, PLACEHOLDER_NAME};

/// Health each fighter starts a game with unless configured otherwise.
pub const DEFAULT_MAX_HEALTH: u32 = 3;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The named side is the only one left standing.
    Winner(Side),
    /// Both fighters went down in the same round.
    Draw,
}

/// Owns exactly two fighters and the one-shot game-over latch.
#[derive(Debug, Clone)]
pub struct GameState {
    p1: Fighter,
    p2: Fighter,
    /// Set once `check_game_over` has reported an outcome; cleared on reset.
    concluded: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEALTH)
    }
}

impl GameState {
    /// Creates a game between two placeholder fighters.
    #[must_use]
    pub fn new(max_health: u32) -> Self {
        Self {
            p1: Fighter::new(PLACEHOLDER_NAME, max_health),
            p2: Fighter::new(PLACEHOLDER_NAME, max_health),
            concluded: false,
        }
    }

    /// Returns the fighter on `side`.
    #[must_use]
    pub fn fighter(&self, side: Side) -> &Fighter {
        match side {
            Side::P1 => &self.p1,
            Side::P2 => &self.p2,
        }
    }

    fn fighter_mut(&mut self, side: Side) -> &mut Fighter {
        match side {
            Side::P1 => &mut self.p1,
            Side::P2 => &mut self.p2,
        }
    }

    /// Renames both fighters and performs a full reset.
    pub fn set_players(&mut self, p1_name: &str, p2_name: &str) {
        self.p1.rename(p1_name);
        self.p2.rename(p2_name);
        self.reset_game();
        info!(p1 = p1_name, p2 = p2_name, "players set");
    }

    /// Restores both fighters to full health and zero wins. Names are kept.
    pub fn reset_game(&mut self) {
        for side in Side::BOTH {
            let fighter = self.fighter_mut(side);
            fighter.reset_health();
            fighter.reset_wins();
        }
        self.concluded = false;
        info!("game reset");
    }

    /// Applies `amount` damage to the fighter on `side`.
    pub fn take_damage(&mut self, side: Side, amount: u32) {
        self.fighter_mut(side).take_damage(amount);
    }

    /// Applies one point of damage to every loser of `verdict`.
    pub fn apply_verdict(&mut self, verdict: Verdict) {
        for &side in verdict.losers() {
            self.take_damage(side, 1);
        }
    }

    /// Detects a finished game and records its result.
    ///
    /// Returns `Some` at most once per game: the first call after a fighter
    /// drops to zero health records a win for the survivor (nothing on a
    /// draw) and latches. Later calls return `None` until `reset_game`.
    pub fn check_game_over(&mut self) -> Option<GameOutcome> {
        if self.concluded {
            return None;
        }

        let outcome = match (self.p1.is_alive(), self.p2.is_alive()) {
            (true, true) => return None,
            (false, false) => GameOutcome::Draw,
            (true, false) => GameOutcome::Winner(Side::P1),
            (false, true) => GameOutcome::Winner(Side::P2),
        };

        self.concluded = true;
        match outcome {
            GameOutcome::Winner(side) => {
                self.fighter_mut(side).add_win();
                info!(winner = %self.fighter(side).name(), "game over");
            }
            GameOutcome::Draw => info!("game over, no winner"),
        }
        Some(outcome)
    }

    /// Returns `true` once a game-over has been recorded and not yet reset.
    #[must_use]
    pub fn is_concluded(&self) -> bool {
        self.concluded
    }

    /// Read-only copy of both fighters.
    #[must_use]
    pub fn scoreboard(&self) -> ScoreBoard {
        ScoreBoard {
            p1: self.p1.snapshot(),
            p2: self.p2.snapshot(),
        }
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn status(&self) -> String {
        format!(
            "{}: {}HP ({}W) | {}: {}HP ({}W)",
            self.p1.name(),
            self.p1.health(),
            self.p1.wins(),
            self.p2.name(),
            self.p2.health(),
            self.p2.wins(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameState {
        let mut game = GameState::new(3);
        game.set_players("Boggy", "Slimy");
        game
    }

    #[test]
    fn test_set_players_renames_and_resets() {
        let mut game = GameState::new(3);
        game.take_damage(Side::P1, 2);

        game.set_players("Boggy", "Slimy");

        assert_eq!(game.fighter(Side::P1).name(), "Boggy");
        assert_eq!(game.fighter(Side::P2).name(), "Slimy");
        assert_eq!(game.fighter(Side::P1).health(), 3);
    }

    #[test]
    fn test_reset_game_keeps_names_clears_wins() {
        let mut game = game();
        game.take_damage(Side::P2, 3);
        assert!(game.check_game_over().is_some());

        game.reset_game();

        assert_eq!(game.fighter(Side::P1).name(), "Boggy");
        assert_eq!(game.fighter(Side::P1).wins(), 0);
        assert_eq!(game.fighter(Side::P2).health(), 3);
        assert!(!game.is_concluded());
    }

    #[test]
    fn test_apply_verdict_damages_loser_only() {
        let mut game = game();

        game.apply_verdict(Verdict::P1Wins);

        assert_eq!(game.fighter(Side::P1).health(), 3);
        assert_eq!(game.fighter(Side::P2).health(), 2);
    }

    #[test]
    fn test_apply_draw_damages_both() {
        let mut game = game();

        game.apply_verdict(Verdict::Draw);

        assert_eq!(game.fighter(Side::P1).health(), 2);
        assert_eq!(game.fighter(Side::P2).health(), 2);
    }

    #[test]
    fn test_check_game_over_is_noop_while_both_alive() {
        let mut game = game();
        game.take_damage(Side::P1, 2);

        assert_eq!(game.check_game_over(), None);
        assert_eq!(game.fighter(Side::P2).wins(), 0);
    }

    #[test]
    fn test_check_game_over_records_win_for_survivor() {
        let mut game = game();
        game.take_damage(Side::P1, 3);

        assert_eq!(game.check_game_over(), Some(GameOutcome::Winner(Side::P2)));
        assert_eq!(game.fighter(Side::P2).wins(), 1);
        assert_eq!(game.fighter(Side::P1).wins(), 0);
    }

    #[test]
    fn test_check_game_over_draw_records_no_win() {
        let mut game = game();
        game.take_damage(Side::P1, 3);
        game.take_damage(Side::P2, 3);

        assert_eq!(game.check_game_over(), Some(GameOutcome::Draw));
        assert_eq!(game.fighter(Side::P1).wins(), 0);
        assert_eq!(game.fighter(Side::P2).wins(), 0);
    }

    #[test]
    fn test_check_game_over_fires_once_until_reset() {
        let mut game = game();
        game.take_damage(Side::P2, 3);

        assert!(game.check_game_over().is_some());
        assert!(game.check_game_over().is_none());
        game.take_damage(Side::P1, 1);
        assert!(game.check_game_over().is_none());
        assert_eq!(game.fighter(Side::P1).wins(), 1);

        game.reset_game();
        game.take_damage(Side::P2, 3);
        assert!(game.check_game_over().is_some());
    }

    #[test]
    fn test_status_line_format() {
        let mut game = game();
        game.take_damage(Side::P2, 1);

        assert_eq!(game.status(), "Boggy: 3HP (0W) | Slimy: 2HP (0W)");
    }
}
