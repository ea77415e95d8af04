//! Generation-tagged shared handle over the game state and inboxes.
//!
//! Every match gets a new generation number. Loops capture the generation
//! they were launched for and route each mutation through
//! [`Arena::with_current`], which refuses to run once a newer match has
//! started. This keeps a cancelled loop's late oracle result from touching
//! the fresh match.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use brawl_core::event::{ScoreBoard, Side};
use serde::Serialize;
use tracing::info;

use crate::domain::game_state::GameState;
use crate::domain::inbox::Inboxes;

#[derive(Debug)]
struct ArenaInner {
    generation: u64,
    game: GameState,
}

/// Write handle: owned by the supervisor and the judgment loop.
#[derive(Debug, Clone)]
pub struct Arena {
    inner: Arc<Mutex<ArenaInner>>,
    inboxes: Arc<Inboxes>,
}

impl Arena {
    /// Creates an arena at generation 0 with placeholder fighters.
    #[must_use]
    pub fn new(max_health: u32, message_max_len: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ArenaInner {
                generation: 0,
                game: GameState::new(max_health),
            })),
            inboxes: Arc::new(Inboxes::new(message_max_len)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ArenaInner> {
        // Mutations are short synchronous sections; recover rather than
        // wedge both loops on a poisoned lock.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared inboxes, written by chat ingestion.
    #[must_use]
    pub fn inboxes(&self) -> &Arc<Inboxes> {
        &self.inboxes
    }

    /// Read-only handle over the same state.
    #[must_use]
    pub fn view(&self) -> ArenaView {
        ArenaView {
            arena: self.clone(),
        }
    }

    /// Declares a new match: bumps the generation, renames and resets both
    /// fighters, and clears both inboxes, all under one lock.
    ///
    /// Returns the new generation.
    pub fn start_match(&self, p1_name: &str, p2_name: &str) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.game.set_players(p1_name, p2_name);
        self.inboxes.clear_all();
        info!(generation = inner.generation, "match started");
        inner.generation
    }

    /// Runs `f` against the game state and inboxes if `generation` is still
    /// the current match. Returns `None`, having run nothing, otherwise.
    pub fn with_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut GameState, &Inboxes) -> R,
    ) -> Option<R> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return None;
        }
        Some(f(&mut inner.game, &self.inboxes))
    }
}

/// Pending submission counts per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingCounts {
    /// Side 1 submitters.
    pub p1: usize,
    /// Side 2 submitters.
    pub p2: usize,
}

/// Serializable read model of the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaSnapshot {
    /// Current match generation.
    pub generation: u64,
    /// Fighter names, health and wins.
    #[serde(flatten)]
    pub board: ScoreBoard,
    /// Whether the current game has been decided.
    pub over: bool,
    /// Distinct submitters waiting per side.
    pub pending: PendingCounts,
}

/// Read-only handle given to the summary loop and the HTTP layer.
#[derive(Debug, Clone)]
pub struct ArenaView {
    arena: Arena,
}

impl ArenaView {
    /// Current match generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.arena.lock().generation
    }

    /// Returns `true` while `generation` is the current match.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Copy of both fighters.
    #[must_use]
    pub fn scoreboard(&self) -> ScoreBoard {
        self.arena.lock().game.scoreboard()
    }

    /// Health of the fighter on `side`.
    #[must_use]
    pub fn health(&self, side: Side) -> u32 {
        self.arena.lock().game.fighter(side).health()
    }

    /// Point-in-time copy of submissions for `side`.
    #[must_use]
    pub fn pending(&self, side: Side) -> Vec<String> {
        self.arena.inboxes.snapshot(side)
    }

    /// Consistent copy of generation, scoreboard and game-over flag.
    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        let (generation, board, over) = {
            let inner = self.arena.lock();
            (inner.generation, inner.game.scoreboard(), inner.game.is_concluded())
        };
        ArenaSnapshot {
            generation,
            board,
            over,
            pending: PendingCounts {
                p1: self.arena.inboxes.len(Side::P1),
                p2: self.arena.inboxes.len(Side::P2),
            },
        }
    }
}
