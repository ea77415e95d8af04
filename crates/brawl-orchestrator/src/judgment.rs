//! The round state machine.
//!
//! One round runs COUNTDOWN, COLLECT, JUDGE, ANNOUNCE and, when a fighter
//! falls, GAME_OVER. Every state mutation goes through
//! [`Arena::with_current`] with the generation the loop was launched for,
//! so a loop whose match has been replaced can never touch the new one.

use brawl_arena::application::arena::Arena;
use brawl_arena::domain::game_state::GameOutcome;
use brawl_core::event::{DisplayEvent, Side};
use brawl_core::verdict::Verdict;
use brawl_oracle::verdict::substitute_names;
use brawl_oracle::{Contender, JudgeRequest, OracleError};
use tracing::{debug, error, info, instrument, warn};

use crate::context::LoopContext;
use crate::error::RoundError;
use crate::supervisor::WeakSupervisorHandle;

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Both inboxes were empty; the oracle was not called.
    Skipped,
    /// The oracle was unreachable; no damage was applied.
    Voided,
    /// A verdict was applied.
    Decided {
        /// The applied verdict.
        verdict: Verdict,
        /// Set when the verdict ended the game.
        game_over: Option<GameOutcome>,
    },
    /// A newer match replaced this loop's match; nothing was applied.
    Stale,
}

/// Runs rounds for one match generation.
pub struct JudgmentLoop {
    ctx: LoopContext,
    arena: Arena,
    generation: u64,
    supervisor: Option<WeakSupervisorHandle>,
}

impl JudgmentLoop {
    /// Creates a loop bound to `generation`.
    ///
    /// After a game-over reset the loop asks `supervisor`, when given, to
    /// relaunch the summary loop.
    #[must_use]
    pub fn new(
        ctx: LoopContext,
        arena: Arena,
        generation: u64,
        supervisor: Option<WeakSupervisorHandle>,
    ) -> Self {
        Self {
            ctx,
            arena,
            generation,
            supervisor,
        }
    }

    /// Runs rounds until the match is replaced.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub async fn run(self) {
        loop {
            match self.run_round().await {
                Ok(RoundOutcome::Stale) => {
                    info!("match replaced, judgment loop exiting");
                    return;
                }
                Ok(outcome) => debug!(?outcome, "round finished"),
                Err(err) => error!(error = %err, "round failed"),
            }
        }
    }

    /// Runs exactly one round.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::InvalidVerdict` when the oracle answers with no
    /// recognizable verdict. Nothing is mutated and the inboxes are kept.
    pub async fn run_round(&self) -> Result<RoundOutcome, RoundError> {
        let config = &self.ctx.config;
        let broadcaster = &self.ctx.broadcaster;
        let view = self.arena.view();

        // COUNTDOWN
        if !view.is_current(self.generation) {
            return Ok(RoundOutcome::Stale);
        }
        broadcaster.publish(DisplayEvent::State(view.scoreboard()));
        self.ctx.publish_placeholders();
        broadcaster.publish(DisplayEvent::RoundStart {
            duration_secs: config.round_duration.as_secs(),
        });
        tokio::time::sleep(config.round_duration).await;

        // COLLECT
        let p1_messages = view.pending(Side::P1);
        let p2_messages = view.pending(Side::P2);
        if p1_messages.is_empty() && p2_messages.is_empty() {
            debug!("no submissions, skipping judgment");
            return Ok(RoundOutcome::Skipped);
        }
        let board = view.scoreboard();
        let request = JudgeRequest {
            p1: Contender {
                name: board.p1.name,
                messages: p1_messages,
            },
            p2: Contender {
                name: board.p2.name,
                messages: p2_messages,
            },
        };

        // JUDGE
        let judgement = match self.ctx.oracle.judge(&request).await {
            Ok(judgement) => judgement,
            Err(err) if err.is_transport() => {
                warn!(error = %err, "oracle unavailable, round void");
                return Ok(RoundOutcome::Voided);
            }
            Err(err) => {
                if let OracleError::InvalidResponse { raw } = &err {
                    error!(raw = %raw, "oracle returned no verdict");
                }
                return Err(RoundError::InvalidVerdict(err));
            }
        };

        // ANNOUNCE
        let verdict = judgement.verdict;
        let Some((board, status)) = self.arena.with_current(self.generation, |game, inboxes| {
            game.apply_verdict(verdict);
            inboxes.clear_all();
            (game.scoreboard(), game.status())
        }) else {
            return Ok(RoundOutcome::Stale);
        };
        info!(?verdict, %status, "verdict applied");

        let text = substitute_names(&judgement.text, &board.p1.name, &board.p2.name);
        let read_time = config.read_time(&text);
        broadcaster.publish(DisplayEvent::Show { text });
        broadcaster.publish(DisplayEvent::State(board));
        tokio::time::sleep(read_time).await;
        broadcaster.publish(DisplayEvent::Hide);

        // GAME_OVER
        let Some(over) = self.arena.with_current(self.generation, |game, _| {
            game.check_game_over()
                .map(|outcome| (outcome, game.scoreboard()))
        }) else {
            return Ok(RoundOutcome::Stale);
        };
        let Some((outcome, board)) = over else {
            return Ok(RoundOutcome::Decided {
                verdict,
                game_over: None,
            });
        };

        broadcaster.publish(DisplayEvent::State(board));
        tokio::time::sleep(config.cooldown).await;

        let Some(board) = self.arena.with_current(self.generation, |game, inboxes| {
            inboxes.clear_all();
            game.reset_game();
            game.scoreboard()
        }) else {
            return Ok(RoundOutcome::Stale);
        };
        broadcaster.publish(DisplayEvent::State(board));
        self.ctx.publish_placeholders();
        self.restart_summary();

        Ok(RoundOutcome::Decided {
            verdict,
            game_over: Some(outcome),
        })
    }

    fn restart_summary(&self) {
        let Some(supervisor) = self.supervisor.as_ref().and_then(WeakSupervisorHandle::upgrade)
        else {
            return;
        };
        if let Err(err) = supervisor.restart_summary(self.generation) {
            warn!(error = %err, "could not relaunch summary loop");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use brawl_broadcast::{Broadcaster, Subscription};
    use brawl_core::event::ScoreBoard;
    use brawl_oracle::Oracle;
    use brawl_test_support::{FailingOracle, FixedClock, MockRng, ScriptedOracle};
    use tokio::sync::mpsc;

    use super::*;
    use crate::config::MatchConfig;
    use crate::supervisor::{SupervisorCommand, SupervisorHandle};

    fn context(oracle: Arc<dyn Oracle>) -> LoopContext {
        LoopContext {
            config: Arc::new(MatchConfig::default()),
            oracle,
            speech: None,
            broadcaster: Broadcaster::new(Arc::new(FixedClock::default()), Duration::from_secs(1)),
            rng: Arc::new(Mutex::new(MockRng)),
        }
    }

    fn arena(max_health: u32) -> (Arena, u64) {
        let arena = Arena::new(max_health, 200);
        let generation = arena.start_match("Boggy", "Slimy");
        (arena, generation)
    }

    fn drain(subscription: &mut Subscription) -> Vec<DisplayEvent> {
        let mut events = Vec::new();
        while let Some(envelope) = subscription.try_recv() {
            events.push(envelope.event);
        }
        events
    }

    fn shows(events: &[DisplayEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Show { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_applies_verdict_and_announces_with_names() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["fire melts ice, the winner is p1"]));
        let ctx = context(oracle.clone());
        let mut subscription = ctx.broadcaster.subscribe();
        let (arena, generation) = arena(3);
        arena.inboxes().submit(Side::P1, "alice", "fire breath");
        arena.inboxes().submit(Side::P2, "bob", "ice wall");
        let judgment = JudgmentLoop::new(ctx, arena.clone(), generation, None);

        // Act
        let outcome = judgment.run_round().await.unwrap();

        // Assert
        assert_eq!(
            outcome,
            RoundOutcome::Decided {
                verdict: Verdict::P1Wins,
                game_over: None
            }
        );
        let view = arena.view();
        assert_eq!(view.health(Side::P1), 3);
        assert_eq!(view.health(Side::P2), 2);
        assert!(arena.inboxes().is_empty());

        let calls = oracle.judge_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].p1.name, "Boggy");
        assert_eq!(calls[0].p1.messages, vec!["fire breath".to_owned()]);
        assert_eq!(calls[0].p2.messages, vec!["ice wall".to_owned()]);

        let events = drain(&mut subscription);
        assert_eq!(shows(&events), vec!["fire melts ice, the winner is Boggy".to_owned()]);
        let show_at = events
            .iter()
            .position(|e| matches!(e, DisplayEvent::Show { .. }))
            .unwrap();
        assert!(matches!(&events[show_at + 1], DisplayEvent::State(board) if board.p2.health == 2));
        assert_eq!(events.last(), Some(&DisplayEvent::Hide));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_publishes_state_placeholders_and_round_start() {
        // Arrange
        let ctx = context(Arc::new(ScriptedOracle::default()));
        let mut subscription = ctx.broadcaster.subscribe();
        let (arena, generation) = arena(3);
        let judgment = JudgmentLoop::new(ctx, arena, generation, None);

        // Act
        judgment.run_round().await.unwrap();

        // Assert
        let events = drain(&mut subscription);
        assert!(matches!(&events[0], DisplayEvent::State(ScoreBoard { p1, .. }) if p1.name == "Boggy"));
        assert_eq!(
            events[1],
            DisplayEvent::Think {
                side: Side::P1,
                text: "what next...".to_owned()
            }
        );
        assert_eq!(
            events[2],
            DisplayEvent::Think {
                side: Side::P2,
                text: "what next...".to_owned()
            }
        );
        assert_eq!(events[3], DisplayEvent::RoundStart { duration_secs: 60 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_inboxes_skip_oracle() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["p1"]));
        let (arena, generation) = arena(3);
        let judgment = JudgmentLoop::new(context(oracle.clone()), arena.clone(), generation, None);

        // Act
        let outcome = judgment.run_round().await.unwrap();

        // Assert
        assert_eq!(outcome, RoundOutcome::Skipped);
        assert!(oracle.judge_calls().is_empty());
        assert_eq!(arena.view().health(Side::P1), 3);
        assert_eq!(arena.view().health(Side::P2), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_voids_round_without_damage() {
        // Arrange
        let (arena, generation) = arena(3);
        arena.inboxes().submit(Side::P1, "alice", "fire breath");
        let judgment = JudgmentLoop::new(
            context(Arc::new(FailingOracle)),
            arena.clone(),
            generation,
            None,
        );

        // Act
        let outcome = judgment.run_round().await.unwrap();

        // Assert
        assert_eq!(outcome, RoundOutcome::Voided);
        assert_eq!(arena.view().health(Side::P1), 3);
        assert_eq!(arena.view().health(Side::P2), 3);
        assert_eq!(arena.inboxes().len(Side::P1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_verdict_fails_round_without_mutation() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["Something else entirely"]));
        let ctx = context(oracle);
        let mut subscription = ctx.broadcaster.subscribe();
        let (arena, generation) = arena(3);
        arena.inboxes().submit(Side::P1, "alice", "fire breath");
        arena.inboxes().submit(Side::P2, "bob", "ice wall");
        let judgment = JudgmentLoop::new(ctx, arena.clone(), generation, None);

        // Act
        let result = judgment.run_round().await;

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            RoundError::InvalidVerdict(OracleError::InvalidResponse { ref raw }) if raw == "Something else entirely"
        ));
        assert_eq!(arena.view().health(Side::P1), 3);
        assert_eq!(arena.view().health(Side::P2), 3);
        assert_eq!(arena.inboxes().len(Side::P1), 1);
        assert_eq!(arena.inboxes().len(Side::P2), 1);
        assert!(shows(&drain(&mut subscription)).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_damages_both_fighters() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["No clear winner, it's a DRAW"]));
        let (arena, generation) = arena(3);
        arena.inboxes().submit(Side::P1, "alice", "fire breath");
        let judgment = JudgmentLoop::new(context(oracle), arena.clone(), generation, None);

        // Act
        let outcome = judgment.run_round().await.unwrap();

        // Assert
        assert_eq!(
            outcome,
            RoundOutcome::Decided {
                verdict: Verdict::Draw,
                game_over: None
            }
        );
        assert_eq!(arena.view().health(Side::P1), 2);
        assert_eq!(arena.view().health(Side::P2), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_match_discards_late_verdict() {
        // Arrange
        let oracle = Arc::new(
            ScriptedOracle::new(["the winner is p2"]).with_delay(Duration::from_secs(30)),
        );
        let (arena, generation) = arena(3);
        arena.inboxes().submit(Side::P1, "alice", "fire breath");
        let judgment = JudgmentLoop::new(context(oracle), arena.clone(), generation, None);
        let round = tokio::spawn(async move { judgment.run_round().await });

        // Act
        tokio::time::sleep(Duration::from_secs(70)).await;
        arena.start_match("Wormy", "Squirmy");
        arena.inboxes().submit(Side::P2, "carol", "burrow");
        let outcome = round.await.unwrap().unwrap();

        // Assert
        assert_eq!(outcome, RoundOutcome::Stale);
        let view = arena.view();
        assert_eq!(view.health(Side::P1), 3);
        assert_eq!(view.scoreboard().p1.name, "Wormy");
        assert_eq!(arena.inboxes().len(Side::P2), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_loop_does_not_start_a_round() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["p1"]));
        let ctx = context(oracle.clone());
        let mut subscription = ctx.broadcaster.subscribe();
        let (arena, generation) = arena(3);
        arena.start_match("Wormy", "Squirmy");
        let judgment = JudgmentLoop::new(ctx, arena, generation, None);

        // Act
        let outcome = judgment.run_round().await.unwrap();

        // Assert
        assert_eq!(outcome, RoundOutcome::Stale);
        assert!(drain(&mut subscription).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_records_win_then_resets_and_restarts_summary() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["the winner is p1"]));
        let ctx = context(oracle);
        let mut subscription = ctx.broadcaster.subscribe();
        let (arena, generation) = arena(1);
        arena.inboxes().submit(Side::P1, "alice", "fire breath");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let supervisor = SupervisorHandle::from_sender(tx);
        let judgment = JudgmentLoop::new(ctx, arena.clone(), generation, Some(supervisor.downgrade()));

        // Act
        let outcome = judgment.run_round().await.unwrap();

        // Assert
        assert_eq!(
            outcome,
            RoundOutcome::Decided {
                verdict: Verdict::P1Wins,
                game_over: Some(GameOutcome::Winner(Side::P1))
            }
        );
        let events = drain(&mut subscription);
        let boards: Vec<&ScoreBoard> = events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::State(board) => Some(board),
                _ => None,
            })
            .collect();
        assert!(boards.iter().any(|b| b.p1.wins == 1 && b.p2.health == 0));
        let last = boards.last().unwrap();
        assert_eq!((last.p1.health, last.p2.health), (1, 1));
        assert_eq!((last.p1.wins, last.p2.wins), (0, 0));
        assert_eq!(
            events.last(),
            Some(&DisplayEvent::Think {
                side: Side::P2,
                text: "what next...".to_owned()
            })
        );
        assert!(!arena.view().snapshot().over);
        assert!(matches!(
            rx.try_recv(),
            Ok(SupervisorCommand::RestartSummary { generation: g }) if g == generation
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submissions_during_cooldown_are_cleared_on_reset() {
        // Arrange
        let oracle = Arc::new(ScriptedOracle::new(["the winner is p2"]));
        let (arena, generation) = arena(1);
        arena.inboxes().submit(Side::P2, "bob", "ice wall");
        let judgment = JudgmentLoop::new(context(oracle), arena.clone(), generation, None);
        let round = tokio::spawn(async move { judgment.run_round().await });

        // Act
        tokio::time::sleep(Duration::from_secs(65)).await;
        arena.inboxes().submit(Side::P1, "alice", "too late");
        round.await.unwrap().unwrap();

        // Assert
        assert!(arena.inboxes().is_empty());
    }
}
