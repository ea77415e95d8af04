//! Periodic narration of pending submissions.

use std::cmp::Ordering;
use std::sync::PoisonError;

use brawl_arena::application::arena::ArenaView;
use brawl_core::event::{DisplayEvent, Side};
use tracing::{debug, instrument, warn};

use crate::context::LoopContext;

/// How one summary cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing pending on either side.
    Idle,
    /// This many sides were narrated.
    Narrated(usize),
    /// The match was replaced mid-cycle; the late narration was dropped.
    Stale,
}

/// Narrates each side's pending submissions on a fixed interval.
pub struct SummaryLoop {
    ctx: LoopContext,
    view: ArenaView,
    generation: u64,
}

impl SummaryLoop {
    /// Creates a loop bound to `generation`.
    #[must_use]
    pub fn new(ctx: LoopContext, view: ArenaView, generation: u64) -> Self {
        Self {
            ctx,
            view,
            generation,
        }
    }

    /// Runs cycles until the match is replaced.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub async fn run(self) {
        loop {
            tokio::time::sleep(self.ctx.config.summary_interval).await;
            match self.run_cycle().await {
                CycleOutcome::Stale => {
                    debug!("match replaced, summary loop exiting");
                    return;
                }
                outcome => debug!(?outcome, "summary cycle finished"),
            }
        }
    }

    /// Narration order: the side with lower health goes second, ties are
    /// broken by a coin flip.
    fn order(&self) -> [Side; 2] {
        let p1 = self.view.health(Side::P1);
        let p2 = self.view.health(Side::P2);
        let p1_last = match p1.cmp(&p2) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self
                .ctx
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .coin_flip(),
        };
        if p1_last {
            [Side::P2, Side::P1]
        } else {
            [Side::P1, Side::P2]
        }
    }

    /// Runs one narration cycle without the leading interval sleep.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.view.is_current(self.generation) {
            return CycleOutcome::Stale;
        }

        let pending: Vec<(Side, Vec<String>)> = self
            .order()
            .into_iter()
            .map(|side| (side, self.view.pending(side)))
            .filter(|(_, messages)| !messages.is_empty())
            .collect();
        if pending.is_empty() {
            return CycleOutcome::Idle;
        }

        let mut narrated = 0;
        for (index, (side, messages)) in pending.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.ctx.config.summary_gap).await;
            }

            let text = match self.ctx.oracle.summarize(messages).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(%side, error = %err, "summary failed");
                    continue;
                }
            };
            if !self.view.is_current(self.generation) {
                return CycleOutcome::Stale;
            }

            self.ctx.broadcaster.publish(DisplayEvent::Think {
                side: *side,
                text: text.clone(),
            });
            narrated += 1;

            if let Some(speech) = &self.ctx.speech {
                if let Err(err) = speech.speak(&text).await {
                    warn!(%side, error = %err, "speech failed");
                }
            }
        }
        CycleOutcome::Narrated(narrated)
    }
}
