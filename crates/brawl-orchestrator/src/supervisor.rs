//! Match supervisor actor.
//!
//! Owns the judgment and summary loop tasks. Commands arrive over a
//! channel and are handled one at a time, so a new match always stops the
//! old loops, bumps the generation, and launches fresh loops before the
//! next command is looked at.

use std::future::Future;

use brawl_arena::application::arena::Arena;
use brawl_core::event::DisplayEvent;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::context::LoopContext;
use crate::error::SupervisorError;
use crate::judgment::JudgmentLoop;
use crate::summary::SummaryLoop;

/// Messages handled by the supervisor actor.
#[derive(Debug)]
pub enum SupervisorCommand {
    /// Replace the current match.
    NewMatch {
        /// Side 1 fighter name.
        p1: String,
        /// Side 2 fighter name.
        p2: String,
        /// Receives the new generation once the loops are running.
        reply: Option<oneshot::Sender<u64>>,
    },
    /// Relaunch the summary loop if `generation` is still current.
    RestartSummary {
        /// Generation of the requesting judgment loop.
        generation: u64,
    },
    /// Stop both loops and exit.
    Shutdown,
}

/// Cloneable sender side of the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<SupervisorCommand>,
}

/// Handle that does not keep the supervisor alive.
///
/// Held by loops the supervisor itself owns.
#[derive(Debug, Clone)]
pub struct WeakSupervisorHandle {
    tx: mpsc::WeakUnboundedSender<SupervisorCommand>,
}

impl WeakSupervisorHandle {
    /// Returns a usable handle while the supervisor still has other owners.
    #[must_use]
    pub fn upgrade(&self) -> Option<SupervisorHandle> {
        self.tx.upgrade().map(|tx| SupervisorHandle { tx })
    }
}

impl SupervisorHandle {
    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<SupervisorCommand>) -> Self {
        Self { tx }
    }

    /// Returns a handle that does not keep the supervisor alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakSupervisorHandle {
        WeakSupervisorHandle {
            tx: self.tx.downgrade(),
        }
    }

    fn send(&self, command: SupervisorCommand) -> Result<(), SupervisorError> {
        self.tx.send(command).map_err(|_| SupervisorError::Stopped)
    }

    /// Requests a new match without waiting for it to start.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Stopped` if the supervisor has exited.
    pub fn new_match(&self, p1: &str, p2: &str) -> Result<(), SupervisorError> {
        self.send(SupervisorCommand::NewMatch {
            p1: p1.to_owned(),
            p2: p2.to_owned(),
            reply: None,
        })
    }

    /// Starts a new match and waits until its loops are running.
    ///
    /// Returns the new generation.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Stopped` if the supervisor has exited.
    pub async fn start_match(&self, p1: &str, p2: &str) -> Result<u64, SupervisorError> {
        let (reply, rx) = oneshot::channel();
        self.send(SupervisorCommand::NewMatch {
            p1: p1.to_owned(),
            p2: p2.to_owned(),
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| SupervisorError::Stopped)
    }

    /// Asks for the summary loop to be relaunched for `generation`.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Stopped` if the supervisor has exited.
    pub fn restart_summary(&self, generation: u64) -> Result<(), SupervisorError> {
        self.send(SupervisorCommand::RestartSummary { generation })
    }

    /// Asks the supervisor to stop both loops and exit.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Stopped` if the supervisor has already exited.
    pub fn shutdown(&self) -> Result<(), SupervisorError> {
        self.send(SupervisorCommand::Shutdown)
    }

    /// Shuts the supervisor down and waits for its `task` to finish.
    ///
    /// Returns `false` if the task panicked or was aborted; the failure is
    /// logged.
    pub async fn shutdown_and_wait(&self, task: JoinHandle<()>) -> bool {
        if self.shutdown().is_err() {
            debug!("supervisor already stopped");
        }
        match task.await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, panicked = err.is_panic(), "supervisor task failed");
                false
            }
        }
    }
}

/// A cancellable loop task.
struct LoopTask {
    name: &'static str,
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LoopTask {
    fn spawn<F>(name: &'static str, generation: u64, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => debug!(name, generation, "loop cancelled"),
                () = future => debug!(name, generation, "loop finished"),
            }
        });
        Self {
            name,
            generation,
            cancel,
            handle,
        }
    }

    /// Cancels the task and waits until it has stopped.
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            if err.is_panic() {
                error!(name = self.name, generation = self.generation, "loop panicked");
            }
        }
    }
}

/// The actor owning both loops.
pub struct Supervisor {
    ctx: LoopContext,
    arena: Arena,
    rx: mpsc::UnboundedReceiver<SupervisorCommand>,
    weak: WeakSupervisorHandle,
    judgment: Option<LoopTask>,
    summary: Option<LoopTask>,
}

impl Supervisor {
    /// Spawns the actor. No loops run until the first match is started.
    ///
    /// The actor exits on [`SupervisorHandle::shutdown`] or once every
    /// handle is dropped, stopping both loops on the way out.
    #[must_use]
    pub fn spawn(ctx: LoopContext, arena: Arena) -> (SupervisorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SupervisorHandle::from_sender(tx);
        let supervisor = Self {
            ctx,
            arena,
            rx,
            weak: handle.downgrade(),
            judgment: None,
            summary: None,
        };
        let task = tokio::spawn(supervisor.run());
        (handle, task)
    }

    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                SupervisorCommand::NewMatch { p1, p2, reply } => {
                    let generation = self.new_match(&p1, &p2).await;
                    if let Some(reply) = reply {
                        let _ = reply.send(generation);
                    }
                }
                SupervisorCommand::RestartSummary { generation } => {
                    self.restart_summary(generation).await;
                }
                SupervisorCommand::Shutdown => break,
            }
        }
        self.stop_loops().await;
        info!("match supervisor stopped");
    }

    #[instrument(skip(self))]
    async fn new_match(&mut self, p1: &str, p2: &str) -> u64 {
        self.stop_loops().await;

        let generation = self.arena.start_match(p1, p2);
        self.ctx
            .broadcaster
            .publish(DisplayEvent::State(self.arena.view().scoreboard()));

        let judgment = JudgmentLoop::new(
            self.ctx.clone(),
            self.arena.clone(),
            generation,
            Some(self.weak.clone()),
        );
        self.judgment = Some(LoopTask::spawn("judgment", generation, judgment.run()));
        self.launch_summary(generation);

        info!(generation, "match loops launched");
        generation
    }

    async fn restart_summary(&mut self, generation: u64) {
        if !self.arena.view().is_current(generation) {
            debug!(generation, "ignoring summary restart for replaced match");
            return;
        }
        if let Some(task) = self.summary.take() {
            task.stop().await;
        }
        self.launch_summary(generation);
        info!(generation, "summary loop relaunched");
    }

    fn launch_summary(&mut self, generation: u64) {
        let summary = SummaryLoop::new(self.ctx.clone(), self.arena.view(), generation);
        self.summary = Some(LoopTask::spawn("summary", generation, summary.run()));
    }

    async fn stop_loops(&mut self) {
        if let Some(task) = self.judgment.take() {
            task.stop().await;
        }
        if let Some(task) = self.summary.take() {
            task.stop().await;
        }
    }
}
