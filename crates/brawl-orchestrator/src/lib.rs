//! Brawl — match orchestration.
//!
//! Two independently scheduled loops share the arena: the judgment loop
//! runs rounds (countdown, collect, judge, announce, game-over) and the
//! summary loop narrates pending submissions in between. A supervisor
//! actor owns both tasks and replaces them atomically on every new match.

pub mod config;
pub mod context;
pub mod error;
pub mod ingest;
pub mod judgment;
pub mod summary;
pub mod supervisor;

pub use config::MatchConfig;
pub use context::LoopContext;
pub use error::{RoundError, SupervisorError};
pub use ingest::{ChatMessage, Ingestor, spawn_ingestion};
pub use supervisor::{Supervisor, SupervisorHandle};
