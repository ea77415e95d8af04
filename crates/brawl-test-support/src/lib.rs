//! Shared test mocks and utilities for the brawl orchestrator.

mod clock;
mod oracle;
mod rng;
mod speech;

pub use clock::FixedClock;
pub use oracle::{FailingOracle, ScriptedOracle};
pub use rng::{MockRng, SequenceRng};
pub use speech::{FailingSpeech, RecordingSpeech};
