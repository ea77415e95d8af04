//! Brawl — oracle and speech clients.
//!
//! The judging/summarizing oracle and the text-to-speech service are
//! external HTTP collaborators. This crate owns the call boundary: request
//! shapes, verdict validation, and the error kinds callers branch on.

pub mod client;
pub mod error;
pub mod speech;
pub mod verdict;

pub use client::{Contender, HttpOracle, JudgeRequest, Judgement, Oracle};
pub use error::{OracleError, SpeechError};
pub use speech::{HttpSpeech, Speech};
