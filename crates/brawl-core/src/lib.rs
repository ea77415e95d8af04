//! Brawl Core — shared primitives.
//!
//! This crate defines the types every other brawl crate speaks: the two
//! sides of the arena, the display events pushed to stream consumers, and
//! the clock/RNG seams that keep the loops deterministic under test. It
//! contains no I/O.

pub mod clock;
pub mod error;
pub mod event;
pub mod rng;
pub mod verdict;
