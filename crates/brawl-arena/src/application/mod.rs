//! Shared handles over the arena domain.

pub mod arena;
