//! Domain model for the arena.

pub mod commands;
pub mod fighter;
pub mod game_state;
pub mod inbox;
