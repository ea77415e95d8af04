//! Route modules.

pub mod arena;
pub mod chat;
pub mod events;
pub mod health;
pub mod matches;
