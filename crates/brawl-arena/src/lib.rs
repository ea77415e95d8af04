//! Brawl — Arena bounded context.
//!
//! Owns the two fighters, the per-side message inboxes, the parsing of
//! chat commands, and the generation-tagged handle through which the
//! loops mutate shared match state.

pub mod application;
pub mod domain;
