//! Brawl — display event broadcaster.
//!
//! Multicast publish/subscribe fan-out of [`DisplayEvent`]s to any number
//! of stream consumers. Producers never wait on consumers: every consumer
//! owns an unbounded queue, and idle consumers are kept alive with
//! synthetic pings.
//!
//! [`DisplayEvent`]: brawl_core::event::DisplayEvent

mod broadcaster;
mod subscription;

pub use broadcaster::{Broadcaster, DEFAULT_KEEPALIVE};
pub use subscription::Subscription;
