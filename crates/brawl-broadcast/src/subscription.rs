//! A single consumer's read cursor.

use std::sync::Weak;

use brawl_core::event::EventEnvelope;
use futures::Stream;
use tokio::sync::mpsc;

use crate::broadcaster::Broadcaster;

/// Receiving end registered with a [`Broadcaster`].
///
/// Dropping it (for example when an HTTP stream disconnects) removes the
/// consumer from the fan-out set.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<EventEnvelope>,
    broadcaster: Weak<Broadcaster>,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        rx: mpsc::UnboundedReceiver<EventEnvelope>,
        broadcaster: Weak<Broadcaster>,
    ) -> Self {
        Self {
            id,
            rx,
            broadcaster,
        }
    }

    /// Waits for the next event. Returns `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.rx.recv().await
    }

    /// Returns the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        self.rx.try_recv().ok()
    }

    /// Converts the subscription into a stream of envelopes.
    pub fn into_stream(self) -> impl Stream<Item = EventEnvelope> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let envelope = subscription.recv().await?;
            Some((envelope, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.unsubscribe(self.id);
        }
    }
}
