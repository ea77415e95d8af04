//! Fan-out of published events to registered consumers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use brawl_core::clock::Clock;
use brawl_core::event::{DisplayEvent, EventEnvelope};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::subscription::Subscription;

/// Idle window after which a consumer is sent a ping.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Subscriber {
    tx: mpsc::UnboundedSender<EventEnvelope>,
    last_sent: Instant,
}

/// Multicast event queue with one independent cursor per consumer.
pub struct Broadcaster {
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
    keepalive: Duration,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscriber_count())
            .field("keepalive", &self.keepalive)
            .finish_non_exhaustive()
    }
}

impl Broadcaster {
    /// Creates a broadcaster stamping events with `clock`.
    ///
    /// Pings are only emitted once [`Broadcaster::spawn_keepalive`] runs.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, keepalive: Duration) -> Arc<Self> {
        Arc::new(Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            clock,
            keepalive,
        })
    }

    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `event` to every registered consumer without blocking.
    ///
    /// Consumers whose receiving side is gone are dropped on the way.
    pub fn publish(&self, event: DisplayEvent) {
        let envelope = EventEnvelope::new(event, self.clock.as_ref());
        let kind = envelope.event.kind();
        let now = Instant::now();

        let mut subscribers = self.subscribers();
        subscribers.retain(|_, subscriber| {
            let delivered = subscriber.tx.send(envelope.clone()).is_ok();
            subscriber.last_sent = now;
            delivered
        });
        debug!(kind, receivers = subscribers.len(), "event published");
    }

    /// Registers a new consumer. Dropping the returned subscription
    /// deregisters it.
    #[must_use]
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers().insert(
            id,
            Subscriber {
                tx,
                last_sent: Instant::now(),
            },
        );
        debug!(id, "consumer subscribed");
        Subscription::new(id, rx, Arc::downgrade(self))
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        if self.subscribers().remove(&id).is_some() {
            debug!(id, "consumer unsubscribed");
        }
    }

    /// Number of registered consumers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// Sends a ping to every consumer that has gone a full keepalive window
    /// without being sent anything, and returns the earliest instant another
    /// consumer falls due.
    fn ping_idle(&self, now: Instant) -> Instant {
        let mut next_due = now + self.keepalive;
        let mut subscribers = self.subscribers();
        subscribers.retain(|_, subscriber| {
            let due = subscriber.last_sent + self.keepalive;
            if due > now {
                next_due = next_due.min(due);
                return true;
            }
            subscriber.last_sent = now;
            subscriber
                .tx
                .send(EventEnvelope::ping(self.clock.as_ref()))
                .is_ok()
        });
        next_due
    }

    /// Starts the keepalive task. Each consumer is pinged one keepalive
    /// window after it was last sent anything. The task exits once the
    /// broadcaster is dropped, and does not run at all for a zero window.
    pub fn spawn_keepalive(self: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let period = self.keepalive;
        tokio::spawn(async move {
            if period.is_zero() {
                warn!("keepalive window is zero, pings disabled");
                return;
            }
            let mut deadline = Instant::now() + period;
            loop {
                tokio::time::sleep_until(deadline).await;
                let Some(broadcaster) = weak.upgrade() else {
                    break;
                };
                deadline = broadcaster.ping_idle(Instant::now());
            }
        })
    }
}
