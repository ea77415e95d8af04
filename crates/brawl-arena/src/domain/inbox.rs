//! Per-side inboxes of the latest chat submission per identity.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use brawl_core::event::Side;
use tracing::debug;

/// Default cap on a stored submission, in characters.
pub const DEFAULT_MESSAGE_MAX_LENGTH: usize = 200;

/// Mapping from submitter identity to their most recent submission.
///
/// Last write per identity wins. Every operation takes the lock for the
/// duration of a single map access, so a snapshot is a consistent copy and
/// never blocks submissions that arrive after it returns.
#[derive(Debug)]
pub struct MessageInbox {
    max_len: usize,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MessageInbox {
    /// Creates an empty inbox that truncates submissions to `max_len` chars.
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // Every critical section is a single map operation, so a poisoned
        // map is still internally consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upserts `text` for `identity` after trimming and truncation.
    ///
    /// Returns `false` (and stores nothing) when the identity or the trimmed
    /// text is empty.
    pub fn submit(&self, identity: &str, text: &str) -> bool {
        let identity = identity.trim();
        let text = text.trim();
        if identity.is_empty() || text.is_empty() {
            return false;
        }

        let truncated: String = text.chars().take(self.max_len).collect();
        self.entries().insert(identity.to_owned(), truncated);
        true
    }

    /// Point-in-time copy of the stored submissions (values only).
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.entries().values().cloned().collect()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of distinct identities with a live entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` when nobody has submitted since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// The pair of inboxes, one per side.
#[derive(Debug)]
pub struct Inboxes {
    p1: MessageInbox,
    p2: MessageInbox,
}

impl Default for Inboxes {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_MAX_LENGTH)
    }
}

impl Inboxes {
    /// Creates both inboxes with the same length cap.
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            p1: MessageInbox::new(max_len),
            p2: MessageInbox::new(max_len),
        }
    }

    /// Returns the inbox for `side`.
    #[must_use]
    pub fn inbox(&self, side: Side) -> &MessageInbox {
        match side {
            Side::P1 => &self.p1,
            Side::P2 => &self.p2,
        }
    }

    /// See [`MessageInbox::submit`].
    pub fn submit(&self, side: Side, identity: &str, text: &str) -> bool {
        let stored = self.inbox(side).submit(identity, text);
        if stored {
            debug!(%side, identity, "stored submission");
        }
        stored
    }

    /// See [`MessageInbox::snapshot`].
    #[must_use]
    pub fn snapshot(&self, side: Side) -> Vec<String> {
        self.inbox(side).snapshot()
    }

    /// Clears the inbox for `side`.
    pub fn clear(&self, side: Side) {
        self.inbox(side).clear();
    }

    /// Clears both inboxes.
    pub fn clear_all(&self) {
        self.p1.clear();
        self.p2.clear();
    }

    /// Number of live entries for `side`.
    #[must_use]
    pub fn len(&self, side: Side) -> usize {
        self.inbox(side).len()
    }

    /// Returns `true` when both inboxes are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.p1.is_empty() && self.p2.is_empty()
    }
}
