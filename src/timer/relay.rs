//! Listener registry for timer update events.
//!
//! The relay never owns a listener: it only keeps the sending half of each
//! listener's queue. A listener that goes away closes its queue, and the
//! relay forgets it on the next broadcast. Queues are unbounded so a slow
//! listener still receives every event of a cycle, completion included.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::TimerUpdateEvent;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// ListenerId
// ============================================================================

/// Identity of a listening context.
///
/// Subscribing the same id twice replaces the earlier queue, so a listener
/// never receives an event twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Creates an id from a caller-chosen value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Allocates a process-unique id.
    pub fn next() -> Self {
        // Caller-chosen ids are expected to be small; allocated ones start high.
        Self(u64::MAX / 2 + NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

// ============================================================================
// Relay
// ============================================================================

#[derive(Debug)]
struct Sink {
    token: u64,
    sender: mpsc::UnboundedSender<TimerUpdateEvent>,
}

/// Fan-out of update events to the currently attached listeners.
#[derive(Debug, Default)]
pub struct Relay {
    sinks: HashMap<ListenerId, Sink>,
}

impl Relay {
    /// Creates an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a queue for `id`.
    ///
    /// `token` identifies this particular subscription so that a stale
    /// unsubscribe cannot detach a newer one. Returns true if an earlier
    /// queue for the same id was replaced.
    pub fn subscribe(
        &mut self,
        id: ListenerId,
        token: u64,
        sender: mpsc::UnboundedSender<TimerUpdateEvent>,
    ) -> bool {
        let replaced = self.sinks.insert(id, Sink { token, sender }).is_some();
        debug!(%id, replaced, "Listener subscribed");
        replaced
    }

    /// Detaches `id` if its current subscription carries `token`.
    pub fn unsubscribe(&mut self, id: ListenerId, token: u64) -> bool {
        match self.sinks.get(&id) {
            Some(sink) if sink.token == token => {
                self.sinks.remove(&id);
                debug!(%id, "Listener unsubscribed");
                true
            }
            _ => false,
        }
    }

    /// Delivers `event` to every attached listener.
    ///
    /// Closed queues are dropped from the registry. Returns the number of
    /// listeners that received the event.
    pub fn broadcast(&mut self, event: &TimerUpdateEvent) -> usize {
        self.sinks.retain(|id, sink| {
            if sink.sender.send(*event).is_ok() {
                true
            } else {
                debug!(%id, "Listener gone, removing");
                false
            }
        });
        self.sinks.len()
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
