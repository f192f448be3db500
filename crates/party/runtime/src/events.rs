//! Event bus for party changes
//!
//! Every successful state change is published after it is durable. Delivery
//! to subscribers is best-effort here; an external broadcast layer owns
//! fan-out and redelivery.

use party_types::{PartyEvent, PartyEventEnvelope, PartyId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Publishes party events to any number of subscribers
#[derive(Clone, Debug)]
pub struct PartyEventBus {
    sender: broadcast::Sender<PartyEventEnvelope>,
    published: Arc<AtomicU64>,
}

impl PartyEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish an event for a party
    pub fn publish(&self, party_id: &PartyId, event: PartyEvent) {
        let envelope = PartyEventEnvelope::new(party_id.clone(), event);
        trace!(party = %party_id, kind = envelope.event.kind(), "publishing event");
        self.published.fetch_add(1, Ordering::Relaxed);
        // No receivers is fine
        let _ = self.sender.send(envelope);
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<PartyEventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events published since creation
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for PartyEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
