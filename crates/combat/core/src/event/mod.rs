//! Event publication.
//!
//! Resolvers publish [`CombatEvent`]s through the [`EventBus`] immediately
//! after the state mutation they describe, so publish order is mutation order.
//! Subscribers are notified synchronously; the bus also keeps a log that the
//! caller drains with [`EventBus::take_events`].
mod types;

pub use types::{BlockedBy, ComboFailureReason, CombatEvent, EffectRemovalReason, ReactionKind};

use chrono::{DateTime, Utc};

/// A published event with its position in the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventRecord {
    /// Contiguous from 0 within one bus.
    pub sequence: u64,
    pub round: u32,
    pub timestamp: DateTime<Utc>,
    pub event: CombatEvent,
}

/// Receives every event as it is published.
pub trait EventSubscriber {
    fn on_event(&mut self, record: &EventRecord);
}

impl<F> EventSubscriber for F
where
    F: FnMut(&EventRecord),
{
    fn on_event(&mut self, record: &EventRecord) {
        self(record)
    }
}

#[derive(Default)]
pub struct EventBus {
    next_sequence: u64,
    log: Vec<EventRecord>,
    subscribers: Vec<Box<dyn EventSubscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribers are notified in registration order.
    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn publish(&mut self, round: u32, event: CombatEvent) {
        let record = EventRecord {
            sequence: self.next_sequence,
            round,
            timestamp: Utc::now(),
            event,
        };
        self.next_sequence += 1;
        tracing::trace!("event #{} {}", record.sequence, record.event.kind());
        for subscriber in &mut self.subscribers {
            subscriber.on_event(&record);
        }
        self.log.push(record);
    }

    /// Events published since the last drain.
    pub fn events(&self) -> &[EventRecord] {
        &self.log
    }

    /// Drains and returns all logged events in publish order.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.log)
    }

    pub fn published(&self) -> u64 {
        self.next_sequence
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("next_sequence", &self.next_sequence)
            .field("logged", &self.log.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
