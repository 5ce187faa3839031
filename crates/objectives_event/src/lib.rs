//! # objectives_event - Event Bus
//!
//! Event bus carrying host notifications to subscribers:
//! - Queued publishing from any thread
//! - Priority-based delivery
//! - Typed events over a dynamic envelope
//! - Explicit subscribe / unsubscribe

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

/// Event priority
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Event envelope containing metadata
pub struct EventEnvelope {
    /// Event type ID
    pub type_id: TypeId,
    /// Event data
    pub data: Box<dyn Any + Send + Sync>,
    /// Priority
    pub priority: Priority,
    /// Sequence number, used to keep publish order within a priority
    pub sequence: u64,
}

impl EventEnvelope {
    /// Create a new envelope
    pub fn new<E: Event>(event: E, priority: Priority, sequence: u64) -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            data: Box::new(event),
            priority,
            sequence,
        }
    }
}

/// Trait for events
pub trait Event: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Event for T {}

/// Dynamic event handler
pub type DynamicHandler = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Event bus for publishing and subscribing to events
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
    /// Typed handlers
    handlers: BTreeMap<TypeId, Vec<(SubscriberId, Priority, DynamicHandler)>>,
    /// Next subscriber ID
    next_subscriber_id: u64,
    /// Publish counter, shared with every [`Publisher`]
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            handlers: BTreeMap::new(),
            next_subscriber_id: 1,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a sender that publishes into this bus from elsewhere
    pub fn publisher(&self) -> Publisher {
        Publisher {
            sender: self.sender.clone(),
            sequence: self.sequence.clone(),
        }
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        self.publish_with_priority(event, Priority::Normal);
    }

    /// Publish an event with priority
    pub fn publish_with_priority<E: Event>(&self, event: E, priority: Priority) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        // The bus holds its own receiver, so the channel is never disconnected.
        let _ = self
            .sender
            .send(EventEnvelope::new(event, priority, sequence));
    }

    /// Subscribe to an event type
    pub fn subscribe<E: Event, F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe_with_priority::<E, F>(handler, Priority::Normal)
    }

    /// Subscribe with priority
    pub fn subscribe_with_priority<E: Event, F>(
        &mut self,
        handler: F,
        priority: Priority,
    ) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;

        let type_id = TypeId::of::<E>();
        let wrapped_handler: DynamicHandler = Box::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        let handlers = self.handlers.entry(type_id).or_default();
        handlers.push((id, priority, wrapped_handler));
        // Stable sort: equal priorities keep subscription order
        handlers.sort_by(|a, b| b.1.cmp(&a.1));

        id
    }

    /// Unsubscribe
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        for handlers in self.handlers.values_mut() {
            handlers.retain(|(sub_id, _, _)| *sub_id != id);
        }
        self.handlers.retain(|_, handlers| !handlers.is_empty());
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Process all pending events, returning how many were delivered
    pub fn process(&mut self) -> usize {
        let mut events: Vec<EventEnvelope> = self.receiver.try_iter().collect();

        // Higher priority first, publish order within a priority
        events.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.sequence.cmp(&b.sequence)));

        let count = events.len();
        for envelope in events {
            match self.handlers.get(&envelope.type_id) {
                Some(handlers) => {
                    for (_, _, handler) in handlers {
                        handler(envelope.data.as_ref());
                    }
                }
                None => log::trace!("Dropping event with no subscribers"),
            }
        }
        count
    }

    /// Get pending event count
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Check if there are pending events
    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable publishing end of an [`EventBus`]
#[derive(Clone)]
pub struct Publisher {
    sender: Sender<EventEnvelope>,
    sequence: Arc<AtomicU64>,
}

impl Publisher {
    /// Publish an event at normal priority
    pub fn publish<E: Event>(&self, event: E) {
        self.publish_with_priority(event, Priority::Normal);
    }

    /// Publish an event with priority
    pub fn publish_with_priority<E: Event>(&self, event: E, priority: Priority) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        if self
            .sender
            .send(EventEnvelope::new(event, priority, sequence))
            .is_err()
        {
            log::warn!("Event bus dropped, event discarded");
        }
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{Event, EventBus, EventEnvelope, Priority, Publisher, SubscriberId};
}
