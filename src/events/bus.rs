//! Topic-based event bus.
//!
//! Dispatch is synchronous: `publish` returns after every subscriber on
//! the event's topic has run, in subscription order. Subscribers observe
//! events and cannot reach back into the engine, so rules evaluation
//! never depends on who is listening.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use rust_tactics::events::{EventBus, GameEvent, Topic};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut bus = EventBus::new();
//! let sink = Rc::clone(&seen);
//! bus.subscribe(Topic::Turn, move |event| sink.borrow_mut().push(event.clone()));
//!
//! bus.publish(GameEvent::ApChanged { before: 3, after: 2 });
//! bus.publish(GameEvent::HistoryCleared); // Command topic, not delivered
//!
//! assert_eq!(seen.borrow().len(), 1);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::event::{GameEvent, Topic};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

impl SubscriptionId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Synchronous publish/subscribe dispatcher.
///
/// Subscriptions are indexed by topic for direct lookup on publish.
/// An optional in-memory log records every published event, which is
/// what tests and replay tooling read.
#[derive(Default)]
pub struct EventBus {
    handlers: FxHashMap<Topic, Vec<(SubscriptionId, Handler)>>,
    next_id: u32,
    log: Option<Vec<GameEvent>>,
    muted: bool,
}

impl EventBus {
    /// Create a bus with no subscribers and no log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus that records every published event.
    #[must_use]
    pub fn recording() -> Self {
        Self {
            log: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Create a bus that drops everything. Used for previews run on
    /// cloned state.
    #[must_use]
    pub fn muted() -> Self {
        Self {
            muted: true,
            ..Self::default()
        }
    }

    /// Register a handler for one topic.
    pub fn subscribe(&mut self, topic: Topic, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(topic).or_default().push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sub, _)| *sub == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of handlers on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }

    /// Deliver an event to every handler on its topic.
    pub fn publish(&mut self, event: GameEvent) {
        if self.muted {
            return;
        }
        let topic = event.topic();
        trace!(?topic, ?event, "publish");

        if let Some(handlers) = self.handlers.get_mut(&topic) {
            for (_, handler) in handlers.iter_mut() {
                handler(&event);
            }
        }
        if let Some(log) = self.log.as_mut() {
            log.push(event);
        }
    }

    /// Start recording published events.
    pub fn enable_recording(&mut self) {
        self.log.get_or_insert_with(Vec::new);
    }

    /// Recorded events, oldest first. Empty if recording is off.
    #[must_use]
    pub fn recorded(&self) -> &[GameEvent] {
        self.log.as_deref().unwrap_or(&[])
    }

    /// Take the recorded events, leaving the log empty but enabled.
    pub fn drain_recorded(&mut self) -> Vec<GameEvent> {
        self.log.as_mut().map(std::mem::take).unwrap_or_default()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = Topic::ALL
            .iter()
            .map(|topic| (*topic, self.subscriber_count(*topic)))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .field("recorded", &self.recorded().len())
            .field("muted", &self.muted)
            .finish()
    }
}
