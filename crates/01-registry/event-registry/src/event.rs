//! Event identity and the contract dispatched events must honour.

use core::cell::Cell;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque identifier naming a class of events.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub u32);

impl EventId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for EventId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An incoming event as seen by the registry.
///
/// The event owns the direction of matching: the registry asks the event
/// whether it belongs to a stored id, never the other way round. `consume`
/// takes `&self` because dispatch only ever holds shared references to the
/// event; implementors track consumption with interior mutability.
pub trait Event {
    /// Returns true when this event belongs to the class named by `event_id`.
    fn matches(&self, event_id: EventId) -> bool;

    /// Marks the event as handled. Must be idempotent.
    fn consume(&self);
}

impl<E: Event + ?Sized> Event for &E {
    fn matches(&self, event_id: EventId) -> bool {
        (**self).matches(event_id)
    }

    fn consume(&self) {
        (**self).consume()
    }
}

/// Minimal event carrying a single id and a consumption counter.
#[derive(Debug, Default)]
pub struct SimpleEvent {
    id: EventId,
    consumed: Cell<u32>,
}

impl SimpleEvent {
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            consumed: Cell::new(0),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get() > 0
    }

    /// Number of times `consume` was called on this event.
    pub fn consume_count(&self) -> u32 {
        self.consumed.get()
    }
}

impl Event for SimpleEvent {
    fn matches(&self, event_id: EventId) -> bool {
        self.id == event_id
    }

    fn consume(&self) {
        self.consumed.set(self.consumed.get().saturating_add(1));
    }
}
