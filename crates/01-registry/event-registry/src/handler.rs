//! Handler records, callback capabilities and the executor seam.
//!
//! A [`HandlerRecord`] is what a slot stores: the event id it waits for and,
//! unless it is an untouched marker, a callback capability `H`. The registry
//! never invokes `H` itself; it hands the record to an
//! [`EventHandlerExecutor`], which decides how the capability runs.

use core::fmt;

use crate::error::Status;
use crate::event::{Event, EventId};

/// One registered interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerRecord<H> {
    /// Arms the registry for an event class without attaching behaviour.
    /// Matching it consumes nothing and reports [`Status::Success`].
    Untouched { event_id: EventId },
    /// Runs `handler` through the executor when a matching event arrives.
    Active { event_id: EventId, handler: H },
}

impl<H> HandlerRecord<H> {
    pub fn untouched(event_id: EventId) -> Self {
        HandlerRecord::Untouched { event_id }
    }

    pub fn active(event_id: EventId, handler: H) -> Self {
        HandlerRecord::Active { event_id, handler }
    }

    pub fn event_id(&self) -> EventId {
        match *self {
            HandlerRecord::Untouched { event_id } | HandlerRecord::Active { event_id, .. } => {
                event_id
            }
        }
    }

    pub fn is_untouched(&self) -> bool {
        matches!(self, HandlerRecord::Untouched { .. })
    }

    pub fn handler(&self) -> Option<&H> {
        match self {
            HandlerRecord::Untouched { .. } => None,
            HandlerRecord::Active { handler, .. } => Some(handler),
        }
    }

    /// Asks the event whether it belongs to this record's id.
    pub fn matches<E: Event + ?Sized>(&self, event: &E) -> bool {
        event.matches(self.event_id())
    }

    /// Delivers `event` to this record.
    ///
    /// Active records consume the event before the executor runs, so the
    /// callback never observes an unconsumed event. The executor's status is
    /// returned unchanged.
    pub fn handle_event<E, X>(&self, event: &E, executor: &mut X) -> Status
    where
        E: Event + ?Sized,
        X: EventHandlerExecutor<E, H> + ?Sized,
    {
        match self {
            HandlerRecord::Untouched { .. } => Status::Success,
            HandlerRecord::Active { handler, .. } => {
                event.consume();
                executor.exec(event, handler)
            }
        }
    }
}

/// Single-method handler interface for receivers that prefer a trait object.
pub trait EventHandler<E: ?Sized> {
    fn handle(&self, event: &E) -> Status;
}

/// A callable capability the stock executor knows how to run.
pub trait Invoke<E: ?Sized> {
    fn invoke(&self, event: &E) -> Status;
}

/// Method bound to a borrowed receiver.
///
/// The callback never owns its receiver; the receiver must outlive every
/// registration that carries it. The method gets the receiver back at the
/// full borrow lifetime `'a`, which lets it build a fresh `Callback` for
/// itself and re-register from inside its own invocation.
pub struct Callback<'a, O: ?Sized, E: ?Sized> {
    owner: &'a O,
    method: fn(&'a O, &E) -> Status,
}

impl<'a, O: ?Sized, E: ?Sized> Callback<'a, O, E> {
    pub fn new(owner: &'a O, method: fn(&'a O, &E) -> Status) -> Self {
        Self { owner, method }
    }

    pub fn owner(&self) -> &'a O {
        self.owner
    }

    pub fn call(&self, event: &E) -> Status {
        (self.method)(self.owner, event)
    }
}

impl<O: ?Sized, E: ?Sized> Clone for Callback<'_, O, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O: ?Sized, E: ?Sized> Copy for Callback<'_, O, E> {}

impl<O: ?Sized, E: ?Sized> fmt::Debug for Callback<'_, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("owner", &(self.owner as *const O as *const ()))
            .finish_non_exhaustive()
    }
}

impl<O: ?Sized, E: ?Sized> Invoke<E> for Callback<'_, O, E> {
    fn invoke(&self, event: &E) -> Status {
        self.call(event)
    }
}

impl<E: ?Sized> Invoke<E> for &dyn EventHandler<E> {
    fn invoke(&self, event: &E) -> Status {
        (**self).handle(event)
    }
}

/// Performs the actual invocation of a handler capability.
///
/// Whatever status the executor returns is propagated verbatim to the
/// caller of [`HandlerRegistry::handle_event`](crate::HandlerRegistry::handle_event).
pub trait EventHandlerExecutor<E: ?Sized, H> {
    fn exec(&mut self, event: &E, handler: &H) -> Status;
}

/// Runs any [`Invoke`] capability directly on the caller's stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectExecutor;

impl<E: ?Sized, H: Invoke<E>> EventHandlerExecutor<E, H> for DirectExecutor {
    fn exec(&mut self, event: &E, handler: &H) -> Status {
        handler.invoke(event)
    }
}

impl<E: ?Sized, H, F> EventHandlerExecutor<E, H> for F
where
    F: FnMut(&E, &H) -> Status,
{
    fn exec(&mut self, event: &E, handler: &H) -> Status {
        self(event, handler)
    }
}
