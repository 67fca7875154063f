//! Single storage cell of the registry.
//!
//! A slot is either free or holds exactly one [`HandlerRecord`] together with
//! its permanence flag. The state lives in a [`Cell`], so every operation
//! takes `&self`; this is what lets a callback re-register into the registry
//! while a dispatch is still on the stack. `Cell` also keeps slots `!Sync`,
//! which rules out unsynchronised sharing across threads.

use core::cell::Cell;

use crate::event::Event;
use crate::handler::HandlerRecord;

#[derive(Clone, Copy, Debug)]
enum SlotState<H> {
    Free,
    Occupied {
        record: HandlerRecord<H>,
        forever: bool,
    },
}

/// Holds zero or one handler record.
pub struct HandlerSlot<H> {
    state: Cell<SlotState<H>>,
}

impl<H: Copy> HandlerSlot<H> {
    pub const fn new() -> Self {
        Self {
            state: Cell::new(SlotState::Free),
        }
    }

    /// Stores `record` in the slot and marks it occupied.
    ///
    /// The slot must be free; callers check [`is_free`](Self::is_free) first.
    pub fn allocate(&self, record: HandlerRecord<H>, forever: bool) {
        debug_assert!(self.is_free(), "allocate called on an occupied slot");
        self.state.set(SlotState::Occupied { record, forever });
    }

    pub fn is_free(&self) -> bool {
        matches!(self.state.get(), SlotState::Free)
    }

    /// True when the slot is occupied by a registration that survives `clear()`.
    pub fn is_forever(&self) -> bool {
        matches!(self.state.get(), SlotState::Occupied { forever: true, .. })
    }

    /// Copy of the stored record, if any.
    pub fn record(&self) -> Option<HandlerRecord<H>> {
        match self.state.get() {
            SlotState::Free => None,
            SlotState::Occupied { record, .. } => Some(record),
        }
    }

    /// Frees the slot unless it is empty or holds a forever registration.
    pub fn clear(&self) {
        if let SlotState::Occupied { forever: false, .. } = self.state.get() {
            self.state.set(SlotState::Free);
        }
    }

    /// Frees the slot regardless of permanence.
    pub fn reset(&self) {
        self.state.set(SlotState::Free);
    }

    pub fn matches<E: Event + ?Sized>(&self, event: &E) -> bool {
        match self.state.get() {
            SlotState::Free => false,
            SlotState::Occupied { record, .. } => record.matches(event),
        }
    }
}

impl<H: Copy> Default for HandlerSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy + core::fmt::Debug> core::fmt::Debug for HandlerSlot<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("HandlerSlot").field(&self.state.get()).finish()
    }
}
