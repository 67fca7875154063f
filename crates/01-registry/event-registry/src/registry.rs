//! Fixed-capacity registry of event handlers.
//!
//! The registry is an arena of `N` [`HandlerSlot`]s stored inline. Slots are
//! handed out lowest-index first, and dispatch scans them in index order, so
//! the slot index is the only ordering rule among registrations. Nothing here
//! allocates.
//!
//! Dispatch runs in three explicit steps: copy the matching record out,
//! release its slot, then invoke the copy. Because the slot is free before
//! the executor runs, a handler may re-register for the same event from
//! inside its own invocation and will land in the slot it just vacated.

use core::fmt;

use tracing::{debug, trace};

use crate::config::{ForeverPolicy, RegistryConfig, ReleasePolicy, MAX_EVENT_HANDLER};
use crate::error::{RegistryError, RegistryResult, Status};
use crate::event::{Event, EventId};
use crate::handler::{EventHandlerExecutor, HandlerRecord};
use crate::slot::HandlerSlot;

/// Index of a slot inside a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<SlotIndex> for usize {
    fn from(index: SlotIndex) -> Self {
        index.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

/// Registry sized by [`MAX_EVENT_HANDLER`].
pub type DefaultRegistry<H> = HandlerRegistry<H, MAX_EVENT_HANDLER>;

/// Fixed-size pool of handler slots.
pub struct HandlerRegistry<H, const N: usize> {
    slots: [HandlerSlot<H>; N],
    config: RegistryConfig,
}

impl<H: Copy, const N: usize> HandlerRegistry<H, N> {
    /// Creates an empty registry with the default policies.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            slots: core::array::from_fn(|_| HandlerSlot::new()),
            config,
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Number of slots managed by the registry.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(HandlerSlot::is_free)
    }

    pub fn is_full(&self) -> bool {
        self.alloc_slot().is_none()
    }

    /// Borrow of the slot at `index`, or `None` when out of range.
    pub fn slot(&self, index: usize) -> Option<&HandlerSlot<H>> {
        self.slots.get(index)
    }

    /// Copy of the record stored at `index`.
    pub fn record(&self, index: SlotIndex) -> Option<HandlerRecord<H>> {
        self.slots.get(index.0).and_then(HandlerSlot::record)
    }

    /// Iterates over occupied slots in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, HandlerRecord<H>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.record().map(|record| (SlotIndex(idx), record)))
    }

    /// Returns the lowest-index free slot, or `None` when every slot is taken.
    pub fn alloc_slot(&self) -> Option<SlotIndex> {
        self.slots.iter().position(HandlerSlot::is_free).map(SlotIndex)
    }

    /// Registers a transient marker that fires for `event_id` without a callback.
    pub fn add_untouched_event(&self, event_id: EventId) -> RegistryResult<SlotIndex> {
        self.insert(HandlerRecord::untouched(event_id), false)
    }

    /// Registers `handler` for `event_id`.
    ///
    /// `forever` registrations survive [`clear`](Self::clear) and are only
    /// removed by [`reset`](Self::reset) (or by dispatch, under
    /// [`ForeverPolicy::ReleaseOnDispatch`]).
    pub fn add_handler(
        &self,
        event_id: EventId,
        handler: H,
        forever: bool,
    ) -> RegistryResult<SlotIndex> {
        self.insert(HandlerRecord::active(event_id, handler), forever)
    }

    pub fn add_forever_handler(&self, event_id: EventId, handler: H) -> RegistryResult<SlotIndex> {
        self.add_handler(event_id, handler, true)
    }

    fn insert(&self, record: HandlerRecord<H>, forever: bool) -> RegistryResult<SlotIndex> {
        let Some(index) = self.alloc_slot() else {
            debug!(
                event_id = record.event_id().get(),
                capacity = N,
                "handler registry full"
            );
            return Err(RegistryError::OutOfScope { capacity: N });
        };

        self.slots[index.0].allocate(record, forever);
        trace!(
            slot = index.0,
            event_id = record.event_id().get(),
            untouched = record.is_untouched(),
            forever,
            "registered handler"
        );
        Ok(index)
    }

    /// Removes the first registration matching `event` and returns a copy of it.
    ///
    /// Release follows the registry's [`RegistryConfig`]: transient slots are
    /// always freed, forever slots per [`ForeverPolicy`], and under
    /// [`ReleasePolicy::AllTransient`] every other transient slot goes too.
    pub fn take_match<E: Event + ?Sized>(
        &self,
        event: &E,
    ) -> Option<(SlotIndex, HandlerRecord<H>)> {
        let (idx, slot) = self
            .slots
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.matches(event))?;
        let record = slot.record()?;

        match self.config.forever {
            ForeverPolicy::Retain => slot.clear(),
            ForeverPolicy::ReleaseOnDispatch => slot.reset(),
        }
        if self.config.release == ReleasePolicy::AllTransient {
            self.clear_slots();
        }

        Some((SlotIndex(idx), record))
    }

    /// Delivers `event` to the first matching registration.
    ///
    /// Returns [`RegistryError::UnknownEvent`] when nothing matches; otherwise
    /// the status produced by the record (the executor's status for active
    /// handlers, [`Status::Success`] for untouched markers).
    pub fn dispatch<E, X>(&self, event: &E, executor: &mut X) -> RegistryResult<Status>
    where
        E: Event + ?Sized,
        X: EventHandlerExecutor<E, H> + ?Sized,
    {
        let Some((index, record)) = self.take_match(event) else {
            debug!("no handler matches event");
            return Err(RegistryError::UnknownEvent);
        };

        trace!(
            slot = index.0,
            event_id = record.event_id().get(),
            untouched = record.is_untouched(),
            "dispatching event"
        );
        Ok(record.handle_event(event, executor))
    }

    /// Status-valued form of [`dispatch`](Self::dispatch).
    pub fn handle_event<E, X>(&self, event: &E, executor: &mut X) -> Status
    where
        E: Event + ?Sized,
        X: EventHandlerExecutor<E, H> + ?Sized,
    {
        self.dispatch(event, executor).unwrap_or_else(Status::from)
    }

    /// Releases every transient registration; forever ones stay.
    pub fn clear(&self) {
        self.clear_slots();
        trace!(remaining = self.len(), "cleared transient handlers");
    }

    /// Releases every registration, forever ones included.
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.reset();
        }
        trace!("reset handler registry");
    }

    fn clear_slots(&self) {
        for slot in &self.slots {
            slot.clear();
        }
    }
}

impl<H: Copy, const N: usize> Default for HandlerRegistry<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy + fmt::Debug, const N: usize> fmt::Debug for HandlerRegistry<H, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("config", &self.config)
            .field("slots", &self.slots)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SimpleEvent;
    use crate::handler::{Callback, DirectExecutor};
    use core::cell::Cell;

    const CAPACITY: usize = 4;

    #[derive(Default)]
    struct Recorder {
        calls: Cell<u32>,
        last: Cell<Option<EventId>>,
    }

    impl Recorder {
        fn on_event(&self, event: &SimpleEvent) -> Status {
            self.calls.set(self.calls.get() + 1);
            self.last.set(Some(event.id()));
            Status::Success
        }
    }

    type Cb<'a> = Callback<'a, Recorder, SimpleEvent>;

    fn registry<'a>() -> HandlerRegistry<Cb<'a>, CAPACITY> {
        HandlerRegistry::new()
    }

    #[test]
    fn allocation_is_lowest_index_first() {
        let rec = Recorder::default();
        let reg = registry();
        let cb = Callback::new(&rec, Recorder::on_event);

        for expected in 0..CAPACITY {
            let idx = reg.add_handler(EventId(1), cb, false).expect("free slot");
            assert_eq!(idx.get(), expected);
        }

        reg.slot(2).expect("in range").clear();
        assert_eq!(reg.alloc_slot().map(SlotIndex::get), Some(2));
    }

    #[test]
    fn full_registry_reports_out_of_scope() {
        let reg: HandlerRegistry<u8, CAPACITY> = HandlerRegistry::new();
        for _ in 0..CAPACITY {
            reg.add_untouched_event(EventId(0)).expect("free slot");
        }
        assert!(reg.is_full());
        assert_eq!(
            reg.add_handler(EventId(1), 1, false),
            Err(RegistryError::OutOfScope { capacity: CAPACITY })
        );
        assert_eq!(
            reg.add_untouched_event(EventId(1)),
            Err(RegistryError::OutOfScope { capacity: CAPACITY })
        );
    }

    #[test]
    fn dispatch_frees_transient_slot_before_returning() {
        let rec = Recorder::default();
        let reg = registry();
        reg.add_handler(EventId(5), Callback::new(&rec, Recorder::on_event), false)
            .expect("free slot");

        let event = SimpleEvent::new(5);
        assert_eq!(reg.handle_event(&event, &mut DirectExecutor), Status::Success);
        assert_eq!(rec.calls.get(), 1);
        assert_eq!(rec.last.get(), Some(EventId(5)));
        assert!(reg.is_empty());
    }

    #[test]
    fn unmatched_event_leaves_registry_untouched() {
        let reg: HandlerRegistry<u8, CAPACITY> = HandlerRegistry::new();
        reg.add_untouched_event(EventId(1)).expect("free slot");

        let event = SimpleEvent::new(2);
        let mut never = |_: &SimpleEvent, _: &u8| -> Status { unreachable!() };
        assert_eq!(
            reg.dispatch(&event, &mut never),
            Err(RegistryError::UnknownEvent)
        );
        assert_eq!(reg.handle_event(&event, &mut never), Status::UnknownEvent);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn take_match_copies_out_and_releases() {
        let reg: HandlerRegistry<u8, CAPACITY> = HandlerRegistry::new();
        reg.add_handler(EventId(3), 9, false).expect("free slot");

        let (idx, record) = reg.take_match(&SimpleEvent::new(3)).expect("match");
        assert_eq!(idx.get(), 0);
        assert_eq!(record, HandlerRecord::active(EventId(3), 9));
        assert!(reg.slot(0).expect("in range").is_free());
    }

    #[test]
    fn forever_handler_is_retained_by_default() {
        let rec = Recorder::default();
        let reg = registry();
        reg.add_forever_handler(EventId(8), Callback::new(&rec, Recorder::on_event))
            .expect("free slot");

        for _ in 0..3 {
            assert_eq!(
                reg.handle_event(&SimpleEvent::new(8), &mut DirectExecutor),
                Status::Success
            );
        }
        assert_eq!(rec.calls.get(), 3);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn release_on_dispatch_frees_forever_handler() {
        let reg: HandlerRegistry<u8, CAPACITY> = HandlerRegistry::with_config(
            RegistryConfig::default().with_forever(ForeverPolicy::ReleaseOnDispatch),
        );
        reg.add_forever_handler(EventId(8), 1).expect("free slot");
        reg.clear();
        assert_eq!(reg.len(), 1);

        let mut exec = |_: &SimpleEvent, _: &u8| Status::Success;
        assert_eq!(reg.handle_event(&SimpleEvent::new(8), &mut exec), Status::Success);
        assert!(reg.is_empty());
    }

    #[test]
    fn all_transient_release_drops_pending_alternatives() {
        let reg: HandlerRegistry<u8, CAPACITY> = HandlerRegistry::with_config(
            RegistryConfig::default().with_release(ReleasePolicy::AllTransient),
        );
        reg.add_handler(EventId(1), 1, false).expect("free slot");
        reg.add_handler(EventId(2), 2, false).expect("free slot");
        reg.add_forever_handler(EventId(3), 3).expect("free slot");

        let mut exec = |_: &SimpleEvent, handler: &u8| Status::Failed(u32::from(*handler));
        assert_eq!(reg.handle_event(&SimpleEvent::new(2), &mut exec), Status::Failed(2));

        let left: Vec<_> = reg.occupied().map(|(idx, rec)| (idx.get(), rec)).collect();
        assert_eq!(left, vec![(2, HandlerRecord::active(EventId(3), 3))]);
    }

    #[test]
    fn clear_and_reset_scope() {
        let reg: HandlerRegistry<u8, CAPACITY> = HandlerRegistry::new();
        reg.add_handler(EventId(1), 1, false).expect("free slot");
        reg.add_forever_handler(EventId(2), 2).expect("free slot");
        reg.add_untouched_event(EventId(3)).expect("free slot");

        reg.clear();
        let left: Vec<_> = reg.occupied().map(|(idx, _)| idx.get()).collect();
        assert_eq!(left, vec![1]);

        reg.reset();
        assert!(reg.is_empty());
        assert!((0..CAPACITY).all(|i| !reg.slot(i).expect("in range").is_forever()));
    }

    #[test]
    fn zero_capacity_registry_refuses_everything() {
        let reg: HandlerRegistry<u8, 0> = HandlerRegistry::new();
        assert_eq!(reg.capacity(), 0);
        assert!(reg.is_full());
        assert_eq!(
            reg.add_untouched_event(EventId(0)),
            Err(RegistryError::OutOfScope { capacity: 0 })
        );
    }
}
