//! Fixed-capacity, allocation-free registry of event handlers.
//!
//! The crate is built from a handful of small pieces:
//! * [`HandlerSlot`] – one storage cell holding at most one registration.
//! * [`HandlerRecord`] – the registration itself: an event id plus either a
//!   callback capability or nothing (an untouched marker).
//! * [`HandlerRegistry`] – an inline array of `N` slots with lowest-index-first
//!   allocation, first-match dispatch and `clear`/`reset` lifecycle control.
//! * [`Event`] / [`EventHandlerExecutor`] – the contracts the registry consumes.
//! * [`Status`] / [`RegistryError`] – value-level outcomes; nothing unwinds.
//!
//! The registry is single-threaded by construction (`!Sync`) and every
//! operation takes `&self`, so handlers may re-register while they run.

mod config;
mod error;
mod event;
mod handler;
mod registry;
mod slot;

pub use config::{ForeverPolicy, RegistryConfig, ReleasePolicy, MAX_EVENT_HANDLER};
pub use error::{RegistryError, RegistryResult, Status};
pub use event::{Event, EventId, SimpleEvent};
pub use handler::{
    Callback, DirectExecutor, EventHandler, EventHandlerExecutor, HandlerRecord, Invoke,
};
pub use registry::{DefaultRegistry, HandlerRegistry, SlotIndex};
pub use slot::HandlerSlot;
