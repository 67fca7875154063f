//! Registry capacity and release policies.

use serde::{Deserialize, Serialize};

/// Default number of handler slots in a registry.
pub const MAX_EVENT_HANDLER: usize = 8;

/// Which slots a successful match releases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Only the matched slot is released.
    #[default]
    MatchedSlot,
    /// The matched slot is released and every other transient registration
    /// is dropped with it, as if `clear()` ran before the handler.
    AllTransient,
}

/// How dispatch treats a matched forever registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeverPolicy {
    /// The record stays in its slot and keeps matching; only `reset()` frees it.
    #[default]
    Retain,
    /// Dispatch frees forever slots like transient ones. `forever` then only
    /// shields a registration from `clear()`.
    ReleaseOnDispatch,
}

/// Behaviour knobs for a [`HandlerRegistry`](crate::HandlerRegistry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub release: ReleasePolicy,
    pub forever: ForeverPolicy,
}

impl RegistryConfig {
    pub fn with_release(mut self, release: ReleasePolicy) -> Self {
        self.release = release;
        self
    }

    pub fn with_forever(mut self, forever: ForeverPolicy) -> Self {
        self.forever = forever;
        self
    }
}
