//! Scenario engine exercising the handler registry end to end.
//!
//! Each [`ScenarioKind`] drives a fresh registry through one lifecycle
//! (capacity overflow, transient round trip, untouched marker, forever vs.
//! clear/reset, first-match, re-registration during dispatch) and records what
//! it observed; [`verify`] compares that against the expected behaviour for the
//! registry's configuration.

#![allow(missing_docs)]

mod checks;
mod config;
mod engine;
mod error;
mod stats;

pub use checks::{
    verify, verify_capacity, verify_first_match, verify_forever_survives_clear,
    verify_reregister, verify_transient_round_trip, verify_untouched_marker, CheckResult,
};
pub use config::{ScenarioKind, ScenarioSuite, ScenarioType, TestConfig};
pub use engine::{run_suite, ScenarioEngine, ScenarioOutcome, ScenarioRegistry, ScenarioReport, Tag};
pub use error::{ScenarioError, ScenarioResult};
pub use stats::{ArcStatsSink, ScenarioStats, StatsSink};

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt().with_env_filter(env_filter).try_init();
}
