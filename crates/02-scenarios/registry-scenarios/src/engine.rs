use event_registry::{
    EventHandlerExecutor, EventId, HandlerRegistry, RegistryConfig, SimpleEvent, SlotIndex,
    Status, MAX_EVENT_HANDLER,
};
use smallvec::SmallVec;
use tracing::{debug, debug_span, warn};

use crate::checks::{verify, CheckResult};
use crate::config::{ScenarioKind, ScenarioSuite};
use crate::stats::StatsSink;

/// Handler payload used by scenarios: a tag identifying the registration.
pub type Tag = u32;

pub type ScenarioRegistry = HandlerRegistry<Tag, MAX_EVENT_HANDLER>;

/// Everything a scenario observed, in step order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Status of every registration and dispatch, in the order they ran.
    pub statuses: SmallVec<[Status; 16]>,
    /// Tags of the handlers the executor invoked.
    pub invoked: SmallVec<[Tag; 8]>,
    /// Total `consume()` calls across all dispatched events.
    pub consumed: u32,
    /// Occupied slot counts taken at scenario checkpoints.
    pub occupancy: SmallVec<[usize; 4]>,
    /// Lowest free slot seen from inside the handler invocation.
    pub vacated: Option<usize>,
    /// Slot the handler re-registered into.
    pub rearmed_at: Option<usize>,
}

pub struct ScenarioReport {
    pub kind: ScenarioKind,
    pub outcome: ScenarioOutcome,
    pub check: CheckResult,
}

/// Runs registry scenarios and feeds their counters into a stats sink.
pub struct ScenarioEngine<S> {
    stats: S,
    config: RegistryConfig,
}

impl<S> ScenarioEngine<S>
where
    S: StatsSink,
{
    pub fn new(stats: S, config: RegistryConfig) -> Self {
        Self { stats, config }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    /// Runs `kind` against a fresh registry.
    pub fn run(&self, kind: ScenarioKind) -> ScenarioOutcome {
        let _span = debug_span!("scenario", ?kind).entered();
        let registry = ScenarioRegistry::with_config(self.config);
        let mut run = Run {
            registry: &registry,
            stats: &self.stats,
            outcome: ScenarioOutcome::default(),
        };

        match kind {
            ScenarioKind::Capacity => {
                for tag in 0..MAX_EVENT_HANDLER as Tag {
                    run.register(EventId(tag), tag, false);
                }
                run.snapshot();
                let overflow = MAX_EVENT_HANDLER as Tag;
                run.register(EventId(overflow), overflow, false);
                run.clear();
                run.register(EventId(0), 0, false);
                run.snapshot();
            }
            ScenarioKind::TransientRoundTrip { event_id } => {
                run.register(event_id, 1, false);
                run.dispatch(event_id, false);
                run.dispatch(event_id, false);
                run.snapshot();
            }
            ScenarioKind::UntouchedMarker { event_id } => {
                run.register_untouched(event_id);
                run.dispatch(event_id, false);
                run.snapshot();
            }
            ScenarioKind::ForeverSurvivesClear { clears } => {
                for tag in 0..MAX_EVENT_HANDLER as Tag {
                    run.register(EventId(tag), tag, true);
                }
                for _ in 0..clears {
                    run.clear();
                }
                run.snapshot();
                run.reset();
                run.snapshot();
                run.dispatch(EventId(0), false);
            }
            ScenarioKind::FirstMatch { event_id } => {
                run.register(event_id, 1, false);
                run.register(event_id, 2, false);
                run.dispatch(event_id, false);
                run.dispatch(event_id, false);
                run.snapshot();
            }
            ScenarioKind::Reregister { event_id } => {
                run.register(event_id, 7, false);
                for offset in 1..MAX_EVENT_HANDLER as u32 {
                    run.register_untouched(EventId(event_id.get().wrapping_add(offset)));
                }
                run.dispatch(event_id, true);
                run.snapshot();
            }
        }

        debug!(outcome = ?run.outcome, "scenario finished");
        run.outcome
    }

    /// Runs `kind` and checks the outcome against this engine's configuration.
    pub fn run_checked(&self, kind: ScenarioKind) -> ScenarioReport {
        let outcome = self.run(kind);
        let check = verify(kind, &outcome, &self.config, MAX_EVENT_HANDLER);
        if let Err(reason) = &check {
            warn!(?kind, %reason, "scenario check failed");
        }
        ScenarioReport {
            kind,
            outcome,
            check,
        }
    }
}

/// Runs every scenario of `suite` with the suite's registry configuration.
pub fn run_suite<S: StatsSink>(suite: &ScenarioSuite, stats: S) -> Vec<ScenarioReport> {
    let engine = ScenarioEngine::new(stats, suite.registry);
    suite
        .scenarios
        .iter()
        .map(|&kind| engine.run_checked(kind))
        .collect()
}

struct Run<'r, S> {
    registry: &'r ScenarioRegistry,
    stats: &'r S,
    outcome: ScenarioOutcome,
}

impl<S: StatsSink> Run<'_, S> {
    fn register(&mut self, event_id: EventId, tag: Tag, forever: bool) {
        let status = Status::from(self.registry.add_handler(event_id, tag, forever));
        self.note_registration(status);
    }

    fn register_untouched(&mut self, event_id: EventId) {
        let status = Status::from(self.registry.add_untouched_event(event_id));
        self.note_registration(status);
    }

    fn note_registration(&mut self, status: Status) {
        self.stats.with_stats(|stats| {
            if status.is_success() {
                stats.registered = stats.registered.wrapping_add(1);
            } else {
                stats.out_of_scope = stats.out_of_scope.wrapping_add(1);
            }
        });
        self.outcome.statuses.push(status);
    }

    fn dispatch(&mut self, event_id: EventId, rearm: bool) {
        let event = SimpleEvent::new(event_id);
        let mut executor = RecordingExecutor {
            registry: self.registry,
            stats: self.stats,
            invoked: &mut self.outcome.invoked,
            rearm,
            vacated: None,
            rearmed_at: None,
        };
        let status = self.registry.handle_event(&event, &mut executor);
        let (vacated, rearmed_at) = (executor.vacated, executor.rearmed_at);

        let consumed = event.consume_count();
        self.stats.with_stats(|stats| {
            stats.dispatched = stats.dispatched.wrapping_add(1);
            stats.consumed = stats.consumed.wrapping_add(consumed);
            if status == Status::UnknownEvent {
                stats.unknown = stats.unknown.wrapping_add(1);
            }
        });

        self.outcome.consumed += consumed;
        self.outcome.statuses.push(status);
        if rearm {
            self.outcome.vacated = vacated;
            self.outcome.rearmed_at = rearmed_at;
        }
    }

    fn clear(&mut self) {
        self.registry.clear();
        self.stats
            .with_stats(|stats| stats.clears = stats.clears.wrapping_add(1));
    }

    fn reset(&mut self) {
        self.registry.reset();
        self.stats
            .with_stats(|stats| stats.resets = stats.resets.wrapping_add(1));
    }

    fn snapshot(&mut self) {
        self.outcome.occupancy.push(self.registry.len());
    }
}

/// Executor that records invocations and, on request, re-registers the
/// handler it is running into the registry that dispatched it.
struct RecordingExecutor<'a, S> {
    registry: &'a ScenarioRegistry,
    stats: &'a S,
    invoked: &'a mut SmallVec<[Tag; 8]>,
    rearm: bool,
    vacated: Option<usize>,
    rearmed_at: Option<usize>,
}

impl<S: StatsSink> EventHandlerExecutor<SimpleEvent, Tag> for RecordingExecutor<'_, S> {
    fn exec(&mut self, event: &SimpleEvent, handler: &Tag) -> Status {
        self.invoked.push(*handler);
        self.stats
            .with_stats(|stats| stats.invoked = stats.invoked.wrapping_add(1));

        if self.rearm {
            self.vacated = self.registry.alloc_slot().map(SlotIndex::get);
            self.rearmed_at = self
                .registry
                .add_handler(event.id(), *handler, false)
                .ok()
                .map(SlotIndex::get);
        }
        Status::Success
    }
}
