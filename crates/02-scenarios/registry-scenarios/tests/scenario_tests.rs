//! End-to-end scenario runs against the default and alternative registry
//! configurations.

use std::sync::Arc;

use event_registry::{EventId, ForeverPolicy, RegistryConfig, ReleasePolicy, MAX_EVENT_HANDLER};
use parking_lot::Mutex;
use registry_scenarios::{
    init_tracing, run_suite, verify_first_match, ArcStatsSink, ScenarioEngine, ScenarioError,
    ScenarioKind, ScenarioStats, ScenarioSuite, StatsSink, TestConfig,
};

fn engine(config: RegistryConfig) -> ScenarioEngine<ArcStatsSink> {
    init_tracing();
    ScenarioEngine::new(ArcStatsSink::default(), config)
}

fn all_kinds() -> Vec<ScenarioKind> {
    vec![
        ScenarioKind::Capacity,
        ScenarioKind::TransientRoundTrip {
            event_id: EventId(5),
        },
        ScenarioKind::UntouchedMarker {
            event_id: EventId(7),
        },
        ScenarioKind::ForeverSurvivesClear { clears: 3 },
        ScenarioKind::FirstMatch {
            event_id: EventId(4),
        },
        ScenarioKind::Reregister {
            event_id: EventId(5),
        },
    ]
}

#[test]
fn every_scenario_passes_with_default_config() {
    let engine = engine(RegistryConfig::default());
    for kind in all_kinds() {
        let report = engine.run_checked(kind);
        assert_eq!(report.check, Ok(()), "{kind:?}: {:?}", report.outcome);
    }
}

#[test]
fn every_scenario_passes_under_alternative_policies() {
    let configs = [
        RegistryConfig::default().with_release(ReleasePolicy::AllTransient),
        RegistryConfig::default().with_forever(ForeverPolicy::ReleaseOnDispatch),
        RegistryConfig {
            release: ReleasePolicy::AllTransient,
            forever: ForeverPolicy::ReleaseOnDispatch,
        },
    ];
    for config in configs {
        let engine = engine(config);
        for kind in all_kinds() {
            let report = engine.run_checked(kind);
            assert_eq!(report.check, Ok(()), "{config:?} {kind:?}");
        }
    }
}

#[test]
fn transient_round_trip_counts_one_invocation_and_one_consumption() {
    let engine = engine(RegistryConfig::default());
    let outcome = engine.run(ScenarioKind::TransientRoundTrip {
        event_id: EventId(5),
    });

    assert_eq!(outcome.invoked.as_slice(), &[1]);
    assert_eq!(outcome.consumed, 1);

    let stats = engine.stats().snapshot();
    assert_eq!(
        stats,
        ScenarioStats {
            registered: 1,
            dispatched: 2,
            unknown: 1,
            invoked: 1,
            consumed: 1,
            ..ScenarioStats::default()
        }
    );
}

#[test]
fn capacity_scenario_reports_overflow_in_stats() {
    let engine = engine(RegistryConfig::default());
    engine.run(ScenarioKind::Capacity);

    let stats = engine.stats().snapshot();
    assert_eq!(stats.registered as usize, MAX_EVENT_HANDLER + 1);
    assert_eq!(stats.out_of_scope, 1);
    assert_eq!(stats.clears, 1);
}

#[test]
fn forever_scenario_keeps_every_slot_until_reset() {
    let engine = engine(RegistryConfig::default());
    let outcome = engine.run(ScenarioKind::ForeverSurvivesClear { clears: 4 });

    assert_eq!(outcome.occupancy.as_slice(), &[MAX_EVENT_HANDLER, 0]);
    let stats = engine.stats().snapshot();
    assert_eq!(stats.clears, 4);
    assert_eq!(stats.resets, 1);
    assert_eq!(stats.unknown, 1);
}

#[test]
fn reregister_lands_in_vacated_slot() {
    let engine = engine(RegistryConfig::default());
    let outcome = engine.run(ScenarioKind::Reregister {
        event_id: EventId(5),
    });

    assert_eq!(outcome.vacated, Some(0));
    assert_eq!(outcome.rearmed_at, Some(0));
    assert_eq!(outcome.occupancy.as_slice(), &[MAX_EVENT_HANDLER]);
}

#[test]
fn first_match_check_rejects_fan_out() {
    let engine = engine(RegistryConfig::default());
    let mut outcome = engine.run(ScenarioKind::FirstMatch {
        event_id: EventId(4),
    });
    outcome.invoked.swap(0, 1);

    let err = verify_first_match(&outcome, &engine.config()).expect_err("order matters");
    assert!(err.contains("invoked handlers"), "{err}");
}

#[test]
fn suite_loads_from_json() {
    let suite = ScenarioSuite::from_json(
        r#"{
            "registry": { "release": "all_transient" },
            "scenarios": [
                { "kind": "capacity" },
                { "kind": "first_match", "event_id": 4 },
                { "kind": "forever_survives_clear", "clears": 2 }
            ]
        }"#,
    )
    .expect("valid suite");

    assert_eq!(suite.registry.release, ReleasePolicy::AllTransient);
    assert_eq!(suite.registry.forever, ForeverPolicy::Retain);
    assert_eq!(
        suite.scenarios[1],
        ScenarioKind::FirstMatch {
            event_id: EventId(4)
        }
    );

    let stats = Arc::new(Mutex::new(ScenarioStats::default()));
    let reports = run_suite(&suite, stats.clone());
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|report| report.check.is_ok()));
    assert_eq!(stats.snapshot().clears, 3);
}

#[test]
fn malformed_suite_is_rejected() {
    let err = ScenarioSuite::from_json(r#"{ "scenarios": [ { "kind": "teleport" } ] }"#)
        .expect_err("unknown scenario kind");
    assert!(matches!(err, ScenarioError::Json(_)));
}

#[test]
fn flat_test_configs_map_to_scenarios() {
    let suite = ScenarioSuite::from_test_configs(
        RegistryConfig::default(),
        &[
            TestConfig::capacity(),
            TestConfig::transient_round_trip(5),
            TestConfig::untouched_marker(7),
            TestConfig::forever_survives_clear(2),
            TestConfig::first_match(4),
            TestConfig::reregister(9),
        ],
    )
    .expect("known scenario types");
    assert_eq!(suite.scenarios.len(), 6);
    assert_eq!(
        suite.scenarios[5],
        ScenarioKind::Reregister {
            event_id: EventId(9)
        }
    );

    let bogus = TestConfig {
        test_type: 42,
        param1: 0,
    };
    assert!(matches!(
        ScenarioSuite::from_test_configs(RegistryConfig::default(), &[bogus]),
        Err(ScenarioError::UnknownScenario(42))
    ));
}
