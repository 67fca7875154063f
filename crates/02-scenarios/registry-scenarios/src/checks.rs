use event_registry::{RegistryConfig, ReleasePolicy, Status};

use crate::config::ScenarioKind;
use crate::engine::ScenarioOutcome;

pub type CheckResult = Result<(), String>;

/// Checks `outcome` against the expectations for `kind`.
pub fn verify(
    kind: ScenarioKind,
    outcome: &ScenarioOutcome,
    config: &RegistryConfig,
    capacity: usize,
) -> CheckResult {
    match kind {
        ScenarioKind::Capacity => verify_capacity(outcome, capacity),
        ScenarioKind::TransientRoundTrip { .. } => verify_transient_round_trip(outcome),
        ScenarioKind::UntouchedMarker { .. } => verify_untouched_marker(outcome),
        ScenarioKind::ForeverSurvivesClear { .. } => {
            verify_forever_survives_clear(outcome, capacity)
        }
        ScenarioKind::FirstMatch { .. } => verify_first_match(outcome, config),
        ScenarioKind::Reregister { .. } => verify_reregister(outcome, config, capacity),
    }
}

pub fn verify_capacity(outcome: &ScenarioOutcome, capacity: usize) -> CheckResult {
    let mut expected = vec![Status::Success; capacity];
    expected.push(Status::OutOfScope);
    expected.push(Status::Success);
    expect_statuses(outcome, &expected)?;
    expect_occupancy(outcome, &[capacity, 1])
}

pub fn verify_transient_round_trip(outcome: &ScenarioOutcome) -> CheckResult {
    expect_statuses(
        outcome,
        &[Status::Success, Status::Success, Status::UnknownEvent],
    )?;
    expect_invoked(outcome, &[1])?;
    if outcome.consumed != 1 {
        return Err(format!(
            "event consumed {} times (expected 1)",
            outcome.consumed
        ));
    }
    expect_occupancy(outcome, &[0])
}

pub fn verify_untouched_marker(outcome: &ScenarioOutcome) -> CheckResult {
    expect_statuses(outcome, &[Status::Success, Status::Success])?;
    expect_invoked(outcome, &[])?;
    if outcome.consumed != 0 {
        return Err(format!(
            "untouched marker consumed the event {} times",
            outcome.consumed
        ));
    }
    expect_occupancy(outcome, &[0])
}

pub fn verify_forever_survives_clear(outcome: &ScenarioOutcome, capacity: usize) -> CheckResult {
    let mut expected = vec![Status::Success; capacity];
    expected.push(Status::UnknownEvent);
    expect_statuses(outcome, &expected)?;
    expect_invoked(outcome, &[])?;
    expect_occupancy(outcome, &[capacity, 0])
}

pub fn verify_first_match(outcome: &ScenarioOutcome, config: &RegistryConfig) -> CheckResult {
    // Dropping pending alternatives on a match also drops the second handler.
    let (second, invoked): (Status, &[u32]) = match config.release {
        ReleasePolicy::MatchedSlot => (Status::Success, &[1, 2][..]),
        ReleasePolicy::AllTransient => (Status::UnknownEvent, &[1][..]),
    };
    expect_statuses(
        outcome,
        &[Status::Success, Status::Success, Status::Success, second],
    )?;
    expect_invoked(outcome, invoked)?;
    expect_occupancy(outcome, &[0])
}

pub fn verify_reregister(
    outcome: &ScenarioOutcome,
    config: &RegistryConfig,
    capacity: usize,
) -> CheckResult {
    let mut expected = vec![Status::Success; capacity];
    expected.push(Status::Success);
    expect_statuses(outcome, &expected)?;
    expect_invoked(outcome, &[7])?;
    if outcome.vacated != Some(0) {
        return Err(format!(
            "handler saw free slot {:?} during dispatch (expected Some(0))",
            outcome.vacated
        ));
    }
    if outcome.rearmed_at != outcome.vacated {
        return Err(format!(
            "handler re-registered at {:?} instead of the vacated slot {:?}",
            outcome.rearmed_at, outcome.vacated
        ));
    }
    let occupied = match config.release {
        ReleasePolicy::MatchedSlot => capacity,
        ReleasePolicy::AllTransient => 1,
    };
    expect_occupancy(outcome, &[occupied])
}

fn expect_statuses(outcome: &ScenarioOutcome, expected: &[Status]) -> CheckResult {
    if outcome.statuses.as_slice() != expected {
        return Err(format!(
            "statuses {:?} (expected {:?})",
            outcome.statuses.as_slice(),
            expected
        ));
    }
    Ok(())
}

fn expect_invoked(outcome: &ScenarioOutcome, expected: &[u32]) -> CheckResult {
    if outcome.invoked.as_slice() != expected {
        return Err(format!(
            "invoked handlers {:?} (expected {:?})",
            outcome.invoked.as_slice(),
            expected
        ));
    }
    Ok(())
}

fn expect_occupancy(outcome: &ScenarioOutcome, expected: &[usize]) -> CheckResult {
    if outcome.occupancy.as_slice() != expected {
        return Err(format!(
            "occupied slots {:?} (expected {:?})",
            outcome.occupancy.as_slice(),
            expected
        ));
    }
    Ok(())
}
