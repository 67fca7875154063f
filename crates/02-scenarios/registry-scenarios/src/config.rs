use event_registry::{EventId, RegistryConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioType {
    Capacity = 0,
    TransientRoundTrip = 1,
    UntouchedMarker = 2,
    ForeverSurvivesClear = 3,
    FirstMatch = 4,
    Reregister = 5,
}

impl ScenarioType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(ScenarioType::Capacity),
            1 => Some(ScenarioType::TransientRoundTrip),
            2 => Some(ScenarioType::UntouchedMarker),
            3 => Some(ScenarioType::ForeverSurvivesClear),
            4 => Some(ScenarioType::FirstMatch),
            5 => Some(ScenarioType::Reregister),
            _ => None,
        }
    }
}

/// Flat scenario description for harnesses that pass configs across an FFI
/// or worker boundary.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TestConfig {
    pub test_type: u32,
    pub param1: u32,
}

impl TestConfig {
    pub fn capacity() -> Self {
        Self {
            test_type: ScenarioType::Capacity as u32,
            param1: 0,
        }
    }

    pub fn transient_round_trip(event_id: u32) -> Self {
        Self {
            test_type: ScenarioType::TransientRoundTrip as u32,
            param1: event_id,
        }
    }

    pub fn untouched_marker(event_id: u32) -> Self {
        Self {
            test_type: ScenarioType::UntouchedMarker as u32,
            param1: event_id,
        }
    }

    pub fn forever_survives_clear(clears: u32) -> Self {
        Self {
            test_type: ScenarioType::ForeverSurvivesClear as u32,
            param1: clears,
        }
    }

    pub fn first_match(event_id: u32) -> Self {
        Self {
            test_type: ScenarioType::FirstMatch as u32,
            param1: event_id,
        }
    }

    pub fn reregister(event_id: u32) -> Self {
        Self {
            test_type: ScenarioType::Reregister as u32,
            param1: event_id,
        }
    }

    pub fn scenario_kind(&self) -> Option<ScenarioKind> {
        let ty = ScenarioType::from_u32(self.test_type)?;
        let event_id = EventId(self.param1);
        Some(match ty {
            ScenarioType::Capacity => ScenarioKind::Capacity,
            ScenarioType::TransientRoundTrip => ScenarioKind::TransientRoundTrip { event_id },
            ScenarioType::UntouchedMarker => ScenarioKind::UntouchedMarker { event_id },
            ScenarioType::ForeverSurvivesClear => ScenarioKind::ForeverSurvivesClear {
                clears: self.param1,
            },
            ScenarioType::FirstMatch => ScenarioKind::FirstMatch { event_id },
            ScenarioType::Reregister => ScenarioKind::Reregister { event_id },
        })
    }

    pub fn try_scenario_kind(&self) -> ScenarioResult<ScenarioKind> {
        self.scenario_kind()
            .ok_or(ScenarioError::UnknownScenario(self.test_type))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Fill every slot, overflow once, clear, register again.
    Capacity,
    /// One transient handler, dispatched twice.
    TransientRoundTrip { event_id: EventId },
    /// One untouched marker, dispatched once.
    UntouchedMarker { event_id: EventId },
    /// Fill every slot with forever handlers, clear `clears` times, then reset.
    ForeverSurvivesClear { clears: u32 },
    /// Two handlers for the same id, dispatched twice.
    FirstMatch { event_id: EventId },
    /// Full registry whose matched handler re-registers during dispatch.
    Reregister { event_id: EventId },
}

/// A batch of scenarios run against one registry configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSuite {
    #[serde(default)]
    pub registry: RegistryConfig,
    pub scenarios: Vec<ScenarioKind>,
}

impl ScenarioSuite {
    /// Parses a suite from its JSON form.
    pub fn from_json(text: &str) -> ScenarioResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_test_configs(
        registry: RegistryConfig,
        configs: &[TestConfig],
    ) -> ScenarioResult<Self> {
        let scenarios = configs
            .iter()
            .map(TestConfig::try_scenario_kind)
            .collect::<ScenarioResult<Vec<_>>>()?;
        Ok(Self {
            registry,
            scenarios,
        })
    }
}
