//! Scenario setup and orchestrator state.
//!
//! [`build_engine`] turns [`EngineParams`] plus a [`CityDefinition`] into a
//! populated world. The orchestrator's progress lives in [`ScenarioState`].

mod build;
mod city;
mod params;

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::{Entity, Resource};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::network::RoadNetwork;
use crate::scoring::FitScoreResult;

pub use build::build_engine;
pub use city::{CityDefinition, ResponderSpec, ScenarioTemplate};
pub use params::{EngineParams, StageDwell};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Scanning,
    Detected,
    Analyzing,
    Dispatching,
    Resolved,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Scanning => Stage::Detected,
            Stage::Detected => Stage::Analyzing,
            Stage::Analyzing => Stage::Dispatching,
            Stage::Dispatching => Stage::Resolved,
            Stage::Resolved => Stage::Scanning,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Scanning => "scanning",
            Stage::Detected => "detected",
            Stage::Analyzing => "analyzing",
            Stage::Dispatching => "dispatching",
            Stage::Resolved => "resolved",
        };
        f.write_str(label)
    }
}

/// Orchestrator progress. Exactly one per engine.
#[derive(Debug, Default, Resource)]
pub struct ScenarioState {
    pub stage: Stage,
    /// Index into the scenario table; wraps modulo its length.
    pub scenario_index: usize,
    pub last_transition_ms: u64,
    /// Incident this cycle is working on.
    pub active_incident: Option<Entity>,
    /// Ranking published during the analyzing stage.
    pub ranking: Vec<FitScoreResult>,
    pub cycles_completed: u64,
    next_incident_seq: u64,
}

impl ScenarioState {
    pub fn transition(&mut self, stage: Stage, now: u64) {
        self.stage = stage;
        self.last_transition_ms = now;
    }

    pub fn next_incident_id(&mut self) -> String {
        self.next_incident_seq += 1;
        format!("INC-{:04}", self.next_incident_seq)
    }
}

/// Whether the clock may advance. While false no events are processed.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEnabled(pub bool);

/// Seeded RNG for incident draws and coordinate jitter.
#[derive(Debug, Resource)]
pub struct ScenarioRng(pub StdRng);

#[derive(Debug, Clone, Resource)]
pub struct RoadNetworkResource(pub Arc<RoadNetwork>);

#[derive(Debug, Clone, Default, Resource)]
pub struct ScenarioTemplates(pub Vec<ScenarioTemplate>);
