#![allow(dead_code)]

use dispatch_core::ecs::{IncidentStatus, ResponderKind, ResponderStatus};
use dispatch_core::scenario::{CityDefinition, EngineParams};
use dispatch_core::spatial::Coordinate;
use dispatch_core::test_helpers::{fast_params, line_city, responder_spec};
use dispatch_core::DispatchEngine;

/// Builder for reproducible test engines.
#[derive(Clone, Debug)]
pub struct TestEngineBuilder {
    params: EngineParams,
    city: CityDefinition,
}

impl Default for TestEngineBuilder {
    fn default() -> Self {
        Self {
            params: fast_params(),
            city: line_city(),
        }
    }
}

impl TestEngineBuilder {
    /// The line city with fast stage timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Koramangala city with default timings.
    pub fn koramangala() -> Self {
        Self {
            params: EngineParams::default(),
            city: CityDefinition::koramangala(),
        }
    }

    pub fn with_params(mut self, params: EngineParams) -> Self {
        self.params = params;
        self
    }

    pub fn map_params(mut self, f: impl FnOnce(EngineParams) -> EngineParams) -> Self {
        self.params = f(self.params);
        self
    }

    pub fn with_drone(mut self, id: &str, at: (f64, f64)) -> Self {
        let mut spec = responder_spec(id, at, &["Surveillance"]);
        spec.kind = ResponderKind::Drone;
        self.city.responders.push(spec);
        self
    }

    pub fn build(self) -> DispatchEngine {
        DispatchEngine::with_city(self.params, self.city).expect("test engine should build")
    }
}

pub fn responder_status(engine: &mut DispatchEngine, id: &str) -> ResponderStatus {
    engine
        .snapshot()
        .responder(id)
        .map(|r| r.status)
        .expect("responder in snapshot")
}

pub fn responder_position(engine: &mut DispatchEngine, id: &str) -> Coordinate {
    engine
        .snapshot()
        .responder(id)
        .map(|r| r.position)
        .expect("responder in snapshot")
}

pub fn incident_status(engine: &mut DispatchEngine, id: &str) -> Option<IncidentStatus> {
    engine.snapshot().incident(id).map(|i| i.status)
}
