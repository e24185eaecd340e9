//! Test helpers for common test setup and utilities.
//!
//! The line city is a three-node road `A - B - C` on a unit grid, small
//! enough to reason about every route and score by hand.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{IncidentType, Priority, Responder, ResponderKind};
use crate::network::{NetworkDefinition, RoadNetwork, RoadNode};
use crate::scenario::{CityDefinition, EngineParams, ResponderSpec, ScenarioTemplate, StageDwell};
use crate::scoring::{CapabilityTable, ScoringConfig};
use crate::spatial::Coordinate;

/// `A (0,0) - B (1,0) - C (2,0)`.
pub fn line_network_definition() -> NetworkDefinition {
    NetworkDefinition {
        nodes: vec![
            RoadNode::new("A", "Alpha", 0.0, 0.0),
            RoadNode::new("B", "Bravo", 1.0, 0.0),
            RoadNode::new("C", "Charlie", 2.0, 0.0),
        ],
        edges: vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "C".to_string()),
        ],
        curves: Vec::new(),
    }
}

/// # Panics
///
/// Panics if the line definition does not build (should never happen).
pub fn line_network() -> RoadNetwork {
    RoadNetwork::from_definition(&line_network_definition()).expect("line network should build")
}

pub fn responder_spec(id: &str, at: (f64, f64), capabilities: &[&str]) -> ResponderSpec {
    ResponderSpec {
        id: id.to_string(),
        name: format!("Officer {id}"),
        kind: ResponderKind::Patrol,
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        fatigue: 0.0,
        vehicle: "Hoysala".to_string(),
        badge: format!("KA-00-{id}"),
        history: String::new(),
        position: Coordinate::from(at),
    }
}

/// One unit parked on `A`, one scenario at `C`.
pub fn line_city() -> CityDefinition {
    CityDefinition {
        name: "Line".to_string(),
        network: line_network_definition(),
        responders: vec![responder_spec("u1", (0.0, 0.0), &["Public Order"])],
        scenarios: vec![ScenarioTemplate {
            kind: IncidentType::PublicOrder,
            location: "Charlie".to_string(),
            coordinate: Coordinate::new(2.0, 0.0),
            priority: Priority::High,
            description: "Crowd gathering at the far end of the line.".to_string(),
            narrative: vec!["Sensor trip at Charlie".to_string()],
        }],
        capabilities: CapabilityTable::empty().with(IncidentType::PublicOrder, &["Public Order"]),
    }
}

/// Scoring on the unit grid: one coordinate unit is one metre and the useful
/// radius is three units.
pub fn unit_grid_scoring() -> ScoringConfig {
    ScoringConfig {
        meters_per_unit: 1.0,
        max_useful_radius_m: 3.0,
        ..ScoringConfig::default()
    }
}

/// Short dwell times and few animation steps so a full cycle takes 500 ms.
pub fn fast_params() -> EngineParams {
    EngineParams::default()
        .with_seed(7)
        .with_tick_ms(10)
        .with_steps_per_segment(2)
        .with_settle_delay_ms(50)
        .with_stage_dwell(StageDwell {
            scanning_ms: 100,
            detected_ms: 100,
            analyzing_ms: 100,
            dispatching_ms: 100,
            resolved_ms: 100,
        })
        .with_scoring_config(unit_grid_scoring())
}

/// # Panics
///
/// Panics if no responder with `id` exists.
pub fn responder_entity(world: &mut World, id: &str) -> Entity {
    world
        .query::<(Entity, &Responder)>()
        .iter(world)
        .find(|(_, responder)| responder.id == id)
        .map(|(entity, _)| entity)
        .expect("responder should exist")
}
