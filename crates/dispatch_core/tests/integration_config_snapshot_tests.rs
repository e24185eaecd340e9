mod support;

use bevy_ecs::prelude::World;
use dispatch_core::ecs::{Position, Responder, ResponderStatus};
use dispatch_core::network::RoadNode;
use dispatch_core::runner::initialize_simulation;
use dispatch_core::scenario::{build_engine, CityDefinition, EngineParams, ScenarioState, Stage};
use dispatch_core::telemetry::capture_snapshot;
use dispatch_core::test_helpers::{fast_params, line_city, responder_entity};
use dispatch_core::{DispatchEngine, EngineError};
use support::schedule::ScheduleRunner;

fn assert_configuration_error(result: Result<DispatchEngine, EngineError>) {
    match result {
        Err(err) => assert!(err.is_fatal(), "unexpected error {err}"),
        Ok(_) => panic!("engine should not build"),
    }
}

#[test]
fn invalid_params_prevent_startup() {
    assert_configuration_error(DispatchEngine::new(EngineParams::default().with_tick_ms(0)));
    assert_configuration_error(DispatchEngine::new(
        EngineParams::default().with_detour_ratio(0.5),
    ));
    assert_configuration_error(DispatchEngine::new(
        EngineParams::default().with_incident_probability(-0.1),
    ));
}

#[test]
fn invalid_cities_prevent_startup() {
    let mut no_scenarios = line_city();
    no_scenarios.scenarios.clear();
    assert_configuration_error(DispatchEngine::with_city(fast_params(), no_scenarios));

    let mut dangling_edge = line_city();
    dangling_edge
        .network
        .edges
        .push(("C".to_string(), "Z".to_string()));
    assert_configuration_error(DispatchEngine::with_city(fast_params(), dangling_edge));

    let mut duplicate_node = line_city();
    duplicate_node
        .network
        .nodes
        .push(RoadNode::new("A", "Alpha again", 9.0, 9.0));
    assert_configuration_error(DispatchEngine::with_city(fast_params(), duplicate_node));

    let mut empty_network = line_city();
    empty_network.network.nodes.clear();
    empty_network.network.edges.clear();
    assert_configuration_error(DispatchEngine::with_city(fast_params(), empty_network));
}

#[test]
fn malformed_json_is_a_configuration_error() {
    let err = EngineParams::from_json_str("{\"tick_ms\": \"fast\"}").expect_err("bad params");
    assert!(err.is_fatal());
    let err = CityDefinition::from_json_str("[]").expect_err("bad city");
    assert!(err.is_fatal());
}

#[test]
fn a_failed_build_leaves_the_world_empty() {
    let mut world = World::new();
    let result = build_engine(&mut world, EngineParams::default().with_tick_ms(0), line_city());
    assert!(result.is_err());
    assert!(world.get_resource::<ScenarioState>().is_none());
    assert_eq!(world.query::<&Responder>().iter(&world).count(), 0);
}

#[test]
fn city_definitions_load_from_json() {
    let json = serde_json::to_string(&line_city()).expect("serialize");
    let city = CityDefinition::from_json_str(&json).expect("city");
    let mut engine = DispatchEngine::with_city(fast_params(), city).expect("engine");
    engine.run_until(500);
    assert_eq!(engine.resolved_incidents().len(), 1);
}

#[test]
fn snapshot_serializes_to_json() {
    let mut engine = DispatchEngine::new(EngineParams::default()).expect("engine");
    let json = engine.snapshot().to_json().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

    assert_eq!(value["stage"], "scanning");
    assert_eq!(value["enabled"], true);
    assert_eq!(value["timestamp_ms"], 0);
    let responders = value["responders"].as_array().expect("responders");
    assert_eq!(responders.len(), 5);
    assert_eq!(responders[0]["id"], "o1");
    assert_eq!(responders[0]["status"], "available");
    assert_eq!(value["incidents"].as_array().map(Vec::len), Some(0));
    assert_eq!(value["routes"].as_array().map(Vec::len), Some(0));
}

#[test]
fn snapshot_reports_routes_and_assignments() {
    let mut engine = DispatchEngine::new(EngineParams::default()).expect("engine");
    // First scenario dispatch happens when the dispatching stage opens.
    engine.run_until(13_000);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.stage, Stage::Dispatching);
    assert_eq!(snapshot.routes.len(), 1);

    let route = &snapshot.routes[0];
    let responder = snapshot.responder(&route.responder_id).expect("responder");
    assert_eq!(responder.status, ResponderStatus::Busy);
    assert_eq!(responder.assignment.as_deref(), Some(route.incident_id.as_str()));
    let incident = snapshot.incident(&route.incident_id).expect("incident");
    assert_eq!(incident.assigned_responder.as_deref(), Some(responder.id.as_str()));
    assert_eq!(route.geometry.first().copied(), Some(responder.position));
}

#[test]
fn world_level_runs_match_the_engine_facade() {
    let mut world = World::new();
    build_engine(&mut world, fast_params(), line_city()).expect("engine");
    initialize_simulation(&mut world);
    let mut runner = ScheduleRunner::new();

    runner.run_until(&mut world, 340);
    let unit = responder_entity(&mut world, "u1");
    let position = world.get::<Position>(unit).expect("position").0;

    let mut engine = DispatchEngine::with_city(fast_params(), line_city()).expect("engine");
    engine.run_until(340);
    assert_eq!(capture_snapshot(&mut world), engine.snapshot());
    assert_eq!(engine.snapshot().responder("u1").map(|r| r.position), Some(position));

    // Stepping one event at a time reaches the same state.
    assert!(runner.run_one(&mut world));
    assert!(runner.run_steps(&mut world, 3) > 0);
}
