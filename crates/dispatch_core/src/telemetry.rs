//! Telemetry and snapshots: resolved incidents for analysis, plus the
//! read-only views handed to consumers.

use bevy_ecs::prelude::{Resource, World};
use serde::Serialize;

use crate::clock::SimulationClock;
use crate::ecs::{
    ActiveRoute, ActiveRoutes, Assignment, Incident, IncidentStatus, IncidentType, Position,
    Priority, Responder, ResponderKind, ResponderStatus,
};
use crate::routing::RouteKind;
use crate::scenario::{ScenarioState, SimulationEnabled, Stage};
use crate::spatial::Coordinate;

/// One resolved incident, recorded when the settle delay completes.
/// Timestamps are simulation ms; use the helper methods for derived KPIs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIncidentRecord {
    pub incident_id: String,
    pub responder_id: String,
    pub incident_kind: IncidentType,
    pub route_kind: RouteKind,
    pub created_at: u64,
    pub dispatched_at: u64,
    pub arrived_at: u64,
    pub resolved_at: u64,
}

impl ResolvedIncidentRecord {
    /// Time from creation to dispatch.
    pub fn time_to_dispatch(&self) -> u64 {
        self.dispatched_at.saturating_sub(self.created_at)
    }

    /// Time from dispatch to arrival on scene.
    pub fn travel_time(&self) -> u64 {
        self.arrived_at.saturating_sub(self.dispatched_at)
    }

    /// Time from arrival to resolution.
    pub fn time_on_scene(&self) -> u64 {
        self.resolved_at.saturating_sub(self.arrived_at)
    }
}

#[derive(Debug, Default, Resource)]
pub struct DispatchTelemetry {
    pub resolved: Vec<ResolvedIncidentRecord>,
    pub dispatches: u64,
    /// Dispatching stages that found nobody available.
    pub unfilled: u64,
    /// Pending incidents dropped at a cycle reset.
    pub expired: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponderSnapshot {
    pub id: String,
    pub name: String,
    pub kind: ResponderKind,
    pub status: ResponderStatus,
    pub position: Coordinate,
    pub fatigue: f64,
    pub capabilities: Vec<String>,
    pub vehicle: String,
    pub badge: String,
    /// Incident the responder is currently assigned to.
    pub assignment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentSnapshot {
    pub id: String,
    pub kind: IncidentType,
    pub label: &'static str,
    pub status: IncidentStatus,
    pub priority: Priority,
    pub coordinate: Coordinate,
    pub location: String,
    pub description: String,
    pub created_at: u64,
    pub assigned_responder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub timestamp_ms: u64,
    pub enabled: bool,
    pub stage: Stage,
    pub scenario_index: usize,
    pub responders: Vec<ResponderSnapshot>,
    pub incidents: Vec<IncidentSnapshot>,
    pub routes: Vec<ActiveRoute>,
}

impl EngineSnapshot {
    pub fn responder(&self, id: &str) -> Option<&ResponderSnapshot> {
        self.responders.iter().find(|r| r.id == id)
    }

    pub fn incident(&self, id: &str) -> Option<&IncidentSnapshot> {
        self.incidents.iter().find(|i| i.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Capture the current state. Responders and incidents are sorted by id so
/// two snapshots of the same state compare equal.
pub fn capture_snapshot(world: &mut World) -> EngineSnapshot {
    let mut responders: Vec<ResponderSnapshot> = world
        .query::<(&Responder, &Position, Option<&Assignment>)>()
        .iter(world)
        .map(|(responder, position, assignment)| ResponderSnapshot {
            id: responder.id.clone(),
            name: responder.name.clone(),
            kind: responder.kind,
            status: responder.status,
            position: position.0,
            fatigue: responder.fatigue,
            capabilities: responder.capabilities.iter().cloned().collect(),
            vehicle: responder.vehicle.clone(),
            badge: responder.badge.clone(),
            assignment: assignment.map(|a| a.incident_id.clone()),
        })
        .collect();
    responders.sort_by(|a, b| a.id.cmp(&b.id));

    let mut incidents: Vec<IncidentSnapshot> = world
        .query::<&Incident>()
        .iter(world)
        .map(|incident| IncidentSnapshot {
            id: incident.id.clone(),
            kind: incident.kind,
            label: incident.kind.label(),
            status: incident.status,
            priority: incident.priority,
            coordinate: incident.coordinate,
            location: incident.location.clone(),
            description: incident.description.clone(),
            created_at: incident.created_at,
            assigned_responder: incident.assigned_responder.clone(),
        })
        .collect();
    incidents.sort_by(|a, b| a.id.cmp(&b.id));

    let routes = world
        .get_resource::<ActiveRoutes>()
        .map(|routes| routes.0.values().cloned().collect())
        .unwrap_or_default();
    let (stage, scenario_index) = world
        .get_resource::<ScenarioState>()
        .map(|state| (state.stage, state.scenario_index))
        .unwrap_or_default();

    EngineSnapshot {
        timestamp_ms: world
            .get_resource::<SimulationClock>()
            .map(|clock| clock.now())
            .unwrap_or(0),
        enabled: world
            .get_resource::<SimulationEnabled>()
            .map(|enabled| enabled.0)
            .unwrap_or(false),
        stage,
        scenario_index,
        responders,
        incidents,
        routes,
    }
}
