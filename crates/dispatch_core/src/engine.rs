//! [`DispatchEngine`]: an owned world plus schedule with a small query and
//! command surface for hosts that do not want to drive the ECS directly.

use bevy_ecs::prelude::{Entity, Schedule, World};

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::ecs::{
    ActiveRoute, ActiveRoutes, Incident, IncidentStatus, IncidentType, Position, Priority,
    Responder,
};
use crate::error::{DispatchRejection, EngineError, EngineResult};
use crate::narrative::{LogEntry, NarrativeLog, Severity};
use crate::routing::RouteKind;
use crate::runner::{
    initialize_simulation, run_event, run_next_event, run_until, simulation_schedule,
};
use crate::scenario::{
    build_engine, CityDefinition, EngineParams, ScenarioState, SimulationEnabled, Stage,
};
use crate::scoring::{FitScoreResult, ScoringPolicyResource};
use crate::spatial::Coordinate;
use crate::systems::dispatch::DispatchOutcomes;
use crate::systems::scenario::rank_responders;
use crate::telemetry::{
    capture_snapshot, DispatchTelemetry, EngineSnapshot, ResolvedIncidentRecord,
};

/// An externally reported incident, injected alongside the scenario cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentReport {
    pub kind: IncidentType,
    pub coordinate: Coordinate,
    pub location: String,
    pub description: String,
    pub priority: Priority,
}

impl IncidentReport {
    pub fn new(kind: IncidentType, coordinate: Coordinate, location: impl Into<String>) -> Self {
        Self {
            kind,
            coordinate,
            location: location.into(),
            description: String::new(),
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

pub struct DispatchEngine {
    world: World,
    schedule: Schedule,
}

impl DispatchEngine {
    /// Engine over the built-in Koramangala city.
    pub fn new(params: EngineParams) -> EngineResult<Self> {
        Self::with_city(params, CityDefinition::koramangala())
    }

    pub fn with_city(params: EngineParams, city: CityDefinition) -> EngineResult<Self> {
        let mut world = World::new();
        build_engine(&mut world, params, city)?;
        initialize_simulation(&mut world);
        Ok(Self {
            world,
            schedule: simulation_schedule(),
        })
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn stage(&self) -> Stage {
        self.world.resource::<ScenarioState>().stage
    }

    pub fn is_enabled(&self) -> bool {
        self.world.resource::<SimulationEnabled>().0
    }

    /// Pause or resume the clock. While paused nothing moves and the
    /// orchestrator holds its stage.
    pub fn set_simulation_enabled(&mut self, enabled: bool) {
        if self.is_enabled() == enabled {
            return;
        }
        self.world.resource_mut::<SimulationEnabled>().0 = enabled;
        let now = self.now();
        let message = if enabled {
            "Simulation resumed."
        } else {
            "Simulation paused."
        };
        self.world.resource_mut::<NarrativeLog>().info(now, message);
    }

    /// Process the next pending event. Returns `false` when paused.
    pub fn run_next_event(&mut self) -> bool {
        run_next_event(&mut self.world, &mut self.schedule)
    }

    /// Process everything due up to `until_ms`. Returns the number of events run.
    pub fn run_until(&mut self, until_ms: u64) -> usize {
        run_until(&mut self.world, &mut self.schedule, until_ms)
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        let until = self.now().saturating_add(delta_ms);
        self.run_until(until)
    }

    pub fn snapshot(&mut self) -> EngineSnapshot {
        capture_snapshot(&mut self.world)
    }

    pub fn routes(&self) -> Vec<ActiveRoute> {
        self.world.resource::<ActiveRoutes>().0.values().cloned().collect()
    }

    pub fn route(&self, incident_id: &str) -> Option<ActiveRoute> {
        self.world.resource::<ActiveRoutes>().0.get(incident_id).cloned()
    }

    pub fn log_entries_since(&self, from_seq: u64) -> Vec<LogEntry> {
        self.world.resource::<NarrativeLog>().since(from_seq)
    }

    pub fn narrative(&self) -> &NarrativeLog {
        self.world.resource::<NarrativeLog>()
    }

    /// Ranking published by the last analyzing or dispatching stage.
    pub fn ranking(&self) -> &[FitScoreResult] {
        &self.world.resource::<ScenarioState>().ranking
    }

    /// Rank every available responder against a live incident.
    pub fn rank_incident(&mut self, incident_id: &str) -> EngineResult<Vec<FitScoreResult>> {
        let entity = self
            .incident_entity(incident_id)
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;
        let mut responders = self.world.query::<(&Responder, &Position)>();
        let world = &self.world;
        let incident = world
            .get::<Incident>(entity)
            .ok_or_else(|| EngineError::incident_not_found(incident_id))?;
        let policy = world.resource::<ScoringPolicyResource>();
        Ok(rank_responders(policy, responders.iter(world), incident))
    }

    pub fn resolved_incidents(&self) -> &[ResolvedIncidentRecord] {
        &self.world.resource::<DispatchTelemetry>().resolved
    }

    pub fn telemetry(&self) -> &DispatchTelemetry {
        self.world.resource::<DispatchTelemetry>()
    }

    /// Dispatch a responder to an incident right now, bypassing the
    /// orchestrator. Accepted while paused; the unit starts moving once the
    /// clock runs again.
    pub fn request_dispatch(
        &mut self,
        responder_id: &str,
        incident_id: &str,
    ) -> Result<RouteKind, DispatchRejection> {
        let Some(responder) = self.responder_entity(responder_id) else {
            return Err(self.reject(
                EngineError::responder_not_found(responder_id),
                DispatchRejection::UnknownResponder(responder_id.to_string()),
            ));
        };
        let Some(incident) = self.incident_entity(incident_id) else {
            return Err(self.reject(
                EngineError::incident_not_found(incident_id),
                DispatchRejection::UnknownIncident(incident_id.to_string()),
            ));
        };

        let event = self.world.resource_mut::<SimulationClock>().immediate(
            EventKind::DispatchRequested,
            Some(EventSubject::Dispatch {
                responder,
                incident,
            }),
        );
        tracing::debug!(responder_id, incident_id, seq = event.seq, "manual dispatch");
        run_event(&mut self.world, &mut self.schedule, event);

        self.world
            .resource::<DispatchOutcomes>()
            .for_seq(event.seq)
            .map(|outcome| outcome.result.clone())
            .unwrap_or_else(|| {
                Err(DispatchRejection::RouteFailed(
                    "dispatch request was not processed".to_string(),
                ))
            })
    }

    /// Add a pending incident. It competes with scenario incidents for the
    /// next dispatching stage and can be dispatched manually at once.
    pub fn submit_incident(&mut self, report: IncidentReport) -> String {
        let now = self.now();
        let id = self.world.resource_mut::<ScenarioState>().next_incident_id();
        self.world.resource_mut::<NarrativeLog>().push(
            now,
            Severity::Alert,
            format!(
                "Incident {id} reported: {} at {}",
                report.kind, report.location
            ),
        );
        self.world.spawn(Incident {
            id: id.clone(),
            kind: report.kind,
            coordinate: report.coordinate,
            location: report.location,
            description: report.description,
            priority: report.priority,
            created_at: now,
            status: IncidentStatus::Pending,
            assigned_responder: None,
        });
        id
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Requests that never reach the dispatch system are logged here.
    fn reject(&mut self, err: EngineError, rejection: DispatchRejection) -> DispatchRejection {
        tracing::warn!(error = %err, "manual dispatch rejected");
        let now = self.now();
        self.world
            .resource_mut::<NarrativeLog>()
            .warn(now, format!("Dispatch rejected: {rejection}"));
        rejection
    }

    fn responder_entity(&mut self, id: &str) -> Option<Entity> {
        self.world
            .query::<(Entity, &Responder)>()
            .iter(&self.world)
            .find(|(_, responder)| responder.id == id)
            .map(|(entity, _)| entity)
    }

    fn incident_entity(&mut self, id: &str) -> Option<Entity> {
        self.world
            .query::<(Entity, &Incident)>()
            .iter(&self.world)
            .find(|(_, incident)| incident.id == id)
            .map(|(entity, _)| entity)
    }
}
