use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{ActiveRoutes, Assignment, Incident, IncidentStatus, Responder, ResponderStatus};
use crate::narrative::NarrativeLog;
use crate::scenario::{EngineParams, ScenarioState};
use crate::telemetry::{DispatchTelemetry, ResolvedIncidentRecord};

/// Finalizes a dispatch once the settle delay has passed: the incident is
/// resolved and leaves the active set, the route is cleared and the
/// responder becomes available again.
#[allow(clippy::too_many_arguments)]
pub fn settle_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    params: Res<EngineParams>,
    mut log: ResMut<NarrativeLog>,
    mut routes: ResMut<ActiveRoutes>,
    mut telemetry: ResMut<DispatchTelemetry>,
    mut state: ResMut<ScenarioState>,
    mut responders: Query<(&mut Responder, &Assignment)>,
    mut incidents: Query<&mut Incident>,
) {
    if event.0.kind != EventKind::SettleComplete {
        return;
    }
    let Some(EventSubject::Responder(entity)) = event.0.subject else {
        return;
    };
    let Ok((mut responder, assignment)) = responders.get_mut(entity) else {
        return;
    };
    let now = clock.now();

    if let Ok(mut incident) = incidents.get_mut(assignment.incident) {
        incident.status = IncidentStatus::Resolved;
        telemetry.resolved.push(ResolvedIncidentRecord {
            incident_id: incident.id.clone(),
            responder_id: responder.id.clone(),
            incident_kind: incident.kind,
            route_kind: assignment.route_kind,
            created_at: incident.created_at,
            dispatched_at: assignment.dispatched_at,
            arrived_at: assignment.arrived_at.unwrap_or(now),
            resolved_at: now,
        });
        commands.entity(assignment.incident).despawn();
    }
    if state.active_incident == Some(assignment.incident) {
        state.active_incident = None;
    }
    routes.0.remove(&assignment.incident_id);

    responder.status = ResponderStatus::Available;
    responder.fatigue = (responder.fatigue + params.fatigue_per_dispatch).min(100.0);
    log.info(
        now,
        format!(
            "Incident {} resolved by {}.",
            assignment.incident_id, responder.name
        ),
    );
    commands.entity(entity).remove::<Assignment>();
}
