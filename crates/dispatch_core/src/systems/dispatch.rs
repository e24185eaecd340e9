//! Dispatch system: validates a request, plans the route, flips statuses and
//! starts the animation.
//!
//! Every `DispatchRequested` event is validated when it executes, not when it
//! was scheduled, so a scenario dispatch queued earlier can never grab a
//! responder that a manual dispatch took in the meantime.

use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut, Resource};

use crate::animation::MovementPlan;
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{
    ActiveRoute, ActiveRoutes, Assignment, Incident, IncidentStatus, Position, Responder,
    ResponderKind, ResponderStatus,
};
use crate::error::{DispatchRejection, EngineError};
use crate::narrative::NarrativeLog;
use crate::routing::{DirectRouteProvider, RouteKind, RouteProvider, RouteProviderResource};
use crate::scenario::{EngineParams, RoadNetworkResource};
use crate::telemetry::DispatchTelemetry;

use super::repositioning::nudge_toward_nearest_node;

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Sequence number of the event that carried the request.
    pub seq: u64,
    pub result: Result<RouteKind, DispatchRejection>,
}

/// Result of the most recent dispatch attempt.
#[derive(Debug, Default, Resource)]
pub struct DispatchOutcomes {
    pub last: Option<DispatchOutcome>,
    pub rejected: u64,
}

impl DispatchOutcomes {
    pub fn for_seq(&self, seq: u64) -> Option<&DispatchOutcome> {
        self.last.as_ref().filter(|outcome| outcome.seq == seq)
    }
}

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn dispatch_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<EngineParams>,
    route_provider: Res<RouteProviderResource>,
    network: Res<RoadNetworkResource>,
    mut log: ResMut<NarrativeLog>,
    mut routes: ResMut<ActiveRoutes>,
    mut telemetry: ResMut<DispatchTelemetry>,
    mut outcomes: ResMut<DispatchOutcomes>,
    mut responders: Query<(
        Entity,
        &mut Responder,
        &mut Position,
        Option<&MovementPlan>,
        Option<&Assignment>,
    )>,
    mut incidents: Query<&mut Incident>,
) {
    if event.0.kind != EventKind::DispatchRequested {
        return;
    }
    let Some(EventSubject::Dispatch {
        responder: responder_entity,
        incident: incident_entity,
    }) = event.0.subject
    else {
        return;
    };
    let now = clock.now();

    let result = (|| {
        let Ok((_, mut responder, position, plan, assignment)) =
            responders.get_mut(responder_entity)
        else {
            return Err(DispatchRejection::UnknownResponder(format!(
                "{responder_entity:?}"
            )));
        };
        if !responder.is_available() || plan.is_some() || assignment.is_some() {
            return Err(DispatchRejection::ResponderBusy(responder.id.clone()));
        }
        let Ok(mut incident) = incidents.get_mut(incident_entity) else {
            return Err(DispatchRejection::UnknownIncident(format!(
                "{incident_entity:?}"
            )));
        };
        if incident.status != IncidentStatus::Pending {
            return Err(DispatchRejection::IncidentNotPending {
                id: incident.id.clone(),
                status: incident.status.to_string(),
            });
        }

        let origin = position.0;
        let planned = match responder.kind {
            ResponderKind::Drone => DirectRouteProvider.route(origin, incident.coordinate),
            ResponderKind::Patrol => route_provider.0.route(origin, incident.coordinate),
        };
        let route = planned.map_err(|err: EngineError| {
            log.error(now, format!("Route planning failed for {}: {err}", responder.name));
            DispatchRejection::RouteFailed(err.to_string())
        })?;

        responder.status = ResponderStatus::Busy;
        incident.status = IncidentStatus::Assigned;
        incident.assigned_responder = Some(responder.id.clone());

        routes.0.insert(
            incident.id.clone(),
            ActiveRoute {
                incident_id: incident.id.clone(),
                responder_id: responder.id.clone(),
                kind: route.kind,
                nodes: route.nodes.clone(),
                geometry: route.geometry(origin),
            },
        );
        commands.entity(responder_entity).insert((
            Assignment {
                incident: incident_entity,
                incident_id: incident.id.clone(),
                route_kind: route.kind,
                dispatched_at: now,
                arrived_at: None,
            },
            MovementPlan::new(
                incident_entity,
                incident.coordinate,
                route.targets,
                params.steps_per_segment,
            ),
        ));

        let via = match route.kind {
            RouteKind::Road => format!("via {}", route.nodes.join(" > ")),
            RouteKind::Fallback(reason) => format!("direct ({reason:?} fallback)"),
            RouteKind::Direct => "direct".to_string(),
        };
        log.info(
            now,
            format!(
                "Dispatching {} to {} {via}...",
                responder.name, incident.location
            ),
        );
        Ok(route.kind)
    })();

    match &result {
        Ok(_) => {
            telemetry.dispatches += 1;
            for (entity, responder, mut position, plan, _) in responders.iter_mut() {
                if entity == responder_entity || !responder.is_available() || plan.is_some() {
                    continue;
                }
                position.0 =
                    nudge_toward_nearest_node(&network.0, position.0, params.reposition_fraction);
            }
            clock.schedule_in(
                params.tick_ms,
                EventKind::MoveStep,
                Some(EventSubject::Responder(responder_entity)),
            );
        }
        Err(rejection) => {
            outcomes.rejected += 1;
            log.warn(now, format!("Dispatch rejected: {rejection}"));
        }
    }

    outcomes.last = Some(DispatchOutcome {
        seq: event.0.seq,
        result,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::clock::Event;
    use crate::ecs::{IncidentType, Priority};
    use crate::routing::FallbackReason;
    use crate::scenario::{build_engine, CityDefinition};
    use crate::spatial::Coordinate;

    fn world() -> World {
        let mut world = World::new();
        build_engine(&mut world, EngineParams::default(), CityDefinition::koramangala())
            .expect("engine");
        world
    }

    fn responder(world: &mut World, id: &str) -> Entity {
        world
            .query::<(Entity, &Responder)>()
            .iter(world)
            .find(|(_, r)| r.id == id)
            .map(|(e, _)| e)
            .expect("responder")
    }

    fn incident(world: &mut World, at: Coordinate) -> Entity {
        world
            .spawn(Incident {
                id: "INC-0100".to_string(),
                kind: IncidentType::Assault,
                coordinate: at,
                location: "Madiwala Market".to_string(),
                description: String::new(),
                priority: Priority::Critical,
                created_at: 0,
                status: IncidentStatus::Pending,
                assigned_responder: None,
            })
            .id()
    }

    fn request(world: &mut World, responder: Entity, incident: Entity, seq: u64) {
        world.insert_resource(CurrentEvent(Event {
            timestamp: 0,
            seq,
            kind: EventKind::DispatchRequested,
            subject: Some(EventSubject::Dispatch {
                responder,
                incident,
            }),
        }));
        let mut schedule = Schedule::default();
        schedule.add_systems(dispatch_system);
        schedule.run(world);
    }

    #[test]
    fn dispatch_flips_statuses_and_schedules_the_first_tick() {
        let mut world = world();
        let o4 = responder(&mut world, "o4");
        let inc = incident(&mut world, Coordinate::new(12.9250, 77.6190));

        request(&mut world, o4, inc, 1);

        let r = world.entity(o4).get::<Responder>().expect("responder");
        assert_eq!(r.status, ResponderStatus::Busy);
        assert!(world.entity(o4).contains::<MovementPlan>());
        let i = world.entity(inc).get::<Incident>().expect("incident");
        assert_eq!(i.status, IncidentStatus::Assigned);
        assert_eq!(i.assigned_responder.as_deref(), Some("o4"));

        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.pending_of(EventKind::MoveStep), 1);
        assert_eq!(clock.next_event_time(), Some(16));

        let outcome = world.resource::<DispatchOutcomes>().for_seq(1).cloned();
        assert_eq!(outcome.map(|o| o.result), Some(Ok(RouteKind::Road)));
        assert!(world.resource::<ActiveRoutes>().0.contains_key("INC-0100"));
    }

    #[test]
    fn second_request_for_the_same_responder_is_rejected() {
        let mut world = world();
        let o1 = responder(&mut world, "o1");
        let first = incident(&mut world, Coordinate::new(12.9250, 77.6190));
        request(&mut world, o1, first, 1);

        let second = incident(&mut world, Coordinate::new(12.9400, 77.6240));
        request(&mut world, o1, second, 2);

        let outcome = world
            .resource::<DispatchOutcomes>()
            .for_seq(2)
            .cloned()
            .expect("outcome");
        assert_eq!(
            outcome.result,
            Err(DispatchRejection::ResponderBusy("o1".to_string()))
        );
        let untouched = world.entity(second).get::<Incident>().expect("incident");
        assert_eq!(untouched.status, IncidentStatus::Pending);
        assert_eq!(world.resource::<SimulationClock>().pending_of(EventKind::MoveStep), 1);
    }

    #[test]
    fn isolated_destination_falls_back_to_a_direct_route() {
        let mut world = world();
        let o2 = responder(&mut world, "o2");
        // Snaps to the isolated Check Post node.
        let inc = incident(&mut world, Coordinate::new(12.9251, 77.6251));
        request(&mut world, o2, inc, 1);

        let outcome = world.resource::<DispatchOutcomes>().for_seq(1).cloned();
        assert_eq!(
            outcome.map(|o| o.result),
            Some(Ok(RouteKind::Fallback(FallbackReason::Disconnected)))
        );
    }

    #[test]
    fn idle_units_drift_toward_the_network_on_dispatch() {
        let mut world = world();
        let o1 = responder(&mut world, "o1");
        let o2 = responder(&mut world, "o2");
        let before = world.entity(o2).get::<Position>().expect("position").0;
        let network = world.resource::<RoadNetworkResource>().0.clone();
        let nearest = network.nearest_node(before).expect("node").coordinate;

        let inc = incident(&mut world, Coordinate::new(12.9250, 77.6190));
        request(&mut world, o1, inc, 1);

        let after = world.entity(o2).get::<Position>().expect("position").0;
        assert!(after.distance_to(nearest) < before.distance_to(nearest));
        let expected = before.distance_to(nearest) * 0.95;
        assert!((after.distance_to(nearest) - expected).abs() < 1e-12);
    }
}
