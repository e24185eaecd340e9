//! Scenario orchestrator: the `scanning → detected → analyzing → dispatching
//! → resolved` cycle.
//!
//! Each `ScenarioAdvance` event ends the current stage, runs the entry work
//! of the next one and schedules the next advance after that stage's dwell.

use std::collections::HashMap;

use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Incident, IncidentStatus, Position, Responder};
use crate::error::EngineError;
use crate::narrative::{NarrativeLog, Severity};
use crate::scenario::{EngineParams, ScenarioRng, ScenarioState, ScenarioTemplates, Stage};
use crate::scoring::{Candidate, FitScoreResult, ScoringPolicyResource};
use crate::spatial::Coordinate;
use crate::telemetry::DispatchTelemetry;

/// Rank every available responder against `incident`.
pub fn rank_responders<'a>(
    policy: &ScoringPolicyResource,
    responders: impl IntoIterator<Item = (&'a Responder, &'a Position)>,
    incident: &Incident,
) -> Vec<FitScoreResult> {
    let candidates: Vec<Candidate<'a>> = responders
        .into_iter()
        .map(|(responder, position)| Candidate::new(responder, position.0))
        .collect();
    policy.rank(&candidates, incident)
}

/// The incident this cycle should work on: the cycle's own incident while it
/// is still pending, otherwise the oldest pending one. With requeueing on the
/// oldest pending incident always goes first.
fn select_incident(
    state: &ScenarioState,
    requeue: bool,
    incidents: &Query<(Entity, &Incident)>,
) -> Option<Entity> {
    let own = state
        .active_incident
        .filter(|entity| incidents.get(*entity).is_ok_and(|(_, i)| i.is_pending()));
    if own.is_some() && !requeue {
        return own;
    }
    incidents
        .iter()
        .filter(|(_, incident)| incident.is_pending())
        .min_by(|(_, a), (_, b)| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
        .map(|(entity, _)| entity)
        .or(own)
}

fn jitter(rng: &mut ScenarioRng, at: Coordinate, amount: f64) -> Coordinate {
    if amount <= 0.0 {
        return at;
    }
    Coordinate::new(
        at.lat + rng.0.gen_range(-amount..=amount),
        at.lng + rng.0.gen_range(-amount..=amount),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn scenario_advance_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<EngineParams>,
    templates: Res<ScenarioTemplates>,
    policy: Res<ScoringPolicyResource>,
    mut state: ResMut<ScenarioState>,
    mut rng: ResMut<ScenarioRng>,
    mut log: ResMut<NarrativeLog>,
    mut telemetry: ResMut<DispatchTelemetry>,
    responders: Query<(Entity, &Responder, &Position)>,
    incidents: Query<(Entity, &Incident)>,
) {
    if event.0.kind != EventKind::ScenarioAdvance {
        return;
    }
    let now = clock.now();
    let next = state.stage.next();

    match next {
        Stage::Detected => {
            let roll: f64 = rng.0.gen();
            if roll >= params.incident_probability || templates.0.is_empty() {
                tracing::debug!(sim_ms = now, "scan cycle quiet");
                state.last_transition_ms = now;
                clock.schedule_in(
                    params.stage_dwell.scanning_ms,
                    EventKind::ScenarioAdvance,
                    None,
                );
                return;
            }

            let template = &templates.0[state.scenario_index % templates.0.len()];
            for line in &template.narrative {
                log.push(now, Severity::Alert, line.clone());
            }
            let incident = Incident {
                id: state.next_incident_id(),
                kind: template.kind,
                coordinate: jitter(&mut rng, template.coordinate, params.incident_jitter),
                location: template.location.clone(),
                description: template.description.clone(),
                priority: template.priority,
                created_at: now,
                status: IncidentStatus::Pending,
                assigned_responder: None,
            };
            log.push(
                now,
                Severity::Alert,
                format!(
                    "Incident {} detected: {} at {}",
                    incident.id, incident.kind, incident.location
                ),
            );
            state.active_incident = Some(commands.spawn(incident).id());
        }
        Stage::Analyzing => {
            state.active_incident = select_incident(&state, params.requeue_unassigned, &incidents);
            let ranking = state
                .active_incident
                .and_then(|entity| incidents.get(entity).ok())
                .map(|(_, incident)| {
                    rank_responders(
                        &policy,
                        responders.iter().map(|(_, r, p)| (r, p)),
                        incident,
                    )
                });
            match ranking {
                Some(ranking) => {
                    log.info(
                        now,
                        "Calculating Officer Fit Scores (Skill vs Distance vs Fatigue)...",
                    );
                    if let Some(best) = ranking.first() {
                        log.info(
                            now,
                            format!(
                                "Top candidate {} (score {:.1}, {:.0} m)",
                                best.responder_id, best.score, best.distance_m
                            ),
                        );
                    }
                    state.ranking = ranking;
                }
                None => {
                    log.info(now, "No pending incident to analyze.");
                    state.ranking.clear();
                }
            }
        }
        Stage::Dispatching => {
            let target = state
                .active_incident
                .and_then(|entity| incidents.get(entity).ok())
                .filter(|(_, incident)| incident.is_pending());
            if let Some((incident_entity, incident)) = target {
                let ranking = rank_responders(
                    &policy,
                    responders.iter().map(|(_, r, p)| (r, p)),
                    incident,
                );
                let by_id: HashMap<&str, (Entity, &Responder)> = responders
                    .iter()
                    .map(|(entity, responder, _)| (responder.id.as_str(), (entity, responder)))
                    .collect();
                let best = ranking
                    .first()
                    .and_then(|best| by_id.get(best.responder_id.as_str()).copied());

                match best {
                    Some((responder_entity, responder)) => {
                        log.push(
                            now,
                            Severity::Success,
                            format!("Auto-Authorizing Dispatch for Officer {}...", responder.name),
                        );
                        clock.schedule_in(
                            0,
                            EventKind::DispatchRequested,
                            Some(EventSubject::Dispatch {
                                responder: responder_entity,
                                incident: incident_entity,
                            }),
                        );
                    }
                    None => {
                        let err = EngineError::NoAvailableResponder {
                            incident: incident.id.clone(),
                        };
                        tracing::warn!(error = %err, "dispatch skipped");
                        log.warn(now, "No units available. Queuing...");
                        telemetry.unfilled += 1;
                    }
                }
                state.ranking = ranking;
            }
        }
        Stage::Resolved => {}
        Stage::Scanning => {
            for (entity, incident) in incidents.iter() {
                let keep = match incident.status {
                    IncidentStatus::Assigned => true,
                    IncidentStatus::Pending => params.requeue_unassigned,
                    IncidentStatus::Resolved => false,
                };
                if keep {
                    continue;
                }
                if incident.is_pending() {
                    log.warn(now, format!("Incident {} expired undispatched.", incident.id));
                    telemetry.expired += 1;
                }
                commands.entity(entity).despawn();
            }
            state.active_incident = None;
            state.ranking.clear();
            state.cycles_completed += 1;
            if !templates.0.is_empty() {
                state.scenario_index = (state.scenario_index + 1) % templates.0.len();
            }
            log.info(
                now,
                format!(
                    "Cycle {} complete. Resuming sector scan.",
                    state.cycles_completed
                ),
            );
        }
    }

    state.transition(next, now);
    clock.schedule_in(
        params.stage_dwell.for_stage(next),
        EventKind::ScenarioAdvance,
        None,
    );
}
