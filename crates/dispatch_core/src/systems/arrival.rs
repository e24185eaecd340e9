use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Assignment, Responder};
use crate::narrative::{NarrativeLog, Severity};
use crate::scenario::EngineParams;

/// Marks the arrival time and starts the settle timer.
pub fn arrival_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<EngineParams>,
    mut log: ResMut<NarrativeLog>,
    mut responders: Query<(&Responder, &mut Assignment)>,
) {
    if event.0.kind != EventKind::ResponderArrived {
        return;
    }
    let Some(EventSubject::Responder(entity)) = event.0.subject else {
        return;
    };
    let Ok((responder, mut assignment)) = responders.get_mut(entity) else {
        return;
    };
    // Arrival fires once per assignment.
    if assignment.arrived_at.is_some() {
        return;
    }

    let now = clock.now();
    assignment.arrived_at = Some(now);
    log.push(
        now,
        Severity::Success,
        format!("Unit {} arrived. Solving...", responder.name),
    );
    clock.schedule_in(
        params.settle_delay_ms,
        EventKind::SettleComplete,
        event.0.subject,
    );
}
