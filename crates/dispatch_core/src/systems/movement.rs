//! Movement system: advances a responder one animation tick along its plan.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::animation::{MovementPlan, StepOutcome};
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Position, Responder};
use crate::scenario::EngineParams;

pub fn movement_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<EngineParams>,
    mut responders: Query<(&Responder, &mut Position, &mut MovementPlan)>,
) {
    if event.0.kind != EventKind::MoveStep {
        return;
    }
    let Some(EventSubject::Responder(entity)) = event.0.subject else {
        return;
    };
    let Ok((responder, mut position, mut plan)) = responders.get_mut(entity) else {
        return;
    };

    match plan.step(position.0) {
        StepOutcome::Moving(next) => {
            position.0 = next;
            clock.schedule_in(params.tick_ms, EventKind::MoveStep, event.0.subject);
        }
        StepOutcome::Arrived(destination) => {
            tracing::debug!(responder = %responder.id, "arrived at destination");
            position.0 = destination;
            commands.entity(entity).remove::<MovementPlan>();
            clock.schedule_in(0, EventKind::ResponderArrived, event.0.subject);
        }
    }
}
