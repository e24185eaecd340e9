//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. Nothing is popped while [SimulationEnabled] is
//! false, so a disabled engine is frozen in time.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::scenario::{ScenarioState, SimulationEnabled};
use crate::systems::{
    arrival::arrival_system, dispatch::dispatch_system, movement::movement_system,
    scenario::scenario_advance_system, settle::settle_system,
};

fn is_scenario_advance(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ScenarioAdvance)
        .unwrap_or(false)
}

fn is_dispatch_requested(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DispatchRequested)
        .unwrap_or(false)
}

fn is_move_step(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::MoveStep)
        .unwrap_or(false)
}

fn is_responder_arrived(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ResponderArrived)
        .unwrap_or(false)
}

fn is_settle_complete(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SettleComplete)
        .unwrap_or(false)
}

fn is_enabled(world: &World) -> bool {
    world
        .get_resource::<SimulationEnabled>()
        .map(|enabled| enabled.0)
        .unwrap_or(true)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `true` if an event was processed, `false` if the clock was empty or the simulation is disabled.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    if !is_enabled(world) {
        return false;
    }
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    run_event(world, schedule, event);
    true
}

/// Runs the schedule for an event that did not come off the queue, such as
/// a manual dispatch request. Works while the simulation is disabled.
pub fn run_event(world: &mut World, schedule: &mut Schedule, event: Event) {
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
}

/// Processes every event due at or before `until_ms`, then moves the clock to
/// `until_ms`. Returns the number of events processed. Does nothing while the
/// simulation is disabled.
pub fn run_until(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        if !is_enabled(world) {
            return steps;
        }
        let due = world
            .resource::<SimulationClock>()
            .next_event_time()
            .is_some_and(|ts| ts <= until_ms);
        if !due || !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    world.resource_mut::<SimulationClock>().advance_to(until_ms);
    steps
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed. The scenario cycle never empties the
/// queue on its own, so `max_steps` is the usual stop condition.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Builds the default simulation schedule: all event-reacting systems plus [apply_deferred]
/// so that spawned and despawned entities are applied before the next step.
///
/// Systems are conditionally executed based on event type.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        scenario_advance_system.run_if(is_scenario_advance),
        dispatch_system.run_if(is_dispatch_requested),
        movement_system.run_if(is_move_step),
        arrival_system.run_if(is_responder_arrived),
        settle_system.run_if(is_settle_complete),
        apply_deferred,
    ));
    schedule
}

/// Starts the scenario cycle by scheduling the end of the first scanning
/// stage. Call this after [crate::scenario::build_engine] and before running
/// events.
pub fn initialize_simulation(world: &mut World) {
    let dwell = world
        .get_resource::<crate::scenario::EngineParams>()
        .map(|params| params.stage_dwell.scanning_ms)
        .unwrap_or_default();
    let now = world.resource::<SimulationClock>().now();
    if let Some(mut state) = world.get_resource_mut::<ScenarioState>() {
        state.last_transition_ms = now;
    }
    world
        .resource_mut::<SimulationClock>()
        .schedule_in(dwell, EventKind::ScenarioAdvance, None);
}
