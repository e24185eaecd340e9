pub mod arrival;
pub mod dispatch;
pub mod movement;
pub mod repositioning;
pub mod scenario;
pub mod settle;

#[cfg(test)]
mod end_to_end_tests {
    use bevy_ecs::prelude::World;

    use crate::clock::SimulationClock;
    use crate::ecs::{Incident, Responder, ResponderStatus};
    use crate::narrative::NarrativeLog;
    use crate::runner::{initialize_simulation, run_until, simulation_schedule};
    use crate::scenario::{build_engine, CityDefinition, EngineParams, ScenarioState, Stage};
    use crate::telemetry::DispatchTelemetry;

    #[test]
    fn simulates_one_full_cycle_end_to_end() {
        let mut world = World::new();
        build_engine(&mut world, EngineParams::default(), CityDefinition::koramangala())
            .expect("engine");
        initialize_simulation(&mut world);
        let mut schedule = simulation_schedule();

        // Detected at 4 s, analyzing at 7 s, dispatching at 13 s.
        run_until(&mut world, &mut schedule, 13_000);
        assert_eq!(world.resource::<ScenarioState>().stage, Stage::Dispatching);
        let busy = world
            .query::<&Responder>()
            .iter(&world)
            .filter(|r| r.status == ResponderStatus::Busy)
            .count();
        assert_eq!(busy, 1);

        // Resolved at 15 s, back to scanning at 23 s. Three segments of
        // animation plus the settle delay end before the next detection at 27 s.
        run_until(&mut world, &mut schedule, 26_000);
        let telemetry = world.resource::<DispatchTelemetry>();
        assert_eq!(telemetry.dispatches, 1);
        assert_eq!(telemetry.resolved.len(), 1);
        let record = &telemetry.resolved[0];
        assert_eq!(record.incident_id, "INC-0001");
        assert_eq!(record.created_at, 4_000);
        assert_eq!(record.dispatched_at, 13_000);
        assert!(record.arrived_at > record.dispatched_at);
        assert_eq!(record.time_on_scene(), 10_000);

        let state = world.resource::<ScenarioState>();
        assert_eq!(state.cycles_completed, 1);
        assert_eq!(state.scenario_index, 1);
        assert!(world.query::<&Incident>().iter(&world).all(|i| i.id != "INC-0001"));
        assert!(world
            .resource::<NarrativeLog>()
            .contains("resolved by"));
        assert!(world.resource::<SimulationClock>().now() <= 26_000);
    }
}
