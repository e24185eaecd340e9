#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use dispatch_core::runner::{run_next_event, run_until, run_until_empty, simulation_schedule};

/// Helper that owns a reusable `Schedule` so world-level tests can step the clock.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default simulation schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    /// Run events up to `max_steps`, returning the number of steps executed.
    pub fn run_steps(&mut self, world: &mut World, max_steps: usize) -> usize {
        run_until_empty(world, &mut self.schedule, max_steps)
    }

    /// Run every event due at or before `until_ms`.
    pub fn run_until(&mut self, world: &mut World, until_ms: u64) -> usize {
        run_until(world, &mut self.schedule, until_ms)
    }
}
