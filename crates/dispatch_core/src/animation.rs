//! Movement animation state and its step function.
//!
//! A [`MovementPlan`] walks a responder through a list of target coordinates.
//! Every target is one segment of `steps_per_segment` ticks. Each tick covers
//! `1 / steps_remaining` of what is left of the segment, and the last tick of a
//! segment lands exactly on the target, so floating point error never
//! accumulates across segments.

use bevy_ecs::prelude::{Component, Entity};

use crate::spatial::Coordinate;

/// Result of advancing a plan by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Moving(Coordinate),
    /// The plan is finished; the position is the destination.
    Arrived(Coordinate),
}

#[derive(Debug, Clone, PartialEq, Component)]
pub struct MovementPlan {
    pub incident: Entity,
    pub destination: Coordinate,
    pub targets: Vec<Coordinate>,
    pub segment: usize,
    /// Ticks already spent on the current segment.
    pub step: u32,
    pub steps_per_segment: u32,
}

impl MovementPlan {
    pub fn new(
        incident: Entity,
        destination: Coordinate,
        targets: Vec<Coordinate>,
        steps_per_segment: u32,
    ) -> Self {
        Self {
            incident,
            destination,
            targets,
            segment: 0,
            step: 0,
            steps_per_segment: steps_per_segment.max(1),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.segment >= self.targets.len()
    }

    /// Ticks left until arrival, including the current one.
    pub fn remaining_ticks(&self) -> u64 {
        let segments_left = self.targets.len().saturating_sub(self.segment) as u64;
        (segments_left * u64::from(self.steps_per_segment)).saturating_sub(u64::from(self.step))
    }

    pub fn step(&mut self, position: Coordinate) -> StepOutcome {
        let Some(&target) = self.targets.get(self.segment) else {
            return StepOutcome::Arrived(self.destination);
        };

        let remaining = self.steps_per_segment - self.step;
        let next = if remaining <= 1 {
            target
        } else {
            position.step_toward(target, 1.0 / f64::from(remaining))
        };

        self.step += 1;
        if self.step >= self.steps_per_segment {
            self.segment += 1;
            self.step = 0;
        }

        if self.is_finished() {
            StepOutcome::Arrived(self.destination)
        } else {
            StepOutcome::Moving(next)
        }
    }
}
