use serde::Serialize;

use crate::ecs::Responder;
use crate::spatial::Coordinate;

/// Component scores, each on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub proximity: f64,
    pub capability: f64,
    pub readiness: f64,
}

/// Represents one responder's fit for an incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitScoreResult {
    pub responder_id: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Responder-to-incident distance in metres.
    pub distance_m: f64,
}

/// A responder paired with its current position, as seen by a scoring policy.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub responder: &'a Responder,
    pub position: Coordinate,
}

impl<'a> Candidate<'a> {
    pub fn new(responder: &'a Responder, position: Coordinate) -> Self {
        Self {
            responder,
            position,
        }
    }
}
