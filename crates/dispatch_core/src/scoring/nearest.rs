use crate::ecs::Incident;

use super::algorithm::ScoringPolicy;
use super::fit::proximity_score;
use super::types::{Candidate, FitScoreResult, ScoreBreakdown};
use super::ScoringConfig;

/// Nearest available unit wins; capability and fatigue are reported but do
/// not affect the score.
///
/// Beyond the useful radius every candidate scores 0, and the ranking's
/// distance tie-break still puts the closest unit first.
#[derive(Debug, Clone)]
pub struct NearestAvailable {
    max_useful_radius_m: f64,
    meters_per_unit: f64,
}

impl NearestAvailable {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            max_useful_radius_m: config.max_useful_radius_m,
            meters_per_unit: config.meters_per_unit,
        }
    }
}

impl Default for NearestAvailable {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl ScoringPolicy for NearestAvailable {
    fn score(&self, candidate: Candidate<'_>, incident: &Incident) -> FitScoreResult {
        let distance_m = candidate.position.distance_to(incident.coordinate) * self.meters_per_unit;
        let proximity = proximity_score(distance_m, self.max_useful_radius_m);
        FitScoreResult {
            responder_id: candidate.responder.id.clone(),
            score: proximity,
            breakdown: ScoreBreakdown {
                proximity,
                capability: 0.0,
                readiness: candidate.responder.readiness(),
            },
            distance_m,
        }
    }
}
