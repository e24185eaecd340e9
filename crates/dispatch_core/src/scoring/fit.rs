use crate::ecs::Incident;

use super::algorithm::ScoringPolicy;
use super::capabilities::CapabilityTable;
use super::types::{Candidate, FitScoreResult, ScoreBreakdown};
use super::{ScoreWeights, ScoringConfig};

/// Weighted fit score: proximity, capability match and readiness.
///
/// # Algorithm Behavior
///
/// - **Proximity**: `max(0, 100 - k * distance_m)` with
///   `k = 100 / max_useful_radius_m`, so a unit on top of the incident scores
///   100 and anything at or beyond the radius scores 0.
/// - **Capability**: 100 when the responder carries any tag the incident
///   type calls for, otherwise `capability_baseline`.
/// - **Readiness**: `100 - fatigue`.
///
/// The total is `w_p * proximity + w_c * capability + w_r * readiness`.
#[derive(Debug, Clone)]
pub struct FitScoreResolver {
    weights: ScoreWeights,
    max_useful_radius_m: f64,
    meters_per_unit: f64,
    capability_baseline: f64,
    capabilities: CapabilityTable,
}

impl FitScoreResolver {
    pub fn new(config: &ScoringConfig, capabilities: CapabilityTable) -> Self {
        Self {
            weights: config.weights,
            max_useful_radius_m: config.max_useful_radius_m,
            meters_per_unit: config.meters_per_unit,
            capability_baseline: config.capability_baseline,
            capabilities,
        }
    }

    pub fn proximity(&self, distance_m: f64) -> f64 {
        proximity_score(distance_m, self.max_useful_radius_m)
    }
}

impl Default for FitScoreResolver {
    fn default() -> Self {
        Self::new(&ScoringConfig::default(), CapabilityTable::default())
    }
}

impl ScoringPolicy for FitScoreResolver {
    fn score(&self, candidate: Candidate<'_>, incident: &Incident) -> FitScoreResult {
        let responder = candidate.responder;
        let distance_m = candidate.position.distance_to(incident.coordinate) * self.meters_per_unit;

        let breakdown = ScoreBreakdown {
            proximity: self.proximity(distance_m),
            capability: if self
                .capabilities
                .matches(incident.kind, &responder.capabilities)
            {
                100.0
            } else {
                self.capability_baseline
            },
            readiness: responder.readiness(),
        };

        FitScoreResult {
            responder_id: responder.id.clone(),
            score: self.weights.combine(&breakdown),
            breakdown,
            distance_m,
        }
    }
}

/// Linear falloff from 100 at the incident to 0 at `radius_m`.
pub(crate) fn proximity_score(distance_m: f64, radius_m: f64) -> f64 {
    if radius_m <= 0.0 {
        return if distance_m <= 0.0 { 100.0 } else { 0.0 };
    }
    (100.0 - distance_m * (100.0 / radius_m)).max(0.0)
}
