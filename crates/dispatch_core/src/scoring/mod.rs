//! Responder scoring and ranking.

pub mod algorithm;
pub mod capabilities;
pub mod fit;
pub mod nearest;
pub mod types;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::spatial::METERS_PER_DEGREE;

pub use algorithm::{compare_results, ScoringPolicy};
pub use capabilities::CapabilityTable;
pub use fit::FitScoreResolver;
pub use nearest::NearestAvailable;
pub use types::{Candidate, FitScoreResult, ScoreBreakdown};

/// Resource wrapper for the scoring policy trait object.
#[derive(Resource)]
pub struct ScoringPolicyResource(pub Box<dyn ScoringPolicy>);

impl ScoringPolicyResource {
    pub fn new(policy: Box<dyn ScoringPolicy>) -> Self {
        Self(policy)
    }
}

impl std::ops::Deref for ScoringPolicyResource {
    type Target = dyn ScoringPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicyKind {
    #[default]
    FitScore,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub proximity: f64,
    pub capability: f64,
    pub readiness: f64,
}

impl ScoreWeights {
    pub fn combine(&self, breakdown: &ScoreBreakdown) -> f64 {
        self.proximity * breakdown.proximity
            + self.capability * breakdown.capability
            + self.readiness * breakdown.readiness
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            proximity: 0.4,
            capability: 0.4,
            readiness: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub policy: ScoringPolicyKind,
    pub weights: ScoreWeights,
    /// Distance at which proximity reaches zero.
    pub max_useful_radius_m: f64,
    pub meters_per_unit: f64,
    /// Capability score for a responder with no matching tag.
    pub capability_baseline: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            policy: ScoringPolicyKind::FitScore,
            weights: ScoreWeights::default(),
            max_useful_radius_m: 3000.0,
            meters_per_unit: METERS_PER_DEGREE,
            capability_baseline: 20.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> EngineResult<()> {
        let weights = [
            self.weights.proximity,
            self.weights.capability,
            self.weights.readiness,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::Configuration(
                "score weights must be finite and non-negative".to_string(),
            ));
        }
        if !(self.max_useful_radius_m.is_finite() && self.max_useful_radius_m > 0.0) {
            return Err(EngineError::Configuration(format!(
                "max_useful_radius_m must be positive, got {}",
                self.max_useful_radius_m
            )));
        }
        if !(self.meters_per_unit.is_finite() && self.meters_per_unit > 0.0) {
            return Err(EngineError::Configuration(format!(
                "meters_per_unit must be positive, got {}",
                self.meters_per_unit
            )));
        }
        if !(0.0..=100.0).contains(&self.capability_baseline) {
            return Err(EngineError::Configuration(format!(
                "capability_baseline must be within 0..=100, got {}",
                self.capability_baseline
            )));
        }
        Ok(())
    }
}

/// Construct a boxed [`ScoringPolicy`] from the scoring configuration.
pub fn build_scoring_policy(
    config: &ScoringConfig,
    capabilities: CapabilityTable,
) -> Box<dyn ScoringPolicy> {
    match config.policy {
        ScoringPolicyKind::FitScore => Box::new(FitScoreResolver::new(config, capabilities)),
        ScoringPolicyKind::Nearest => Box::new(NearestAvailable::new(config)),
    }
}
