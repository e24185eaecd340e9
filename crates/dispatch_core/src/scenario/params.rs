use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::narrative::DEFAULT_LOG_CAPACITY;
use crate::routing::{RouteProviderKind, RoutingConfig};
use crate::scoring::{ScoringConfig, ScoringPolicyKind};

use super::Stage;

/// Animation tick, roughly one frame at 60 Hz.
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_STEPS_PER_SEGMENT: u32 = 60;
const DEFAULT_SETTLE_DELAY_MS: u64 = 10_000;

/// How long the orchestrator stays in each stage (simulation ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDwell {
    pub scanning_ms: u64,
    pub detected_ms: u64,
    pub analyzing_ms: u64,
    pub dispatching_ms: u64,
    pub resolved_ms: u64,
}

impl StageDwell {
    pub fn for_stage(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Scanning => self.scanning_ms,
            Stage::Detected => self.detected_ms,
            Stage::Analyzing => self.analyzing_ms,
            Stage::Dispatching => self.dispatching_ms,
            Stage::Resolved => self.resolved_ms,
        }
    }

    /// One full cycle, assuming the scanning draw succeeds.
    pub fn cycle_ms(&self) -> u64 {
        self.scanning_ms
            + self.detected_ms
            + self.analyzing_ms
            + self.dispatching_ms
            + self.resolved_ms
    }
}

impl Default for StageDwell {
    fn default() -> Self {
        Self {
            scanning_ms: 4000,
            detected_ms: 3000,
            analyzing_ms: 6000,
            dispatching_ms: 2000,
            resolved_ms: 8000,
        }
    }
}

/// Parameters for building a dispatch engine. Inserted as a resource so
/// systems read their tuning from one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct EngineParams {
    /// Seed for the scenario RNG (incident draws and jitter).
    pub seed: u64,
    pub tick_ms: u64,
    pub steps_per_segment: u32,
    /// Delay between arrival and the responder becoming available again.
    pub settle_delay_ms: u64,
    pub stage_dwell: StageDwell,
    /// Chance (0.0–1.0) that a scanning stage produces an incident.
    pub incident_probability: f64,
    /// Uniform perturbation applied to template coordinates, in coordinate units.
    pub incident_jitter: f64,
    /// Keep pending, undispatched incidents across the cycle reset.
    pub requeue_unassigned: bool,
    /// Fraction of the remaining distance idle responders move toward their
    /// nearest node on every dispatch.
    pub reposition_fraction: f64,
    pub fatigue_per_dispatch: f64,
    pub log_capacity: usize,
    /// Whether the scenario clock runs as soon as the engine is built.
    pub start_enabled: bool,
    pub routing: RoutingConfig,
    pub scoring: ScoringConfig,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_ms: DEFAULT_TICK_MS,
            steps_per_segment: DEFAULT_STEPS_PER_SEGMENT,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            stage_dwell: StageDwell::default(),
            incident_probability: 1.0,
            incident_jitter: 0.0,
            requeue_unassigned: false,
            reposition_fraction: 0.05,
            fatigue_per_dispatch: 2.0,
            log_capacity: DEFAULT_LOG_CAPACITY,
            start_enabled: true,
            routing: RoutingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineParams {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| EngineError::Configuration(format!("invalid engine params: {err}")))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn with_steps_per_segment(mut self, steps: u32) -> Self {
        self.steps_per_segment = steps;
        self
    }

    pub fn with_settle_delay_ms(mut self, delay_ms: u64) -> Self {
        self.settle_delay_ms = delay_ms;
        self
    }

    pub fn with_stage_dwell(mut self, dwell: StageDwell) -> Self {
        self.stage_dwell = dwell;
        self
    }

    pub fn with_incident_probability(mut self, probability: f64) -> Self {
        self.incident_probability = probability;
        self
    }

    pub fn with_incident_jitter(mut self, jitter: f64) -> Self {
        self.incident_jitter = jitter;
        self
    }

    pub fn with_requeue_unassigned(mut self, requeue: bool) -> Self {
        self.requeue_unassigned = requeue;
        self
    }

    pub fn with_reposition_fraction(mut self, fraction: f64) -> Self {
        self.reposition_fraction = fraction;
        self
    }

    pub fn with_fatigue_per_dispatch(mut self, fatigue: f64) -> Self {
        self.fatigue_per_dispatch = fatigue;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn with_start_enabled(mut self, enabled: bool) -> Self {
        self.start_enabled = enabled;
        self
    }

    pub fn with_route_provider(mut self, kind: RouteProviderKind) -> Self {
        self.routing.provider = kind;
        self
    }

    pub fn with_detour_ratio(mut self, ratio: f64) -> Self {
        self.routing.detour_ratio = ratio;
        self
    }

    pub fn with_scoring_policy(mut self, policy: ScoringPolicyKind) -> Self {
        self.scoring.policy = policy;
        self
    }

    pub fn with_scoring_config(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.tick_ms == 0 {
            return Err(EngineError::Configuration(
                "tick_ms must be at least 1".to_string(),
            ));
        }
        if self.steps_per_segment == 0 {
            return Err(EngineError::Configuration(
                "steps_per_segment must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.incident_probability) {
            return Err(EngineError::Configuration(format!(
                "incident_probability must be within 0..=1, got {}",
                self.incident_probability
            )));
        }
        if !(self.incident_jitter.is_finite() && self.incident_jitter >= 0.0) {
            return Err(EngineError::Configuration(format!(
                "incident_jitter must be non-negative, got {}",
                self.incident_jitter
            )));
        }
        if !(0.0..=1.0).contains(&self.reposition_fraction) {
            return Err(EngineError::Configuration(format!(
                "reposition_fraction must be within 0..=1, got {}",
                self.reposition_fraction
            )));
        }
        if !(self.fatigue_per_dispatch.is_finite() && self.fatigue_per_dispatch >= 0.0) {
            return Err(EngineError::Configuration(format!(
                "fatigue_per_dispatch must be non-negative, got {}",
                self.fatigue_per_dispatch
            )));
        }
        if !(self.routing.detour_ratio.is_finite() && self.routing.detour_ratio >= 1.0) {
            return Err(EngineError::Configuration(format!(
                "detour_ratio must be at least 1.0, got {}",
                self.routing.detour_ratio
            )));
        }
        self.scoring.validate()
    }
}
