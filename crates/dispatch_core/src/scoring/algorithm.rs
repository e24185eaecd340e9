use std::cmp::Ordering;

use crate::ecs::Incident;

use super::types::{Candidate, FitScoreResult};

/// Trait for policies that score responders against an incident.
///
/// Implementations are pure: the same candidates and incident always yield
/// the same scores and the same order.
pub trait ScoringPolicy: Send + Sync {
    /// Score a single responder. Does not look at the responder's status.
    fn score(&self, candidate: Candidate<'_>, incident: &Incident) -> FitScoreResult;

    /// Score every available candidate and order them best first.
    ///
    /// Busy responders are dropped before scoring. Ties on score fall back to
    /// ascending distance, then ascending responder id.
    fn rank(&self, candidates: &[Candidate<'_>], incident: &Incident) -> Vec<FitScoreResult> {
        let mut ranked: Vec<FitScoreResult> = candidates
            .iter()
            .filter(|candidate| candidate.responder.is_available())
            .map(|candidate| self.score(*candidate, incident))
            .collect();
        ranked.sort_by(compare_results);
        ranked
    }
}

/// Best-first ordering for ranked results.
pub fn compare_results(a: &FitScoreResult, b: &FitScoreResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.distance_m.total_cmp(&b.distance_m))
        .then_with(|| a.responder_id.cmp(&b.responder_id))
}
