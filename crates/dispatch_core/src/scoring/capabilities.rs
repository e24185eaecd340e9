use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ecs::IncidentType;

/// Capability tags an incident type calls for. A responder is well suited
/// when any of its tags appears in the set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityTable(pub BTreeMap<IncidentType, BTreeSet<String>>);

impl CapabilityTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, kind: IncidentType, tags: &[&str]) -> Self {
        self.0
            .insert(kind, tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn required(&self, kind: IncidentType) -> Option<&BTreeSet<String>> {
        self.0.get(&kind)
    }

    /// An incident type missing from the table matches nobody.
    pub fn matches(&self, kind: IncidentType, tags: &BTreeSet<String>) -> bool {
        self.required(kind)
            .is_some_and(|required| !required.is_disjoint(tags))
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::empty()
            .with(IncidentType::Theft, &["Theft", "Burglary", "Public Order"])
            .with(IncidentType::Assault, &["Public Order", "Crowd Control"])
            .with(IncidentType::Cyber, &["Cyber", "Fraud"])
            .with(IncidentType::WomenSafety, &["Women Safety", "Mediation"])
            .with(IncidentType::PublicOrder, &["Public Order"])
            .with(IncidentType::Murder, &["Investigation", "Forensics"])
            .with(IncidentType::Traffic, &["Public Order", "Crowd Control"])
            .with(IncidentType::Predictive, &["Patrol", "Public Order", "Theft"])
    }
}
