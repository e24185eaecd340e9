//! ECS components for responders and incidents, plus the route table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bevy_ecs::prelude::{Component, Entity, Resource};
use serde::{Deserialize, Serialize};

use crate::routing::RouteKind;
use crate::spatial::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderStatus {
    Available,
    Busy,
}

/// Ground units follow roads; drones fly straight to the incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderKind {
    #[default]
    Patrol,
    Drone,
}

#[derive(Debug, Clone, PartialEq, Component)]
pub struct Responder {
    pub id: String,
    pub name: String,
    pub kind: ResponderKind,
    pub status: ResponderStatus,
    pub capabilities: BTreeSet<String>,
    /// 0–100, higher is more fatigued.
    pub fatigue: f64,
    pub vehicle: String,
    pub badge: String,
    pub history: String,
}

impl Responder {
    pub fn is_available(&self) -> bool {
        self.status == ResponderStatus::Available
    }

    pub fn readiness(&self) -> f64 {
        100.0 - self.fatigue.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Position(pub Coordinate);

/// Present on a responder from the moment it is dispatched until its settle
/// delay completes.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Assignment {
    pub incident: Entity,
    pub incident_id: String,
    pub route_kind: RouteKind,
    pub dispatched_at: u64,
    pub arrived_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Theft,
    Assault,
    Cyber,
    WomenSafety,
    PublicOrder,
    Murder,
    Traffic,
    Predictive,
}

impl IncidentType {
    pub const ALL: [IncidentType; 8] = [
        IncidentType::Theft,
        IncidentType::Assault,
        IncidentType::Cyber,
        IncidentType::WomenSafety,
        IncidentType::PublicOrder,
        IncidentType::Murder,
        IncidentType::Traffic,
        IncidentType::Predictive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Theft => "Theft / Snatch",
            Self::Assault => "Violent Assault",
            Self::Cyber => "Cyber Fraud",
            Self::WomenSafety => "Women Safety",
            Self::PublicOrder => "Public Disturbance",
            Self::Murder => "Homicide",
            Self::Traffic => "Traffic Gridlock",
            Self::Predictive => "AI Prediction",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    Assigned,
    Resolved,
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Resolved => "resolved",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Component)]
pub struct Incident {
    pub id: String,
    pub kind: IncidentType,
    pub coordinate: Coordinate,
    pub location: String,
    pub description: String,
    pub priority: Priority,
    pub created_at: u64,
    pub status: IncidentStatus,
    pub assigned_responder: Option<String>,
}

impl Incident {
    pub fn is_pending(&self) -> bool {
        self.status == IncidentStatus::Pending
    }
}

/// Route geometry for one dispatched incident, kept until it resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRoute {
    pub incident_id: String,
    pub responder_id: String,
    pub kind: RouteKind,
    /// Graph nodes the route follows, empty for direct routes.
    pub nodes: Vec<String>,
    /// Polyline from the dispatch position to the incident.
    pub geometry: Vec<Coordinate>,
}

#[derive(Debug, Default, Resource)]
pub struct ActiveRoutes(pub BTreeMap<String, ActiveRoute>);
