//! City definitions: road network, responder roster and scenario templates.

use serde::{Deserialize, Serialize};

use crate::ecs::{IncidentType, Priority, Responder, ResponderKind, ResponderStatus};
use crate::error::{EngineError, EngineResult};
use crate::network::{CurveDefinition, NetworkDefinition, RoadNode};
use crate::scoring::CapabilityTable;
use crate::spatial::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: ResponderKind,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub fatigue: f64,
    #[serde(default)]
    pub vehicle: String,
    #[serde(default)]
    pub badge: String,
    #[serde(default)]
    pub history: String,
    pub position: Coordinate,
}

impl ResponderSpec {
    pub fn to_component(&self) -> Responder {
        Responder {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            status: ResponderStatus::Available,
            capabilities: self.capabilities.iter().cloned().collect(),
            fatigue: self.fatigue.clamp(0.0, 100.0),
            vehicle: self.vehicle.clone(),
            badge: self.badge.clone(),
            history: self.history.clone(),
        }
    }
}

/// One entry of the rotating incident table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    pub kind: IncidentType,
    pub location: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub description: String,
    /// Lines logged when the incident is detected.
    #[serde(default)]
    pub narrative: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDefinition {
    pub name: String,
    pub network: NetworkDefinition,
    pub responders: Vec<ResponderSpec>,
    pub scenarios: Vec<ScenarioTemplate>,
    #[serde(default)]
    pub capabilities: CapabilityTable,
}

impl Default for CityDefinition {
    fn default() -> Self {
        Self::koramangala()
    }
}

impl CityDefinition {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| EngineError::Configuration(format!("invalid city definition: {err}")))
    }

    /// Checks that do not need the built network.
    pub fn validate(&self) -> EngineResult<()> {
        if self.scenarios.is_empty() {
            return Err(EngineError::Configuration(format!(
                "city {} has no scenario templates",
                self.name
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for responder in &self.responders {
            if !seen.insert(responder.id.as_str()) {
                return Err(EngineError::Configuration(format!(
                    "duplicate responder id {}",
                    responder.id
                )));
            }
        }
        Ok(())
    }

    /// Koramangala / Madiwala, Bangalore: 13 intersections, 11 roads. Check
    /// Post, Wipro Park, 80ft Road and Jyoti Nivas have no roads, so routes
    /// that snap to them fall back to a direct line.
    pub fn koramangala() -> Self {
        let nodes = vec![
            RoadNode::new("SonySignal", "Sony World Signal", 12.9450, 77.6250),
            RoadNode::new("ChristUniv", "Christ University", 12.9360, 77.6050),
            RoadNode::new("MadiwalaMkt", "Madiwala Market", 12.9220, 77.6180),
            RoadNode::new("Koramangala5th", "Koramangala 5th Block", 12.9340, 77.6200),
            RoadNode::new("ForumMall", "Forum Mall", 12.9350, 77.6100),
            RoadNode::new("StJohns", "St. Johns Signal", 12.9300, 77.6200),
            RoadNode::new("DairyCircle", "Dairy Circle", 12.9380, 77.6000),
            RoadNode::new("BTMJunction", "BTM Junction", 12.9150, 77.6100),
            RoadNode::new("Indiranagar100ft", "Indiranagar 100ft", 12.9600, 77.6400),
            RoadNode::new("WiproPark", "Wipro Park", 12.9320, 77.6300),
            RoadNode::new("Koramangala80ft", "80ft Road", 12.9400, 77.6200),
            RoadNode::new("JyotiNivas", "Jyoti Nivas College", 12.9330, 77.6150),
            RoadNode::new("CheckPost", "Check Post", 12.9250, 77.6250),
        ];

        let edges = [
            ("SonySignal", "StJohns"),
            ("SonySignal", "Indiranagar100ft"),
            ("ChristUniv", "StJohns"),
            ("ChristUniv", "DairyCircle"),
            ("ChristUniv", "BTMJunction"),
            ("MadiwalaMkt", "StJohns"),
            ("MadiwalaMkt", "BTMJunction"),
            ("Koramangala5th", "StJohns"),
            ("Koramangala5th", "ForumMall"),
            ("DairyCircle", "ForumMall"),
            ("StJohns", "Indiranagar100ft"),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

        let curve = |from: &str, to: &str, points: &[(f64, f64)]| CurveDefinition {
            from: from.to_string(),
            to: to.to_string(),
            points: points.iter().copied().map(Coordinate::from).collect(),
            both_directions: true,
        };
        let curves = vec![
            curve("SonySignal", "StJohns", &[(12.9400, 77.6240), (12.9350, 77.6230)]),
            curve(
                "SonySignal",
                "Indiranagar100ft",
                &[(12.9500, 77.6300), (12.9550, 77.6350)],
            ),
            curve("MadiwalaMkt", "StJohns", &[(12.9250, 77.6190)]),
        ];

        let officer = |id: &str,
                       name: &str,
                       badge: &str,
                       skills: &[&str],
                       fatigue: f64,
                       at: (f64, f64),
                       vehicle: &str,
                       history: &str| ResponderSpec {
            id: id.to_string(),
            name: name.to_string(),
            kind: ResponderKind::Patrol,
            capabilities: skills.iter().map(|s| s.to_string()).collect(),
            fatigue,
            vehicle: vehicle.to_string(),
            badge: badge.to_string(),
            history: history.to_string(),
            position: Coordinate::from(at),
        };
        let responders = vec![
            officer(
                "o1",
                "ASI Rajesh Kumar",
                "KA-05-221",
                &["Public Order", "Mediation"],
                12.0,
                (12.935, 77.624),
                "Hoysala",
                "12 Years Service, 94% Clearance Rate",
            ),
            officer(
                "o2",
                "HC Suresh Menon",
                "KA-05-119",
                &["Traffic", "Pursuit"],
                45.0,
                (12.940, 77.610),
                "Cheetah",
                "8 Years Service, 88% Clearance Rate",
            ),
            officer(
                "o3",
                "WPC Lakshmi N",
                "KA-05-441",
                &["Women Safety", "Counseling"],
                5.0,
                (12.936, 77.605),
                "Pink Hoysala",
                "4 Years Service, 98% Clearance Rate",
            ),
            officer(
                "o4",
                "PC Arun Gowda",
                "KA-05-334",
                &["Public Order", "Crowd Control"],
                80.0,
                (12.925, 77.620),
                "Cheetah",
                "5 Years Service, 85% Clearance Rate",
            ),
            officer(
                "o5",
                "PSI Anjali Reddy",
                "KA-05-990",
                &["Narcotics", "Investigation"],
                30.0,
                (12.942, 77.618),
                "Hoysala",
                "10 Years Service, 96% Clearance Rate",
            ),
        ];

        let scenarios = vec![
            ScenarioTemplate {
                kind: IncidentType::Theft,
                location: "SG Palya Main Road".to_string(),
                coordinate: Coordinate::new(12.9352, 77.6093),
                priority: Priority::High,
                description: "Two wheeler snatch & grab reported near Christ University Gate 1."
                    .to_string(),
                narrative: vec![
                    "INCOMING CALL: +91-98XXX-XXXX (Tower: SG Palya)".to_string(),
                    "Voice-to-Text Active... Transcribing...".to_string(),
                    "Keyword Detected: 'Snatch', 'Bike', 'Help'".to_string(),
                ],
            },
            ScenarioTemplate {
                kind: IncidentType::Predictive,
                location: "Sony Signal Junction".to_string(),
                coordinate: Coordinate::new(12.9400, 77.6240),
                priority: Priority::Medium,
                description: "Forecast: traffic deadlock likely to escalate into public disorder."
                    .to_string(),
                narrative: vec![
                    "Predictive Model Alert: Crowd Density Critical > 85%".to_string(),
                    "Correlation: Weather (Rain) + Traffic (High) -> Risk of Public Disorder"
                        .to_string(),
                ],
            },
            ScenarioTemplate {
                kind: IncidentType::Assault,
                location: "Madiwala Market".to_string(),
                coordinate: Coordinate::new(12.9250, 77.6190),
                priority: Priority::Critical,
                description: "Officer requesting immediate backup. Active altercation in progress."
                    .to_string(),
                narrative: vec![
                    "RADIO SIGNAL: Unit KA-05-334 Requesting Assist".to_string(),
                    "Signal Triangulation: Madiwala Market".to_string(),
                ],
            },
        ];

        Self {
            name: "Koramangala".to_string(),
            network: NetworkDefinition {
                nodes,
                edges,
                curves,
            },
            responders,
            scenarios,
            capabilities: CapabilityTable::default(),
        }
    }
}
