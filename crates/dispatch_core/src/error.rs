//! Engine error types.
//!
//! [`EngineError::Configuration`] is the only fatal kind: it is raised while
//! building the road network or the engine and prevents the engine from
//! starting. The other kinds abort a single operation; systems log them to
//! the narrative stream and carry on.

use thiserror::Error;

/// Errors produced by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("no available responder for incident {incident}")]
    NoAvailableResponder { incident: String },
}

impl EngineError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Node,
            id: id.into(),
        }
    }

    pub fn responder_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Responder,
            id: id.into(),
        }
    }

    pub fn incident_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Incident,
            id: id.into(),
        }
    }

    /// Only configuration errors are fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// What an id in [`EngineError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Responder,
    Incident,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Node => "node",
            Self::Responder => "responder",
            Self::Incident => "incident",
        };
        f.write_str(label)
    }
}

/// Shorthand result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a manual dispatch request was refused. The `Display` text is the
/// reason string handed back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchRejection {
    #[error("unknown responder {0}")]
    UnknownResponder(String),

    #[error("unknown incident {0}")]
    UnknownIncident(String),

    #[error("responder {0} is busy")]
    ResponderBusy(String),

    #[error("incident {id} is {status}, only pending incidents can be dispatched")]
    IncidentNotPending { id: String, status: String },

    #[error("route planning failed: {0}")]
    RouteFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity_kind() {
        let err = EngineError::node_not_found("Z");
        assert_eq!(err.to_string(), "node Z not found");
        assert!(!err.is_fatal());
        assert!(EngineError::Configuration("empty".into()).is_fatal());
    }

    #[test]
    fn rejection_reason_is_human_readable() {
        let rejection = DispatchRejection::IncidentNotPending {
            id: "INC-0001".into(),
            status: "assigned".into(),
        };
        assert_eq!(
            rejection.to_string(),
            "incident INC-0001 is assigned, only pending incidents can be dispatched"
        );
    }
}
