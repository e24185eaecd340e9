pub mod animation;
pub mod clock;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod narrative;
pub mod network;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod scoring;
pub mod spatial;
pub mod systems;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use engine::{DispatchEngine, IncidentReport};
pub use error::{DispatchRejection, EngineError, EngineResult};
