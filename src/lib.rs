pub mod agents;
pub mod config;
pub mod engine;
pub mod scenario;
pub mod simulation;

pub use config::SimulationConfig;
pub use engine::{EmergencyPhase, EngineError, SimulationEngine};
pub use simulation::StateSnapshot;
