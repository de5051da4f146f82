pub mod engine;
pub mod grid;
pub mod params;
pub mod particle;
pub mod rng;
pub mod snapshot;
pub mod stats;
pub mod systems;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings, System, SystemContext, TickSummary};
pub use params::{Mode, Scenario, ScenarioLoader, SimParams};
pub use stats::DailyCounts;
