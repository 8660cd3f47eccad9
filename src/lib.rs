pub mod config;
pub mod engine;
pub mod population;
pub mod rng;
pub mod ticker;
pub mod web;

pub use config::{ConfigError, Scenario, ScenarioLoader};
pub use engine::{Engine, EngineSettings, Lifecycle, INFECTION_PROBABILITY};
pub use population::{HealthStatus, Population, PopulationError, PopulationSnapshot};
