//! Scenario configuration
//!
//! Scenarios describe one simulation run: group size, infection radius, tick
//! interval, seed, and which individuals start out sick. Unparsable input is
//! rejected up front instead of being coerced to zero; degenerate sizes
//! (empty group, zero radius) are valid no-op simulations, not errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::engine::EngineSettings;

fn default_seed() -> u64 {
    42
}

fn default_interval_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub group_size: usize,
    #[serde(default)]
    pub infection_factor: usize,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub initial_sick: Vec<usize>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tick interval must be positive")]
    ZeroInterval,
    #[error("initial_sick index {index} out of range for group of {group_size}")]
    SeedIndexOutOfRange { index: usize, group_size: usize },
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        for &index in &self.initial_sick {
            if index >= self.group_size {
                return Err(ConfigError::SeedIndexOutOfRange {
                    index,
                    group_size: self.group_size,
                });
            }
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            group_size: self.group_size,
            infection_factor: self.infection_factor,
            interval: Duration::from_millis(self.interval_ms),
            seed: self.seed,
        }
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}
