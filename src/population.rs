//! Per-individual health state for the simulated group

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Sick,
}

impl HealthStatus {
    pub fn is_sick(self) -> bool {
        matches!(self, HealthStatus::Sick)
    }

    pub fn flipped(self) -> Self {
        match self {
            HealthStatus::Healthy => HealthStatus::Sick,
            HealthStatus::Sick => HealthStatus::Healthy,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PopulationError {
    #[error("index {index} out of range for population of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("replacement length {actual} does not match population length {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Fixed-size sequence of health flags. The length is set at construction and
/// never changes; `version` increments on every successful mutation so
/// observers can detect change without diffing the cells.
pub struct Population {
    cells: Vec<HealthStatus>,
    version: u64,
}

impl Population {
    /// All individuals start healthy.
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![HealthStatus::Healthy; size],
            version: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[HealthStatus] {
        &self.cells
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, index: usize) -> Result<HealthStatus, PopulationError> {
        self.cells
            .get(index)
            .copied()
            .ok_or(PopulationError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            })
    }

    /// Flips the status at `index` in place and returns the new status.
    pub fn toggle(&mut self, index: usize) -> Result<HealthStatus, PopulationError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(PopulationError::IndexOutOfRange { index, len })?;
        *cell = cell.flipped();
        self.version += 1;
        Ok(*cell)
    }

    /// Swaps in a precomputed next generation. Readers only ever observe the
    /// fully-previous or fully-next array.
    pub fn replace(&mut self, next: Vec<HealthStatus>) -> Result<(), PopulationError> {
        if next.len() != self.cells.len() {
            return Err(PopulationError::LengthMismatch {
                expected: self.cells.len(),
                actual: next.len(),
            });
        }
        self.cells = next;
        self.version += 1;
        Ok(())
    }

    /// Recomputed on every call; no stored counters to drift out of sync with
    /// concurrent toggles and replaces.
    pub fn counts(&self) -> (usize, usize) {
        let sick = self.cells.iter().filter(|c| c.is_sick()).count();
        (self.cells.len() - sick, sick)
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        let (healthy, sick) = self.counts();
        PopulationSnapshot {
            version: self.version,
            healthy,
            sick,
            cells: self.cells.clone(),
        }
    }
}

/// Point-in-time copy published to observers after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationSnapshot {
    pub version: u64,
    pub healthy: usize,
    pub sick: usize,
    pub cells: Vec<HealthStatus>,
}
