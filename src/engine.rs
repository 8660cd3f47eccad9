//! Infection engine: tick lifecycle plus the 1-D neighborhood spread rule

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::population::{HealthStatus, Population, PopulationError, PopulationSnapshot};
use crate::rng::{InfectionRng, SeededRng};
use crate::ticker::Ticker;

/// Probability that one (sick source, healthy neighbor) evaluation infects.
/// A healthy cell in range of k sick sources is evaluated k times, so its
/// per-tick infection probability compounds to 1 - 0.5^k.
pub const INFECTION_PROBABILITY: f64 = 0.5;

const EVENT_CHANNEL_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub group_size: usize,
    pub infection_factor: usize,
    pub interval: Duration,
    pub seed: u64,
}

struct Core {
    population: Population,
    rng: Box<dyn InfectionRng>,
}

struct LifecycleState {
    phase: Lifecycle,
    ticker: Option<Ticker>,
}

/// Owns the population, the tick scheduler, and the spread rule. All methods
/// take `&self`; the population sits behind one mutex so a manual toggle
/// either fully precedes or fully follows a tick's read-compute-replace.
pub struct Engine {
    settings: EngineSettings,
    core: Arc<Mutex<Core>>,
    lifecycle: Mutex<LifecycleState>,
    events: broadcast::Sender<PopulationSnapshot>,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        let rng = SeededRng::new(settings.seed);
        Self::with_rng(settings, rng)
    }

    /// Construction with an explicit random source, used by tests to force
    /// always-infect or never-infect outcomes.
    pub fn with_rng(settings: EngineSettings, rng: impl InfectionRng + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            core: Arc::new(Mutex::new(Core {
                population: Population::new(settings.group_size),
                rng: Box::new(rng),
            })),
            lifecycle: Mutex::new(LifecycleState {
                phase: Lifecycle::Idle,
                ticker: None,
            }),
            settings,
            events,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.lock().expect("lifecycle lock poisoned").phase
    }

    /// Begins issuing one step per interval. No-op unless the engine is Idle;
    /// restart after `stop` is intentionally not supported.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if lifecycle.phase != Lifecycle::Idle {
            debug!("start ignored in state {:?}", lifecycle.phase);
            return;
        }
        let core = Arc::clone(&self.core);
        let events = self.events.clone();
        let radius = self.settings.infection_factor;
        let ticker = Ticker::spawn(self.settings.interval, move || {
            run_step(&core, radius, &events);
        });
        lifecycle.ticker = Some(ticker);
        lifecycle.phase = Lifecycle::Running;
        info!(
            "engine started: group_size={} infection_factor={} interval={:?}",
            self.settings.group_size, self.settings.infection_factor, self.settings.interval
        );
    }

    /// Cancels the periodic tick; no further step runs after this returns.
    /// Idempotent, and a no-op when the engine never started.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if lifecycle.phase != Lifecycle::Running {
            return;
        }
        if let Some(mut ticker) = lifecycle.ticker.take() {
            ticker.cancel();
        }
        lifecycle.phase = Lifecycle::Stopped;
        info!("engine stopped");
    }

    /// Manual edit; allowed in every lifecycle state. Out-of-range indices
    /// surface as errors rather than being swallowed.
    pub fn toggle(&self, index: usize) -> Result<HealthStatus, PopulationError> {
        let snapshot;
        let status;
        {
            let mut core = self.core.lock().expect("population lock poisoned");
            status = core.population.toggle(index)?;
            snapshot = core.population.snapshot();
        }
        let _ = self.events.send(snapshot);
        Ok(status)
    }

    /// Advances one generation immediately, outside the timer. Used by the
    /// headless runner and by tests.
    pub fn step(&self) -> PopulationSnapshot {
        run_step(&self.core, self.settings.infection_factor, &self.events)
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        self.core
            .lock()
            .expect("population lock poisoned")
            .population
            .snapshot()
    }

    pub fn counts(&self) -> (usize, usize) {
        self.core
            .lock()
            .expect("population lock poisoned")
            .population
            .counts()
    }

    /// Every step and every toggle publishes a fresh snapshot here.
    pub fn subscribe(&self) -> broadcast::Receiver<PopulationSnapshot> {
        self.events.subscribe()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One tick: read the current generation, compute the next, swap it in, and
/// publish. The lock is held for the whole read-compute-replace sequence.
fn run_step(
    core: &Mutex<Core>,
    radius: usize,
    events: &broadcast::Sender<PopulationSnapshot>,
) -> PopulationSnapshot {
    let snapshot;
    {
        let mut core = core.lock().expect("population lock poisoned");
        let Core { population, rng } = &mut *core;
        let next = next_generation(population.cells(), radius, rng.as_mut());
        population
            .replace(next)
            .expect("next generation preserves length");
        snapshot = population.snapshot();
    }
    let _ = events.send(snapshot.clone());
    snapshot
}

/// The spread rule. All infection decisions read the pre-tick generation, so
/// a cell infected during this tick cannot infect others until the next one.
/// Sick cells never revert here; only a manual toggle heals.
fn next_generation(
    current: &[HealthStatus],
    radius: usize,
    rng: &mut dyn InfectionRng,
) -> Vec<HealthStatus> {
    let mut next = current.to_vec();
    for (index, status) in current.iter().enumerate() {
        if !status.is_sick() {
            continue;
        }
        let lo = index.saturating_sub(radius);
        let hi = index.saturating_add(radius).min(current.len() - 1);
        for neighbor in lo..=hi {
            if current[neighbor].is_sick() {
                continue;
            }
            if rng.draw() <= INFECTION_PROBABILITY {
                next[neighbor] = HealthStatus::Sick;
            }
        }
    }
    next
}
