use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::debug;

use virosim::{
    engine::Engine,
    web::{self, WebServerConfig},
    Scenario, ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "1-D epidemic spread simulator")]
struct Cli {
    /// Path to a scenario YAML file (flags below are ignored when given)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Population size
    #[arg(long, default_value_t = 50)]
    population: usize,

    /// Infection radius: a sick individual reaches this many neighbors on
    /// each side per tick
    #[arg(long, default_value_t = 1)]
    infection_factor: usize,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 1_000)]
    interval_ms: u64,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Indices that start out sick, e.g. --sick 3,17
    #[arg(long, value_delimiter = ',')]
    sick: Vec<usize>,

    /// Number of ticks for a headless run (scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Serve the interactive web UI instead of running headless
    #[arg(long)]
    serve: bool,

    /// Listen host for --serve
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Listen port for --serve
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Cli {
    fn scenario(&self) -> Result<Scenario> {
        if let Some(path) = &self.scenario {
            let loader = ScenarioLoader::new(".");
            return loader.load(path);
        }
        let scenario = Scenario {
            name: "cli".into(),
            description: None,
            seed: self.seed,
            group_size: self.population,
            infection_factor: self.infection_factor,
            interval_ms: self.interval_ms,
            ticks: None,
            initial_sick: self.sick.clone(),
        };
        scenario.validate()?;
        Ok(scenario)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let scenario = cli.scenario()?;

    if cli.serve {
        let config = WebServerConfig {
            scenario,
            host: cli.host.clone(),
            port: cli.port,
        };
        return tokio::runtime::Runtime::new()?.block_on(web::run(config));
    }

    let ticks = scenario.ticks(cli.ticks);
    let engine = Engine::new(scenario.engine_settings());
    for &index in &scenario.initial_sick {
        engine.toggle(index)?;
    }

    for tick in 1..=ticks {
        let snapshot = engine.step();
        debug!("tick {tick}: version {}", snapshot.version);
        println!(
            "tick {:>4}: healthy {:>6} sick {:>6}",
            tick, snapshot.healthy, snapshot.sick
        );
    }

    let (healthy, sick) = engine.counts();
    println!(
        "Scenario '{}' completed for {} ticks. Healthy: {}, sick: {}",
        scenario.name, ticks, healthy, sick
    );
    Ok(())
}
