use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use outbreak::{
    engine::{EngineBuilder, EngineSettings},
    params::ScenarioLoader,
    systems::{
        InfectionSystem, MarketplaceSystem, MovementSystem, ProgressionSystem, StatsSystem,
        TravelSystem,
    },
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless epidemic scenario runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/baseline.yaml")]
    scenario: PathBuf,

    /// Override the simulated day count (uses scenario default when omitted)
    #[arg(long)]
    days: Option<u32>,

    /// Override the snapshot interval in ticks (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Suppress the per-day event log
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let days = scenario.days(cli.days);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        mode: scenario.mode,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };

    let mut builder = EngineBuilder::new(settings)
        .with_system(MovementSystem::new())
        .with_system(InfectionSystem::new())
        .with_system(ProgressionSystem::new())
        .with_system(TravelSystem::new())
        .with_system(MarketplaceSystem::new())
        .with_system(StatsSystem::new());
    if !cli.quiet {
        builder = builder.on_log(|line| println!("{line}"));
    }
    let mut engine = builder.build();

    engine.initialize(&scenario.params)?;
    engine.run_days(&scenario.params, days)?;

    let counts = engine.world().counts();
    println!(
        "Scenario '{}' completed after {} days. susceptible: {}, infected: {}, removed: {}, dead: {}",
        scenario.name, days, counts.susceptible, counts.infected, counts.removed, counts.dead
    );
    Ok(())
}
