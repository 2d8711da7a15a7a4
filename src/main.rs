use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use homestead::{
    config::SimConfig,
    registry::WorldRegistry,
    tick::{TickManager, DAY_LENGTH},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless settlement simulation runner")]
struct Cli {
    /// Path to the run configuration YAML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// World to simulate (uses the config default when omitted)
    #[arg(long)]
    world: Option<String>,

    /// Override the number of host ticks to run
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the settlement data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SimConfig::from_yaml(path)?,
        None => SimConfig::default(),
    };
    let world = cli.world.unwrap_or_else(|| config.world.clone());
    let ticks = config.ticks(cli.ticks);
    let seed = cli.seed.unwrap_or(config.seed);
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());

    let mut registry = WorldRegistry::open(&data_dir, config.autosave)?;
    // Pick the clock up where the loaded settlement left off so day
    // boundaries and contract expiry line up across sessions.
    let mut ticker = TickManager::resume(seed, registry.get_or_create(&world));
    info!(run = %config.name, %world, ticks, seed, start = ticker.now(), "starting simulation");

    for _ in 0..ticks {
        let settlement = registry.get_or_create(&world);
        let stepped = ticker.on_tick(settlement);
        if stepped && registry.autosave() && ticker.now() % DAY_LENGTH == 0 {
            registry.save(&world)?;
        }
    }

    registry.flush()?;
    let settlement = registry.get_or_create(&world);
    println!(
        "World '{}' simulated for {} ticks. Day {}, {} citizens, {} coins, {} items produced.",
        world,
        ticks,
        settlement.stats().days_played,
        settlement.citizen_count(),
        settlement.coins(),
        settlement.stats().total_items_produced,
    );
    Ok(())
}
