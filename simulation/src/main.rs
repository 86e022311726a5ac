//! Sporeworld headless driver.
//!
//! Stands in for a Presenter: seeds the classic scenario, steps the engine
//! until the contagion either dies out or saturates, and logs the census.

use anyhow::Result;
use simulation::{SimConfig, SimulationWorld, Spawner};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Stop once the infected fraction falls below this.
const EXTINCTION_THRESHOLD: f64 = 0.008;

/// Hard cap on simulated ticks.
const MAX_TICKS: u64 = 10_000;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SimConfig::default();
    info!(
        "Sporeworld starting: {0}x{0} grid, {1} agents, genus \"{2}\" at virulence {3}",
        config.dimension, config.initial_population, config.genus, config.virulence
    );

    let mut sim = SimulationWorld::new(&config);
    let seeded = sim.seed_population(config.initial_population)?;
    if let Some(&author) = seeded.first() {
        Spawner::new(&mut sim.world, config.genus.clone(), author, config.virulence);
    }
    sim.warm_up(3);

    let start = std::time::Instant::now();
    let mut last = sim.stats(&config.genus);
    for _ in 0..MAX_TICKS {
        sim.step()?;
        last = sim.stats(&config.genus);

        if sim.ticks() % 100 == 0 {
            info!(
                "tick {:>5}: population {}, infected {:.2}, immune {:.2}, food {}",
                sim.ticks(),
                last.population,
                last.infected,
                last.immune,
                last.food
            );
        }
        if last.infected < EXTINCTION_THRESHOLD {
            info!(tick = sim.ticks(), "contagion died out");
            break;
        }
        if last.infected + last.immune >= 1.0 {
            info!(tick = sim.ticks(), "contagion saturated the population");
            break;
        }
    }

    let elapsed = start.elapsed();
    info!(
        "Run complete: {} ticks in {:?}, final population {}, total calories {}",
        sim.ticks(),
        elapsed,
        last.population,
        sim.space.total_calories()
    );
    println!("{}", serde_json::to_string(&last)?);

    Ok(())
}
