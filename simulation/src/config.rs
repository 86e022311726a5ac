//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Tunable parameters for a run. Defaults mirror the classic scenario: a
/// 50x50 torus, 30 food drops per tick, 60 agents and one "cats" lineage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Width and height of the toroidal grid.
    pub dimension: i64,
    /// Food units dropped by each `generate()` pass.
    pub food_growth_rate: u32,
    /// Agents seeded at startup.
    pub initial_population: usize,
    /// Genus name of the seeded contagion; also the genus tracked by stats.
    pub genus: String,
    /// Transmission probability weight of the seeded contagion.
    pub virulence: f64,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dimension: 50,
            food_growth_rate: 30,
            initial_population: 60,
            genus: "cats".to_string(),
            virulence: 0.05,
            seed: None,
        }
    }
}
