//! Simulation World - main orchestrator.
//!
//! Owns the ECS world, the grid and the RNG, and drives one tick at a time.
//! A Presenter only ever reads the snapshot surface (`cell`, `view`,
//! `stats`) between `step()` calls.

use hecs::{Entity, World};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::components::{npc_bundle, Immunities, Infections};
use crate::config::SimConfig;
use crate::space::{Space, SpaceError};
use crate::systems::{self, TurnOutcome};

/// Point-in-time census of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub population: usize,
    /// Fraction of agents holding at least one infection.
    pub infected: f64,
    /// Fraction of uninfected agents with saturated immunity to the tracked
    /// genus.
    pub immune: f64,
    /// Food currently stored across the grid.
    pub food: u64,
}

/// What a Presenter needs to paint one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub occupants: usize,
    /// Any occupant of this cell carries an infection.
    pub infected: bool,
    pub food: bool,
}

pub struct SimulationWorld {
    pub world: World,
    pub space: Space,
    rng: SmallRng,
    ticks: u64,
}

impl SimulationWorld {
    pub fn new(config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            world: World::new(),
            space: Space::new(config.dimension, config.food_growth_rate),
            rng,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn population(&self) -> usize {
        self.space.population()
    }

    /// Spawn one fresh agent at `(x, y)`.
    pub fn spawn_npc(&mut self, x: i64, y: i64) -> Result<Entity, SpaceError> {
        let npc = self.world.spawn(npc_bundle());
        self.space.enter(x, y, npc)?;
        Ok(npc)
    }

    /// Seed `count` agents at uniformly random cells.
    pub fn seed_population(&mut self, count: usize) -> Result<Vec<Entity>, SpaceError> {
        let dim = self.space.dimension();
        let mut seeded = Vec::with_capacity(count);
        for _ in 0..count {
            let x = self.rng.gen_range(0..dim);
            let y = self.rng.gen_range(0..dim);
            seeded.push(self.spawn_npc(x, y)?);
        }
        debug!(count, "population seeded");
        Ok(seeded)
    }

    /// Pre-run food growth without advancing the tick counter.
    pub fn warm_up(&mut self, passes: u32) {
        for _ in 0..passes {
            self.space.generate(&mut self.rng);
        }
    }

    /// Apply one full tick: snapshot the live agents, run each program in
    /// snapshot order (births this tick are excluded), reap the starved,
    /// then regenerate food once. Grid-index corruption propagates uncaught.
    pub fn step(&mut self) -> Result<(), SpaceError> {
        let snapshot = self.space.people();
        for person in snapshot {
            match systems::program(&mut self.world, &mut self.space, person, &mut self.rng)? {
                TurnOutcome::Survived => {}
                TurnOutcome::Starved => {
                    self.space.leave(person)?;
                    let _ = self.world.despawn(person);
                    debug!(?person, tick = self.ticks, "agent starved");
                }
            }
        }
        self.space.generate(&mut self.rng);
        self.ticks += 1;
        Ok(())
    }

    /// Census the grid. `genus` selects which immunity the immune fraction
    /// tracks; with nobody on the grid both fractions are defined as 0.
    pub fn stats(&mut self, genus: &str) -> Stats {
        let people = self.space.people();
        let population = people.len();
        let mut infected = 0usize;
        let mut immune = 0usize;
        for &person in &people {
            let has_infections = self
                .world
                .get::<&Infections>(person)
                .map(|i| !i.is_empty())
                .unwrap_or(false);
            if has_infections {
                infected += 1;
            } else if self
                .world
                .get::<&Immunities>(person)
                .map(|imm| imm.immune_to(genus))
                .unwrap_or(false)
            {
                immune += 1;
            }
        }

        let fraction = |n: usize| {
            if population == 0 {
                0.0
            } else {
                n as f64 / population as f64
            }
        };
        Stats {
            population,
            infected: fraction(infected),
            immune: fraction(immune),
            food: self.space.total_food(),
        }
    }

    /// Read-only view of one cell, wrapped onto the torus.
    pub fn cell(&self, x: i64, y: i64) -> CellView {
        let Some(location) = self.space.get(x, y) else {
            return CellView {
                occupants: 0,
                infected: false,
                food: false,
            };
        };
        let infected = location.occupants().iter().any(|&person| {
            self.world
                .get::<&Infections>(person)
                .map(|i| !i.is_empty())
                .unwrap_or(false)
        });
        CellView {
            occupants: location.occupants().len(),
            infected,
            food: location.has_food(),
        }
    }

    /// Row-major views of the `width` x `height` sub-rectangle anchored at
    /// `(x0, y0)`. The Presenter owns viewport and scrolling state.
    pub fn view(&self, x0: i64, y0: i64, width: i64, height: i64) -> Vec<CellView> {
        let mut cells = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
        for dy in 0..height {
            for dx in 0..width {
                cells.push(self.cell(x0 + dx, y0 + dy));
            }
        }
        cells
    }
}
