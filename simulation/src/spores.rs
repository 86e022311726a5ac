//! Spores: the contagion packets, their lineage chains and the tithe economy.
//!
//! A chain entry is a bare `hecs::Entity` handle. Handles are generation
//! tagged, so once an ancestor is despawned its entry can never resolve
//! again; every read checks liveness with `World::contains` instead of
//! relying on removal hooks. Entry 0 is always the original author while the
//! author lives.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Energy, Immunities};

/// Maximum chain length: the author plus the six most recent carriers.
const CHAIN_LIMIT: usize = 7;

/// Probability that holding or receiving a spore triggers a tithe.
const TITHE_CHANCE: f64 = 0.05;

/// Energy a tithing agent pays out.
const TITHE_COST: i64 = 20;

/// Tithing only happens above this energy level.
const TITHE_FLOOR: i64 = 100;

/// The author's base cut; one unit per living intermediate carrier is
/// diverted to that carrier instead.
const AUTHOR_BASE_CUT: i64 = 14;

/// One packet of contagion. Cheap to clone; a spore is owned only by the
/// agents holding it in their infections, and is garbage when unreferenced.
#[derive(Debug, Clone, PartialEq)]
pub struct Spore {
    genus: String,
    virulence: f64,
    chain: Vec<Entity>,
}

impl Spore {
    pub fn new(
        genus: impl Into<String>,
        virulence: f64,
        chain: Vec<Entity>,
        world: &World,
    ) -> Self {
        Self {
            genus: genus.into(),
            virulence,
            chain: prep_chain(chain, world),
        }
    }

    pub fn genus(&self) -> &str {
        &self.genus
    }

    pub fn virulence(&self) -> f64 {
        self.virulence
    }

    pub fn chain(&self) -> &[Entity] {
        &self.chain
    }

    /// Append `person` to the lineage chain. No pruning happens here; reads
    /// treat dead entries as absent.
    pub fn register(&mut self, person: Entity) {
        self.chain.push(person);
    }

    /// A fresh spore of the same genus carrying this spore's (re-prepped)
    /// chain. Used for transmission copies and for cloned agents.
    pub fn spawn(&self, world: &World) -> Spore {
        Spore::new(self.genus.clone(), self.virulence, self.chain.clone(), world)
    }

    /// Would this spore take hold in `person`? One uniform draw against
    /// `susceptibility * virulence`; zero susceptibility fails outright
    /// without consuming randomness.
    pub fn infects(&self, world: &World, person: Entity, rng: &mut impl Rng) -> bool {
        let suscept = world
            .get::<&Immunities>(person)
            .map(|imm| imm.susceptibility_to(&self.genus))
            .unwrap_or(0.0);
        if suscept == 0.0 {
            return false;
        }
        rng.gen::<f64>() <= suscept * self.virulence
    }

    /// The tithe: occasionally an agent carrying wealth pays 20 energy back
    /// along this spore's lineage. Every living intermediate carrier, newest
    /// first, collects 1; the author collects `14 + (6 - living)`, so direct
    /// transmission pays the source best. Aborts without effect when the
    /// payer is poor or the author is gone.
    pub fn act(&self, world: &mut World, person: Entity, rng: &mut impl Rng) {
        if rng.gen::<f64>() > TITHE_CHANCE {
            return;
        }
        let Some(&author) = self.chain.first() else {
            return;
        };

        {
            let Ok(energy) = world.get::<&Energy>(person) else {
                return;
            };
            if energy.foods <= TITHE_FLOOR {
                return;
            }
        }
        if !world.contains(author) {
            return;
        }

        if let Ok(mut energy) = world.get::<&mut Energy>(person) {
            energy.foods -= TITHE_COST;
        }

        let mut living = 0i64;
        for &ancestor in self.chain.iter().skip(1).rev().take(CHAIN_LIMIT - 1) {
            if let Ok(mut energy) = world.get::<&mut Energy>(ancestor) {
                energy.foods += 1;
                living += 1;
            }
        }
        if let Ok(mut energy) = world.get::<&mut Energy>(author) {
            energy.foods += AUTHOR_BASE_CUT + (CHAIN_LIMIT as i64 - 1 - living);
        }
    }
}

/// Drop dead chain entries, then bound the result to the author plus the six
/// most recent carriers.
fn prep_chain(chain: Vec<Entity>, world: &World) -> Vec<Entity> {
    let mut chain: Vec<Entity> = chain.into_iter().filter(|&e| world.contains(e)).collect();
    if chain.len() > CHAIN_LIMIT {
        let tail = chain.split_off(chain.len() - (CHAIN_LIMIT - 1));
        chain.truncate(1);
        chain.extend(tail);
    }
    chain
}

/// Origin point of a genus: binds the genus name, its author and the spore
/// configuration. Construction unconditionally infects the author with a
/// spore whose chain is just `[author]`.
#[derive(Debug, Clone)]
pub struct Spawner {
    genus: String,
    author: Entity,
    virulence: f64,
}

impl Spawner {
    pub fn new(
        world: &mut World,
        genus: impl Into<String>,
        author: Entity,
        virulence: f64,
    ) -> Self {
        let spawner = Self {
            genus: genus.into(),
            author,
            virulence,
        };
        let spore = spawner.spawn(world);
        crate::systems::contagion::infection(world, author, spore);
        spawner
    }

    pub fn genus(&self) -> &str {
        &self.genus
    }

    pub fn author(&self) -> Entity {
        self.author
    }

    /// A new spore of this genus rooted at the author.
    pub fn spawn(&self, world: &World) -> Spore {
        Spore::new(self.genus.clone(), self.virulence, vec![self.author], world)
    }
}
