//! Contagion System
//!
//! Immune responses, resistance buildup and agent-to-agent affliction.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Immunities, Infections};
use crate::spores::Spore;

/// Resistance gained each time an infection attempt is fought off.
const RESISTANCE_STEP: f64 = 0.01;

/// Resolve an attempt by `spore` to take hold in `person`. Whatever the
/// outcome, the spore gets its tithe opportunity against the target. Returns
/// true when the immune system fought the attempt off.
pub fn immune_response(
    world: &mut World,
    person: Entity,
    mut spore: Spore,
    rng: &mut impl Rng,
) -> bool {
    let infected = spore.infects(world, person, rng);
    spore.act(world, person, rng);

    if infected {
        // The new host joins the lineage before the spore settles in.
        spore.register(person);
        infection(world, person, spore);
    } else {
        build_resistance(world, person, &spore);
    }
    !infected
}

/// Unconditionally infect `person`: the spore is recorded and immunity to
/// its genus saturates. Used by `Spawner` and the successful-response path.
pub fn infection(world: &mut World, person: Entity, spore: Spore) {
    if let Ok(mut imm) = world.get::<&mut Immunities>(person) {
        imm.0.insert(spore.genus().to_string(), 1.0);
    }
    if let Ok(mut infections) = world.get::<&mut Infections>(person) {
        infections.0.push(spore);
    }
}

/// A fought-off attempt still leaves its mark: +0.01 immunity, capped at 1.
pub fn build_resistance(world: &mut World, person: Entity, spore: &Spore) {
    if let Ok(mut imm) = world.get::<&mut Immunities>(person) {
        let entry = imm.0.entry(spore.genus().to_string()).or_insert(0.0);
        *entry = (*entry + RESISTANCE_STEP).min(1.0);
    }
}

/// `attacker` tries to infect `target`. With no explicit spore, one of the
/// attacker's held infections is chosen uniformly and re-spawned; an
/// uninfected attacker transmits nothing. Returns true on a new infection.
pub fn afflict(
    world: &mut World,
    attacker: Entity,
    target: Entity,
    spore: Option<Spore>,
    rng: &mut impl Rng,
) -> bool {
    let spore = match spore {
        Some(spore) => spore,
        None => {
            let held = world
                .get::<&Infections>(attacker)
                .map(|i| i.len())
                .unwrap_or(0);
            if held == 0 {
                return false;
            }
            let pick = rng.gen_range(0..held);
            let carried = match world.get::<&Infections>(attacker) {
                Ok(infections) => infections.0[pick].clone(),
                Err(_) => return false,
            };
            carried.spawn(world)
        }
    };
    !immune_response(world, target, spore, rng)
}
