//! NPC System
//!
//! The fixed per-turn program for one live agent: forage, starve check,
//! self-tithe, afflict a neighbour, then either wander or reproduce.

use hecs::{Entity, World};
use rand::Rng;
use tracing::trace;

use crate::components::{Energy, Infections};
use crate::space::{Space, SpaceError};
use crate::spores::Spore;
use crate::systems::{contagion, reproduce};

/// How far an agent scans for someone to afflict.
const AFFLICT_RANGE: i64 = 2;

/// How far a hungry agent scans for food before wandering blind.
const FOOD_SCAN_RANGE: i64 = 1;

/// The eight unit deltas an aimless wander chooses from.
const DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// How one agent's turn ended. Starvation is an expected outcome, not an
/// error; the engine reaps the starved agent after the program returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Survived,
    Starved,
}

/// Run one agent's turn. Only grid-index corruption surfaces as an error.
pub fn program(
    world: &mut World,
    space: &mut Space,
    person: Entity,
    rng: &mut impl Rng,
) -> Result<TurnOutcome, SpaceError> {
    // Try to eat some food.
    let food = space.forage(person)?;
    let foods = {
        let mut energy = world
            .get::<&mut Energy>(person)
            .map_err(|_| SpaceError::NotTracked(person))?;
        energy.foods += food as i64;
        energy.foods
    };
    if foods <= 0 {
        return Ok(TurnOutcome::Starved);
    }

    // Maybe we tithe to some worthy cause.
    if let Some(spore) = pick_infection(world, person, rng) {
        spore.act(world, person, rng);
    }

    // Try to afflict one nearby person.
    let neighbours = space.neighbours(person, AFFLICT_RANGE)?;
    if !neighbours.is_empty() {
        let target = neighbours[rng.gen_range(0..neighbours.len())];
        contagion::afflict(world, person, target, None, rng);
    }

    if food == 0 {
        // Nothing to eat here; wander towards food if any is in sight.
        wander(world, space, person, rng)?;
    } else if let Some(child) = reproduce::reproduce(world, person) {
        space.new_life(person, child)?;
        trace!(?person, ?child, "agent cloned");
    }

    Ok(TurnOutcome::Survived)
}

/// One uniformly chosen held infection, cloned out so the borrow on the
/// holder's component list is released before it acts on the world.
fn pick_infection(world: &World, person: Entity, rng: &mut impl Rng) -> Option<Spore> {
    let infections = world.get::<&Infections>(person).ok()?;
    if infections.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..infections.len());
    Some(infections.0[pick].clone())
}

/// Move one step, paying the distance cost.
fn wander(
    world: &mut World,
    space: &mut Space,
    person: Entity,
    rng: &mut impl Rng,
) -> Result<(), SpaceError> {
    let (dx, dy) = which_way(space, person, rng)?;
    let cost = space.move_by(dx, dy, person)?;
    if let Ok(mut energy) = world.get::<&mut Energy>(person) {
        energy.foods -= cost;
    }
    Ok(())
}

/// Pick a direction of travel: uniformly among offsets to visible food, or
/// uniformly among the eight unit deltas when nothing is in sight.
fn which_way(
    space: &Space,
    person: Entity,
    rng: &mut impl Rng,
) -> Result<(i64, i64), SpaceError> {
    let nearby = space.nearby_foods(person, FOOD_SCAN_RANGE)?;
    Ok(if nearby.is_empty() {
        DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())]
    } else {
        nearby[rng.gen_range(0..nearby.len())]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{npc_bundle, Fecundity, Immunities};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn agent(world: &mut World) -> Entity {
        world.spawn(npc_bundle())
    }

    #[test]
    fn empty_stomach_on_empty_grid_starves() {
        let mut world = World::new();
        let npc = agent(&mut world);
        world.get::<&mut Energy>(npc).unwrap().foods = 0;

        let mut space = Space::new(10, 0);
        space.enter(5, 5, npc).unwrap();

        let outcome = program(&mut world, &mut space, npc, &mut rng()).unwrap();
        assert_eq!(outcome, TurnOutcome::Starved);
    }

    #[test]
    fn hungry_agent_wanders_and_pays_for_it() {
        let mut world = World::new();
        let npc = agent(&mut world);
        let mut space = Space::new(10, 0);
        space.enter(5, 5, npc).unwrap();

        let outcome = program(&mut world, &mut space, npc, &mut rng()).unwrap();
        assert_eq!(outcome, TurnOutcome::Survived);
        assert_ne!(space.coords_of(npc), Some((5, 5)));
        assert_eq!(world.get::<&Energy>(npc).unwrap().foods, 99);
    }

    #[test]
    fn wander_heads_for_visible_food() {
        let mut world = World::new();
        let npc = agent(&mut world);
        let mut space = Space::new(10, 0);
        space.enter(5, 5, npc).unwrap();
        space.add_food(6, 6, 1);

        // The lone food offset is the only possible pick.
        let outcome = program(&mut world, &mut space, npc, &mut rng()).unwrap();
        assert_eq!(outcome, TurnOutcome::Survived);
        assert_eq!(space.coords_of(npc), Some((6, 6)));
    }

    #[test]
    fn fed_agent_stays_put_and_courts_reproduction() {
        let mut world = World::new();
        let npc = agent(&mut world);
        let mut space = Space::new(10, 0);
        space.enter(5, 5, npc).unwrap();
        space.add_food(5, 5, 3);

        let outcome = program(&mut world, &mut space, npc, &mut rng()).unwrap();
        assert_eq!(outcome, TurnOutcome::Survived);
        assert_eq!(space.coords_of(npc), Some((5, 5)));
        assert_eq!(world.get::<&Energy>(npc).unwrap().foods, 101);
        // Eating triggered the reproduce warm-up.
        assert_eq!(
            world.get::<&Fecundity>(npc).unwrap().turns_of_plenty,
            Some(1)
        );
    }

    #[test]
    fn turn_can_transmit_to_a_neighbour() {
        let mut world = World::new();
        let carrier = agent(&mut world);
        let target = agent(&mut world);
        crate::spores::Spawner::new(&mut world, "cats", carrier, 1.0);

        let mut space = Space::new(10, 0);
        space.enter(5, 5, carrier).unwrap();
        space.enter(6, 5, target).unwrap();

        // With virulence 1.0 and a naive target, some turn soon transmits.
        let mut rng = rng();
        for _ in 0..64 {
            program(&mut world, &mut space, carrier, &mut rng).unwrap();
            if !world.get::<&Infections>(target).unwrap().is_empty() {
                break;
            }
        }
        let infections = world.get::<&Infections>(target).unwrap();
        assert_eq!(infections.len(), 1);
        assert_eq!(infections.0[0].chain(), &[carrier, target]);
        drop(infections);
        assert!(world.get::<&Immunities>(target).unwrap().immune_to("cats"));
    }
}
