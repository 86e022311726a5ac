//! Reproduction System
//!
//! Turns-of-plenty hysteresis and agent cloning. An agent that has held more
//! than `PLENTY_THRESHOLD` energy for more than `PLENTY_TURNS` consecutive
//! well-fed turns splits into two: the clone inherits immunities and
//! re-spawned copies of every infection, and the parent's energy is divided
//! between the pair.

use hecs::{Entity, World};

use crate::components::{
    Energy, Fecundity, Immunities, Infections, PLENTY_THRESHOLD, PLENTY_TURNS,
};
use crate::spores::Spore;

/// Advance the hysteresis counter for `person` and clone when it trips.
///
/// The very first call only initialises the counter and never clones: a
/// deliberate warm-up turn. Afterwards the counter moves by the sign of
/// `foods - PLENTY_THRESHOLD` each call, is floored at 0, and produces a
/// clone (resetting to 0) once it exceeds `PLENTY_TURNS`.
pub fn reproduce(world: &mut World, person: Entity) -> Option<Entity> {
    let foods = world.get::<&Energy>(person).ok()?.foods;

    {
        let mut fecundity = world.get::<&mut Fecundity>(person).ok()?;
        match fecundity.turns_of_plenty {
            None => {
                fecundity.turns_of_plenty = Some((foods > PLENTY_THRESHOLD) as i32);
                return None;
            }
            Some(turns) => {
                let turns = turns + (foods - PLENTY_THRESHOLD).signum() as i32;
                if turns > PLENTY_TURNS {
                    fecundity.turns_of_plenty = Some(0);
                    // Fall through to clone below.
                } else {
                    fecundity.turns_of_plenty = Some(turns.max(0));
                    return None;
                }
            }
        }
    }

    Some(clone(world, person))
}

/// Split `person` into parent and clone. Both end with `floor(foods / 2)`;
/// energy is divided, never duplicated. Each parent infection is re-spawned
/// for the clone with the clone registered as its newest carrier.
pub fn clone(world: &mut World, person: Entity) -> Entity {
    let immunities = world
        .get::<&Immunities>(person)
        .map(|imm| (*imm).clone())
        .unwrap_or_default();
    let carried: Vec<Spore> = world
        .get::<&Infections>(person)
        .map(|i| i.0.clone())
        .unwrap_or_default();
    let half = world
        .get::<&Energy>(person)
        .map(|e| e.foods)
        .unwrap_or_default()
        / 2;

    if let Ok(mut energy) = world.get::<&mut Energy>(person) {
        energy.foods = half;
    }

    let child = world.spawn((
        Energy { foods: half },
        immunities,
        Infections::default(),
        Fecundity::default(),
    ));

    let inherited: Vec<Spore> = carried
        .iter()
        .map(|spore| {
            let mut fresh = spore.spawn(world);
            fresh.register(child);
            fresh
        })
        .collect();
    if let Ok(mut infections) = world.get::<&mut Infections>(child) {
        infections.0 = inherited;
    }

    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::npc_bundle;
    use crate::spores::Spawner;

    fn agent(world: &mut World) -> Entity {
        world.spawn(npc_bundle())
    }

    fn set_energy(world: &mut World, e: Entity, foods: i64) {
        world.get::<&mut Energy>(e).unwrap().foods = foods;
    }

    fn counter(world: &World, e: Entity) -> Option<i32> {
        world.get::<&Fecundity>(e).unwrap().turns_of_plenty
    }

    #[test]
    fn hysteresis_literal_sequence() {
        let mut world = World::new();
        let npc = agent(&mut world);
        assert_eq!(counter(&world, npc), None);

        // Warm-up call at exactly 100: initialises to 0, no clone.
        assert!(reproduce(&mut world, npc).is_none());
        assert_eq!(counter(&world, npc), Some(0));

        // Holding at the threshold keeps the counter pinned at 0.
        for _ in 0..3 {
            assert!(reproduce(&mut world, npc).is_none());
            assert_eq!(counter(&world, npc), Some(0));
        }

        // Above the threshold the counter climbs by one per call.
        set_energy(&mut world, npc, 101);
        for n in 1..=3 {
            assert!(reproduce(&mut world, npc).is_none());
            assert_eq!(counter(&world, npc), Some(n));
        }

        // Back at the threshold it holds.
        set_energy(&mut world, npc, 100);
        for _ in 0..3 {
            assert!(reproduce(&mut world, npc).is_none());
            assert_eq!(counter(&world, npc), Some(3));
        }

        // Below the threshold it decays, floored at 0.
        set_energy(&mut world, npc, 99);
        for n in (0..=2).rev() {
            assert!(reproduce(&mut world, npc).is_none());
            assert_eq!(counter(&world, npc), Some(n));
        }
        assert!(reproduce(&mut world, npc).is_none());
        assert_eq!(counter(&world, npc), Some(0));

        // Ten fat turns take the counter to 10; the eleventh call clones.
        set_energy(&mut world, npc, 101);
        for n in 1..=10 {
            assert!(reproduce(&mut world, npc).is_none());
            assert_eq!(counter(&world, npc), Some(n));
        }
        let child = reproduce(&mut world, npc).expect("clone expected");
        assert_eq!(counter(&world, npc), Some(0));

        // 101 energy splits as floor(101 / 2) to both.
        assert_eq!(world.get::<&Energy>(npc).unwrap().foods, 50);
        assert_eq!(world.get::<&Energy>(child).unwrap().foods, 50);
    }

    #[test]
    fn clone_inherits_immunities_and_infections() {
        let mut world = World::new();
        let npc = agent(&mut world);
        Spawner::new(&mut world, "cats", npc, 0.05);
        world
            .get::<&mut Immunities>(npc)
            .unwrap()
            .0
            .insert("dogs".into(), 0.4);
        set_energy(&mut world, npc, 100);

        let child = clone(&mut world, npc);

        let parent_imm = (*world.get::<&Immunities>(npc).unwrap()).clone();
        let child_imm = (*world.get::<&Immunities>(child).unwrap()).clone();
        assert_eq!(parent_imm, child_imm);

        let inherited = world.get::<&Infections>(child).unwrap();
        assert_eq!(inherited.len(), 1);
        assert_eq!(inherited.0[0].genus(), "cats");
        // Fresh copy, chain extended with the clone itself.
        assert_eq!(inherited.0[0].chain(), &[npc, child]);
        drop(inherited);

        assert_eq!(world.get::<&Energy>(npc).unwrap().foods, 50);
        assert_eq!(world.get::<&Energy>(child).unwrap().foods, 50);
        // The clone starts its own hysteresis from scratch.
        assert_eq!(counter(&world, child), None);
    }
}
