//! ECS components for Sporeworld agents.
//!
//! An agent is a `hecs::Entity` carrying all four components below. Entity
//! handles are generation-tagged, so a despawned agent's handle can never be
//! resurrected; spore lineage chains rely on that (see `spores`).

use std::collections::HashMap;

use crate::spores::Spore;

/// Energy threshold above which an agent counts as "having plenty".
pub const PLENTY_THRESHOLD: i64 = 100;

/// Consecutive turns of plenty required before a clone is produced.
pub const PLENTY_TURNS: i32 = 10;

/// An agent's power supply. Gained from food and tithe bonuses, spent on
/// movement and tithes. May dip below zero mid-tick; starvation is only
/// detected at the start of the owner's own next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Energy {
    pub foods: i64,
}

impl Default for Energy {
    fn default() -> Self {
        Self { foods: 100 }
    }
}

/// Per-genus immunity levels, each in `[0.0, 1.0]`. Absent genus = naive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Immunities(pub HashMap<String, f64>);

impl Immunities {
    /// How open the owner is to infection by `genus`: `1 - immunity`.
    pub fn susceptibility_to(&self, genus: &str) -> f64 {
        1.0 - self.0.get(genus).copied().unwrap_or(0.0)
    }

    /// True when the owner has saturated immunity to `genus`.
    pub fn immune_to(&self, genus: &str) -> bool {
        self.0.get(genus).copied() == Some(1.0)
    }
}

/// Spores that successfully infected the owner. They stay resident and may
/// be re-spawned to infect others.
#[derive(Debug, Clone, Default)]
pub struct Infections(pub Vec<Spore>);

impl Infections {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Reproduction hysteresis state. `None` until the first `reproduce` call,
/// which only initialises the counter (a deliberate warm-up turn).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fecundity {
    pub turns_of_plenty: Option<i32>,
}

/// The component bundle for a freshly created agent.
pub fn npc_bundle() -> (Energy, Immunities, Infections, Fecundity) {
    (
        Energy::default(),
        Immunities::default(),
        Infections::default(),
        Fecundity::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_agent_defaults() {
        let (energy, immunities, infections, fecundity) = npc_bundle();
        assert_eq!(energy.foods, 100);
        assert!(immunities.0.is_empty());
        assert!(infections.is_empty());
        assert_eq!(fecundity.turns_of_plenty, None);
    }

    #[test]
    fn susceptibility_defaults_to_one() {
        let mut imm = Immunities::default();
        assert_eq!(imm.susceptibility_to("cats"), 1.0);

        imm.0.insert("cats".into(), 0.25);
        assert!((imm.susceptibility_to("cats") - 0.75).abs() < 1e-12);

        imm.0.insert("cats".into(), 1.0);
        assert_eq!(imm.susceptibility_to("cats"), 0.0);
        assert!(imm.immune_to("cats"));
        assert!(!imm.immune_to("dogs"));
    }
}
