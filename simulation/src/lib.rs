//! Sporeworld Simulation Engine
//!
//! Discrete-time artificial life on a toroidal grid: agents forage for
//! regrowing food, wander, clone themselves in times of plenty, and pass
//! around a contagion whose per-transmission lineage funds a tithe economy.
//! Rendering, input and export are external Presenter concerns; this crate
//! only steps the world and exposes read-only snapshots of it.

pub mod components;
pub mod config;
pub mod space;
pub mod spores;
pub mod systems;
pub mod world;

pub use components::*;
pub use config::SimConfig;
pub use space::{Food, Location, Space, SpaceError};
pub use spores::{Spawner, Spore};
pub use systems::TurnOutcome;
pub use world::{CellView, SimulationWorld, Stats};
