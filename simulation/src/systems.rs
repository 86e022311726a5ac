//! Per-concern logic run against the ECS world each tick.

pub mod contagion;
pub mod npc;
pub mod reproduce;

pub use npc::{program, TurnOutcome};
