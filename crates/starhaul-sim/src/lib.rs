//! Simulation engine for STARHAUL.
//!
//! Owns the hecs ECS world and the combat services (cooldowns, projectiles,
//! beams, weapon targets, timers), runs systems in a fixed order each tick,
//! and produces `SimSnapshot`s for the frontend.

pub mod beam;
pub mod combat;
pub mod cooldown;
pub mod engine;
pub mod projectile;
pub mod scheduler;
pub mod systems;
pub mod target;
pub mod targeting;
pub mod world;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use starhaul_core as core;

#[cfg(test)]
mod testing;
