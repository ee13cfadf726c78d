//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are functions over `&mut World` plus whatever engine-owned
//! services they need. They hold no state of their own.

pub mod cleanup;
pub mod movement;
pub mod pirates;
pub mod projectiles;
pub mod snapshot;
pub mod timers;
pub mod traders;
pub mod weapons;
