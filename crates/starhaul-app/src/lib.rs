//! STARHAUL headless application.
//!
//! Wires the simulation engine to a game-loop thread fed over an `mpsc`
//! command channel, and handles logging setup and player-pose persistence.

pub mod game_loop;
pub mod state;
pub mod telemetry;

pub use starhaul_core as core;
