//! Core types and definitions for the STARHAUL simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! kinematic types, weapon and movement configuration, player commands,
//! combat events, snapshot views, ECS components, constants, and
//! ship-pose persistence.
//! It has no dependency on any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod persistence;
pub mod state;
pub mod types;

pub use glam::DVec2;
