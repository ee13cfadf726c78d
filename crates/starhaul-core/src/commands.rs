//! Player commands sent from the frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.
//! Entity references are the `u64` bit form of the ECS handle.

use serde::{Deserialize, Serialize};

use crate::types::SlotKey;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Simulation control ---
    /// Populate the star system and start ticking.
    StartSystem,
    Pause,
    Resume,

    // --- Movement ---
    /// Plan a path to a point and fly it.
    MoveTo { x: f64, y: f64 },
    /// Fly a caller-supplied polyline of `[x, y]` points.
    FollowPath { points: Vec<[f64; 2]> },
    /// Circle a ship at `radius`.
    Orbit { target: u64, radius: f64 },
    /// Chase a ship.
    Pursue { target: u64 },
    /// Hold `standoff` distance from a ship.
    FollowTarget { target: u64, standoff: f64 },
    /// Drop the current movement mode.
    Stop,

    // --- Weapons ---
    /// Assign (or with `None`, clear) the target of a weapon slot.
    SetTarget { slot: SlotKey, target: Option<u64> },
    ClearSlot { slot: SlotKey },
    ClearAllTargets,
}
