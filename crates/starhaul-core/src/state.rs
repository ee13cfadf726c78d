//! Simulation snapshot: the complete visible state sent to the frontend each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::{FactionId, SimTime, SlotKey};

/// Complete state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    pub beams: Vec<BeamView>,
    pub player_slots: Vec<SlotView>,
    pub events: Vec<CombatEvent>,
}

/// A ship as displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: u64,
    pub class: ShipClass,
    pub faction: FactionId,
    pub x: f64,
    pub y: f64,
    pub heading_rad: f64,
    pub speed: f64,
    pub hp: f64,
    pub max_hp: f64,
    /// Points of the path currently being flown (empty when idle).
    pub path: Vec<[f64; 2]>,
    /// Commanded movement target, for aim lines.
    pub movement_target: Option<[f64; 2]>,
    /// Estimated flight distance to the movement target.
    pub remaining_distance: Option<f64>,
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: u32,
    pub shape: ProjectileShape,
    /// Whether fog of war lets the player see it.
    pub visible: bool,
}

/// An active beam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamView {
    pub shooter: u64,
    pub target: u64,
    pub slot_key: SlotKey,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
}

/// HUD state of one player weapon slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotView {
    pub slot_key: SlotKey,
    pub weapon: String,
    pub target: Option<u64>,
    /// Reload progress in [0, 1]; beams report refresh progress.
    pub charge_progress: f64,
    pub charging: bool,
}
