//! ECS components for hecs entities.
//!
//! Components are plain data structs.
//! Game logic lives in systems and services, not components.
//! `KinematicState` (from `types`) doubles as the transform component.

use serde::{Deserialize, Serialize};

use crate::enums::ShipClass;
use crate::types::{FactionId, SlotKey};

/// Any ship in the system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ship {
    pub class: ShipClass,
    pub faction: FactionId,
}

/// Hit points and collision radius.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hull {
    pub hp: f64,
    pub max_hp: f64,
    pub radius: f64,
    pub invulnerable: bool,
}

/// A weapon mounted in a slot; `weapon` indexes `GameConfig::weapons`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponMount {
    pub slot: SlotKey,
    pub weapon: usize,
}

/// All weapons mounted on a ship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponLoadout {
    pub mounts: Vec<WeaponMount>,
}

impl WeaponLoadout {
    pub fn mount(&self, slot: SlotKey) -> Option<&WeaponMount> {
        self.mounts.iter().find(|m| m.slot == slot)
    }
}

/// Current weapon target of an NPC ship, as an entity id.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NpcTarget {
    pub target: Option<u64>,
}

/// Marks the player's ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerShip;

/// Marks a ship that has been destroyed and awaits cleanup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Destroyed;
