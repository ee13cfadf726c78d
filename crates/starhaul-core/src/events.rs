//! Events emitted by the combat services for HUD and UI consumers.
//!
//! Services receive an explicit `EventSink` rather than publishing to a
//! shared scene bus. Entity ids are the `u64` bit form of the ECS handle.

use serde::{Deserialize, Serialize};

use crate::types::SlotKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A beam weapon started firing.
    BeamStart {
        shooter: u64,
        slot_key: SlotKey,
        duration_ms: f64,
    },
    /// A beam ran its full duration; the refresh window has begun.
    BeamRefresh {
        shooter: u64,
        slot_key: SlotKey,
        refresh_ms: f64,
    },
    /// A beam stopped, either naturally (`completed`) or interrupted.
    BeamEnded {
        shooter: u64,
        slot_key: SlotKey,
        completed: bool,
    },
    /// Range status of the target assigned to a slot.
    WeaponOutOfRange { slot_key: SlotKey, out_of_range: bool },
    /// One or more slots lost their target in a single operation.
    PlayerWeaponTargetCleared { slots: Vec<SlotKey> },
    /// A projectile hit and applied damage.
    ProjectileHit {
        projectile_id: u64,
        target: u64,
        damage: f64,
    },
}

/// Destination for combat events.
pub trait EventSink {
    fn emit(&mut self, event: CombatEvent);
}

impl EventSink for Vec<CombatEvent> {
    fn emit(&mut self, event: CombatEvent) {
        self.push(event);
    }
}
