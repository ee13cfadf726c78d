//! Weapon reload and beam refresh bookkeeping.
//!
//! Each shooter gets its own slot map, keyed by entity identity. A missing
//! record always reads as "ready".

use std::collections::HashMap;

use hecs::Entity;

use starhaul_core::config::WeaponDef;
use starhaul_core::types::SlotKey;

/// Timing record for one weapon slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlotCooldown {
    pub charge_until_ms: Option<f64>,
    pub beam_ready_at_ms: Option<f64>,
}

impl SlotCooldown {
    fn is_empty(&self) -> bool {
        self.charge_until_ms.is_none() && self.beam_ready_at_ms.is_none()
    }
}

#[derive(Debug, Default)]
pub struct CooldownService {
    shooters: HashMap<Entity, HashMap<SlotKey, SlotCooldown>>,
}

impl CooldownService {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, shooter: Entity, slot: SlotKey) -> Option<&SlotCooldown> {
        self.shooters.get(&shooter)?.get(&slot)
    }

    fn record_mut(&mut self, shooter: Entity, slot: SlotKey) -> &mut SlotCooldown {
        self.shooters
            .entry(shooter)
            .or_default()
            .entry(slot)
            .or_default()
    }

    fn prune(&mut self, shooter: Entity, slot: SlotKey) {
        if let Some(slots) = self.shooters.get_mut(&shooter) {
            if slots.get(&slot).is_some_and(SlotCooldown::is_empty) {
                slots.remove(&slot);
            }
            if slots.is_empty() {
                self.shooters.remove(&shooter);
            }
        }
    }

    pub fn set_charge_until(&mut self, shooter: Entity, slot: SlotKey, until_ms: f64) {
        self.record_mut(shooter, slot).charge_until_ms = Some(until_ms);
    }

    /// Reload progress in [0, 1]. 1 when there is no record or it has elapsed.
    pub fn get_weapon_charge_progress(
        &self,
        shooter: Entity,
        slot: SlotKey,
        now_ms: f64,
        weapon: &WeaponDef,
    ) -> f64 {
        let until = self.record(shooter, slot).and_then(|r| r.charge_until_ms);
        window_progress(until, now_ms, weapon.cooldown_ms())
    }

    /// Forget the reload window; the slot reads as ready.
    pub fn clear_charge(&mut self, shooter: Entity, slot: SlotKey) {
        if let Some(record) = self
            .shooters
            .get_mut(&shooter)
            .and_then(|slots| slots.get_mut(&slot))
        {
            record.charge_until_ms = None;
        }
        self.prune(shooter, slot);
    }

    pub fn set_beam_ready_at(&mut self, shooter: Entity, slot: SlotKey, ready_at_ms: f64) {
        self.record_mut(shooter, slot).beam_ready_at_ms = Some(ready_at_ms);
    }

    pub fn get_beam_ready_at(&self, shooter: Entity, slot: SlotKey) -> Option<f64> {
        self.record(shooter, slot).and_then(|r| r.beam_ready_at_ms)
    }

    /// Beam refresh progress in [0, 1]. Weapons without a beam read as ready.
    pub fn get_beam_refresh_progress(
        &self,
        shooter: Entity,
        slot: SlotKey,
        now_ms: f64,
        weapon: &WeaponDef,
    ) -> f64 {
        let Some(beam) = weapon.beam.as_ref() else {
            return 1.0;
        };
        window_progress(self.get_beam_ready_at(shooter, slot), now_ms, beam.refresh_ms)
    }

    /// True while either the reload or the beam refresh window is open.
    pub fn is_weapon_charging(&self, shooter: Entity, slot: SlotKey, now_ms: f64) -> bool {
        self.record(shooter, slot).is_some_and(|r| {
            r.charge_until_ms.is_some_and(|t| now_ms < t)
                || r.beam_ready_at_ms.is_some_and(|t| now_ms < t)
        })
    }

    /// Drop every record for a shooter that no longer exists.
    pub fn clear_shooter(&mut self, shooter: Entity) {
        self.shooters.remove(&shooter);
    }

    pub fn tracked_shooters(&self) -> usize {
        self.shooters.len()
    }
}

/// Elapsed fraction of a window of length `window_ms` ending at `until_ms`.
fn window_progress(until_ms: Option<f64>, now_ms: f64, window_ms: f64) -> f64 {
    let Some(until) = until_ms else {
        return 1.0;
    };
    let remaining = until - now_ms;
    if remaining <= 0.0 || window_ms <= 0.0 {
        return 1.0;
    }
    (1.0 - remaining / window_ms).clamp(0.0, 1.0)
}
