//! Combat services owned by the engine, bundled so systems can borrow them
//! field by field alongside the ECS world.

use std::collections::{BTreeMap, HashSet};

use glam::DVec2;
use hecs::Entity;

use starhaul_core::types::SlotKey;

use crate::beam::BeamService;
use crate::cooldown::CooldownService;
use crate::projectile::ProjectileService;
use crate::scheduler::TimerRegistry;
use crate::target::TargetService;

#[derive(Debug, Default)]
pub struct CombatState {
    pub cooldowns: CooldownService,
    pub projectiles: ProjectileService,
    pub beams: BeamService,
    /// Player weapon slot assignments.
    pub targets: TargetService,
    pub timers: TimerRegistry,
    /// `(shooter, target)` pairs declared hostile by target assignment.
    pub hostility: HashSet<(Entity, Entity)>,
    /// Last reported out-of-range state per player slot.
    pub out_of_range: BTreeMap<SlotKey, bool>,
    /// Hit effects produced this tick.
    pub effects: Vec<DVec2>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything tied to an entity that is leaving the world.
    pub fn forget(&mut self, entity: Entity) {
        self.cooldowns.clear_shooter(entity);
        self.hostility.retain(|&(a, b)| a != entity && b != entity);
    }
}
