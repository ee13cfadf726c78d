//! The combat collaborator interface and its hecs-backed implementation.
//!
//! Combat services never touch the ECS directly; they ask a `CombatWorld`.
//! Tests substitute an in-memory mock.

use std::collections::HashSet;

use glam::DVec2;
use hecs::{Entity, World};
use tracing::info;

use starhaul_core::components::{Destroyed, Hull, PlayerShip, Ship};
use starhaul_core::config::GameConfig;
use starhaul_core::constants::FOW_SENSOR_RANGE;
use starhaul_core::enums::Relation;
use starhaul_core::types::{FactionId, KinematicState};

/// World queries and side effects the combat services depend on.
pub trait CombatWorld {
    /// Target exists and has not been destroyed.
    fn is_active(&self, entity: Entity) -> bool;
    fn position(&self, entity: Entity) -> Option<DVec2>;
    /// Movement state, when the entity has one.
    fn velocity_ref(&self, entity: Entity) -> Option<KinematicState>;
    fn faction(&self, entity: Entity) -> Option<FactionId>;
    fn relation(&self, a: FactionId, b: FactionId) -> Relation;
    /// Collision radius used for hit tests.
    fn effective_radius(&self, target: Entity) -> f64;
    fn is_invulnerable(&self, target: Entity) -> bool;
    fn apply_damage(&mut self, target: Entity, amount: f64, shooter: Entity);
    fn hit_effect(&mut self, at: DVec2);
    /// Update fog-of-war visibility for a projectile; returns whether it is visible.
    fn set_visible_by_fow(&mut self, projectile_id: u64, pos: DVec2) -> bool;
    /// Record that `shooter` has declared `target` hostile.
    fn mark_hostile(&mut self, shooter: Entity, target: Entity);
    fn player_ship(&self) -> Option<Entity>;
}

/// Stable `u64` form of an entity, as used in events and snapshots.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Inverse of `entity_id`; `None` for ids that cannot name an entity.
pub fn entity_from_id(id: u64) -> Option<Entity> {
    Entity::from_bits(id)
}

/// `CombatWorld` over the engine's ECS world.
pub struct EcsCombatWorld<'a> {
    pub world: &'a mut World,
    pub game: &'a GameConfig,
    /// `(shooter, target)` pairs declared hostile by target assignment.
    pub hostility: &'a mut HashSet<(Entity, Entity)>,
    /// Hit-effect positions collected this tick.
    pub effects: &'a mut Vec<DVec2>,
}

impl EcsCombatWorld<'_> {
    /// Whether `shooter` declared `target` hostile through a target assignment.
    pub fn is_declared_hostile(&self, shooter: Entity, target: Entity) -> bool {
        self.hostility.contains(&(shooter, target))
    }
}

impl CombatWorld for EcsCombatWorld<'_> {
    fn is_active(&self, entity: Entity) -> bool {
        self.world.contains(entity) && self.world.get::<&Destroyed>(entity).is_err()
    }

    fn position(&self, entity: Entity) -> Option<DVec2> {
        self.world
            .get::<&KinematicState>(entity)
            .ok()
            .map(|state| state.position())
    }

    fn velocity_ref(&self, entity: Entity) -> Option<KinematicState> {
        self.world.get::<&KinematicState>(entity).ok().map(|state| *state)
    }

    fn faction(&self, entity: Entity) -> Option<FactionId> {
        self.world.get::<&Ship>(entity).ok().map(|ship| ship.faction)
    }

    fn relation(&self, a: FactionId, b: FactionId) -> Relation {
        self.game.relation_between(a, b)
    }

    fn effective_radius(&self, target: Entity) -> f64 {
        self.world.get::<&Hull>(target).map_or(0.0, |hull| hull.radius)
    }

    fn is_invulnerable(&self, target: Entity) -> bool {
        self.world
            .get::<&Hull>(target)
            .is_ok_and(|hull| hull.invulnerable)
    }

    fn apply_damage(&mut self, target: Entity, amount: f64, shooter: Entity) {
        if !self.is_active(target) {
            return;
        }
        let destroyed = match self.world.get::<&mut Hull>(target) {
            Ok(mut hull) => {
                hull.hp = (hull.hp - amount).max(0.0);
                hull.hp <= 0.0
            }
            Err(_) => false,
        };
        if destroyed && self.world.insert_one(target, Destroyed).is_ok() {
            info!(
                target = entity_id(target),
                shooter = entity_id(shooter),
                "ship destroyed"
            );
        }
    }

    fn hit_effect(&mut self, at: DVec2) {
        self.effects.push(at);
    }

    fn set_visible_by_fow(&mut self, _projectile_id: u64, pos: DVec2) -> bool {
        self.player_ship()
            .and_then(|player| self.position(player))
            .is_some_and(|eye| eye.distance(pos) <= FOW_SENSOR_RANGE)
    }

    fn mark_hostile(&mut self, shooter: Entity, target: Entity) {
        self.hostility.insert((shooter, target));
    }

    fn player_ship(&self) -> Option<Entity> {
        self.world
            .query::<&PlayerShip>()
            .iter()
            .next()
            .map(|(entity, _)| entity)
    }
}
