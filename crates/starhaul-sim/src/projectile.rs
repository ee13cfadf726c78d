//! Projectile flight and hit resolution.
//!
//! Projectiles are owned by the service, not the ECS: they are short-lived,
//! never targeted themselves, and only interact with their intended target.
//! Terminal projectiles are removed after the whole batch has been advanced.

use glam::DVec2;
use hecs::Entity;
use tracing::{debug, info};

use starhaul_core::config::WeaponDef;
use starhaul_core::enums::{ProjectileOutcome, ProjectileShape, Relation, WeaponKind};
use starhaul_core::events::{CombatEvent, EventSink};
use starhaul_core::types::FactionId;

use crate::world::{entity_id, CombatWorld};

/// Per-shot adjustments to the collision rules.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitOverrides {
    /// Use this relation instead of the faction table.
    pub relation: Option<Relation>,
    /// Use this collision radius instead of the target's.
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub shooter: Entity,
    pub shooter_faction: FactionId,
    pub target: Option<Entity>,
    pub kind: WeaponKind,
    pub damage: f64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub speed: f64,
    pub lifetime_remaining_ms: f64,
    pub radius: f64,
    pub color: u32,
    pub shape: ProjectileShape,
    /// Last fog-of-war verdict; rendering only.
    pub visible: bool,
    pub in_flight: bool,
}

#[derive(Debug, Default)]
pub struct ProjectileService {
    projectiles: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a projectile for `weapon` at `origin`, pointed along `angle`.
    ///
    /// Returns `None` for weapons without projectile parameters (beams).
    /// The projectile does not move until `start_flight`.
    pub fn spawn_projectile(
        &mut self,
        weapon: &WeaponDef,
        shooter: Entity,
        shooter_faction: FactionId,
        origin: DVec2,
        angle: f64,
        target: Option<Entity>,
    ) -> Option<u64> {
        let spec = weapon.projectile.as_ref()?;
        let id = self.next_id;
        self.next_id += 1;
        self.projectiles.push(Projectile {
            id,
            shooter,
            shooter_faction,
            target,
            kind: weapon.kind,
            damage: weapon.damage,
            position: origin,
            velocity: DVec2::from_angle(angle) * spec.speed,
            speed: spec.speed,
            lifetime_remaining_ms: spec.lifetime_ms,
            radius: spec.radius,
            color: spec.color,
            shape: spec.shape,
            visible: true,
            in_flight: false,
        });
        Some(id)
    }

    /// Begin per-tick advancement. Returns false for unknown ids.
    pub fn start_flight(&mut self, id: u64) -> bool {
        match self.projectiles.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.in_flight = true;
                true
            }
            None => false,
        }
    }

    /// Spawn and launch in one step.
    pub fn fire(
        &mut self,
        weapon: &WeaponDef,
        shooter: Entity,
        shooter_faction: FactionId,
        origin: DVec2,
        angle: f64,
        target: Option<Entity>,
    ) -> Option<u64> {
        let id = self.spawn_projectile(weapon, shooter, shooter_faction, origin, angle, target)?;
        self.start_flight(id);
        Some(id)
    }

    pub fn get(&self, id: u64) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Advance every in-flight projectile by `dt_ms` and resolve collisions.
    ///
    /// Returns the projectiles removed this tick with their outcome.
    pub fn tick(
        &mut self,
        dt_ms: f64,
        world: &mut impl CombatWorld,
        overrides: impl Fn(&Projectile) -> HitOverrides,
        sink: &mut impl EventSink,
    ) -> Vec<(u64, ProjectileOutcome)> {
        let dt_ms = dt_ms.max(0.0);
        let dt = dt_ms / 1000.0;
        let mut finished = Vec::new();

        for p in self.projectiles.iter_mut().filter(|p| p.in_flight) {
            p.lifetime_remaining_ms -= dt_ms;

            if p.kind == WeaponKind::Homing {
                let aim = p
                    .target
                    .filter(|&t| world.is_active(t))
                    .and_then(|t| world.position(t));
                if let Some(target_pos) = aim {
                    let dir = (target_pos - p.position).normalize_or_zero();
                    if dir != DVec2::ZERO {
                        p.velocity = dir * p.speed;
                    }
                }
            }

            let prev = p.position;
            p.position += p.velocity * dt;
            p.visible = world.set_visible_by_fow(p.id, p.position);

            let mut outcome = check_projectile_collisions(Some(prev), p, world, &overrides(p));
            if outcome == ProjectileOutcome::Flying && p.lifetime_remaining_ms <= 0.0 {
                outcome = ProjectileOutcome::Expire;
            }

            match outcome {
                ProjectileOutcome::Flying => continue,
                ProjectileOutcome::Hit => {
                    let target = p.target.map_or(0, entity_id);
                    info!(projectile = p.id, target, damage = p.damage, "projectile hit");
                    sink.emit(CombatEvent::ProjectileHit {
                        projectile_id: p.id,
                        target,
                        damage: p.damage,
                    });
                }
                ProjectileOutcome::Expire | ProjectileOutcome::TargetLost => {
                    debug!(projectile = p.id, ?outcome, "projectile removed");
                }
            }
            finished.push((p.id, outcome));
        }

        if !finished.is_empty() {
            self.projectiles
                .retain(|p| !finished.iter().any(|&(id, _)| id == p.id));
        }
        finished
    }
}

/// Resolve one tick of a projectile against its intended target.
///
/// With `prev` given, the hit test sweeps the segment travelled this tick so
/// fast projectiles cannot tunnel through small targets. On a hit, damage and
/// the hit effect are applied through `world`.
pub fn check_projectile_collisions(
    prev: Option<DVec2>,
    projectile: &Projectile,
    world: &mut impl CombatWorld,
    overrides: &HitOverrides,
) -> ProjectileOutcome {
    let Some(target) = projectile.target else {
        return ProjectileOutcome::Flying;
    };
    if !world.is_active(target) {
        return ProjectileOutcome::TargetLost;
    }
    let Some(target_pos) = world.position(target) else {
        return ProjectileOutcome::TargetLost;
    };

    let relation = overrides.relation.unwrap_or_else(|| {
        let target_faction = world.faction(target).unwrap_or_default();
        world.relation(projectile.shooter_faction, target_faction)
    });
    if !relation.is_confrontational() {
        return ProjectileOutcome::Flying;
    }

    let radius = overrides
        .radius
        .unwrap_or_else(|| world.effective_radius(target));
    let distance = match prev {
        Some(prev) => distance_to_segment(target_pos, prev, projectile.position),
        None => projectile.position.distance(target_pos),
    };
    if distance > radius {
        return ProjectileOutcome::Flying;
    }

    if world.is_invulnerable(target) {
        return ProjectileOutcome::Expire;
    }
    world.apply_damage(target, projectile.damage, projectile.shooter);
    world.hit_effect(projectile.position);
    ProjectileOutcome::Hit
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
