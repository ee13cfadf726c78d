//! Projectile system: flight, homing, fog of war and hit resolution.

use std::collections::HashMap;

use hecs::World;

use starhaul_core::config::GameConfig;
use starhaul_core::enums::Relation;
use starhaul_core::events::CombatEvent;

use crate::combat::CombatState;
use crate::projectile::HitOverrides;
use crate::world::EcsCombatWorld;

pub fn run(
    world: &mut World,
    game: &GameConfig,
    combat: &mut CombatState,
    dt_ms: f64,
    events: &mut Vec<CombatEvent>,
) {
    if combat.projectiles.is_empty() {
        return;
    }

    // Shots at targets declared hostile hit regardless of faction relation.
    let overrides: HashMap<u64, HitOverrides> = combat
        .projectiles
        .projectiles()
        .iter()
        .filter(|p| {
            p.target
                .is_some_and(|t| combat.hostility.contains(&(p.shooter, t)))
        })
        .map(|p| {
            (
                p.id,
                HitOverrides {
                    relation: Some(Relation::Confrontation),
                    radius: None,
                },
            )
        })
        .collect();

    let mut view = EcsCombatWorld {
        world,
        game,
        hostility: &mut combat.hostility,
        effects: &mut combat.effects,
    };
    combat.projectiles.tick(
        dt_ms,
        &mut view,
        |p| overrides.get(&p.id).copied().unwrap_or_default(),
        events,
    );
}
