//! Weapon fire system: target lookup, range check, hostility gate,
//! cooldown gate, then either a beam or a lead-aimed projectile.
//!
//! Targets are read through the `CombatWorld` view, the same interface the
//! projectile and beam services use.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};

use starhaul_core::components::{Destroyed, NpcTarget, PlayerShip, Ship, WeaponLoadout, WeaponMount};
use starhaul_core::config::GameConfig;
use starhaul_core::events::{CombatEvent, EventSink};
use starhaul_core::types::{FactionId, KinematicState, SlotKey};

use crate::combat::CombatState;
use crate::targeting::{get_target_velocity, lead_angle};
use crate::world::{entity_from_id, CombatWorld, EcsCombatWorld};

/// A ship able to fire this tick.
struct Shooter {
    entity: Entity,
    faction: FactionId,
    origin: DVec2,
    mounts: Vec<WeaponMount>,
    is_player: bool,
    npc_target: Option<Entity>,
}

pub fn run(
    world: &mut World,
    game: &GameConfig,
    combat: &mut CombatState,
    now_ms: f64,
    events: &mut Vec<CombatEvent>,
) {
    let shooters: Vec<Shooter> = world
        .query::<(
            &Ship,
            &KinematicState,
            &WeaponLoadout,
            Option<&PlayerShip>,
            Option<&NpcTarget>,
            Option<&Destroyed>,
        )>()
        .iter()
        .filter(|(_, (.., destroyed))| destroyed.is_none())
        .map(|(entity, (ship, state, loadout, player, npc, _))| Shooter {
            entity,
            faction: ship.faction,
            origin: state.position(),
            mounts: loadout.mounts.clone(),
            is_player: player.is_some(),
            npc_target: npc.and_then(|n| n.target).and_then(entity_from_id),
        })
        .collect();
    if shooters.is_empty() {
        return;
    }

    let view = EcsCombatWorld {
        world,
        game,
        hostility: &mut combat.hostility,
        effects: &mut combat.effects,
    };

    for shooter in &shooters {
        for mount in &shooter.mounts {
            let target = if shooter.is_player {
                combat.targets.get_target(mount.slot)
            } else {
                shooter.npc_target
            };
            let (Some(target), Some(weapon)) = (target, game.weapons.get(mount.weapon)) else {
                continue;
            };
            if !view.is_active(target) {
                continue;
            }
            let (Some(target_state), Some(target_faction)) =
                (view.velocity_ref(target), view.faction(target))
            else {
                continue;
            };

            let target_pos = target_state.position();
            let in_range = shooter.origin.distance(target_pos) <= weapon.range;
            if shooter.is_player {
                report_range(&mut combat.out_of_range, mount.slot, !in_range, events);
            }
            if !in_range {
                continue;
            }

            let confrontational = view.relation(shooter.faction, target_faction).is_confrontational();
            if !confrontational && !view.is_declared_hostile(shooter.entity, target) {
                continue;
            }
            if combat
                .cooldowns
                .is_weapon_charging(shooter.entity, mount.slot, now_ms)
            {
                continue;
            }

            if weapon.is_beam() {
                combat.beams.ensure_beam(
                    shooter.entity,
                    mount.slot,
                    mount.weapon,
                    weapon,
                    target,
                    now_ms,
                    &mut combat.timers,
                    events,
                );
                continue;
            }

            let angle = lead_angle(
                shooter.origin,
                target_pos,
                get_target_velocity(Some(&target_state)),
                weapon.projectile_speed(),
            );
            let fired = combat.projectiles.fire(
                weapon,
                shooter.entity,
                shooter.faction,
                shooter.origin,
                angle,
                Some(target),
            );
            if fired.is_some() {
                combat
                    .cooldowns
                    .set_charge_until(shooter.entity, mount.slot, now_ms + weapon.cooldown_ms());
            }
        }
    }
}

/// Emit `WeaponOutOfRange` only when a slot's range state changes.
fn report_range(
    reported: &mut BTreeMap<SlotKey, bool>,
    slot: SlotKey,
    out_of_range: bool,
    sink: &mut impl EventSink,
) {
    let previous = reported.insert(slot, out_of_range);
    if previous != Some(out_of_range) {
        sink.emit(CombatEvent::WeaponOutOfRange {
            slot_key: slot,
            out_of_range,
        });
    }
}
