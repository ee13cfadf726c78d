//! Snapshot system: queries the ECS world and combat services and builds
//! a complete `SimSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::{Entity, World};

use starhaul_core::components::{Hull, PlayerShip, Ship, WeaponLoadout};
use starhaul_core::config::GameConfig;
use starhaul_core::enums::GamePhase;
use starhaul_core::events::CombatEvent;
use starhaul_core::state::*;
use starhaul_core::types::{KinematicState, SimTime};
use starhaul_nav::movement::MovementManager;
use starhaul_nav::planner::estimate_remaining_distance;

use crate::combat::CombatState;
use crate::world::entity_id;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    game: &GameConfig,
    combat: &CombatState,
    events: Vec<CombatEvent>,
) -> SimSnapshot {
    SimSnapshot {
        time: *time,
        phase,
        ships: build_ships(world),
        projectiles: build_projectiles(combat),
        beams: build_beams(combat),
        player_slots: build_player_slots(world, game, combat, time.now_ms),
        events,
    }
}

fn build_ships(world: &World) -> Vec<ShipView> {
    let mut ships: Vec<ShipView> = world
        .query::<(&Ship, &Hull, &KinematicState, &MovementManager<Entity>)>()
        .iter()
        .map(|(entity, (ship, hull, state, helm))| ShipView {
            id: entity_id(entity),
            class: ship.class,
            faction: ship.faction,
            x: state.x,
            y: state.y,
            heading_rad: state.heading_rad,
            speed: state.speed,
            hp: hull.hp,
            max_hp: hull.max_hp,
            path: helm
                .trajectory()
                .map(|t| t.points.iter().map(|p| [p.x, p.y]).collect())
                .unwrap_or_default(),
            movement_target: helm.get_target().map(|p| [p.x, p.y]),
            remaining_distance: helm
                .get_target()
                .map(|goal| estimate_remaining_distance(state, goal, helm.movement())),
        })
        .collect();
    ships.sort_by_key(|s| s.id);
    ships
}

fn build_projectiles(combat: &CombatState) -> Vec<ProjectileView> {
    combat
        .projectiles
        .projectiles()
        .iter()
        .filter(|p| p.in_flight)
        .map(|p| ProjectileView {
            id: p.id,
            x: p.position.x,
            y: p.position.y,
            radius: p.radius,
            color: p.color,
            shape: p.shape,
            visible: p.visible,
        })
        .collect()
}

fn build_beams(combat: &CombatState) -> Vec<BeamView> {
    combat
        .beams
        .beams()
        .map(|b| BeamView {
            shooter: entity_id(b.shooter),
            target: entity_id(b.target),
            slot_key: b.slot,
            elapsed_ms: b.elapsed_ms,
            duration_ms: b.duration_ms,
        })
        .collect()
}

fn build_player_slots(
    world: &World,
    game: &GameConfig,
    combat: &CombatState,
    now_ms: f64,
) -> Vec<SlotView> {
    let mut query = world.query::<(&PlayerShip, &WeaponLoadout)>();
    let Some((player, (_, loadout))) = query.iter().next() else {
        return Vec::new();
    };

    loadout
        .mounts
        .iter()
        .filter_map(|mount| {
            let weapon = game.weapons.get(mount.weapon)?;
            let charge_progress = if weapon.is_beam() {
                combat
                    .cooldowns
                    .get_beam_refresh_progress(player, mount.slot, now_ms, weapon)
            } else {
                combat
                    .cooldowns
                    .get_weapon_charge_progress(player, mount.slot, now_ms, weapon)
            };
            Some(SlotView {
                slot_key: mount.slot,
                weapon: weapon.name.clone(),
                target: combat.targets.get_target(mount.slot).map(entity_id),
                charge_progress,
                charging: combat.cooldowns.is_weapon_charging(player, mount.slot, now_ms),
            })
        })
        .collect()
}
