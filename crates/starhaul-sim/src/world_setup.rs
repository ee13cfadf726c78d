//! Entity spawn factories for populating the star system.
//!
//! Every ship gets a `KinematicState` transform and its own
//! `MovementManager`; armed ships also get a `WeaponLoadout`.

use std::f64::consts::TAU;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use starhaul_core::components::*;
use starhaul_core::config::*;
use starhaul_core::constants::PIRATE_SPAWN_RADIUS;
use starhaul_core::enums::ShipClass;
use starhaul_core::types::{KinematicState, SlotKey};
use starhaul_nav::movement::MovementManager;
use starhaul_nav::trader::{next_planet, TraderBrain};

/// Spawn the player, traders and pirates described by `game`.
pub fn setup_system(world: &mut World, game: &GameConfig, rng: &mut ChaCha8Rng) {
    spawn_player(world, game);
    for _ in 0..game.trader_count {
        spawn_trader(world, game, rng);
    }
    for _ in 0..game.pirate_count {
        spawn_pirate(world, game, rng);
    }
    info!(
        traders = game.trader_count,
        pirates = game.pirate_count,
        planets = game.planets.len(),
        "star system populated"
    );
}

/// Resolve loadout weapon names to mounts, one slot per entry.
/// Unknown names are skipped but keep their slot number.
pub fn build_loadout(game: &GameConfig, names: &[String]) -> WeaponLoadout {
    let mounts = names
        .iter()
        .enumerate()
        .filter_map(|(slot, name)| match game.weapon_index(name) {
            Some(weapon) => Some(WeaponMount {
                slot: SlotKey(slot as u32),
                weapon,
            }),
            None => {
                warn!(weapon = %name, "unknown weapon in loadout");
                None
            }
        })
        .collect();
    WeaponLoadout { mounts }
}

fn hull(def: &HullDef) -> Hull {
    Hull {
        hp: def.hp,
        max_hp: def.hp,
        radius: def.radius,
        invulnerable: def.invulnerable,
    }
}

/// Spawn the player's ship at the origin.
pub fn spawn_player(world: &mut World, game: &GameConfig) -> Entity {
    world.spawn((
        PlayerShip,
        Ship {
            class: ShipClass::Player,
            faction: PLAYER_FACTION,
        },
        hull(&game.player_hull),
        KinematicState::default(),
        MovementManager::<Entity>::new(game.player_movement),
        build_loadout(game, &game.player_loadout),
    ))
}

/// Spawn a trader parked at a random planet, bound for a different one.
pub fn spawn_trader(world: &mut World, game: &GameConfig, rng: &mut ChaCha8Rng) -> Entity {
    let count = game.planets.len();
    let home = if count == 0 { 0 } else { rng.gen_range(0..count) };
    let (x, y) = game.planets.get(home).map_or((0.0, 0.0), |p| (p.x, p.y));
    let heading = rng.gen_range(0.0..TAU);
    let destination = next_planet(home, count, rng.gen_range(0..count.max(1)));

    world.spawn((
        Ship {
            class: ShipClass::Trader,
            faction: TRADER_FACTION,
        },
        hull(&game.trader_hull),
        KinematicState::new(x, y, heading, 0.0),
        MovementManager::<Entity>::new(game.trader_movement),
        TraderBrain::new(destination),
    ))
}

/// Spawn a pirate on the outer ring, heading inward.
pub fn spawn_pirate(world: &mut World, game: &GameConfig, rng: &mut ChaCha8Rng) -> Entity {
    let bearing = rng.gen_range(0.0..TAU);
    let x = PIRATE_SPAWN_RADIUS * bearing.cos();
    let y = PIRATE_SPAWN_RADIUS * bearing.sin();
    let heading = (-y).atan2(-x);

    world.spawn((
        Ship {
            class: ShipClass::Pirate,
            faction: PIRATE_FACTION,
        },
        hull(&game.pirate_hull),
        KinematicState::new(x, y, heading, 0.0),
        MovementManager::<Entity>::new(game.pirate_movement),
        build_loadout(game, &game.pirate_loadout),
        NpcTarget::default(),
    ))
}
