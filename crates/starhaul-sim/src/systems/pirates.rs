//! Pirate AI system: engage the player when close, disengage when far.

use hecs::{Entity, World};
use tracing::debug;

use starhaul_core::components::{NpcTarget, PlayerShip};
use starhaul_core::constants::{PIRATE_AGGRO_RANGE, PIRATE_STANDOFF};
use starhaul_core::types::KinematicState;
use starhaul_nav::movement::MovementManager;

use crate::world::{entity_from_id, entity_id};

/// Disengage once the player is this many times the aggro range away.
const DISENGAGE_FACTOR: f64 = 1.5;

pub fn run(world: &mut World) {
    let player = world
        .query::<(&PlayerShip, &KinematicState)>()
        .iter()
        .next()
        .map(|(entity, (_, state))| (entity, state.position()));

    for (entity, (npc, state, helm)) in world.query_mut::<(
        &mut NpcTarget,
        &KinematicState,
        &mut MovementManager<Entity>,
    )>() {
        let engaged = npc.target.and_then(entity_from_id);
        match player {
            Some((player, pos)) => {
                let range = state.position().distance(pos);
                if engaged.is_none() && range <= PIRATE_AGGRO_RANGE {
                    debug!(pirate = entity_id(entity), range, "pirate engaging");
                    npc.target = Some(entity_id(player));
                    helm.follow_object(player, PIRATE_STANDOFF);
                } else if engaged.is_some() && range > PIRATE_AGGRO_RANGE * DISENGAGE_FACTOR {
                    debug!(pirate = entity_id(entity), range, "pirate disengaging");
                    npc.target = None;
                    helm.stop();
                }
            }
            None => {
                if engaged.is_some() {
                    npc.target = None;
                    helm.stop();
                }
            }
        }
    }
}
