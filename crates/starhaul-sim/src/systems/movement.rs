//! Movement system: mode replanning plus one path-follower step per ship.
//!
//! Positions are snapshotted first so an agent can resolve the object it
//! tracks while its own state is borrowed mutably.

use std::collections::HashMap;

use glam::DVec2;
use hecs::{Entity, World};

use starhaul_core::types::KinematicState;
use starhaul_nav::movement::MovementManager;

pub fn run(world: &mut World, dt_ms: f64, now_ms: f64) {
    let positions: HashMap<Entity, DVec2> = world
        .query::<&KinematicState>()
        .iter()
        .map(|(entity, state)| (entity, state.position()))
        .collect();

    for (_entity, (state, helm)) in
        world.query_mut::<(&mut KinematicState, &mut MovementManager<Entity>)>()
    {
        helm.update(state, dt_ms, now_ms, |target| positions.get(&target).copied());
    }
}
