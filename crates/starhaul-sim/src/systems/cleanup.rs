//! Cleanup system: removes destroyed ships and everything pointing at them.

use hecs::{Entity, World};

use starhaul_core::components::{Destroyed, NpcTarget};
use starhaul_core::events::CombatEvent;

use crate::combat::CombatState;
use crate::world::entity_from_id;

/// Despawn destroyed ships, clearing weapon assignments, beams and cooldown
/// records that reference them. Uses a pre-allocated buffer.
pub fn run(
    world: &mut World,
    combat: &mut CombatState,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<CombatEvent>,
) {
    despawn_buffer.clear();
    despawn_buffer.extend(world.query::<&Destroyed>().iter().map(|(entity, _)| entity));
    if despawn_buffer.is_empty() {
        return;
    }

    for (_entity, npc) in world.query_mut::<&mut NpcTarget>() {
        let lost = npc
            .target
            .and_then(entity_from_id)
            .is_some_and(|t| despawn_buffer.contains(&t));
        if lost {
            npc.target = None;
        }
    }

    for &entity in despawn_buffer.iter() {
        for slot in combat.targets.clear_assignments_for_target(entity, events) {
            combat.out_of_range.remove(&slot);
        }
        combat.beams.stop_involving(entity, &mut combat.timers, events);
        combat.forget(entity);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
