//! Timer dispatch system: fires due timers in order.
//!
//! Each firing runs at its own due time, so a long tick that spans several
//! beam intervals applies every one of them.

use hecs::World;

use starhaul_core::config::GameConfig;
use starhaul_core::events::CombatEvent;

use crate::beam::Beam;
use crate::combat::CombatState;
use crate::scheduler::{Firing, TimerTask};
use crate::world::{CombatWorld, EcsCombatWorld};

pub fn run(
    world: &mut World,
    game: &GameConfig,
    combat: &mut CombatState,
    now_ms: f64,
    events: &mut Vec<CombatEvent>,
) {
    let due = combat.timers.drain_due(now_ms);
    if due.is_empty() {
        return;
    }

    let mut view = EcsCombatWorld {
        world,
        game,
        hostility: &mut combat.hostility,
        effects: &mut combat.effects,
    };
    for Firing { id, due_at_ms, task } in due {
        match task {
            TimerTask::BeamTick { shooter, slot } => {
                combat.beams.on_tick(
                    shooter,
                    slot,
                    id,
                    due_at_ms,
                    &mut view,
                    beam_in_range,
                    &mut combat.cooldowns,
                    &mut combat.timers,
                    events,
                );
            }
        }
    }
}

/// A beam keeps firing while its target stays within weapon range.
fn beam_in_range<W: CombatWorld>(beam: &Beam, world: &W) -> bool {
    match (world.position(beam.shooter), world.position(beam.target)) {
        (Some(from), Some(to)) => from.distance(to) <= beam.range,
        _ => false,
    }
}
