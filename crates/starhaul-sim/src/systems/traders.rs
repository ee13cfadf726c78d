//! Trader AI system: runs the trader state machine and applies its actions.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use starhaul_core::config::PlanetDef;
use starhaul_core::types::KinematicState;
use starhaul_nav::movement::MovementManager;
use starhaul_nav::trader::{
    evaluate, next_planet, TraderAction, TraderBrain, TraderContext, TraderState,
};

use crate::world::entity_id;

/// Evaluate every trader at `now_ms`.
pub fn run(world: &mut World, planets: &[PlanetDef], rng: &mut ChaCha8Rng, now_ms: f64) {
    for (entity, (brain, state, helm)) in world.query_mut::<(
        &mut TraderBrain,
        &mut KinematicState,
        &mut MovementManager<Entity>,
    )>() {
        // Only roll a new destination when leaving the dock.
        let leaving_dock = matches!(brain.state, TraderState::Docked { .. })
            && brain.pending.is_some_and(|p| now_ms >= p.due_at_ms);
        let next_destination = if leaving_dock && planets.len() > 1 {
            next_planet(brain.state.planet(), planets.len(), rng.gen_range(0..planets.len()))
        } else {
            brain.state.planet()
        };

        let ctx = TraderContext {
            now_ms,
            position: state.position(),
            moving: helm.is_moving(),
            planets,
            next_destination,
        };
        let update = evaluate(brain, &ctx);
        if update.state_changed {
            debug!(
                trader = entity_id(entity),
                from = ?brain.state,
                to = ?update.new_state,
                "trader state change"
            );
        }
        brain.apply(&update);
        if update.state_changed && matches!(brain.state, TraderState::Docked { .. }) {
            debug!(
                trader = entity_id(entity),
                trips = brain.trips_completed,
                "trader docked"
            );
        }

        match update.action {
            TraderAction::None => {}
            TraderAction::PlanTo(goal) => {
                helm.move_to(state, goal);
            }
            TraderAction::Halt => {
                helm.stop();
                state.speed = 0.0;
            }
        }
    }
}
