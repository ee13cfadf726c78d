//! Trader NPC state machine.
//!
//! Pure functions over plain data: no ECS, no engine. Delayed transitions
//! (docking, undocking) are pending records polled against the clock.

use glam::DVec2;

use starhaul_core::config::PlanetDef;
use starhaul_core::constants::{DOCKED_DURATION_MS, DOCKING_DURATION_MS, UNDOCKING_DURATION_MS};

/// Trader behavior state. Each variant carries the planet it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraderState {
    Travel { planet: usize },
    Docking { planet: usize },
    Docked { planet: usize },
    Undocking { planet: usize },
}

impl TraderState {
    pub fn planet(&self) -> usize {
        match *self {
            TraderState::Travel { planet }
            | TraderState::Docking { planet }
            | TraderState::Docked { planet }
            | TraderState::Undocking { planet } => planet,
        }
    }
}

/// A scheduled state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    pub due_at_ms: f64,
    pub next: TraderState,
}

/// Per-trader record owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraderBrain {
    pub state: TraderState,
    pub pending: Option<PendingTransition>,
    pub trips_completed: u32,
}

impl TraderBrain {
    pub fn new(first_planet: usize) -> Self {
        Self {
            state: TraderState::Travel {
                planet: first_planet,
            },
            pending: None,
            trips_completed: 0,
        }
    }

    /// Apply an FSM result.
    pub fn apply(&mut self, update: &TraderUpdate) {
        if update.state_changed && matches!(update.new_state, TraderState::Docked { .. }) {
            self.trips_completed += 1;
        }
        self.state = update.new_state;
        self.pending = update.pending;
    }
}

/// What the engine should do with the trader's movement this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraderAction {
    None,
    /// Plan a path to this point.
    PlanTo(DVec2),
    /// Stop moving.
    Halt,
}

/// Input to the trader FSM for a single NPC.
pub struct TraderContext<'a> {
    pub now_ms: f64,
    pub position: DVec2,
    /// Whether the trader currently has an active path.
    pub moving: bool,
    pub planets: &'a [PlanetDef],
    /// Planet to travel to after undocking, chosen by the caller.
    pub next_destination: usize,
}

/// Output from the trader FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraderUpdate {
    pub new_state: TraderState,
    pub pending: Option<PendingTransition>,
    pub action: TraderAction,
    pub state_changed: bool,
}

/// Evaluate the FSM for one trader.
pub fn evaluate(brain: &TraderBrain, ctx: &TraderContext) -> TraderUpdate {
    let no_change = TraderUpdate {
        new_state: brain.state,
        pending: brain.pending,
        action: TraderAction::None,
        state_changed: false,
    };

    let Some(planet) = ctx.planets.get(brain.state.planet()) else {
        return no_change;
    };

    if let Some(pending) = brain.pending {
        if ctx.now_ms >= pending.due_at_ms {
            return enter(pending.next, ctx);
        }
        return no_change;
    }

    match brain.state {
        TraderState::Travel { planet: index } => {
            let target = DVec2::new(planet.x, planet.y);
            if ctx.position.distance(target) <= planet.dock_radius {
                TraderUpdate {
                    new_state: TraderState::Docking { planet: index },
                    pending: Some(PendingTransition {
                        due_at_ms: ctx.now_ms + DOCKING_DURATION_MS,
                        next: TraderState::Docked { planet: index },
                    }),
                    action: TraderAction::Halt,
                    state_changed: true,
                }
            } else if !ctx.moving {
                TraderUpdate {
                    action: TraderAction::PlanTo(target),
                    ..no_change
                }
            } else {
                no_change
            }
        }
        // Waiting states always carry a pending transition; re-arm if lost.
        TraderState::Docking { .. } | TraderState::Docked { .. } | TraderState::Undocking { .. } => {
            enter(brain.state, ctx)
        }
    }
}

/// Enter `state` now, scheduling its follow-up transition.
fn enter(state: TraderState, ctx: &TraderContext) -> TraderUpdate {
    let (pending, action) = match state {
        TraderState::Travel { planet } => {
            let action = ctx
                .planets
                .get(planet)
                .map_or(TraderAction::Halt, |p| TraderAction::PlanTo(DVec2::new(p.x, p.y)));
            (None, action)
        }
        TraderState::Docking { planet } => (
            Some(PendingTransition {
                due_at_ms: ctx.now_ms + DOCKING_DURATION_MS,
                next: TraderState::Docked { planet },
            }),
            TraderAction::Halt,
        ),
        TraderState::Docked { planet } => (
            Some(PendingTransition {
                due_at_ms: ctx.now_ms + DOCKED_DURATION_MS,
                next: TraderState::Undocking { planet },
            }),
            TraderAction::Halt,
        ),
        TraderState::Undocking { .. } => (
            Some(PendingTransition {
                due_at_ms: ctx.now_ms + UNDOCKING_DURATION_MS,
                next: TraderState::Travel {
                    planet: ctx.next_destination,
                },
            }),
            TraderAction::Halt,
        ),
    };
    TraderUpdate {
        new_state: state,
        pending,
        action,
        state_changed: true,
    }
}

/// Pick the next planet from a random `roll`, never repeating `current`
/// when there is any alternative.
pub fn next_planet(current: usize, count: usize, roll: usize) -> usize {
    match count {
        0 => 0,
        1 => 0,
        _ => (current + 1 + roll % (count - 1)) % count,
    }
}
