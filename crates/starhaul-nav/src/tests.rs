use std::cell::Cell;

use glam::DVec2;

use starhaul_core::config::{MovementConfig, PlanetDef};
use starhaul_core::constants::*;
use starhaul_core::types::KinematicState;

use crate::follower::FollowStatus;
use crate::movement::{MovementManager, MovementMode, TargetRef};
use crate::trader::{
    evaluate, next_planet, PendingTransition, TraderAction, TraderBrain, TraderContext,
    TraderState,
};

fn manager() -> MovementManager<u32> {
    MovementManager::new(MovementConfig::default())
}

fn no_objects(_: u32) -> Option<DVec2> {
    None
}

// ---------------------------------------------------------------------
// Movement manager
// ---------------------------------------------------------------------

#[test]
fn test_move_to_arrives_and_goes_idle() {
    let mut mgr = manager();
    let mut state = KinematicState::default();
    let goal = DVec2::new(400.0, 150.0);

    assert!(mgr.move_to(&state, goal));
    assert!(mgr.is_moving());
    assert_eq!(mgr.get_target(), Some(goal));
    assert!(mgr.trajectory().is_some());

    let mut arrived = false;
    for tick in 0..3000 {
        let now = tick as f64 * TICK_MS;
        if mgr.update(&mut state, TICK_MS, now, no_objects) == FollowStatus::Arrived {
            arrived = true;
            break;
        }
    }
    assert!(arrived, "agent should arrive; state {state:?}");
    assert_eq!(state.position(), goal);
    assert_eq!(*mgr.mode(), MovementMode::Idle);
    assert_eq!(mgr.get_target(), None);
    assert!(mgr.trajectory().is_none());
}

#[test]
fn test_follow_path_ignores_short_input() {
    let mut mgr = manager();
    assert!(!mgr.follow_path(vec![DVec2::new(10.0, 10.0)]));
    assert!(!mgr.follow_path(Vec::new()));
    assert_eq!(*mgr.mode(), MovementMode::Idle);
    assert!(!mgr.is_moving());
}

#[test]
fn test_follow_path_flies_polyline() {
    let mut mgr = manager();
    let mut state = KinematicState::default();
    let end = DVec2::new(300.0, 300.0);
    assert!(mgr.follow_path(vec![DVec2::ZERO, DVec2::new(300.0, 0.0), end]));
    assert_eq!(mgr.trajectory().map(|t| t.length), Some(600.0));

    for tick in 0..3000 {
        mgr.update(&mut state, TICK_MS, tick as f64 * TICK_MS, no_objects);
        if !mgr.is_moving() {
            break;
        }
    }
    assert_eq!(state.position(), end);
    assert_eq!(*mgr.mode(), MovementMode::Idle);
}

#[test]
fn test_follow_point_holds_standoff() {
    let mut mgr = manager();
    let mut state = KinematicState::default();
    let point = DVec2::new(1000.0, 0.0);
    mgr.follow_target(point, 200.0);

    for tick in 0..1800 {
        mgr.update(&mut state, TICK_MS, tick as f64 * TICK_MS, no_objects);
    }
    let dist = state.position().distance(point);
    assert!((dist - 200.0).abs() < 20.0, "expected ~200 standoff, got {dist}");
    assert_eq!(mgr.get_target(), Some(point));
}

#[test]
fn test_pursue_replans_only_on_drift() {
    let mut mgr = manager();
    let mut state = KinematicState::default();
    let target = Cell::new(DVec2::new(500.0, 0.0));
    let resolve = |_: u32| Some(target.get());

    mgr.pursue_target(7);
    mgr.update(&mut state, TICK_MS, 0.0, resolve);
    assert_eq!(
        *mgr.mode(),
        MovementMode::Pursue {
            target: 7,
            planned_goal: Some(DVec2::new(500.0, 0.0)),
        }
    );

    // Small drift: keep the old plan
    target.set(DVec2::new(550.0, 0.0));
    mgr.update(&mut state, TICK_MS, TICK_MS, resolve);
    assert!(matches!(
        *mgr.mode(),
        MovementMode::Pursue { planned_goal: Some(g), .. } if g == DVec2::new(500.0, 0.0)
    ));

    // Past the threshold: replan onto the live position
    target.set(DVec2::new(500.0, PURSUE_DRIFT_THRESHOLD + 20.0));
    mgr.update(&mut state, TICK_MS, 2.0 * TICK_MS, resolve);
    assert!(matches!(
        *mgr.mode(),
        MovementMode::Pursue { planned_goal: Some(g), .. } if g == target.get()
    ));
    assert_eq!(
        mgr.trajectory().and_then(|t| t.last_point()),
        Some(target.get())
    );
}

#[test]
fn test_lost_target_drops_to_idle() {
    let mut mgr = manager();
    let mut state = KinematicState::default();
    let alive = Cell::new(true);
    let resolve = |_: u32| alive.get().then_some(DVec2::new(300.0, 0.0));

    mgr.follow_object(3, 50.0);
    mgr.update(&mut state, TICK_MS, 0.0, resolve);
    assert!(mgr.is_moving());

    alive.set(false);
    let status = mgr.update(&mut state, TICK_MS, TICK_MS, resolve);
    assert_eq!(status, FollowStatus::Idle);
    assert_eq!(*mgr.mode(), MovementMode::Idle);
    assert!(!mgr.is_moving());
}

#[test]
fn test_orbit_plans_lap_at_radius() {
    let mut mgr = manager();
    let mut state = KinematicState::new(300.0, 0.0, 0.0, 0.0);
    let center = DVec2::ZERO;
    mgr.orbit_target(center, 150.0);
    mgr.update(&mut state, TICK_MS, 0.0, no_objects);

    assert!(matches!(
        *mgr.mode(),
        MovementMode::Orbit { target: TargetRef::Point(_), radius } if radius == 150.0
    ));
    let traj = mgr.trajectory().expect("orbit should install a path");
    assert_eq!(traj.points.len(), ORBIT_SAMPLES + 1);
    for p in &traj.points[1..] {
        assert!((p.distance(center) - 150.0).abs() < 1e-9);
    }
}

#[test]
fn test_orbit_replans_on_interval() {
    let mut mgr = manager();
    let mut state = KinematicState::new(300.0, 0.0, 0.0, 0.0);
    mgr.orbit_target(DVec2::ZERO, 150.0);
    mgr.update(&mut state, TICK_MS, 0.0, no_objects);
    let first = mgr.trajectory().cloned();

    // Inside the interval: same plan
    mgr.update(&mut state, TICK_MS, FOLLOW_REPLAN_INTERVAL_MS / 2.0, no_objects);
    assert_eq!(mgr.trajectory().cloned(), first);

    mgr.update(&mut state, TICK_MS, FOLLOW_REPLAN_INTERVAL_MS, no_objects);
    assert_ne!(mgr.trajectory().cloned(), first);
}

#[test]
fn test_stop_clears_everything() {
    let mut mgr = manager();
    let state = KinematicState::default();
    mgr.move_to(&state, DVec2::new(100.0, 0.0));
    mgr.stop();
    mgr.stop();
    assert_eq!(*mgr.mode(), MovementMode::Idle);
    assert_eq!(mgr.get_target(), None);
    assert!(!mgr.is_moving());
}

// ---------------------------------------------------------------------
// Trader FSM
// ---------------------------------------------------------------------

fn planets() -> Vec<PlanetDef> {
    vec![
        PlanetDef {
            name: "A".into(),
            x: 0.0,
            y: 0.0,
            dock_radius: 50.0,
        },
        PlanetDef {
            name: "B".into(),
            x: 1000.0,
            y: 0.0,
            dock_radius: 50.0,
        },
    ]
}

fn ctx(planets: &[PlanetDef], now_ms: f64, position: DVec2, moving: bool) -> TraderContext<'_> {
    TraderContext {
        now_ms,
        position,
        moving,
        planets,
        next_destination: 0,
    }
}

#[test]
fn test_trader_idle_far_away_plans_to_planet() {
    let planets = planets();
    let brain = TraderBrain::new(1);
    let update = evaluate(&brain, &ctx(&planets, 0.0, DVec2::ZERO, false));
    assert!(!update.state_changed);
    assert_eq!(update.action, TraderAction::PlanTo(DVec2::new(1000.0, 0.0)));

    // Already en route: leave it alone
    let update = evaluate(&brain, &ctx(&planets, 0.0, DVec2::ZERO, true));
    assert_eq!(update.action, TraderAction::None);
}

#[test]
fn test_trader_starts_docking_inside_radius() {
    let planets = planets();
    let brain = TraderBrain::new(1);
    let update = evaluate(&brain, &ctx(&planets, 100.0, DVec2::new(970.0, 0.0), true));
    assert!(update.state_changed);
    assert_eq!(update.new_state, TraderState::Docking { planet: 1 });
    assert_eq!(update.action, TraderAction::Halt);
    assert_eq!(
        update.pending,
        Some(PendingTransition {
            due_at_ms: 100.0 + DOCKING_DURATION_MS,
            next: TraderState::Docked { planet: 1 },
        })
    );
}

#[test]
fn test_trader_waits_for_pending_transition() {
    let planets = planets();
    let mut brain = TraderBrain::new(1);
    let pos = DVec2::new(1000.0, 0.0);
    brain.apply(&evaluate(&brain, &ctx(&planets, 0.0, pos, false)));
    assert_eq!(brain.state, TraderState::Docking { planet: 1 });

    let early = evaluate(&brain, &ctx(&planets, DOCKING_DURATION_MS - 1.0, pos, false));
    assert!(!early.state_changed);

    let due = evaluate(&brain, &ctx(&planets, DOCKING_DURATION_MS, pos, false));
    assert!(due.state_changed);
    assert_eq!(due.new_state, TraderState::Docked { planet: 1 });
    brain.apply(&due);
    assert_eq!(brain.trips_completed, 1);
}

#[test]
fn test_trader_full_cycle_departs_for_next_destination() {
    let planets = planets();
    let mut brain = TraderBrain::new(1);
    let pos = DVec2::new(1000.0, 0.0);
    let mut now = 0.0;
    let mut seen = Vec::new();

    for _ in 0..4 {
        let update = evaluate(&brain, &ctx(&planets, now, pos, false));
        if update.state_changed {
            seen.push(update.new_state);
        }
        brain.apply(&update);
        now += DOCKED_DURATION_MS;
    }

    assert_eq!(
        seen,
        vec![
            TraderState::Docking { planet: 1 },
            TraderState::Docked { planet: 1 },
            TraderState::Undocking { planet: 1 },
            TraderState::Travel { planet: 0 },
        ]
    );
    assert!(brain.pending.is_none());
}

#[test]
fn test_trader_with_unknown_planet_does_nothing() {
    let planets = planets();
    let brain = TraderBrain::new(9);
    let update = evaluate(&brain, &ctx(&planets, 0.0, DVec2::ZERO, false));
    assert!(!update.state_changed);
    assert_eq!(update.action, TraderAction::None);
}

#[test]
fn test_next_planet_never_repeats_current() {
    for count in 2..6 {
        for current in 0..count {
            for roll in 0..20 {
                let next = next_planet(current, count, roll);
                assert_ne!(next, current);
                assert!(next < count);
            }
        }
    }
    assert_eq!(next_planet(0, 1, 5), 0);
}
