//! Kinematic trajectory planning.
//!
//! Two strategies, both pure functions of their inputs:
//! - `plan_dubins_like`: a circular arc sized from the turn rate, then a
//!   straight segment to the goal. Cheap; used for planning and telemetry.
//! - `simulate_kinematic_path`: a fixed-step forward integration of the
//!   steering model. Approximates what the path follower will actually fly,
//!   so path previews must use it.

use glam::DVec2;

use starhaul_core::config::MovementConfig;
use starhaul_core::constants::*;
use starhaul_core::types::{angle_delta, KinematicState, Trajectory};

/// Arc sampled around a turning circle.
struct Arc {
    points: Vec<DVec2>,
    end: DVec2,
    length: f64,
}

/// Plan an arc-then-straight path from `start` to `goal`.
///
/// The arc radius depends on the speed it is flown at. A first pass guesses
/// that speed from `max(current, 0.6 * max_speed)`; the second pass refits it
/// to the speed from which the straight leg can exactly brake to rest,
/// clamped to `[current, max_speed]`.
pub fn plan_dubins_like(start: &KinematicState, goal: DVec2, mv: &MovementConfig) -> Trajectory {
    let origin = start.position();
    let to_goal = goal - origin;
    if to_goal.length_squared() < EPSILON * EPSILON {
        return Trajectory::new(vec![origin, goal], 0.0);
    }

    let desired = to_goal.y.atan2(to_goal.x);
    let delta = angle_delta(start.heading_rad, desired);
    let turn_angle = delta.abs();
    let turn_sign = if delta >= 0.0 { 1.0 } else { -1.0 };

    let guess_speed = start.speed.max(CRUISE_SPEED_GUESS_FACTOR * mv.max_speed);
    let first = build_arc(start, guess_speed, turn_angle, turn_sign, mv);

    let straight = first.end.distance(goal);
    let floor = start.speed.min(mv.max_speed);
    let fit_speed = (2.0 * mv.deceleration * straight)
        .sqrt()
        .clamp(floor, mv.max_speed.max(floor));
    let arc = build_arc(start, fit_speed, turn_angle, turn_sign, mv);

    let straight = arc.end.distance(goal);
    let mut points = arc.points;
    points.push(goal);
    Trajectory::new(points, arc.length + straight)
}

/// Length of the arc-then-straight plan, without keeping the points.
pub fn estimate_remaining_distance(
    start: &KinematicState,
    goal: DVec2,
    mv: &MovementConfig,
) -> f64 {
    plan_dubins_like(start, goal, mv).length
}

fn build_arc(
    start: &KinematicState,
    speed: f64,
    turn_angle: f64,
    turn_sign: f64,
    mv: &MovementConfig,
) -> Arc {
    let origin = start.position();
    if turn_angle <= EPSILON {
        return Arc {
            points: vec![origin],
            end: origin,
            length: 0.0,
        };
    }

    let radius = speed / mv.turn_rate_rad.max(EPSILON);
    let h = start.heading_rad;
    // Left-hand normal of the heading, flipped for right turns.
    let normal = DVec2::new(-h.sin(), h.cos());
    let center = origin + normal * radius * turn_sign;
    let phi0 = h - turn_sign * std::f64::consts::FRAC_PI_2;

    let samples = ((turn_angle / std::f64::consts::TAU) * ARC_SAMPLES_PER_TURN)
        .ceil()
        .max(MIN_ARC_SAMPLES as f64) as usize;

    let mut points = Vec::with_capacity(samples + 2);
    points.push(origin);
    for k in 1..=samples {
        let phi = phi0 + turn_sign * turn_angle * (k as f64 / samples as f64);
        points.push(center + DVec2::new(phi.cos(), phi.sin()) * radius);
    }
    let end = *points.last().unwrap_or(&origin);

    Arc {
        points,
        end,
        length: radius * turn_angle,
    }
}

/// Forward-simulate the steering model from `start` toward `goal`.
///
/// Runs at `SIM_DT` for at most `MAX_SIM_STEPS`. A sample is kept every
/// `SIM_SAMPLE_SPACING` units of travel. Once remaining distance falls within
/// the stopping distance the agent brakes with heading frozen and never
/// resumes normal flight. On arrival or full stop the goal is appended
/// exactly; if the step cap runs out, the last simulated position closes the
/// path instead.
pub fn simulate_kinematic_path(
    start: &KinematicState,
    goal: DVec2,
    mv: &MovementConfig,
) -> Trajectory {
    let dt = SIM_DT;
    let mut state = *start;
    let mut points = vec![state.position()];
    let mut length = 0.0;
    let mut since_sample = 0.0;
    let mut braking = false;

    for _ in 0..MAX_SIM_STEPS {
        let pos = state.position();
        let remaining = pos.distance(goal);

        let arrive_radius = ARRIVAL_MIN_RADIUS.max(state.speed * dt + ARRIVAL_MARGIN);
        if remaining < arrive_radius && state.speed < ARRIVAL_MAX_SPEED {
            length += remaining;
            points.push(goal);
            return Trajectory::new(points, length);
        }

        if !braking && remaining <= mv.stopping_distance(state.speed) {
            braking = true;
        }

        if braking {
            state.speed = (state.speed - mv.deceleration * dt).max(0.0);
            if state.speed <= BRAKE_STOP_SPEED {
                length += remaining;
                points.push(goal);
                return Trajectory::new(points, length);
            }
        } else {
            steer_toward(&mut state, goal, mv, dt);
        }

        let step = state.forward() * state.speed * dt;
        state.set_position(pos + step);
        let travelled = step.length();
        length += travelled;
        since_sample += travelled;
        if since_sample >= SIM_SAMPLE_SPACING {
            points.push(state.position());
            since_sample = 0.0;
        }
    }

    let last = state.position();
    if points.last() != Some(&last) {
        points.push(last);
    }
    Trajectory::new(points, length)
}

/// One tick of the "moving" mode: turn, maneuver, or accelerate.
fn steer_toward(state: &mut KinematicState, goal: DVec2, mv: &MovementConfig, dt: f64) {
    let to_goal = goal - state.position();
    let desired = to_goal.y.atan2(to_goal.x);
    let error = angle_delta(state.heading_rad, desired);

    if error.abs() > mv.thrust_angle_tolerance_rad {
        if state.speed >= mv.min_turn_speed {
            let max_turn = mv.turn_rate_rad * dt;
            state.heading_rad += error.clamp(-max_turn, max_turn);
            let speed_ratio = state.speed / mv.max_speed.max(EPSILON);
            let decay = mv.turn_deceleration * (1.0 + speed_ratio * mv.high_speed_turn_penalty);
            state.speed = (state.speed - decay * dt).max(0.0);
        } else {
            // Too slow to turn: thrust straight to gain turn authority.
            state.speed = (state.speed + mv.maneuver_thrust * dt).min(mv.max_speed);
        }
    } else {
        state.speed = (state.speed + mv.acceleration * dt).min(mv.max_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn mv() -> MovementConfig {
        MovementConfig {
            max_speed: 200.0,
            turn_rate_rad: PI,
            ..MovementConfig::default()
        }
    }

    #[test]
    fn test_straight_ahead_plan_reaches_goal() {
        let start = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        let goal = DVec2::new(1000.0, 0.0);
        let traj = plan_dubins_like(&start, goal, &mv());

        let last = traj.last_point().unwrap();
        assert!(last.distance(goal) < 3.0, "last point {last:?}");
        assert!(traj.length >= 1000.0 - 1e-9, "length {}", traj.length);
    }

    #[test]
    fn test_turning_plan_starts_with_arc() {
        // Goal directly behind-left: the plan must curve before the straight leg
        let start = KinematicState::new(0.0, 0.0, 0.0, 50.0);
        let goal = DVec2::new(-400.0, 300.0);
        let traj = plan_dubins_like(&start, goal, &mv());

        assert!(traj.points.len() > MIN_ARC_SAMPLES + 1);
        assert_eq!(traj.points[0], start.position());
        assert_eq!(traj.last_point(), Some(goal));
        // Left turn: early arc samples have positive y
        assert!(traj.points[2].y > 0.0);
        assert!(traj.length > start.position().distance(goal));
    }

    #[test]
    fn test_arc_radius_refit_to_reachable_speed() {
        // Short hop: the refit speed is lower than the cruise guess,
        // so the arc is tighter than a 0.6*max_speed arc would be.
        let start = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        let goal = DVec2::new(0.0, 40.0);
        let m = mv();
        let traj = plan_dubins_like(&start, goal, &m);
        let guess_radius = CRUISE_SPEED_GUESS_FACTOR * m.max_speed / m.turn_rate_rad;
        let max_excursion = traj
            .points
            .iter()
            .map(|p| p.length())
            .fold(0.0_f64, f64::max);
        assert!(max_excursion < 2.0 * guess_radius + 40.0);
        assert_eq!(traj.last_point(), Some(goal));
    }

    #[test]
    fn test_estimate_matches_plan_length() {
        let start = KinematicState::new(10.0, -5.0, 1.0, 80.0);
        let goal = DVec2::new(-300.0, 200.0);
        let m = mv();
        assert_eq!(
            estimate_remaining_distance(&start, goal, &m),
            plan_dubins_like(&start, goal, &m).length
        );
    }

    #[test]
    fn test_simulation_from_rest_ends_exactly_at_goal() {
        let m = MovementConfig {
            deceleration: 5.0,
            ..mv()
        };
        let start = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        let goal = DVec2::new(50.0, 0.0);
        let traj = simulate_kinematic_path(&start, goal, &m);
        assert_eq!(traj.last_point(), Some(goal));
        assert!(traj.length >= 50.0 - 1e-6);
    }

    #[test]
    fn test_simulation_turns_around_and_arrives() {
        let start = KinematicState::new(0.0, 0.0, 0.0, 100.0);
        let goal = DVec2::new(-500.0, 0.0);
        let traj = simulate_kinematic_path(&start, goal, &mv());
        assert_eq!(traj.last_point(), Some(goal));
        // Samples are compressed: far fewer points than steps
        assert!(traj.points.len() < MAX_SIM_STEPS / 4);
    }

    #[test]
    fn test_simulation_respects_step_cap() {
        // Goal far beyond 20 seconds of flight: stops at the cap without the goal
        let start = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        let goal = DVec2::new(1_000_000.0, 0.0);
        let traj = simulate_kinematic_path(&start, goal, &mv());
        let last = traj.last_point().unwrap();
        assert_ne!(last, goal);
        assert!(last.x > 0.0 && last.x <= mv().max_speed * MAX_SIM_STEPS as f64 * SIM_DT);
    }

    #[test]
    fn test_too_slow_to_turn_accelerates_straight() {
        let m = MovementConfig {
            min_turn_speed: 50.0,
            maneuver_thrust: 30.0,
            ..mv()
        };
        let mut state = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        steer_toward(&mut state, DVec2::new(0.0, 100.0), &m, SIM_DT);
        assert_eq!(state.heading_rad, 0.0);
        assert!((state.speed - 30.0 * SIM_DT).abs() < 1e-12);
    }

    #[test]
    fn test_turn_is_rate_limited() {
        let m = mv();
        let mut state = KinematicState::new(0.0, 0.0, 0.0, 100.0);
        steer_toward(&mut state, DVec2::new(-100.0, 1.0), &m, SIM_DT);
        assert!((state.heading_rad - m.turn_rate_rad * SIM_DT).abs() < 1e-12);
    }
}
