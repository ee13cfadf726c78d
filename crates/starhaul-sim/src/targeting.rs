//! Aim-lead helpers for projectile weapons.
//!
//! Intercept time is only used for the initial firing angle. Homing
//! projectiles steer at the live target position after launch.

use glam::DVec2;

use starhaul_core::constants::{EPSILON, INTERCEPT_MAX_ITERATIONS, INTERCEPT_TOLERANCE};
use starhaul_core::types::KinematicState;

/// Time for a projectile at `projectile_speed` to reach a target at
/// relative offset `rel` moving with `target_vel`.
///
/// Fixed-point iteration seeded from straight-line time. Returns the last
/// estimate when it fails to converge; callers treat it as approximate.
/// A non-positive projectile speed yields 0 (aim directly).
pub fn calculate_intercept_time(rel: DVec2, target_vel: DVec2, projectile_speed: f64) -> f64 {
    if projectile_speed <= EPSILON {
        return 0.0;
    }
    let mut t = rel.length() / projectile_speed;
    for _ in 0..INTERCEPT_MAX_ITERATIONS {
        let future = rel + target_vel * t;
        let next = future.length() / projectile_speed;
        if (next - t).abs() < INTERCEPT_TOLERANCE * t.max(EPSILON) {
            return next;
        }
        t = next;
    }
    t
}

/// Velocity read from a target's movement state, or zero when it has none.
pub fn get_target_velocity(target: Option<&KinematicState>) -> DVec2 {
    target.map_or(DVec2::ZERO, KinematicState::velocity)
}

/// Predicted impact point for a shot fired from `origin`.
pub fn lead_point(origin: DVec2, target_pos: DVec2, target_vel: DVec2, projectile_speed: f64) -> DVec2 {
    let t = calculate_intercept_time(target_pos - origin, target_vel, projectile_speed);
    target_pos + target_vel * t
}

/// Firing angle (radians) toward the lead point.
pub fn lead_angle(origin: DVec2, target_pos: DVec2, target_vel: DVec2, projectile_speed: f64) -> f64 {
    let aim = lead_point(origin, target_pos, target_vel, projectile_speed) - origin;
    aim.y.atan2(aim.x)
}
