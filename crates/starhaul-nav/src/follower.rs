//! Pure-pursuit path follower.
//!
//! Consumes a precomputed polyline and writes heading, speed, and position
//! back onto the agent's `KinematicState` every tick. The follower is the
//! sole per-tick writer of the agent's pose while it is active.

use glam::DVec2;
use tracing::debug;

use starhaul_core::config::MovementConfig;
use starhaul_core::constants::*;
use starhaul_core::types::{angle_delta, KinematicState};

use crate::polyline::Polyline;

/// Result of one follower tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowStatus {
    /// No path active.
    Idle,
    /// Still following; `remaining` is arclength left on the path.
    Following { remaining: f64 },
    /// Snapped onto the final point and stopped this tick.
    Arrived,
}

/// Per-agent path follower state.
#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    active: bool,
    path: Option<Polyline>,
    current_speed: f64,
    /// Furthest arclength reached on the current path.
    progress_s: f64,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start following `points`, replacing any in-flight path.
    ///
    /// Paths with fewer than two points are ignored. Returns whether the
    /// path was accepted.
    pub fn follow(&mut self, points: Vec<DVec2>) -> bool {
        match Polyline::new(points) {
            Some(path) => {
                self.path = Some(path);
                self.active = true;
                self.progress_s = 0.0;
                true
            }
            None => false,
        }
    }

    /// Deactivate. Safe to call repeatedly or mid-tick.
    pub fn stop(&mut self) {
        self.active = false;
        self.path = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn path(&self) -> Option<&Polyline> {
        self.path.as_ref()
    }

    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Advance the agent one tick of `dt_ms` along the active path.
    pub fn update(
        &mut self,
        state: &mut KinematicState,
        dt_ms: f64,
        mv: &MovementConfig,
    ) -> FollowStatus {
        if !self.active {
            return FollowStatus::Idle;
        }
        let Some(path) = self.path.as_ref() else {
            self.active = false;
            return FollowStatus::Idle;
        };

        let dt = dt_ms.max(0.0) / 1000.0;
        let pos = state.position();
        let mut speed = state.speed;

        // 1. Where are we along the path? Progress never runs backwards.
        let s = path.project_from(pos, self.progress_s - PROGRESS_BACKTRACK_SLACK);
        self.progress_s = self.progress_s.max(s);

        // 2. Pure-pursuit lookahead target.
        let lookahead = s + LOOKAHEAD_MIN.max(LOOKAHEAD_SPEED_FACTOR * speed);
        let target = path.point_at_s(lookahead);

        // 3. Bounded turn toward the lookahead point.
        let to_target = target - pos;
        let mut residual_error = 0.0;
        if to_target.length_squared() > EPSILON {
            let desired = to_target.y.atan2(to_target.x);
            let error = angle_delta(state.heading_rad, desired);
            let max_turn = mv.turn_rate_rad * dt;
            let turn = error.clamp(-max_turn, max_turn);
            state.heading_rad += turn;
            residual_error = error - turn;
        }

        // 4. Speed profile: brake once the remaining path fits the stopping distance.
        let end = path.last();
        let remaining = (path.total_len() - s).max(pos.distance(end));
        if remaining <= mv.stopping_distance(speed) + STOP_MARGIN {
            speed = (speed - mv.deceleration * dt).max(0.0);
        } else {
            speed = (speed + mv.acceleration * dt).min(mv.max_speed);
        }
        // While misaligned, keep the turn circle inside the distance to the
        // lookahead point so the agent cannot orbit its target.
        if residual_error.abs() > mv.thrust_angle_tolerance_rad {
            speed = speed.min(0.5 * mv.turn_rate_rad * to_target.length());
        }
        speed = speed.clamp(0.0, mv.max_speed.max(0.0));

        // 5. Integrate along the new heading.
        let new_pos = pos + state.forward() * speed * dt;
        state.set_position(new_pos);
        state.speed = speed;
        self.current_speed = speed;

        // 6. Same arrival rule as the forward simulator.
        let to_end = new_pos.distance(end);
        let arrive_radius = ARRIVAL_MIN_RADIUS.max(speed * dt + ARRIVAL_MARGIN);
        if to_end < arrive_radius && speed < ARRIVAL_MAX_SPEED {
            state.set_position(end);
            state.speed = 0.0;
            self.current_speed = 0.0;
            self.stop();
            debug!(x = end.x, y = end.y, "path complete");
            return FollowStatus::Arrived;
        }

        FollowStatus::Following { remaining }
    }
}
