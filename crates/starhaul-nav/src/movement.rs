//! Agent movement modes built on the planner and path follower.
//!
//! A `MovementManager` owns one agent's commanded mode and its follower.
//! Modes that track something (follow, orbit, pursue) replan periodically
//! or on drift rather than every tick. Replanning swaps in a whole new
//! trajectory; the previous one is discarded, never edited.

use glam::DVec2;
use tracing::debug;

use starhaul_core::config::MovementConfig;
use starhaul_core::constants::*;
use starhaul_core::types::{KinematicState, Trajectory};

use crate::follower::{FollowStatus, PathFollower};
use crate::pathfinding::{PathRequest, PathfindingManager};

/// Something to steer relative to: a live object or a fixed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetRef<T> {
    Object(T),
    Point(DVec2),
}

/// Commanded movement mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementMode<T> {
    Idle,
    MoveTo { goal: DVec2 },
    FollowPath { end: DVec2 },
    /// Hold `standoff` distance from the target.
    Follow { target: TargetRef<T>, standoff: f64 },
    /// Circle the target at `radius`.
    Orbit { target: TargetRef<T>, radius: f64 },
    /// Chase a moving object, replanning when it drifts from the planned goal.
    Pursue {
        target: T,
        planned_goal: Option<DVec2>,
    },
}

/// Per-agent movement controller.
#[derive(Debug, Clone)]
pub struct MovementManager<T> {
    pathfinder: PathfindingManager,
    follower: PathFollower,
    mode: MovementMode<T>,
    trajectory: Option<Trajectory>,
    last_plan_ms: Option<f64>,
    last_target: Option<DVec2>,
}

impl<T: Copy + PartialEq + std::fmt::Debug> MovementManager<T> {
    pub fn new(movement: MovementConfig) -> Self {
        Self {
            pathfinder: PathfindingManager::new(movement),
            follower: PathFollower::new(),
            mode: MovementMode::Idle,
            trajectory: None,
            last_plan_ms: None,
            last_target: None,
        }
    }

    pub fn movement(&self) -> &MovementConfig {
        self.pathfinder.movement()
    }

    pub fn pathfinder(&self) -> &PathfindingManager {
        &self.pathfinder
    }

    pub fn mode(&self) -> &MovementMode<T> {
        &self.mode
    }

    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// The trajectory currently being flown, if any.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref().filter(|_| self.follower.is_active())
    }

    pub fn is_moving(&self) -> bool {
        self.follower.is_active()
    }

    /// Current commanded target position, for HUD and aim-line rendering.
    pub fn get_target(&self) -> Option<DVec2> {
        match self.mode {
            MovementMode::Idle => None,
            MovementMode::MoveTo { goal } => Some(goal),
            MovementMode::FollowPath { end } => Some(end),
            MovementMode::Follow { .. }
            | MovementMode::Orbit { .. }
            | MovementMode::Pursue { .. } => self.last_target,
        }
    }

    /// Plan and fly to `goal`.
    pub fn move_to(&mut self, state: &KinematicState, goal: DVec2) -> bool {
        self.mode = MovementMode::MoveTo { goal };
        self.last_target = Some(goal);
        self.replan(state, goal)
    }

    /// Fly a caller-supplied polyline directly. Ignored below two points.
    pub fn follow_path(&mut self, points: Vec<DVec2>) -> bool {
        let Some(&end) = points.last() else {
            return false;
        };
        let trajectory = polyline_trajectory(points);
        if !self.install(trajectory) {
            return false;
        }
        self.mode = MovementMode::FollowPath { end };
        self.last_target = Some(end);
        true
    }

    /// Keep `standoff` from a moving object.
    pub fn follow_object(&mut self, object: T, standoff: f64) {
        self.set_tracking_mode(MovementMode::Follow {
            target: TargetRef::Object(object),
            standoff: standoff.max(0.0),
        });
    }

    /// Keep `standoff` from a fixed point.
    pub fn follow_target(&mut self, point: DVec2, standoff: f64) {
        self.set_tracking_mode(MovementMode::Follow {
            target: TargetRef::Point(point),
            standoff: standoff.max(0.0),
        });
    }

    pub fn orbit_object(&mut self, object: T, radius: f64) {
        self.set_tracking_mode(MovementMode::Orbit {
            target: TargetRef::Object(object),
            radius: radius.max(ARRIVAL_MIN_RADIUS),
        });
    }

    pub fn orbit_target(&mut self, point: DVec2, radius: f64) {
        self.set_tracking_mode(MovementMode::Orbit {
            target: TargetRef::Point(point),
            radius: radius.max(ARRIVAL_MIN_RADIUS),
        });
    }

    pub fn pursue_target(&mut self, object: T) {
        self.set_tracking_mode(MovementMode::Pursue {
            target: object,
            planned_goal: None,
        });
    }

    /// Drop the current mode and path.
    pub fn stop(&mut self) {
        self.mode = MovementMode::Idle;
        self.follower.stop();
        self.trajectory = None;
        self.last_plan_ms = None;
        self.last_target = None;
    }

    /// Replan as the mode requires, then advance the follower one tick.
    ///
    /// `resolve` returns the live position of an object, or `None` once it
    /// is gone; a lost object drops the agent back to `Idle`.
    pub fn update(
        &mut self,
        state: &mut KinematicState,
        dt_ms: f64,
        now_ms: f64,
        resolve: impl Fn(T) -> Option<DVec2>,
    ) -> FollowStatus {
        match self.mode {
            MovementMode::Idle | MovementMode::MoveTo { .. } | MovementMode::FollowPath { .. } => {}
            MovementMode::Follow { target, standoff } => {
                let Some(p) = resolve_ref(target, &resolve) else {
                    return self.target_lost();
                };
                self.last_target = Some(p);
                if self.replan_due(now_ms) {
                    self.last_plan_ms = Some(now_ms);
                    let offset = state.position() - p;
                    if offset.length() > standoff + ARRIVAL_MIN_RADIUS {
                        let goal = p + offset.normalize_or_zero() * standoff;
                        self.replan(state, goal);
                    }
                }
            }
            MovementMode::Orbit { target, radius } => {
                let Some(p) = resolve_ref(target, &resolve) else {
                    return self.target_lost();
                };
                self.last_target = Some(p);
                if self.replan_due(now_ms) {
                    self.last_plan_ms = Some(now_ms);
                    let points = orbit_points(state.position(), p, radius);
                    self.install(polyline_trajectory(points));
                }
            }
            MovementMode::Pursue {
                target,
                planned_goal,
            } => {
                let Some(p) = resolve(target) else {
                    return self.target_lost();
                };
                self.last_target = Some(p);
                let drifted = planned_goal.map_or(true, |g| g.distance(p) > PURSUE_DRIFT_THRESHOLD);
                let stalled =
                    !self.follower.is_active() && state.position().distance(p) > PURSUE_DRIFT_THRESHOLD;
                if drifted || stalled {
                    self.replan(state, p);
                    self.last_plan_ms = Some(now_ms);
                    self.mode = MovementMode::Pursue {
                        target,
                        planned_goal: Some(p),
                    };
                }
            }
        }

        let status = self.follower.update(state, dt_ms, self.pathfinder.movement());
        if status == FollowStatus::Arrived
            && matches!(
                self.mode,
                MovementMode::MoveTo { .. } | MovementMode::FollowPath { .. }
            )
        {
            self.mode = MovementMode::Idle;
            self.trajectory = None;
        }
        status
    }

    fn set_tracking_mode(&mut self, mode: MovementMode<T>) {
        self.follower.stop();
        self.trajectory = None;
        self.last_plan_ms = None;
        self.last_target = None;
        self.mode = mode;
    }

    fn replan_due(&self, now_ms: f64) -> bool {
        self.last_plan_ms
            .map_or(true, |t| now_ms - t >= FOLLOW_REPLAN_INTERVAL_MS)
    }

    fn replan(&mut self, state: &KinematicState, goal: DVec2) -> bool {
        let trajectory = self.pathfinder.plan_path(&PathRequest::new(*state, goal));
        self.install(trajectory)
    }

    /// Swap in a new trajectory as a unit.
    fn install(&mut self, trajectory: Trajectory) -> bool {
        if self.follower.follow(trajectory.points.clone()) {
            self.trajectory = Some(trajectory);
            true
        } else {
            false
        }
    }

    fn target_lost(&mut self) -> FollowStatus {
        debug!(mode = ?self.mode, "movement target lost");
        self.stop();
        FollowStatus::Idle
    }
}

fn resolve_ref<T: Copy>(target: TargetRef<T>, resolve: &impl Fn(T) -> Option<DVec2>) -> Option<DVec2> {
    match target {
        TargetRef::Object(object) => resolve(object),
        TargetRef::Point(p) => Some(p),
    }
}

fn polyline_trajectory(points: Vec<DVec2>) -> Trajectory {
    let length = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    Trajectory::new(points, length)
}

/// One counter-clockwise lap around `center`, starting from the agent's bearing.
fn orbit_points(from: DVec2, center: DVec2, radius: f64) -> Vec<DVec2> {
    let offset = from - center;
    let a0 = offset.y.atan2(offset.x);
    let mut points = Vec::with_capacity(ORBIT_SAMPLES + 1);
    points.push(from);
    for k in 1..=ORBIT_SAMPLES {
        let a = a0 + std::f64::consts::TAU * (k as f64 / ORBIT_SAMPLES as f64);
        points.push(center + DVec2::from_angle(a) * radius);
    }
    points
}
