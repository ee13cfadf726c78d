//! Pathfinding façade: the single entry point for "plan a path from A to B".
//!
//! There is no navmesh. Obstacles and a dynamics override are accepted on
//! the request so callers can start passing them, but the geometry ignores
//! both: plans always use the manager's own movement profile.

use glam::DVec2;
use tracing::debug;

use starhaul_core::config::MovementConfig;
use starhaul_core::types::{KinematicState, Trajectory};

use crate::planner::{plan_dubins_like, simulate_kinematic_path};

/// Circular keep-out area. Not yet used by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: DVec2,
    pub radius: f64,
}

/// A planning request.
#[derive(Debug, Clone)]
pub struct PathRequest {
    pub start: KinematicState,
    pub goal: DVec2,
    /// Requested movement constraints. Not yet used by the planner.
    pub dynamics: Option<MovementConfig>,
    pub obstacles: Vec<Obstacle>,
}

impl PathRequest {
    pub fn new(start: KinematicState, goal: DVec2) -> Self {
        Self {
            start,
            goal,
            dynamics: None,
            obstacles: Vec::new(),
        }
    }
}

/// Stateless planner façade bound to a movement profile.
#[derive(Debug, Clone, Copy)]
pub struct PathfindingManager {
    movement: MovementConfig,
}

impl PathfindingManager {
    pub fn new(movement: MovementConfig) -> Self {
        Self { movement }
    }

    pub fn movement(&self) -> &MovementConfig {
        &self.movement
    }

    /// Plan an arc-then-straight trajectory.
    pub fn plan_path(&self, request: &PathRequest) -> Trajectory {
        if !request.obstacles.is_empty() {
            debug!(
                count = request.obstacles.len(),
                "obstacles ignored: no avoidance source"
            );
        }
        if request.dynamics.is_some() {
            debug!("dynamics override ignored: plans use the manager profile");
        }
        plan_dubins_like(&request.start, request.goal, &self.movement)
    }

    /// Forward-simulated path for UI previews; approximates what the
    /// follower will actually fly.
    pub fn preview_path(&self, start: &KinematicState, goal: DVec2) -> Trajectory {
        simulate_kinematic_path(start, goal, &self.movement)
    }
}
