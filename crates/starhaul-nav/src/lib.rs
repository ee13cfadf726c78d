//! Navigation for STARHAUL.
//!
//! Kinematic trajectory planning, pure-pursuit path following, and the
//! per-agent movement modes built on top of them. Also hosts the trader
//! NPC state machine, which only needs geometry and a clock.

pub mod follower;
pub mod movement;
pub mod pathfinding;
pub mod planner;
pub mod polyline;
pub mod trader;

pub use follower::{FollowStatus, PathFollower};
pub use movement::{MovementManager, MovementMode, TargetRef};
pub use pathfinding::{Obstacle, PathRequest, PathfindingManager};
pub use planner::{estimate_remaining_distance, plan_dubins_like, simulate_kinematic_path};
pub use starhaul_core as core;

#[cfg(test)]
mod tests;
