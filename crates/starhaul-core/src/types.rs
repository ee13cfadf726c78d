//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Instantaneous pose of a moving agent.
///
/// Heading is in radians, 0 = +x, counter-clockwise positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub x: f64,
    pub y: f64,
    pub heading_rad: f64,
    pub speed: f64,
}

impl KinematicState {
    pub fn new(x: f64, y: f64, heading_rad: f64, speed: f64) -> Self {
        Self {
            x,
            y,
            heading_rad,
            speed,
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: DVec2) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Unit vector along the current heading.
    pub fn forward(&self) -> DVec2 {
        DVec2::from_angle(self.heading_rad)
    }

    /// Velocity implied by heading and speed.
    pub fn velocity(&self) -> DVec2 {
        self.forward() * self.speed
    }
}

/// An immutable planned path. Superseded, never mutated, on replanning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<DVec2>,
    pub length: f64,
}

impl Trajectory {
    pub fn new(points: Vec<DVec2>, length: f64) -> Self {
        Self { points, length }
    }

    pub fn last_point(&self) -> Option<DVec2> {
        self.points.last().copied()
    }

    /// A trajectory is followable once it has at least two points.
    pub fn is_followable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Weapon slot on a shooter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SlotKey(pub u32);

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Faction identifier used for relation lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

/// Simulation time tracking. Ticks may carry a variable delta.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    pub tick: u64,
    pub now_ms: f64,
}

impl SimTime {
    /// Advance by one tick of `delta_ms` (negative deltas are treated as zero).
    pub fn advance(&mut self, delta_ms: f64) {
        self.tick += 1;
        self.now_ms += delta_ms.max(0.0);
    }
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// Signed shortest rotation taking heading `from` onto heading `to`.
pub fn angle_delta(from: f64, to: f64) -> f64 {
    wrap_angle(to - from)
}
