//! Player ship pose save/load.
//!
//! The save record is intentionally minimal: position, heading, camera zoom.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SaveError;
use crate::types::KinematicState;

/// Persisted player pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipPose {
    pub x: f64,
    pub y: f64,
    pub heading_rad: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for ShipPose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            heading_rad: 0.0,
            zoom: default_zoom(),
        }
    }
}

impl ShipPose {
    pub fn from_state(state: &KinematicState, zoom: f64) -> Self {
        Self {
            x: state.x,
            y: state.y,
            heading_rad: state.heading_rad,
            zoom,
        }
    }

    /// A stationary kinematic state at this pose.
    pub fn to_state(&self) -> KinematicState {
        KinematicState::new(self.x, self.y, self.heading_rad, 0.0)
    }
}

pub fn save_pose(path: &Path, pose: &ShipPose) -> Result<(), SaveError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(pose)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_pose(path: &Path) -> Result<ShipPose, SaveError> {
    let json = fs::read_to_string(path)?;
    let pose: ShipPose = serde_json::from_str(&json)?;
    Ok(pose)
}

/// Load a pose, or start at the origin if the file is absent or unreadable.
pub fn load_pose_or_default(path: &Path) -> ShipPose {
    match load_pose(path) {
        Ok(pose) => pose,
        Err(SaveError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => ShipPose::default(),
        Err(error) => {
            warn!(path = %path.display(), %error, "pose load failed, starting at origin");
            ShipPose::default()
        }
    }
}
