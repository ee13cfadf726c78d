//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Faction-pair hostility classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Open hostility: hits register as damage.
    Confrontation,
    #[default]
    Neutral,
    Ally,
    /// Same faction.
    Own,
}

impl Relation {
    /// Only confrontational relations ever register a hit.
    pub fn is_confrontational(self) -> bool {
        matches!(self, Relation::Confrontation)
    }
}

/// How a weapon delivers damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Straight-line projectile.
    #[default]
    Linear,
    /// Projectile that re-aims at the live target position every tick.
    Homing,
    /// Continuous-damage beam.
    Beam,
}

/// Visual shape of a projectile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileShape {
    #[default]
    Circle,
    Bolt,
    Diamond,
}

/// Result of resolving one projectile tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileOutcome {
    /// Still in flight.
    Flying,
    /// Damage applied; projectile consumed.
    Hit,
    /// Consumed without damage (lifetime over or invulnerable target).
    Expire,
    /// Target inactive or destroyed.
    TargetLost,
}

impl ProjectileOutcome {
    /// Whether the projectile is removed after this outcome.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProjectileOutcome::Flying)
    }
}

/// Ship role within the star system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    #[default]
    Player,
    Trader,
    Pirate,
}

/// High-level simulation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// System not yet populated.
    #[default]
    Setup,
    Active,
    Paused,
}
