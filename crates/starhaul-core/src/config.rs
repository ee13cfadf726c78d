//! Game configuration: movement profiles, weapons, hulls, planets, relations.
//!
//! Loaded once from TOML. Optional fields are resolved to their documented
//! defaults at load time so per-tick code never deals with missing values.
//! Any load failure falls back to `GameConfig::default()`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::*;
use crate::enums::{ProjectileShape, Relation, WeaponKind};
use crate::error::ConfigError;
use crate::types::FactionId;

/// Movement constraints for a steering agent. All rates are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MovementConfigFile")]
pub struct MovementConfig {
    /// Units per second.
    pub max_speed: f64,
    /// Units per second squared.
    pub acceleration: f64,
    /// Units per second squared. Floored at `EPSILON`.
    pub deceleration: f64,
    /// Radians per second.
    pub turn_rate_rad: f64,
    /// Heading error (radians) under which the agent thrusts instead of turning.
    pub thrust_angle_tolerance_rad: f64,
    /// Below this speed the agent cannot turn and thrusts straight instead.
    pub min_turn_speed: f64,
    /// Acceleration used while too slow to turn.
    pub maneuver_thrust: f64,
    /// Extra speed decay while turning, scaled by speed ratio.
    pub high_speed_turn_penalty: f64,
    /// Base speed decay (units/s²) applied while turning.
    pub turn_deceleration: f64,
}

/// On-disk form of `MovementConfig` with optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
struct MovementConfigFile {
    max_speed: Option<f64>,
    acceleration: Option<f64>,
    deceleration: Option<f64>,
    turn_rate_rad: Option<f64>,
    turn_rate_deg_per_sec: Option<f64>,
    thrust_angle_tolerance_rad: Option<f64>,
    min_turn_speed: Option<f64>,
    maneuver_thrust: Option<f64>,
    high_speed_turn_penalty: Option<f64>,
    turn_deceleration: Option<f64>,
}

impl From<MovementConfigFile> for MovementConfig {
    fn from(raw: MovementConfigFile) -> Self {
        let base = MovementConfig::default();
        let turn_rate_rad = raw
            .turn_rate_rad
            .or(raw.turn_rate_deg_per_sec.map(f64::to_radians))
            .unwrap_or(base.turn_rate_rad);
        MovementConfig {
            max_speed: raw.max_speed.unwrap_or(base.max_speed),
            acceleration: raw.acceleration.unwrap_or(base.acceleration),
            deceleration: raw.deceleration.unwrap_or(base.deceleration),
            turn_rate_rad,
            thrust_angle_tolerance_rad: raw
                .thrust_angle_tolerance_rad
                .unwrap_or(base.thrust_angle_tolerance_rad),
            min_turn_speed: raw.min_turn_speed.unwrap_or(base.min_turn_speed),
            maneuver_thrust: raw.maneuver_thrust.unwrap_or(base.maneuver_thrust),
            high_speed_turn_penalty: raw
                .high_speed_turn_penalty
                .unwrap_or(DEFAULT_HIGH_SPEED_TURN_PENALTY),
            turn_deceleration: raw.turn_deceleration.unwrap_or(DEFAULT_TURN_DECELERATION),
        }
        .validated()
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 200.0,
            acceleration: 120.0,
            deceleration: 160.0,
            turn_rate_rad: std::f64::consts::PI,
            thrust_angle_tolerance_rad: DEFAULT_THRUST_ANGLE_TOLERANCE_RAD,
            min_turn_speed: 0.0,
            maneuver_thrust: 60.0,
            high_speed_turn_penalty: DEFAULT_HIGH_SPEED_TURN_PENALTY,
            turn_deceleration: DEFAULT_TURN_DECELERATION,
        }
    }
}

impl MovementConfig {
    /// Clamp rates to be non-negative and floor deceleration at `EPSILON`.
    pub fn validated(mut self) -> Self {
        self.max_speed = self.max_speed.max(0.0);
        self.acceleration = self.acceleration.max(0.0);
        self.deceleration = self.deceleration.max(EPSILON);
        self.turn_rate_rad = self.turn_rate_rad.max(0.0);
        self.thrust_angle_tolerance_rad = self.thrust_angle_tolerance_rad.max(0.0);
        self.min_turn_speed = self.min_turn_speed.max(0.0);
        self.maneuver_thrust = self.maneuver_thrust.max(0.0);
        self.high_speed_turn_penalty = self.high_speed_turn_penalty.max(0.0);
        self.turn_deceleration = self.turn_deceleration.max(0.0);
        self
    }

    /// Distance needed to stop from `speed` at the configured deceleration.
    pub fn stopping_distance(&self, speed: f64) -> f64 {
        speed * speed / (2.0 * self.deceleration.max(EPSILON))
    }
}

/// Projectile parameters for `Linear` and `Homing` weapons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub speed: f64,
    pub lifetime_ms: f64,
    pub radius: f64,
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default)]
    pub shape: ProjectileShape,
}

fn default_color() -> u32 {
    0xffcc33
}

/// Beam timing for `Beam` weapons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub tick_ms: f64,
    pub duration_ms: f64,
    pub refresh_ms: f64,
}

/// A weapon definition referenced by ship loadouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub name: String,
    #[serde(default)]
    pub kind: WeaponKind,
    /// Damage per hit (projectiles) or per beam tick.
    pub damage: f64,
    /// Shots per second; reload window is its inverse.
    pub fire_rate_per_sec: f64,
    pub range: f64,
    #[serde(default)]
    pub projectile: Option<ProjectileSpec>,
    #[serde(default)]
    pub beam: Option<BeamSpec>,
}

impl WeaponDef {
    /// Reload window in milliseconds.
    pub fn cooldown_ms(&self) -> f64 {
        1000.0 / self.fire_rate_per_sec.max(EPSILON)
    }

    pub fn is_beam(&self) -> bool {
        self.kind == WeaponKind::Beam
    }

    /// Projectile speed, or 0 for beams and malformed entries.
    pub fn projectile_speed(&self) -> f64 {
        self.projectile.as_ref().map_or(0.0, |p| p.speed)
    }
}

/// Hull stats for a ship class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullDef {
    pub hp: f64,
    pub radius: f64,
    #[serde(default)]
    pub invulnerable: bool,
}

/// A planet traders dock at. Treated as opaque data from system generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDef {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub dock_radius: f64,
}

/// A relation between two factions (symmetric).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationRule {
    pub a: FactionId,
    pub b: FactionId,
    pub relation: Relation,
}

/// Faction ids used by world setup.
pub const PLAYER_FACTION: FactionId = FactionId(0);
pub const TRADER_FACTION: FactionId = FactionId(1);
pub const PIRATE_FACTION: FactionId = FactionId(2);

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_movement: MovementConfig,
    pub trader_movement: MovementConfig,
    pub pirate_movement: MovementConfig,
    pub player_hull: HullDef,
    pub trader_hull: HullDef,
    pub pirate_hull: HullDef,
    pub weapons: Vec<WeaponDef>,
    /// Weapon names mounted on the player, one per slot.
    pub player_loadout: Vec<String>,
    pub pirate_loadout: Vec<String>,
    pub planets: Vec<PlanetDef>,
    pub relations: Vec<RelationRule>,
    pub trader_count: u32,
    pub pirate_count: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_movement: MovementConfig::default(),
            trader_movement: MovementConfig {
                max_speed: 120.0,
                acceleration: 60.0,
                deceleration: 80.0,
                turn_rate_rad: std::f64::consts::FRAC_PI_2,
                min_turn_speed: 10.0,
                ..MovementConfig::default()
            },
            pirate_movement: MovementConfig {
                max_speed: 220.0,
                acceleration: 140.0,
                ..MovementConfig::default()
            },
            player_hull: HullDef {
                hp: 200.0,
                radius: 18.0,
                invulnerable: false,
            },
            trader_hull: HullDef {
                hp: 120.0,
                radius: 22.0,
                invulnerable: false,
            },
            pirate_hull: HullDef {
                hp: 90.0,
                radius: 16.0,
                invulnerable: false,
            },
            weapons: vec![
                WeaponDef {
                    name: "pulse-cannon".into(),
                    kind: WeaponKind::Linear,
                    damage: 12.0,
                    fire_rate_per_sec: 2.0,
                    range: 600.0,
                    projectile: Some(ProjectileSpec {
                        speed: 700.0,
                        lifetime_ms: 1200.0,
                        radius: 3.0,
                        color: default_color(),
                        shape: ProjectileShape::Bolt,
                    }),
                    beam: None,
                },
                WeaponDef {
                    name: "seeker".into(),
                    kind: WeaponKind::Homing,
                    damage: 30.0,
                    fire_rate_per_sec: 0.5,
                    range: 900.0,
                    projectile: Some(ProjectileSpec {
                        speed: 380.0,
                        lifetime_ms: 4000.0,
                        radius: 5.0,
                        color: 0xff5533,
                        shape: ProjectileShape::Diamond,
                    }),
                    beam: None,
                },
                WeaponDef {
                    name: "cutting-beam".into(),
                    kind: WeaponKind::Beam,
                    damage: 4.0,
                    fire_rate_per_sec: 1.0,
                    range: 350.0,
                    projectile: None,
                    beam: Some(BeamSpec {
                        tick_ms: 100.0,
                        duration_ms: 1500.0,
                        refresh_ms: 3000.0,
                    }),
                },
            ],
            player_loadout: vec!["pulse-cannon".into(), "seeker".into(), "cutting-beam".into()],
            pirate_loadout: vec!["pulse-cannon".into()],
            planets: vec![
                PlanetDef {
                    name: "Cinder".into(),
                    x: -1800.0,
                    y: 400.0,
                    dock_radius: 60.0,
                },
                PlanetDef {
                    name: "Halcyon".into(),
                    x: 1500.0,
                    y: -900.0,
                    dock_radius: 80.0,
                },
                PlanetDef {
                    name: "Vesper".into(),
                    x: 300.0,
                    y: 2100.0,
                    dock_radius: 70.0,
                },
            ],
            relations: vec![
                RelationRule {
                    a: PLAYER_FACTION,
                    b: PIRATE_FACTION,
                    relation: Relation::Confrontation,
                },
                RelationRule {
                    a: TRADER_FACTION,
                    b: PIRATE_FACTION,
                    relation: Relation::Confrontation,
                },
                RelationRule {
                    a: PLAYER_FACTION,
                    b: TRADER_FACTION,
                    relation: Relation::Ally,
                },
            ],
            trader_count: 3,
            pirate_count: 2,
        }
    }
}

impl GameConfig {
    /// Parse a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        Ok(config.validated())
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from `path`, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), weapons = config.weapons.len(), "config loaded");
                config
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "config load failed, using defaults");
                Self::default()
            }
        }
    }

    /// Normalise numeric fields so the core can rely on them.
    pub fn validated(mut self) -> Self {
        self.player_movement = self.player_movement.validated();
        self.trader_movement = self.trader_movement.validated();
        self.pirate_movement = self.pirate_movement.validated();
        for weapon in &mut self.weapons {
            weapon.damage = weapon.damage.max(0.0);
            weapon.fire_rate_per_sec = weapon.fire_rate_per_sec.max(EPSILON);
            weapon.range = weapon.range.max(0.0);
            if let Some(beam) = weapon.beam.as_mut() {
                beam.tick_ms = beam.tick_ms.max(1.0);
                beam.duration_ms = beam.duration_ms.max(0.0);
                beam.refresh_ms = beam.refresh_ms.max(0.0);
            }
        }
        self
    }

    pub fn weapon_index(&self, name: &str) -> Option<usize> {
        self.weapons.iter().position(|w| w.name == name)
    }

    /// Relation between two factions; same faction is `Own`, unlisted pairs are `Neutral`.
    pub fn relation_between(&self, a: FactionId, b: FactionId) -> Relation {
        if a == b {
            return Relation::Own;
        }
        self.relations
            .iter()
            .find(|r| (r.a == a && r.b == b) || (r.a == b && r.b == a))
            .map(|r| r.relation)
            .unwrap_or_default()
    }
}
