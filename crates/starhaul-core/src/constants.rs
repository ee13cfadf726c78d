//! Simulation constants and tuning parameters.

/// Nominal tick rate (Hz) for the app loop and the forward simulator.
pub const TICK_RATE: u32 = 60;

/// Forward-simulation step in seconds.
pub const SIM_DT: f64 = 1.0 / TICK_RATE as f64;

/// Nominal tick length in milliseconds.
pub const TICK_MS: f64 = 1000.0 / TICK_RATE as f64;

/// Floor for denominators (turn rate, deceleration, segment lengths).
pub const EPSILON: f64 = 1e-6;

// --- Planner ---

/// Hard cap on forward-simulation steps (~20 s at 60 Hz).
pub const MAX_SIM_STEPS: usize = 1200;

/// Minimum accumulated path length between emitted simulator samples.
pub const SIM_SAMPLE_SPACING: f64 = 12.0;

/// Arc samples per full revolution.
pub const ARC_SAMPLES_PER_TURN: f64 = 32.0;

/// Minimum arc sample count.
pub const MIN_ARC_SAMPLES: usize = 4;

/// Fraction of max speed used as the cruise-speed guess for the first arc pass.
pub const CRUISE_SPEED_GUESS_FACTOR: f64 = 0.6;

/// Speed under which a braking simulation is considered stopped.
pub const BRAKE_STOP_SPEED: f64 = 0.01;

// --- Arrival (shared by simulator and follower) ---

/// Minimum arrival radius.
pub const ARRIVAL_MIN_RADIUS: f64 = 4.0;

/// Added to one tick of travel when computing the arrival radius.
pub const ARRIVAL_MARGIN: f64 = 2.0;

/// Agents must be slower than this to count as arrived.
pub const ARRIVAL_MAX_SPEED: f64 = 10.0;

// --- Follower ---

/// Minimum pure-pursuit lookahead distance.
pub const LOOKAHEAD_MIN: f64 = 50.0;

/// Lookahead grows with speed by this factor.
pub const LOOKAHEAD_SPEED_FACTOR: f64 = 0.6;

/// How far the follower's path progress may slide back between ticks.
pub const PROGRESS_BACKTRACK_SLACK: f64 = 5.0;

/// Extra distance added to the stopping distance before braking.
pub const STOP_MARGIN: f64 = 2.0;

// --- Movement config defaults ---

pub const DEFAULT_HIGH_SPEED_TURN_PENALTY: f64 = 0.9;
pub const DEFAULT_TURN_DECELERATION: f64 = 30.0;
pub const DEFAULT_THRUST_ANGLE_TOLERANCE_RAD: f64 = 0.2;

// --- Movement manager ---

/// Follow/orbit modes replan no more often than this.
pub const FOLLOW_REPLAN_INTERVAL_MS: f64 = 500.0;

/// Pursuit replans once the target drifts this far from the planned goal.
pub const PURSUE_DRIFT_THRESHOLD: f64 = 80.0;

/// Number of samples on a full orbit circle.
pub const ORBIT_SAMPLES: usize = 24;

// --- Targeting ---

pub const INTERCEPT_MAX_ITERATIONS: usize = 10;

/// Convergence tolerance relative to projectile travel time.
pub const INTERCEPT_TOLERANCE: f64 = 0.0001;

// --- Trader NPCs ---

pub const DOCKING_DURATION_MS: f64 = 1500.0;
pub const DOCKED_DURATION_MS: f64 = 4000.0;
pub const UNDOCKING_DURATION_MS: f64 = 1200.0;

// --- Combat ---

/// Player sensor range; projectiles beyond it are hidden by fog of war.
pub const FOW_SENSOR_RANGE: f64 = 1400.0;

/// Floor on repeating timer intervals.
pub const MIN_TIMER_REPEAT_MS: f64 = 1.0;

// --- Pirates ---

/// Pirates engage the player inside this range.
pub const PIRATE_AGGRO_RANGE: f64 = 900.0;

/// Distance pirates try to hold from the player while engaging.
pub const PIRATE_STANDOFF: f64 = 250.0;

// --- World setup ---

/// Pirates spawn on a ring of this radius around the origin.
pub const PIRATE_SPAWN_RADIUS: f64 = 2200.0;
