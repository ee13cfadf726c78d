//! Simulation engine: the headless core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world and the combat services,
//! processes player commands, runs all systems in a fixed order, and
//! produces a `SimSnapshot` per tick. Same seed and same commands give the
//! same snapshots.

use std::collections::VecDeque;

use glam::DVec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use starhaul_core::commands::PlayerCommand;
use starhaul_core::components::{Destroyed, PlayerShip, WeaponLoadout};
use starhaul_core::config::GameConfig;
use starhaul_core::enums::GamePhase;
use starhaul_core::events::CombatEvent;
use starhaul_core::persistence::ShipPose;
use starhaul_core::state::SimSnapshot;
use starhaul_core::types::{KinematicState, SimTime, SlotKey, Trajectory};
use starhaul_nav::movement::MovementManager;

use crate::combat::CombatState;
use crate::systems;
use crate::world::{entity_from_id, EcsCombatWorld};
use crate::world_setup;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub game: GameConfig,
    /// Where the player ship starts; the origin when `None`.
    pub start_pose: Option<ShipPose>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            game: GameConfig::default(),
            start_pose: None,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    game: GameConfig,
    start_pose: Option<ShipPose>,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<CombatEvent>,
    combat: CombatState,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            game: config.game.validated(),
            start_pose: config.start_pose,
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            combat: CombatState::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Advance the simulation by `delta_ms` and return the resulting snapshot.
    /// Negative deltas are treated as zero.
    pub fn tick(&mut self, delta_ms: f64) -> SimSnapshot {
        let delta_ms = delta_ms.max(0.0);
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems(delta_ms);
            self.time.advance(delta_ms);
        }

        let events = std::mem::take(&mut self.events);
        let snapshot = systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.game,
            &self.combat,
            events,
        );
        self.combat.effects.clear();
        snapshot
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for arranging test scenarios.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn game(&self) -> &GameConfig {
        &self.game
    }

    pub fn combat(&self) -> &CombatState {
        &self.combat
    }

    /// The player's ship, once the system is populated.
    pub fn player(&self) -> Option<Entity> {
        self.world
            .query::<&PlayerShip>()
            .iter()
            .next()
            .map(|(entity, _)| entity)
    }

    pub fn player_state(&self) -> Option<KinematicState> {
        let player = self.player()?;
        let state = *self.world.get::<&KinematicState>(player).ok()?;
        Some(state)
    }

    /// Forward-simulated path from the player's current state to `goal`:
    /// the path the follower will approximately fly.
    pub fn preview_path(&self, goal: DVec2) -> Option<Trajectory> {
        let player = self.player()?;
        let state = self.world.get::<&KinematicState>(player).ok()?;
        let helm = self.world.get::<&MovementManager<Entity>>(player).ok()?;
        Some(helm.pathfinder().preview_path(&state, goal))
    }

    /// Cancel every beam, pending timer and projectile. Nothing scheduled
    /// before teardown fires afterwards.
    pub fn teardown(&mut self) {
        let beams = self.combat.beams.stop_all(&mut self.combat.timers);
        let timers = self.combat.timers.cancel_all();
        let projectiles = self.combat.projectiles.len();
        self.combat.projectiles.clear();
        info!(beams, timers, projectiles, "simulation torn down");
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartSystem => {
                if self.phase == GamePhase::Setup {
                    world_setup::setup_system(&mut self.world, &self.game, &mut self.rng);
                    if let Some(pose) = self.start_pose {
                        self.place_player(pose);
                    }
                    self.phase = GamePhase::Active;
                    self.time = SimTime::default();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::MoveTo { x, y } => {
                self.with_player_helm(|state, helm| {
                    if !helm.move_to(state, DVec2::new(x, y)) {
                        debug!(x, y, "move ignored: already at goal");
                    }
                });
            }
            PlayerCommand::FollowPath { points } => {
                let points: Vec<DVec2> = points.iter().map(|&[x, y]| DVec2::new(x, y)).collect();
                self.with_player_helm(|_, helm| {
                    if !helm.follow_path(points) {
                        debug!("path ignored: fewer than two points");
                    }
                });
            }
            PlayerCommand::Orbit { target, radius } => {
                if let Some(target) = self.live_ship(target) {
                    self.with_player_helm(|_, helm| helm.orbit_object(target, radius));
                }
            }
            PlayerCommand::Pursue { target } => {
                if let Some(target) = self.live_ship(target) {
                    self.with_player_helm(|_, helm| helm.pursue_target(target));
                }
            }
            PlayerCommand::FollowTarget { target, standoff } => {
                if let Some(target) = self.live_ship(target) {
                    self.with_player_helm(|_, helm| helm.follow_object(target, standoff));
                }
            }
            PlayerCommand::Stop => {
                self.with_player_helm(|state, helm| {
                    helm.stop();
                    state.speed = 0.0;
                });
            }
            PlayerCommand::SetTarget { slot, target } => self.set_player_target(slot, target),
            PlayerCommand::ClearSlot { slot } => {
                if let Some(player) = self.player() {
                    self.combat
                        .beams
                        .stop_beam(player, slot, &mut self.combat.timers, &mut self.events);
                }
                self.combat.targets.clear_slot(slot, &mut self.events);
                self.combat.out_of_range.remove(&slot);
            }
            PlayerCommand::ClearAllTargets => {
                let slots = self.combat.targets.clear_all(&mut self.events);
                if let Some(player) = self.player() {
                    for &slot in &slots {
                        self.combat
                            .beams
                            .stop_beam(player, slot, &mut self.combat.timers, &mut self.events);
                    }
                }
                self.combat.out_of_range.clear();
            }
        }
    }

    /// Resolve a command's ship id to a live entity.
    fn live_ship(&self, id: u64) -> Option<Entity> {
        let entity = entity_from_id(id).filter(|&e| {
            self.world.contains(e) && self.world.get::<&Destroyed>(e).is_err()
        });
        if entity.is_none() {
            warn!(id, "command names an unknown ship");
        }
        entity
    }

    fn with_player_helm(&mut self, f: impl FnOnce(&mut KinematicState, &mut MovementManager<Entity>)) {
        let Some(player) = self.player() else {
            debug!("movement command ignored: no player ship");
            return;
        };
        if let Ok((state, helm)) = self
            .world
            .query_one_mut::<(&mut KinematicState, &mut MovementManager<Entity>)>(player)
        {
            f(state, helm);
        }
    }

    fn place_player(&mut self, pose: ShipPose) {
        let Some(player) = self.player() else {
            return;
        };
        if let Ok(mut state) = self.world.get::<&mut KinematicState>(player) {
            *state = pose.to_state();
        }
    }

    fn set_player_target(&mut self, slot: SlotKey, target: Option<u64>) {
        let Some(player) = self.player() else {
            return;
        };
        let has_slot = self
            .world
            .get::<&WeaponLoadout>(player)
            .is_ok_and(|loadout| loadout.mount(slot).is_some());
        if !has_slot {
            warn!(?slot, "target assignment for an unmounted slot");
            return;
        }

        let target = match target {
            Some(id) => match self.live_ship(id) {
                Some(entity) if entity != player => Some(entity),
                _ => return,
            },
            None => None,
        };

        if self.combat.targets.get_target(slot) != target {
            self.combat
                .beams
                .stop_beam(player, slot, &mut self.combat.timers, &mut self.events);
        }
        if target.is_none() {
            self.combat.out_of_range.remove(&slot);
        }

        let mut view = EcsCombatWorld {
            world: &mut self.world,
            game: &self.game,
            hostility: &mut self.combat.hostility,
            effects: &mut self.combat.effects,
        };
        self.combat
            .targets
            .set_target(player, slot, target, &mut view, &mut self.events);
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt_ms: f64) {
        let now_ms = self.time.now_ms;

        // 1. Trader AI
        systems::traders::run(&mut self.world, &self.game.planets, &mut self.rng, now_ms);
        // 2. Pirate AI
        systems::pirates::run(&mut self.world);
        // 3. Movement managers and path followers
        systems::movement::run(&mut self.world, dt_ms, now_ms);
        // 4. Weapon fire
        systems::weapons::run(
            &mut self.world,
            &self.game,
            &mut self.combat,
            now_ms,
            &mut self.events,
        );
        // 5. Projectile flight and collision
        systems::projectiles::run(
            &mut self.world,
            &self.game,
            &mut self.combat,
            dt_ms,
            &mut self.events,
        );
        // 6. Due timers (beam ticks)
        systems::timers::run(
            &mut self.world,
            &self.game,
            &mut self.combat,
            now_ms + dt_ms,
            &mut self.events,
        );
        // 7. Cleanup of destroyed ships
        systems::cleanup::run(
            &mut self.world,
            &mut self.combat,
            &mut self.despawn_buffer,
            &mut self.events,
        );
    }
}
