//! Game loop thread: runs the simulation engine at 60Hz and publishes snapshots.
//!
//! The engine is created inside this thread. Commands arrive via an `mpsc`
//! channel; the latest snapshot is stored in shared state for polling. On
//! shutdown the engine is torn down and the player pose is saved.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use starhaul_core::commands::PlayerCommand;
use starhaul_core::constants::{TICK_MS, TICK_RATE};
use starhaul_core::persistence::{save_pose, ShipPose};
use starhaul_core::state::SimSnapshot;
use starhaul_sim::engine::{SimConfig, SimulationEngine};

use crate::state::GameLoopCommand;

/// Wall-clock duration of one tick.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Per-run options that live outside the simulation.
#[derive(Debug, Clone)]
pub struct Session {
    /// Where the player pose is written on shutdown.
    pub save_path: PathBuf,
    /// Camera zoom carried through to the save file.
    pub zoom: f64,
    /// Stop on its own after this many ticks.
    pub max_ticks: Option<u64>,
}

/// Spawns the game loop in a new thread. The star system is started
/// immediately.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    config: SimConfig,
    session: Session,
    latest_snapshot: Arc<Mutex<Option<SimSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("starhaul-game-loop".into())
        .spawn(move || {
            let mut engine = SimulationEngine::new(config);
            engine.queue_command(PlayerCommand::StartSystem);
            run_game_loop(&mut engine, &cmd_rx, &latest_snapshot, session.max_ticks);
            shut_down(&mut engine, &session);
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown, channel disconnect, or `max_ticks`.
fn run_game_loop(
    engine: &mut SimulationEngine,
    cmd_rx: &mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<SimSnapshot>>,
    max_ticks: Option<u64>,
) {
    let mut next_tick_time = Instant::now();
    let mut ticks: u64 = 0;

    loop {
        // 1. Drain all pending commands
        if !drain_commands(engine, cmd_rx) {
            return;
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick(TICK_MS);
        ticks += 1;
        if ticks % u64::from(TICK_RATE) == 0 {
            debug!(
                tick = snapshot.time.tick,
                ships = snapshot.ships.len(),
                projectiles = snapshot.projectiles.len(),
                beams = snapshot.beams.len(),
                "simulation heartbeat"
            );
        }

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if max_ticks.is_some_and(|max| ticks >= max) {
            info!(ticks, "tick limit reached");
            return;
        }

        // 4. Sleep until next tick
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind, reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}

/// Queue every pending command. False once the loop should stop.
fn drain_commands(engine: &mut SimulationEngine, cmd_rx: &mpsc::Receiver<GameLoopCommand>) -> bool {
    loop {
        match cmd_rx.try_recv() {
            Ok(GameLoopCommand::Player(cmd)) => engine.queue_command(cmd),
            Ok(GameLoopCommand::Shutdown) => return false,
            Err(mpsc::TryRecvError::Empty) => return true,
            Err(mpsc::TryRecvError::Disconnected) => return false,
        }
    }
}

fn shut_down(engine: &mut SimulationEngine, session: &Session) {
    engine.teardown();
    let Some(state) = engine.player_state() else {
        return;
    };
    let pose = ShipPose::from_state(&state, session.zoom);
    match save_pose(&session.save_path, &pose) {
        Ok(()) => info!(path = %session.save_path.display(), "player pose saved"),
        Err(error) => warn!(path = %session.save_path.display(), %error, "pose save failed"),
    }
}
