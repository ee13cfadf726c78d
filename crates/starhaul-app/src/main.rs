use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use starhaul_app::game_loop::{spawn_game_loop, Session};
use starhaul_app::state::{AppState, GameLoopCommand, Settings};
use starhaul_app::telemetry::init_tracing;
use starhaul_core::commands::PlayerCommand;
use starhaul_core::config::GameConfig;
use starhaul_core::persistence::load_pose_or_default;
use starhaul_sim::engine::SimConfig;

fn main() -> ExitCode {
    init_tracing();
    let settings = Settings::from_env();
    info!(?settings, "starting starhaul");

    let game = GameConfig::load_or_default(&settings.config_path);
    let pose = load_pose_or_default(&settings.save_path);
    let config = SimConfig {
        seed: settings.seed,
        game,
        start_pose: Some(pose),
    };
    let session = Session {
        save_path: settings.save_path.clone(),
        zoom: pose.zoom,
        max_ticks: settings.max_ticks,
    };

    let app = AppState::new();
    let (tx, handle) = match spawn_game_loop(config, session, Arc::clone(&app.latest_snapshot)) {
        Ok(spawned) => spawned,
        Err(e) => {
            error!(error = %e, "failed to spawn game loop");
            return ExitCode::FAILURE;
        }
    };
    if let Ok(mut guard) = app.command_tx.lock() {
        *guard = Some(tx);
    }

    if settings.max_ticks.is_none() {
        read_commands(&app);
        app.send(GameLoopCommand::Shutdown);
    }

    if handle.join().is_err() {
        error!("game loop panicked");
        return ExitCode::FAILURE;
    }

    if let Ok(guard) = app.latest_snapshot.lock() {
        if let Some(snapshot) = guard.as_ref() {
            info!(
                tick = snapshot.time.tick,
                ships = snapshot.ships.len(),
                "simulation stopped"
            );
        }
    }
    ExitCode::SUCCESS
}

/// Forward JSON-encoded player commands from stdin, one per line, until
/// EOF or `quit`.
fn read_commands(app: &AppState) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        match serde_json::from_str::<PlayerCommand>(line) {
            Ok(command) => {
                if !app.send(GameLoopCommand::Player(command)) {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "unrecognised command"),
        }
    }
}
