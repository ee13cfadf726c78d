//! Application state shared between the command source and the game loop thread.

use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use starhaul_core::commands::PlayerCommand;
use starhaul_core::state::SimSnapshot;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    Player(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Shared application state.
pub struct AppState {
    /// Channel sender to the game loop thread. `None` until it is spawned.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Latest snapshot, updated by the game loop thread after each tick.
    pub latest_snapshot: Arc<Mutex<Option<SimSnapshot>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a command to the game loop. False when it is not running.
    pub fn send(&self, command: GameLoopCommand) -> bool {
        match self.command_tx.lock() {
            Ok(guard) => guard.as_ref().is_some_and(|tx| tx.send(command).is_ok()),
            Err(_) => false,
        }
    }
}

/// Process settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `STARHAUL_CONFIG`, default `starhaul.toml`.
    pub config_path: PathBuf,
    /// `STARHAUL_SAVE`, default `pose.json`.
    pub save_path: PathBuf,
    /// `STARHAUL_TICKS`: stop after this many ticks. Runs until stdin closes
    /// when unset.
    pub max_ticks: Option<u64>,
    /// `STARHAUL_SEED`, default 42.
    pub seed: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            config_path: lookup("STARHAUL_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("starhaul.toml")),
            save_path: lookup("STARHAUL_SAVE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("pose.json")),
            max_ticks: lookup("STARHAUL_TICKS").and_then(|v| v.trim().parse().ok()),
            seed: lookup("STARHAUL_SEED")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(42),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.command_tx.lock().unwrap().is_none());
        assert!(state.latest_snapshot.lock().unwrap().is_none());
        assert!(!state.send(GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_send_forwards_when_running() {
        let state = AppState::new();
        let (tx, rx) = mpsc::channel();
        *state.command_tx.lock().unwrap() = Some(tx);
        assert!(state.send(GameLoopCommand::Player(PlayerCommand::Pause)));
        assert!(matches!(
            rx.try_recv(),
            Ok(GameLoopCommand::Player(PlayerCommand::Pause))
        ));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.config_path, PathBuf::from("starhaul.toml"));
        assert_eq!(settings.save_path, PathBuf::from("pose.json"));
        assert_eq!(settings.max_ticks, None);
        assert_eq!(settings.seed, 42);
    }

    #[test]
    fn test_settings_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STARHAUL_CONFIG", "cfg/game.toml"),
            ("STARHAUL_SAVE", "saves/me.json"),
            ("STARHAUL_TICKS", "600"),
            ("STARHAUL_SEED", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(settings.config_path, PathBuf::from("cfg/game.toml"));
        assert_eq!(settings.save_path, PathBuf::from("saves/me.json"));
        assert_eq!(settings.max_ticks, Some(600));
        assert_eq!(settings.seed, 42);
    }
}
