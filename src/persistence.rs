//! Saving and resuming games in progress
//!
//! A saved game is the verbatim `GameState` as pretty JSON. Loading checks the
//! structural invariants so a hand-edited file cannot put the engine into a
//! state it could never have reached.

use anyhow::{Context, Result};
use std::path::Path;

use crate::game::GameState;

/// Save a game state to a file
///
/// Creates parent directories if they don't exist.
pub fn save_state(state: &GameState, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(state).context("Failed to serialize game state")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write game state to {:?}", path))?;

    Ok(())
}

/// Load a game state saved by [`save_state`]
pub fn load_state(path: &Path) -> Result<GameState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read game state from {:?}", path))?;
    let state: GameState =
        serde_json::from_str(&json).context("Failed to deserialize game state")?;
    state
        .validate()
        .with_context(|| format!("Invalid game state in {:?}", path))?;
    Ok(state)
}
