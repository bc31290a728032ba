use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::state::{GRID_SIZE, GameMode};

/// Scoring and pacing policy for a game
///
/// The shape of each rule is fixed (flat award per food, speed-up with a
/// floor, per-mode multiplier applied when reading the score); only the
/// numbers are configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Tick interval at the start of a game, in milliseconds
    pub initial_speed: u32,
    /// How much the tick interval shrinks per food eaten
    pub speed_decrement: u32,
    /// Fastest allowed tick interval
    pub min_speed: u32,
    /// Points awarded per food
    pub food_points: u32,
    /// Final score multiplier in walls mode
    pub walls_multiplier: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_snake_length: 3,
            initial_speed: 150,
            speed_decrement: 5,
            min_speed: 50,
            food_points: 10,
            walls_multiplier: 1.5,
        }
    }
}

impl GameConfig {
    /// Load a configuration from a JSON file; absent fields take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to parse game config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_speed == 0 {
            bail!("min_speed must be positive");
        }
        if self.min_speed > self.initial_speed {
            bail!(
                "min_speed ({}) must not exceed initial_speed ({})",
                self.min_speed,
                self.initial_speed
            );
        }
        let max_length = (GRID_SIZE / 2) as usize;
        if self.initial_snake_length == 0 || self.initial_snake_length > max_length {
            bail!("initial_snake_length must be between 1 and {}", max_length);
        }
        if !self.walls_multiplier.is_finite() || self.walls_multiplier < 0.0 {
            bail!("walls_multiplier must be a non-negative number");
        }
        Ok(())
    }

    /// Score multiplier applied to the raw score for a mode
    pub fn score_multiplier(&self, mode: GameMode) -> f64 {
        match mode {
            GameMode::Walls => self.walls_multiplier,
            GameMode::PassThrough => 1.0,
        }
    }

    /// Tick interval after eating one food at `speed`
    pub fn next_speed(&self, speed: u32) -> u32 {
        speed.saturating_sub(self.speed_decrement).max(self.min_speed)
    }
}
