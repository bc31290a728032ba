//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Every transition takes a state by reference and returns the next one, so the
//! same code serves human play, the autopilot and tests.

pub mod action;
pub mod config;
pub mod engine;
pub mod food;
pub mod rules;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::GameConfig;
pub use engine::GameEngine;
pub use food::{CellSource, RandomCells, ScriptedCells};
pub use rules::{
    change_direction, check_food_collision, check_self_collision, is_out_of_bounds,
    is_valid_direction_change, next_head_position,
};
pub use state::{GRID_SIZE, GameMode, GameState, GameStatus, Position};
