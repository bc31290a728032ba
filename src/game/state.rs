use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::action::Direction;
use super::rules::is_out_of_bounds;

/// Side length of the square playing field, in cells
pub const GRID_SIZE: i32 = 20;

/// A position on the game grid
///
/// Coordinates are signed: in walls mode a step off the edge yields `-1` or
/// `GRID_SIZE`, which bounds checking then rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Fold both coordinates back onto the grid (toroidal topology)
    pub fn wrapped(&self) -> Self {
        Self {
            x: self.x.rem_euclid(GRID_SIZE),
            y: self.y.rem_euclid(GRID_SIZE),
        }
    }
}

/// Boundary behaviour, fixed for the lifetime of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Leaving one edge re-enters on the opposite edge
    #[default]
    PassThrough,
    /// Leaving the grid ends the game
    Walls,
}

impl GameMode {
    pub fn toggled(&self) -> GameMode {
        match self {
            GameMode::PassThrough => GameMode::Walls,
            GameMode::Walls => GameMode::PassThrough,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::PassThrough => "pass-through",
            GameMode::Walls => "walls",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Idle,
    Playing,
    Paused,
    GameOver,
}

/// Complete game state
///
/// Values are never mutated by the engine; every transition produces a new
/// state. The field set is also the persisted form of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Body segments, with head at index 0
    pub snake: Vec<Position>,
    pub food: Position,
    pub direction: Direction,
    pub score: u32,
    pub status: GameStatus,
    pub mode: GameMode,
    /// Tick interval in milliseconds; smaller is faster
    pub speed: u32,
}

impl GameState {
    /// Get the head position
    pub fn head(&self) -> Position {
        self.snake[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.snake[self.snake.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    /// Always false for a well-formed state
    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(&pos)
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Check the structural invariants every reachable state satisfies
    pub fn validate(&self) -> Result<()> {
        if self.snake.is_empty() {
            bail!("snake has no segments");
        }
        if let Some(pos) = self.snake.iter().find(|p| is_out_of_bounds(**p)) {
            bail!("snake segment {:?} is off the grid", pos);
        }
        let unique: HashSet<_> = self.snake.iter().collect();
        if unique.len() != self.snake.len() {
            bail!("snake overlaps itself");
        }
        if is_out_of_bounds(self.food) || self.is_occupied_by_snake(self.food) {
            bail!("food at {:?} is not on a free cell", self.food);
        }
        if self.speed == 0 {
            bail!("speed must be positive");
        }
        Ok(())
    }

    /// Copy of this state with only the status replaced
    pub fn with_status(&self, status: GameStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameState {
        GameState {
            snake: vec![
                Position::new(10, 10),
                Position::new(11, 10),
                Position::new(12, 10),
            ],
            food: Position::new(3, 4),
            direction: Direction::Left,
            score: 0,
            status: GameStatus::Idle,
            mode: GameMode::PassThrough,
            speed: 150,
        }
    }

    #[test]
    fn test_validate_accepts_reachable_state() {
        assert!(sample_state().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_broken_states() {
        let mut state = sample_state();
        state.snake.clear();
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.snake[0] = Position::new(-1, 10);
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.snake.push(state.head());
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.food = state.tail();
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.speed = 0;
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
    }

    #[test]
    fn test_wrapping() {
        assert_eq!(Position::new(-1, 5).wrapped(), Position::new(19, 5));
        assert_eq!(Position::new(20, 5).wrapped(), Position::new(0, 5));
        assert_eq!(Position::new(7, -1).wrapped(), Position::new(7, 19));
        assert_eq!(Position::new(7, 20).wrapped(), Position::new(7, 0));
        assert_eq!(Position::new(7, 8).wrapped(), Position::new(7, 8));
    }

    #[test]
    fn test_head_and_tail() {
        let state = sample_state();
        assert_eq!(state.head(), Position::new(10, 10));
        assert_eq!(state.tail(), Position::new(12, 10));
        assert_eq!(state.len(), 3);
        assert!(state.is_occupied_by_snake(Position::new(11, 10)));
        assert!(!state.is_occupied_by_snake(Position::new(9, 10)));
    }

    #[test]
    fn test_with_status_keeps_everything_else() {
        let state = sample_state();
        let over = state.with_status(GameStatus::GameOver);
        assert_eq!(over.status, GameStatus::GameOver);
        assert_eq!(over.snake, state.snake);
        assert_eq!(over.food, state.food);
        assert_eq!(over.score, state.score);
    }

    #[test]
    fn test_serialized_form() {
        let mut state = sample_state();
        state.status = GameStatus::GameOver;
        state.mode = GameMode::Walls;

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "game-over");
        assert_eq!(json["mode"], "walls");
        assert_eq!(json["direction"], "LEFT");
        assert_eq!(json["snake"][0]["x"], 10);

        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
