//! Game driver: owns the current state and applies player commands
//!
//! The engine is pure, so something has to hold "the" state between ticks.
//! `GameSession` is that single writer. It also buffers direction requests
//! that arrive faster than the tick rate and hands them to the engine one
//! effective turn per tick, in arrival order.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::game::{
    CellSource, Direction, GameEngine, GameMode, GameState, GameStatus, RandomCells,
    change_direction,
};
use crate::leaderboard::ScoreSubmission;

/// What a single tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Whether the state was replaced
    pub changed: bool,
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Whether this tick ended the game
    pub ended: bool,
    /// Set on the tick a named player's game ends
    pub game_over: Option<ScoreSubmission>,
}

pub struct GameSession<S = RandomCells> {
    engine: GameEngine<S>,
    state: GameState,
    direction_queue: VecDeque<Direction>,
    player: Option<String>,
}

impl<S: CellSource> GameSession<S> {
    pub fn new(mut engine: GameEngine<S>, mode: GameMode) -> Self {
        let state = engine.create_initial_state(mode);
        Self {
            engine,
            state,
            direction_queue: VecDeque::new(),
            player: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine(&self) -> &GameEngine<S> {
        &self.engine
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn set_player(&mut self, player: Option<String>) {
        self.player = player;
    }

    /// Score with the mode multiplier applied
    pub fn final_score(&self) -> u32 {
        self.engine.final_score(&self.state)
    }

    /// Number of direction requests waiting for a tick
    pub fn queued_directions(&self) -> usize {
        self.direction_queue.len()
    }

    /// Time until the next tick at the current speed
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.state.speed))
    }

    /// Idle -> playing. Any other status is left alone.
    pub fn start(&mut self) -> bool {
        if self.state.status != GameStatus::Idle {
            return false;
        }
        self.direction_queue.clear();
        self.state = self.state.with_status(GameStatus::Playing);
        info!(mode = self.state.mode.as_str(), "game started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.status != GameStatus::Playing {
            return false;
        }
        self.state = self.state.with_status(GameStatus::Paused);
        info!(score = self.state.score, "game paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.status != GameStatus::Paused {
            return false;
        }
        self.state = self.state.with_status(GameStatus::Playing);
        info!(score = self.state.score, "game resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state.status {
            GameStatus::Playing => self.pause(),
            GameStatus::Paused => self.resume(),
            GameStatus::Idle | GameStatus::GameOver => false,
        }
    }

    /// Throw the current game away and start over in the same mode
    pub fn reset(&mut self) {
        let mode = self.state.mode;
        self.set_mode(mode);
    }

    /// Start over in `mode`; the state always goes back to idle
    pub fn set_mode(&mut self, mode: GameMode) {
        self.state = self.engine.create_initial_state(mode);
        self.direction_queue.clear();
        info!(mode = mode.as_str(), "game reset");
    }

    /// Replace the current state with a previously saved one
    ///
    /// Fails, leaving the session untouched, if `state` breaks the
    /// structural invariants (empty or overlapping snake, food on the body).
    pub fn restore(&mut self, state: GameState) -> Result<()> {
        state.validate().context("Refusing to restore game state")?;
        info!(
            score = state.score,
            length = state.len(),
            mode = state.mode.as_str(),
            "game restored"
        );
        self.state = state;
        self.direction_queue.clear();
        Ok(())
    }

    /// Buffer a turn for the coming ticks; ignored unless playing
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.direction_queue.push_back(direction);
        true
    }

    /// Apply at most one queued turn, then advance the snake
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_playing() {
            return TickOutcome::default();
        }
        let mut changed = self.apply_queued_direction();

        let score_before = self.state.score;
        if let Cow::Owned(next) = self.engine.move_snake(&self.state) {
            self.state = next;
            changed = true;
        }

        let ate_food = self.state.score > score_before;
        if ate_food {
            debug!(
                score = self.state.score,
                speed = self.state.speed,
                length = self.state.len(),
                "food eaten"
            );
        }

        let ended = self.state.status == GameStatus::GameOver;
        let mut game_over = None;
        if ended {
            let final_score = self.final_score();
            info!(
                score = self.state.score,
                final_score,
                length = self.state.len(),
                mode = self.state.mode.as_str(),
                "game over"
            );
            self.direction_queue.clear();
            game_over = self.player.as_ref().map(|username| ScoreSubmission {
                username: username.clone(),
                score: final_score,
                mode: self.state.mode,
            });
        }

        TickOutcome {
            changed,
            ate_food,
            ended,
            game_over,
        }
    }

    /// Pop requests in order until one actually turns the snake
    fn apply_queued_direction(&mut self) -> bool {
        while let Some(direction) = self.direction_queue.pop_front() {
            if let Cow::Owned(next) = change_direction(&self.state, direction) {
                self.state = next;
                return true;
            }
        }
        false
    }
}
