use std::borrow::Cow;
use std::collections::HashSet;

use super::{
    action::Direction,
    config::GameConfig,
    food::{CellSource, RandomCells},
    rules::{check_food_collision, check_self_collision, is_out_of_bounds, next_head_position},
    state::{GRID_SIZE, GameMode, GameState, GameStatus, Position},
};

/// The game engine that handles all game logic
///
/// The engine holds only the scoring policy and the food cell source. Game
/// state lives with the caller and is passed in by reference; transitions
/// hand back either the same state (`Cow::Borrowed`, nothing happened) or a
/// brand new one (`Cow::Owned`).
pub struct GameEngine<S = RandomCells> {
    config: GameConfig,
    cells: S,
}

impl GameEngine<RandomCells> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_source(config, RandomCells::from_entropy())
    }

    /// Engine whose food placement is reproducible for `seed`
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_source(config, RandomCells::seeded(seed))
    }
}

impl<S: CellSource> GameEngine<S> {
    pub fn with_source(config: GameConfig, cells: S) -> Self {
        Self { config, cells }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh idle game: snake centred on the grid, heading left, body
    /// trailing toward increasing x
    pub fn create_initial_state(&mut self, mode: GameMode) -> GameState {
        let center = GRID_SIZE / 2;
        let length = self
            .config
            .initial_snake_length
            .clamp(1, (GRID_SIZE / 2) as usize);

        let snake: Vec<Position> = (0..length as i32)
            .map(|i| Position::new(center + i, center))
            .collect();

        // A snake this short never fills the grid, so a free cell always exists
        let food = self.generate_food(&snake).unwrap_or_default();

        GameState {
            snake,
            food,
            direction: Direction::Left,
            score: 0,
            status: GameStatus::Idle,
            mode,
            speed: self.config.initial_speed,
        }
    }

    /// Pick a food cell not covered by `snake` by rejection sampling
    ///
    /// Returns `None` only when the snake covers the whole grid.
    pub fn generate_food(&mut self, snake: &[Position]) -> Option<Position> {
        let occupied: HashSet<Position> = snake.iter().copied().collect();
        if occupied.len() >= (GRID_SIZE * GRID_SIZE) as usize {
            return None;
        }

        loop {
            let cell = self.cells.sample(GRID_SIZE);
            if !occupied.contains(&cell) {
                return Some(cell);
            }
        }
    }

    /// Advance the game by one tick
    pub fn move_snake<'a>(&mut self, state: &'a GameState) -> Cow<'a, GameState> {
        if state.status != GameStatus::Playing {
            return Cow::Borrowed(state);
        }

        let new_head = next_head_position(state.head(), state.direction, state.mode);

        if state.mode == GameMode::Walls && is_out_of_bounds(new_head) {
            return Cow::Owned(state.with_status(GameStatus::GameOver));
        }

        let mut snake = Vec::with_capacity(state.snake.len() + 1);
        snake.push(new_head);
        snake.extend_from_slice(&state.snake);

        let ate_food = check_food_collision(new_head, state.food);

        // Without growth the tail cell is vacated this tick
        let occupied = if ate_food {
            &snake[..]
        } else {
            &snake[..snake.len() - 1]
        };
        if check_self_collision(occupied) {
            return Cow::Owned(state.with_status(GameStatus::GameOver));
        }

        if !ate_food {
            snake.pop();
            return Cow::Owned(GameState {
                snake,
                food: state.food,
                direction: state.direction,
                score: state.score,
                status: state.status,
                mode: state.mode,
                speed: state.speed,
            });
        }

        let score = state.score.saturating_add(self.config.food_points);
        let speed = self.config.next_speed(state.speed);

        let (food, status) = match self.generate_food(&snake) {
            Some(food) => (food, state.status),
            // Grid is full: nothing left to eat
            None => (state.food, GameStatus::GameOver),
        };

        Cow::Owned(GameState {
            snake,
            food,
            direction: state.direction,
            score,
            status,
            mode: state.mode,
            speed,
        })
    }

    pub fn score_multiplier(&self, mode: GameMode) -> f64 {
        self.config.score_multiplier(mode)
    }

    /// Score with the mode multiplier applied, rounded down
    pub fn final_score(&self, state: &GameState) -> u32 {
        (state.score as f64 * self.score_multiplier(state.mode)).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::food::ScriptedCells;

    fn playing_state(snake: Vec<Position>, direction: Direction, mode: GameMode) -> GameState {
        GameState {
            snake,
            food: Position::new(0, 0),
            direction,
            score: 0,
            status: GameStatus::Playing,
            mode,
            speed: 150,
        }
    }

    fn centre_snake() -> Vec<Position> {
        vec![
            Position::new(10, 10),
            Position::new(11, 10),
            Position::new(12, 10),
        ]
    }

    #[test]
    fn test_initial_state() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        let state = engine.create_initial_state(GameMode::Walls);

        assert_eq!(state.snake, centre_snake());
        assert_eq!(state.direction, Direction::Left);
        assert_eq!(state.status, GameStatus::Idle);
        assert_eq!(state.mode, GameMode::Walls);
        assert_eq!(state.score, 0);
        assert_eq!(state.speed, 150);
        assert!(!state.is_occupied_by_snake(state.food));
        assert!(!is_out_of_bounds(state.food));
    }

    #[test]
    fn test_food_rejects_occupied_cells() {
        let cells = ScriptedCells::new([
            Position::new(10, 10),
            Position::new(12, 10),
            Position::new(3, 7),
        ]);
        let mut engine = GameEngine::with_source(GameConfig::default(), cells);

        let food = engine.generate_food(&centre_snake());
        assert_eq!(food, Some(Position::new(3, 7)));
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 99);
        // A long snake filling most of the top rows raises the rejection rate
        let snake: Vec<Position> = (0..GRID_SIZE * 15)
            .map(|i| Position::new(i % GRID_SIZE, i / GRID_SIZE))
            .collect();

        for _ in 0..200 {
            let food = engine.generate_food(&snake).unwrap();
            assert!(!snake.contains(&food));
            assert!(!is_out_of_bounds(food));
        }
    }

    #[test]
    fn test_food_on_full_grid() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 3);
        let snake: Vec<Position> = (0..GRID_SIZE * GRID_SIZE)
            .map(|i| Position::new(i % GRID_SIZE, i / GRID_SIZE))
            .collect();
        assert_eq!(engine.generate_food(&snake), None);
    }

    #[test]
    fn test_not_playing_is_identity() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        for status in [GameStatus::Idle, GameStatus::Paused, GameStatus::GameOver] {
            let state = playing_state(centre_snake(), Direction::Left, GameMode::PassThrough)
                .with_status(status);
            let next = engine.move_snake(&state);
            assert!(matches!(next, Cow::Borrowed(_)));
            assert!(std::ptr::eq(next.as_ref(), &state));
        }
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        let state = playing_state(centre_snake(), Direction::Left, GameMode::PassThrough);

        let next = engine.move_snake(&state);

        assert_eq!(next.head(), Position::new(9, 10));
        assert_eq!(next.len(), 3);
        assert_eq!(next.tail(), Position::new(11, 10));
        assert_eq!(next.status, GameStatus::Playing);
        assert_eq!(next.score, 0);
        assert_eq!(next.speed, 150);
        // The input is untouched
        assert_eq!(state.head(), Position::new(10, 10));
    }

    #[test]
    fn test_food_consumption() {
        let cells = ScriptedCells::new([Position::new(9, 10), Position::new(4, 4)]);
        let mut engine = GameEngine::with_source(GameConfig::default(), cells);
        let mut state = playing_state(centre_snake(), Direction::Left, GameMode::PassThrough);
        state.food = Position::new(9, 10);

        let next = engine.move_snake(&state);

        assert_eq!(next.len(), 4);
        assert_eq!(next.head(), Position::new(9, 10));
        assert_eq!(next.tail(), Position::new(12, 10));
        assert_eq!(next.score, 10);
        assert_eq!(next.speed, 145);
        // (9,10) is now the head, so the first scripted cell is rejected
        assert_eq!(next.food, Position::new(4, 4));
        assert_eq!(next.status, GameStatus::Playing);
    }

    #[test]
    fn test_speed_floor_on_food() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 5);
        let mut state = playing_state(centre_snake(), Direction::Left, GameMode::PassThrough);
        state.food = Position::new(9, 10);
        state.speed = 52;

        let next = engine.move_snake(&state);
        assert_eq!(next.speed, 50);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        let snake = vec![Position::new(0, 10), Position::new(1, 10), Position::new(2, 10)];
        let mut state = playing_state(snake.clone(), Direction::Left, GameMode::Walls);
        state.score = 30;

        let next = engine.move_snake(&state);

        assert_eq!(next.status, GameStatus::GameOver);
        assert_eq!(next.snake, snake);
        assert_eq!(next.score, 30);
        assert_eq!(next.food, state.food);
    }

    #[test]
    fn test_pass_through_wraps() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        let snake = vec![Position::new(0, 10), Position::new(1, 10), Position::new(2, 10)];
        let state = playing_state(snake, Direction::Left, GameMode::PassThrough);

        let next = engine.move_snake(&state);

        assert_eq!(next.head(), Position::new(19, 10));
        assert_eq!(next.status, GameStatus::Playing);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        // Head came down from (6,5) and now turns left into its own body at (5,6)
        let snake = vec![
            Position::new(6, 6),
            Position::new(6, 5),
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(5, 7),
        ];
        let mut state = playing_state(snake.clone(), Direction::Left, GameMode::PassThrough);
        state.score = 40;

        let next = engine.move_snake(&state);

        assert_eq!(next.status, GameStatus::GameOver);
        assert_eq!(next.snake, snake);
        assert_eq!(next.score, 40);
    }

    #[test]
    fn test_moving_into_vacated_tail_is_safe() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        let snake = vec![
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 6),
            Position::new(5, 6),
        ];
        let state = playing_state(snake, Direction::Down, GameMode::Walls);

        let next = engine.move_snake(&state);

        assert_eq!(next.status, GameStatus::Playing);
        assert_eq!(
            next.snake,
            vec![
                Position::new(5, 6),
                Position::new(5, 5),
                Position::new(6, 5),
                Position::new(6, 6),
            ]
        );
    }

    #[test]
    fn test_eating_the_last_free_cell_ends_the_game() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 1);
        // Boustrophedon walk over the whole grid; the snake covers every
        // cell except the first one, where the food sits
        let path: Vec<Position> = (0..GRID_SIZE)
            .flat_map(|y| {
                let row: Vec<Position> = (0..GRID_SIZE).map(|x| Position::new(x, y)).collect();
                if y % 2 == 0 {
                    row
                } else {
                    row.into_iter().rev().collect()
                }
            })
            .collect();
        let mut state = playing_state(path[1..].to_vec(), Direction::Left, GameMode::Walls);
        state.food = path[0];

        let next = engine.move_snake(&state);

        assert_eq!(next.status, GameStatus::GameOver);
        assert_eq!(next.len(), (GRID_SIZE * GRID_SIZE) as usize);
        assert_eq!(next.score, 10);
    }

    #[test]
    fn test_final_score() {
        let engine = GameEngine::seeded(GameConfig::default(), 1);
        let mut state = playing_state(centre_snake(), Direction::Left, GameMode::Walls);
        state.score = 100;
        assert_eq!(engine.final_score(&state), 150);

        state.mode = GameMode::PassThrough;
        assert_eq!(engine.final_score(&state), 100);

        state.mode = GameMode::Walls;
        state.score = 15;
        assert_eq!(engine.final_score(&state), 22);
        // The stored score is never scaled
        assert_eq!(state.score, 15);
    }

    #[test]
    fn test_seeded_games_are_replayable() {
        let mut a = GameEngine::seeded(GameConfig::default(), 2024);
        let mut b = GameEngine::seeded(GameConfig::default(), 2024);
        assert_eq!(
            a.create_initial_state(GameMode::PassThrough),
            b.create_initial_state(GameMode::PassThrough)
        );
    }
}
