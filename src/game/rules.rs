//! Pure movement, collision and steering rules
//!
//! None of these functions touch randomness or configuration, so they can be
//! called freely by drivers, renderers and the autopilot.

use std::borrow::Cow;

use super::{
    action::Direction,
    state::{GRID_SIZE, GameMode, GameState, Position},
};

/// Position the head reaches after one step
///
/// Pass-through mode wraps onto the grid; walls mode returns the raw
/// coordinate, which may lie outside the grid.
pub fn next_head_position(head: Position, direction: Direction, mode: GameMode) -> Position {
    let next = head.moved_in_direction(direction);
    match mode {
        GameMode::PassThrough => next.wrapped(),
        GameMode::Walls => next,
    }
}

pub fn is_out_of_bounds(position: Position) -> bool {
    position.x < 0 || position.x >= GRID_SIZE || position.y < 0 || position.y >= GRID_SIZE
}

/// True if the head (first segment) overlaps any later segment
///
/// When checking a move that does not grow the snake, pass the segments
/// without the current tail: that cell is vacated on the same tick.
pub fn check_self_collision(snake: &[Position]) -> bool {
    match snake.split_first() {
        Some((head, body)) => body.contains(head),
        None => false,
    }
}

pub fn check_food_collision(head: Position, food: Position) -> bool {
    head == food
}

/// Any turn except a reversal is allowed
pub fn is_valid_direction_change(current: Direction, next: Direction) -> bool {
    !current.is_opposite(next)
}

/// Steer the snake
///
/// Returns the input unchanged (`Cow::Borrowed`) for a reversal or for the
/// current heading; status is not consulted.
pub fn change_direction(state: &GameState, direction: Direction) -> Cow<'_, GameState> {
    if !is_valid_direction_change(state.direction, direction) || state.direction == direction {
        return Cow::Borrowed(state);
    }

    Cow::Owned(GameState {
        direction,
        ..state.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameStatus;

    fn state_heading(direction: Direction) -> GameState {
        GameState {
            snake: vec![
                Position::new(10, 10),
                Position::new(11, 10),
                Position::new(12, 10),
            ],
            food: Position::new(0, 0),
            direction,
            score: 0,
            status: GameStatus::Playing,
            mode: GameMode::PassThrough,
            speed: 150,
        }
    }

    #[test]
    fn test_pass_through_wraps_every_edge() {
        let mode = GameMode::PassThrough;
        assert_eq!(
            next_head_position(Position::new(0, 5), Direction::Left, mode),
            Position::new(19, 5)
        );
        assert_eq!(
            next_head_position(Position::new(19, 5), Direction::Right, mode),
            Position::new(0, 5)
        );
        assert_eq!(
            next_head_position(Position::new(5, 0), Direction::Up, mode),
            Position::new(5, 19)
        );
        assert_eq!(
            next_head_position(Position::new(5, 19), Direction::Down, mode),
            Position::new(5, 0)
        );
    }

    #[test]
    fn test_pass_through_never_leaves_grid() {
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                for dir in Direction::ALL {
                    let next =
                        next_head_position(Position::new(x, y), dir, GameMode::PassThrough);
                    assert!(!is_out_of_bounds(next), "{:?} {:?} -> {:?}", (x, y), dir, next);
                }
            }
        }
    }

    #[test]
    fn test_walls_mode_returns_raw_coordinates() {
        let mode = GameMode::Walls;
        assert_eq!(
            next_head_position(Position::new(0, 5), Direction::Left, mode),
            Position::new(-1, 5)
        );
        assert_eq!(
            next_head_position(Position::new(19, 5), Direction::Right, mode),
            Position::new(20, 5)
        );
        assert_eq!(
            next_head_position(Position::new(5, 0), Direction::Up, mode),
            Position::new(5, -1)
        );
        assert_eq!(
            next_head_position(Position::new(5, 5), Direction::Down, mode),
            Position::new(5, 6)
        );
    }

    #[test]
    fn test_bounds_checking() {
        assert!(!is_out_of_bounds(Position::new(0, 0)));
        assert!(!is_out_of_bounds(Position::new(19, 19)));
        assert!(is_out_of_bounds(Position::new(-1, 0)));
        assert!(is_out_of_bounds(Position::new(0, -1)));
        assert!(is_out_of_bounds(Position::new(20, 0)));
        assert!(is_out_of_bounds(Position::new(0, 20)));
    }

    #[test]
    fn test_self_collision() {
        let clear = [Position::new(5, 5), Position::new(6, 5), Position::new(7, 5)];
        assert!(!check_self_collision(&clear));

        let hit = [
            Position::new(6, 5),
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(7, 5),
        ];
        assert!(check_self_collision(&hit));

        assert!(!check_self_collision(&[Position::new(1, 1)]));
        assert!(!check_self_collision(&[]));
    }

    #[test]
    fn test_food_collision() {
        assert!(check_food_collision(Position::new(3, 4), Position::new(3, 4)));
        assert!(!check_food_collision(Position::new(3, 4), Position::new(4, 3)));
    }

    #[test]
    fn test_direction_validity_table() {
        for dir in Direction::ALL {
            assert!(!is_valid_direction_change(dir, dir.opposite()));
            assert!(is_valid_direction_change(dir, dir));
            for side in dir.perpendicular() {
                assert!(is_valid_direction_change(dir, side));
            }
        }
    }

    #[test]
    fn test_change_direction_rejects_reversal() {
        let state = state_heading(Direction::Left);
        let next = change_direction(&state, Direction::Right);
        assert!(matches!(next, Cow::Borrowed(_)));
        assert!(std::ptr::eq(next.as_ref(), &state));
    }

    #[test]
    fn test_change_direction_same_heading_is_noop() {
        let state = state_heading(Direction::Left);
        let next = change_direction(&state, Direction::Left);
        assert!(std::ptr::eq(next.as_ref(), &state));
    }

    #[test]
    fn test_change_direction_turns_without_moving() {
        let state = state_heading(Direction::Left);
        let next = change_direction(&state, Direction::Up);
        assert!(matches!(next, Cow::Owned(_)));
        assert_eq!(next.direction, Direction::Up);
        assert_eq!(next.snake, state.snake);
        assert_eq!(state.direction, Direction::Left);
    }

    #[test]
    fn test_change_direction_ignores_status() {
        let mut state = state_heading(Direction::Left);
        state.status = GameStatus::Paused;
        let next = change_direction(&state, Direction::Down);
        assert_eq!(next.direction, Direction::Down);
        assert_eq!(next.status, GameStatus::Paused);
    }
}
