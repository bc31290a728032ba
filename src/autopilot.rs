//! Greedy computer player used by watch mode
//!
//! Looks one step ahead: of the moves that do not kill the snake right away,
//! take the one that ends closest to the food.

use crate::game::{
    Direction, GRID_SIZE, GameMode, GameState, Position, is_out_of_bounds, next_head_position,
};

/// Pick the heading for the next tick
///
/// Candidates are the current direction and its two perpendiculars (never a
/// reversal). Ties keep the current direction. With no safe option the
/// snake carries straight on.
pub fn choose_direction(state: &GameState) -> Direction {
    let current = state.direction;
    let [left, right] = current.perpendicular();

    let mut best: Option<(Direction, i32)> = None;
    for direction in [current, left, right] {
        let next = next_head_position(state.head(), direction, state.mode);
        if !is_safe(state, next) {
            continue;
        }

        let distance = distance(next, state.food, state.mode);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((direction, distance));
        }
    }

    best.map(|(direction, _)| direction).unwrap_or(current)
}

fn is_safe(state: &GameState, pos: Position) -> bool {
    if state.mode == GameMode::Walls && is_out_of_bounds(pos) {
        return false;
    }
    // The tail moves out of the way unless this step eats
    let body = if pos == state.food {
        &state.snake[..]
    } else {
        &state.snake[..state.snake.len() - 1]
    };
    !body.contains(&pos)
}

/// Manhattan distance, taking the short way round in pass-through mode
fn distance(a: Position, b: Position, mode: GameMode) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    match mode {
        GameMode::Walls => dx + dy,
        GameMode::PassThrough => dx.min(GRID_SIZE - dx) + dy.min(GRID_SIZE - dy),
    }
}
