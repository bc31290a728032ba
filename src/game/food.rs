//! Sources of candidate food cells
//!
//! Food placement draws cells from a [`CellSource`] and rejects occupied ones.
//! Production games use [`RandomCells`]; tests and replays can feed an exact
//! sequence through [`ScriptedCells`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::state::Position;

pub trait CellSource {
    /// Draw a cell from `[0, grid_size) x [0, grid_size)`
    fn sample(&mut self, grid_size: i32) -> Position;
}

/// Uniform cells from a random number generator
pub struct RandomCells<R = StdRng> {
    rng: R,
}

impl RandomCells<StdRng> {
    /// Reproducible source for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomCells<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> CellSource for RandomCells<R> {
    fn sample(&mut self, grid_size: i32) -> Position {
        let x = self.rng.gen_range(0..grid_size);
        let y = self.rng.gen_range(0..grid_size);
        Position::new(x, y)
    }
}

/// Replays a fixed list of cells, starting over when it runs out
///
/// The script must contain at least one cell that is free whenever food is
/// placed, otherwise rejection sampling never finishes.
#[derive(Debug, Clone)]
pub struct ScriptedCells {
    cells: Vec<Position>,
    next: usize,
}

impl ScriptedCells {
    pub fn new(cells: impl IntoIterator<Item = Position>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            next: 0,
        }
    }

    /// Number of cells handed out so far
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl CellSource for ScriptedCells {
    fn sample(&mut self, _grid_size: i32) -> Position {
        if self.cells.is_empty() {
            return Position::default();
        }
        let cell = self.cells[self.next % self.cells.len()];
        self.next += 1;
        cell
    }
}
