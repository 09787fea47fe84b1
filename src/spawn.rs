//! Random tile placement.

use crate::grid::Grid;
use rand::Rng;

/// Chance that a spawned tile is a 4 instead of a 2.
pub const FOUR_PROBABILITY: f64 = 0.1;

/// Randomness needed to place tiles. Every `rand::Rng` is a source; tests script one.
pub trait TileSource {
    /// Uniform index in `0..len`. `len` is never 0.
    fn pick(&mut self, len: usize) -> usize;
    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<R: Rng + ?Sized> TileSource for R {
    fn pick(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.random_bool(p)
    }
}

/// Fill one random empty cell with 2 or 4. Returns the cell, or `None` if the board is full.
pub fn spawn_tile<S: TileSource + ?Sized>(grid: &mut Grid, source: &mut S) -> Option<(usize, usize)> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }
    let (row, col) = empty[source.pick(empty.len()).min(empty.len() - 1)];
    let value = if source.chance(FOUR_PROBABILITY) { 4 } else { 2 };
    grid.set(row, col, value);
    Some((row, col))
}

/// Opening position: two random tiles.
pub fn seed_grid<S: TileSource + ?Sized>(grid: &mut Grid, source: &mut S) -> Vec<(usize, usize)> {
    (0..2).filter_map(|_| spawn_tile(grid, source)).collect()
}

/// Scripted source for deterministic tests: replays queued answers, then falls back to 0 / false.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pub picks: std::collections::VecDeque<usize>,
    pub chances: std::collections::VecDeque<bool>,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(picks: &[usize], chances: &[bool]) -> Self {
        Self {
            picks: picks.iter().copied().collect(),
            chances: chances.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl TileSource for ScriptedSource {
    fn pick(&mut self, _len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0)
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }
}
