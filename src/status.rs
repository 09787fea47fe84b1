//! Win and loss detection.

use crate::grid::Grid;
use crate::line::can_merge;

/// Reference win threshold.
pub const DEFAULT_WIN_TILE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Win and loss are tracked separately; both may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub won: bool,
    pub lost: bool,
}

impl StatusFlags {
    /// Lost wins over Won since it ends input.
    pub fn status(&self) -> GameStatus {
        if self.lost {
            GameStatus::Lost
        } else if self.won {
            GameStatus::Won
        } else {
            GameStatus::Playing
        }
    }
}

/// Evaluate the board. `currently_won` is carried in from the caller and never cleared.
pub fn evaluate(grid: &Grid, currently_won: bool, win_tile: u32) -> StatusFlags {
    StatusFlags {
        won: currently_won || grid.max_tile() >= win_tile,
        lost: !has_moves(grid),
    }
}

/// Any empty cell or any mergeable neighbour pair in a row or column means a move exists.
pub fn has_moves(grid: &Grid) -> bool {
    if grid.has_empty() {
        return true;
    }
    let pairs = |line: &[u32]| line.windows(2).any(|w| can_merge(w[0], w[1]));
    (0..grid.size()).any(|i| pairs(grid.row(i)) || pairs(grid.column(i).as_slice()))
}
