//! Errors raised by the board model and direction parsing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("board size must be at least 2, got {0}")]
    BoardTooSmall(usize),
    #[error("board is not square: row {row} has {len} cells, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },
    #[error("invalid tile value {value} at ({row}, {col}): tiles are 0 or a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),
}
