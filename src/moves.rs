//! Directions and whole-board moves built from line merges.

use crate::error::GameError;
use crate::grid::Grid;
use crate::line::merge_line;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Grid coordinates of line `index`, starting at the edge the tiles move toward.
    fn line_coords(self, size: usize, index: usize) -> impl Iterator<Item = (usize, usize)> {
        (0..size).map(move |k| match self {
            Self::Left => (index, k),
            Self::Right => (index, size - 1 - k),
            Self::Up => (k, index),
            Self::Down => (size - 1 - k, index),
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(s)
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Self::Up),
            "down" | "d" => Ok(Self::Down),
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(GameError::InvalidDirection(s.to_string())),
        }
    }
}

/// Outcome of one board move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveResult {
    pub changed: bool,
    pub score_delta: u64,
    /// Values produced by merges this move.
    pub merged_values: Vec<u32>,
    /// Where those merged tiles ended up, as (row, col).
    pub merged_cells: Vec<(usize, usize)>,
}

/// Slide every line toward `direction`. Lines that do not change are never written,
/// so an unchanged move leaves the grid identical.
pub fn apply_move(grid: &mut Grid, direction: Direction) -> MoveResult {
    let size = grid.size();
    let mut result = MoveResult::default();

    for index in 0..size {
        let coords: Vec<(usize, usize)> = direction.line_coords(size, index).collect();
        let line: Vec<u32> = coords.iter().map(|&rc| grid[rc]).collect();
        let merged = merge_line(&line);

        if merged.cells != line {
            result.changed = true;
            for (&rc, &v) in coords.iter().zip(&merged.cells) {
                grid[rc] = v;
            }
        }
        result.score_delta += merged.score();
        for &(pos, value) in &merged.merges {
            result.merged_values.push(value);
            result.merged_cells.push(coords[pos]);
        }
    }
    result
}

/// Whether `direction` would change the board.
pub fn can_move(grid: &Grid, direction: Direction) -> bool {
    let mut scratch = grid.clone();
    apply_move(&mut scratch, direction).changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[[u32; 4]]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("Left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(" u ".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(
            "sideways".parse::<Direction>(),
            Err(GameError::InvalidDirection("sideways".to_string()))
        );
    }

    #[test]
    fn test_move_left_merges_rows() {
        let mut g = grid(&[[2, 2, 0, 0], [2, 0, 2, 4], [0; 4], [4, 4, 4, 4]]);
        let r = apply_move(&mut g, Direction::Left);
        assert!(r.changed);
        assert_eq!(g.row(0), &[4, 0, 0, 0]);
        assert_eq!(g.row(1), &[4, 4, 0, 0]);
        assert_eq!(g.row(3), &[8, 8, 0, 0]);
        assert_eq!(r.score_delta, 4 + 4 + 16);
        assert_eq!(r.merged_values, vec![4, 4, 8, 8]);
        assert_eq!(r.merged_cells, vec![(0, 0), (1, 0), (3, 0), (3, 1)]);
    }

    #[test]
    fn test_move_right_reads_reversed() {
        let mut g = grid(&[[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
        let r = apply_move(&mut g, Direction::Right);
        assert_eq!(g.row(0), &[0, 0, 2, 4]);
        assert_eq!(r.merged_cells, vec![(0, 3)]);
    }

    #[test]
    fn test_move_up_and_down_columns() {
        let base = grid(&[[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 8], [0, 0, 0, 8]]);

        let mut up = base.clone();
        let r = apply_move(&mut up, Direction::Up);
        assert_eq!(up.column(0), vec![4, 4, 0, 0]);
        assert_eq!(up.column(3), vec![16, 0, 0, 0]);
        assert_eq!(r.score_delta, 20);

        let mut down = base;
        let r = apply_move(&mut down, Direction::Down);
        assert_eq!(down.column(0), vec![0, 0, 4, 4]);
        assert_eq!(down.column(3), vec![0, 0, 0, 16]);
        assert_eq!(r.merged_cells, vec![(2, 0), (3, 3)]);
    }

    #[test]
    fn test_noop_move_leaves_grid_untouched() {
        let mut g = grid(&[[2, 4, 2, 0], [0; 4], [0; 4], [0; 4]]);
        let before = g.clone();
        let r = apply_move(&mut g, Direction::Left);
        assert!(!r.changed);
        assert_eq!(r.score_delta, 0);
        assert_eq!(g, before);

        let again = apply_move(&mut g, Direction::Left);
        assert_eq!(again, r);
        assert_eq!(g, before);
    }

    #[test]
    fn test_can_move_does_not_mutate() {
        let g = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
        assert!(!can_move(&g, Direction::Left));
        assert!(!can_move(&g, Direction::Up));
        assert!(can_move(&g, Direction::Right));
        assert!(can_move(&g, Direction::Down));
        assert_eq!(g.get(3, 3), Some(0));
    }

    #[test]
    fn test_larger_board() {
        let mut g = Grid::from_rows(&[
            vec![2, 2, 2, 2, 2],
            vec![0; 5],
            vec![0; 5],
            vec![0; 5],
            vec![0; 5],
        ])
        .unwrap();
        let r = apply_move(&mut g, Direction::Left);
        assert_eq!(g.row(0), &[4, 4, 2, 0, 0]);
        assert_eq!(r.score_delta, 8);
    }
}
