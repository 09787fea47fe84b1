//! Board: NxN tile values stored row-major. 0 is empty; every other value is 2^k, k >= 1.

use crate::error::GameError;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Reference board edge length.
pub const DEFAULT_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

/// True for 0 and for powers of two >= 2.
#[inline]
pub fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

impl Grid {
    /// Empty board. Sizes below 2 have no meaningful moves and are rejected.
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size < 2 {
            return Err(GameError::BoardTooSmall(size));
        }
        Ok(Self {
            size,
            cells: vec![0; size * size],
        })
    }

    /// Build a board from nested rows, validating shape and tile values.
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, GameError> {
        let mut grid = Self::new(rows.len())?;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != grid.size {
                return Err(GameError::NotSquare {
                    row: r,
                    len: row.len(),
                    expected: grid.size,
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(GameError::InvalidTile { row: r, col: c, value });
                }
                grid[(r, c)] = value;
            }
        }
        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col).copied()
    }

    /// Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        if row < self.size && col < self.size {
            self.cells[row * self.size + col] = value;
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.size;
        &self.cells[start..start + self.size]
    }

    pub fn column(&self, col: usize) -> Vec<u32> {
        (0..self.size).map(|r| self[(r, col)]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    pub fn has_empty(&self) -> bool {
        self.cells.contains(&0)
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = u32;

    fn index(&self, (row, col): (usize, usize)) -> &u32 {
        &self.cells[row * self.size + col]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut u32 {
        &mut self.cells[row * self.size + col]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &v in row {
                if v == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{v:>6}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let g = Grid::new(4).unwrap();
        assert_eq!(g.size(), 4);
        assert_eq!(g.empty_cells().len(), 16);
        assert_eq!(g.total(), 0);
    }

    #[test]
    fn test_new_rejects_size_one() {
        assert_eq!(Grid::new(1), Err(GameError::BoardTooSmall(1)));
        assert_eq!(Grid::new(0), Err(GameError::BoardTooSmall(0)));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Grid::from_rows(&[vec![2, 0], vec![0]]).unwrap_err();
        assert_eq!(err, GameError::NotSquare { row: 1, len: 1, expected: 2 });
    }

    #[test]
    fn test_from_rows_rejects_non_power_of_two() {
        let err = Grid::from_rows(&[[2, 3], [0, 0]]).unwrap_err();
        assert_eq!(err, GameError::InvalidTile { row: 0, col: 1, value: 3 });
        assert!(Grid::from_rows(&[[1, 0], [0, 0]]).is_err());
    }

    #[test]
    fn test_accessors() {
        let mut g = Grid::from_rows(&[[2, 0, 4], [0, 8, 0], [16, 0, 0]]).unwrap();
        assert_eq!(g.get(1, 1), Some(8));
        assert_eq!(g.get(3, 0), None);
        assert_eq!(g.row(0), &[2, 0, 4]);
        assert_eq!(g.column(0), vec![2, 0, 16]);
        assert_eq!(g.max_tile(), 16);
        assert_eq!(g.total(), 30);
        assert_eq!(g.empty_cells()[0], (0, 1));
        g.set(2, 2, 32);
        g.set(5, 5, 64);
        assert_eq!(g[(2, 2)], 32);
        assert_eq!(g.total(), 62);
    }
}
