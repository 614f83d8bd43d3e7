//! Grid model: fixed-size board, collision, merge and line clears.

use crate::piece::Matrix;
use std::collections::VecDeque;

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 10;

/// Board of cell ids. y=0 is the top row; 0 is empty, 1..=7 is a locked piece kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<u8>>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: (0..rows).map(|_| vec![0; cols]).collect(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|&c| c == 0))
    }

    /// True if any occupied piece cell at offset (px, py) lands outside the side walls,
    /// below the floor, or on an occupied cell. Cells above row 0 only check the walls.
    pub fn collides(&self, piece: &Matrix, px: i32, py: i32) -> bool {
        let (cols, rows) = (self.cols as i32, self.rows() as i32);
        piece.cells().any(|(dx, dy, _)| {
            let x = px + dx as i32;
            let y = py + dy as i32;
            if x < 0 || x >= cols || y >= rows {
                return true;
            }
            y >= 0 && self.rows[y as usize][x as usize] != 0
        })
    }

    /// Write every occupied piece cell into the board. Cells outside the board are dropped.
    pub fn merge(&mut self, piece: &Matrix, px: i32, py: i32) {
        for (dx, dy, id) in piece.cells() {
            let x = px + dx as i32;
            let y = py + dy as i32;
            if x < 0 || y < 0 {
                continue;
            }
            if let Some(cell) = self
                .rows
                .get_mut(y as usize)
                .and_then(|row| row.get_mut(x as usize))
            {
                *cell = id;
            }
        }
    }

    /// Remove every full row, shifting the rows above down and adding empty rows on top.
    /// Scans bottom-up and re-checks the same index after a removal. Returns rows removed.
    pub fn clear_completed_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.rows();
        while y > 0 {
            let idx = y - 1;
            if self.rows[idx].iter().all(|&c| c != 0) {
                self.rows.remove(idx);
                self.rows.push_front(vec![0; self.cols]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}
