//! Grid module - manages the 9x9 token store
//!
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (row, col) where row ranges 0..8 (top to bottom) and col
//! ranges 0..8 (left to right).
//!
//! The grid is deliberately dumb: it swaps, clears and compacts, but knows
//! nothing about matches or legality.

use std::fmt;

use crate::error::GridError;
use crate::types::{Coord, TokenValue, GRID_COLS, GRID_ROWS};

/// Total number of cells on the grid
pub const GRID_SIZE: usize = (GRID_ROWS as usize) * (GRID_COLS as usize);

/// The game grid - 9 rows x 9 columns using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Flat array of cells, row-major order (row * COLS + col)
    cells: [TokenValue; GRID_SIZE],
}

impl Grid {
    /// Create a grid with every cell `Empty`
    pub fn new() -> Self {
        Self::filled(TokenValue::Empty)
    }

    /// Create a grid with every cell set to `value`
    pub fn filled(value: TokenValue) -> Self {
        Self {
            cells: [value; GRID_SIZE],
        }
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(coord: Coord) -> Option<usize> {
        if !Self::in_bounds(coord) {
            return None;
        }
        Some((coord.row as usize) * (GRID_COLS as usize) + (coord.col as usize))
    }

    /// Check if a coordinate lies inside `[0, rows) x [0, cols)`
    pub fn in_bounds(coord: Coord) -> bool {
        coord.row >= 0
            && coord.row < GRID_ROWS as i8
            && coord.col >= 0
            && coord.col < GRID_COLS as i8
    }

    pub fn rows(&self) -> u8 {
        GRID_ROWS
    }

    pub fn cols(&self) -> u8 {
        GRID_COLS
    }

    /// Get the token at `coord`
    pub fn get(&self, coord: Coord) -> Result<TokenValue, GridError> {
        self.cell(coord).ok_or(GridError::OutOfBounds {
            row: coord.row,
            col: coord.col,
        })
    }

    /// Get the token at `coord`, `None` if out of bounds
    #[inline]
    pub fn cell(&self, coord: Coord) -> Option<TokenValue> {
        Self::index(coord).map(|idx| self.cells[idx])
    }

    /// Set the token at `coord`
    pub fn set(&mut self, coord: Coord, value: TokenValue) -> Result<(), GridError> {
        let idx = Self::index(coord).ok_or(GridError::OutOfBounds {
            row: coord.row,
            col: coord.col,
        })?;
        self.cells[idx] = value;
        Ok(())
    }

    /// Exchange two cells. No legality check; calling it twice restores the grid.
    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), GridError> {
        let ia = Self::index(a).ok_or(GridError::OutOfBounds {
            row: a.row,
            col: a.col,
        })?;
        let ib = Self::index(b).ok_or(GridError::OutOfBounds {
            row: b.row,
            col: b.col,
        })?;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Set every listed cell to `Empty`, skipping out-of-bounds entries.
    /// Returns the number of cells that were not already empty.
    pub fn remove_cells<'a, I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = &'a Coord>,
    {
        let mut removed = 0;
        for &coord in cells {
            if let Some(idx) = Self::index(coord) {
                if !self.cells[idx].is_empty() {
                    removed += 1;
                }
                self.cells[idx] = TokenValue::Empty;
            }
        }
        removed
    }

    /// Compact every column toward the bottom and refill the vacated cells.
    ///
    /// Non-empty tokens keep their relative order. Vacated cells are filled
    /// from the top of the column downward, one `draw()` call per cell.
    /// Returns the number of cells refilled.
    pub fn gravity_refill<F>(&mut self, mut draw: F) -> usize
    where
        F: FnMut() -> TokenValue,
    {
        let rows = GRID_ROWS as usize;
        let cols = GRID_COLS as usize;
        let mut refilled = 0;

        for col in 0..cols {
            // Two-pointer compaction, scanning bottom to top
            let mut write = rows;
            for read in (0..rows).rev() {
                let value = self.cells[read * cols + col];
                if !value.is_empty() {
                    write -= 1;
                    self.cells[write * cols + col] = value;
                }
            }

            for row in 0..write {
                let value = draw();
                debug_assert!(!value.is_empty(), "token source produced an empty cell");
                self.cells[row * cols + col] = value;
                refilled += 1;
            }
        }

        refilled
    }

    /// Push `top` into row 0 of `col`, shifting the column down by one.
    /// Returns the token that fell off the bottom row.
    pub fn shift_column_down(&mut self, col: i8, top: TokenValue) -> Result<TokenValue, GridError> {
        if !Self::in_bounds(Coord::new(0, col)) {
            return Err(GridError::OutOfBounds { row: 0, col });
        }
        let cols = GRID_COLS as usize;
        let col = col as usize;
        let rows = GRID_ROWS as usize;

        let dropped = self.cells[(rows - 1) * cols + col];
        for row in (1..rows).rev() {
            self.cells[row * cols + col] = self.cells[(row - 1) * cols + col];
        }
        self.cells[col] = top;
        Ok(dropped)
    }

    /// True if no `Empty` cell sits below a non-empty cell in any column
    pub fn is_compacted(&self) -> bool {
        let cols = GRID_COLS as usize;
        (0..cols).all(|col| {
            let mut seen_filled = false;
            (0..GRID_ROWS as usize).all(|row| {
                let empty = self.cells[row * cols + col].is_empty();
                if !empty {
                    seen_filled = true;
                }
                !(empty && seen_filled)
            })
        })
    }

    /// True if every cell holds a token
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Iterate over all coordinates in row-major order
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..GRID_ROWS as i8).flat_map(|row| (0..GRID_COLS as i8).map(move |col| Coord::new(row, col)))
    }

    /// Iterate over `(coord, token)` pairs in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, TokenValue)> + '_ {
        Self::coords().zip(self.cells.iter().copied())
    }

    /// Count cells matching a predicate
    pub fn count<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(TokenValue) -> bool,
    {
        self.cells.iter().filter(|&&cell| pred(cell)).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[TokenValue] {
        &self.cells
    }

    /// Copy the grid into a 2D array (for snapshots)
    pub fn write_rows(&self, out: &mut [[TokenValue; GRID_COLS as usize]; GRID_ROWS as usize]) {
        let cols = GRID_COLS as usize;
        for (row, out_row) in out.iter_mut().enumerate() {
            out_row.copy_from_slice(&self.cells[row * cols..(row + 1) * cols]);
        }
    }

    /// Build a grid from one glyph string per row (see [`TokenValue::glyph`]).
    /// Whitespace inside a row is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use bubble_pop_core::Grid;
    /// use bubble_pop_core::types::{Coord, TokenValue};
    ///
    /// let grid = Grid::from_rows(&[
    ///     "ABCDEFABC",
    ///     "BCDEFABCD",
    ///     "CDEFABCDE",
    ///     "DEFABCDEF",
    ///     "EFABCDEFA",
    ///     "FABCDEFAB",
    ///     "ABCDEFABC",
    ///     "BCDEFABCD",
    ///     "CDEFABC*+",
    /// ])
    /// .unwrap();
    /// assert_eq!(grid.get(Coord::new(8, 7)), Ok(TokenValue::Wildcard));
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        if rows.len() != GRID_ROWS as usize {
            return Err(GridError::Parse {
                row: rows.len(),
                reason: format!("expected {} rows, got {}", GRID_ROWS, rows.len()),
            });
        }

        let mut grid = Self::new();
        let cols = GRID_COLS as usize;
        for (row, text) in rows.iter().enumerate() {
            let glyphs: Vec<char> = text
                .as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if glyphs.len() != cols {
                return Err(GridError::Parse {
                    row,
                    reason: format!("expected {} cells, got {}", cols, glyphs.len()),
                });
            }
            for (col, glyph) in glyphs.into_iter().enumerate() {
                let value = TokenValue::from_glyph(glyph).ok_or_else(|| GridError::Parse {
                    row,
                    reason: format!("unknown glyph {:?}", glyph),
                })?;
                grid.cells[row * cols + col] = value;
            }
        }
        Ok(grid)
    }

    /// Render each row as a glyph string (inverse of [`Grid::from_rows`])
    pub fn to_rows(&self) -> Vec<String> {
        let cols = GRID_COLS as usize;
        self.cells
            .chunks(cols)
            .map(|row| row.iter().map(TokenValue::glyph).collect())
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.to_rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_index_calculation() {
        assert_eq!(Grid::index(Coord::new(0, 0)), Some(0));
        assert_eq!(Grid::index(Coord::new(0, 8)), Some(8));
        assert_eq!(Grid::index(Coord::new(1, 0)), Some(9));
        assert_eq!(Grid::index(Coord::new(8, 8)), Some(80));
        assert_eq!(Grid::index(Coord::new(-1, 0)), None);
        assert_eq!(Grid::index(Coord::new(0, 9)), None);
        assert_eq!(Grid::index(Coord::new(9, 0)), None);
    }

    #[test]
    fn test_gravity_keeps_column_order() {
        let mut grid = Grid::filled(TokenValue::Normal(0));
        // Column 2, top to bottom: B . C . D ...
        grid.set(Coord::new(0, 2), TokenValue::Normal(1)).unwrap();
        grid.set(Coord::new(1, 2), TokenValue::Empty).unwrap();
        grid.set(Coord::new(2, 2), TokenValue::Normal(2)).unwrap();
        grid.set(Coord::new(3, 2), TokenValue::Empty).unwrap();
        grid.set(Coord::new(4, 2), TokenValue::Normal(3)).unwrap();

        let refilled = grid.gravity_refill(|| TokenValue::Wildcard);
        assert_eq!(refilled, 2);

        let column: Vec<TokenValue> = (0..9)
            .map(|r| grid.get(Coord::new(r, 2)).unwrap())
            .collect();
        assert_eq!(column[0], TokenValue::Wildcard);
        assert_eq!(column[1], TokenValue::Wildcard);
        assert_eq!(column[2], TokenValue::Normal(1));
        assert_eq!(column[3], TokenValue::Normal(2));
        assert_eq!(column[4], TokenValue::Normal(3));
        assert!(column[5..].iter().all(|&t| t == TokenValue::Normal(0)));
    }

    #[test]
    fn test_refill_draws_top_down() {
        let mut grid = Grid::filled(TokenValue::Normal(0));
        grid.remove_cells(&[Coord::new(7, 4), Coord::new(8, 4)]);

        let mut next = 0u8;
        grid.gravity_refill(|| {
            next += 1;
            TokenValue::Normal(next)
        });

        assert_eq!(grid.get(Coord::new(0, 4)), Ok(TokenValue::Normal(1)));
        assert_eq!(grid.get(Coord::new(1, 4)), Ok(TokenValue::Normal(2)));
        assert_eq!(grid.get(Coord::new(2, 4)), Ok(TokenValue::Normal(0)));
    }

    #[test]
    fn test_shift_column_down() {
        let mut grid = Grid::from_rows(&[
            "AAAAAAAAA",
            "BBBBBBBBB",
            "CCCCCCCCC",
            "DDDDDDDDD",
            "EEEEEEEEE",
            "FFFFFFFFF",
            "GGGGGGGGG",
            "HHHHHHHHH",
            "ABCDEFGH#",
        ])
        .unwrap();

        let dropped = grid.shift_column_down(3, TokenValue::Snake).unwrap();
        assert_eq!(dropped, TokenValue::Normal(3));
        assert_eq!(grid.get(Coord::new(0, 3)), Ok(TokenValue::Snake));
        assert_eq!(grid.get(Coord::new(1, 3)), Ok(TokenValue::Normal(0)));
        assert_eq!(grid.get(Coord::new(8, 3)), Ok(TokenValue::Normal(7)));
        // Neighbouring column untouched
        assert_eq!(grid.get(Coord::new(0, 4)), Ok(TokenValue::Normal(0)));

        assert!(grid.shift_column_down(9, TokenValue::Snake).is_err());
    }

    #[test]
    fn test_is_compacted() {
        let mut grid = Grid::filled(TokenValue::Normal(1));
        assert!(grid.is_compacted());

        grid.set(Coord::new(0, 0), TokenValue::Empty).unwrap();
        assert!(grid.is_compacted());

        grid.set(Coord::new(5, 5), TokenValue::Empty).unwrap();
        assert!(!grid.is_compacted());
    }

    #[test]
    fn test_rows_roundtrip() {
        let rows = [
            "ABCDEFGH#", "*@-|+~...", "AAAAAAAAA", "BBBBBBBBB", "CCCCCCCCC",
            "DDDDDDDDD", "EEEEEEEEE", "FFFFFFFFF", "GGGGGGGGG",
        ];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_from_rows_rejects_bad_fixtures() {
        assert!(matches!(
            Grid::from_rows(&["AAA"]),
            Err(GridError::Parse { .. })
        ));
        let mut rows = vec!["AAAAAAAAA"; 9];
        rows[4] = "AAAAxAAAA";
        assert!(matches!(
            Grid::from_rows(&rows),
            Err(GridError::Parse { row: 4, .. })
        ));
    }
}
