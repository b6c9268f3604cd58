use crate::error::BoardError;

use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

impl Cell {
    /// The player occupying this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Player::Red),
            Cell::Yellow => Some(Player::Yellow),
        }
    }
}

/// Result of evaluating a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
    Ongoing,
}

impl GameOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameOutcome::Ongoing)
    }
}

/// A Connect Four board of arbitrary dimensions.
///
/// Cells are stored row-major with row 0 at the top; pieces stack upward from
/// row `rows - 1`. Grids smaller than 4 in both dimensions are legal; they
/// simply can never produce a win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board. Both dimensions must be positive.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "board dimensions must be positive");
        Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Rehydrate a board from a row-major cell matrix.
    pub fn from_cells(grid: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, |r| r.len());
        if rows == 0 || cols == 0 || grid.iter().any(|r| r.len() != cols) {
            return Err(BoardError::MalformedSnapshot);
        }
        Ok(Board {
            rows,
            cols,
            cells: grid.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the cell at a specific position.
    /// Row 0 is the top, row `rows - 1` is the bottom.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// The full grid, row-major. Useful for serializing a snapshot.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// True iff `col` exists and its topmost cell is empty.
    ///
    /// This is a pure query: an out-of-range column is simply not playable.
    /// The mutation path ([`drop_piece`](Self::drop_piece)) reports the range
    /// violation as a hard error instead.
    pub fn is_column_playable(&self, col: usize) -> bool {
        col < self.cols && self.get(0, col) == Cell::Empty
    }

    /// Ordered list of playable column indices. Empty means the board is full.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..self.cols)
            .filter(|&col| self.is_column_playable(col))
            .collect()
    }

    /// Scan a column from the bottom up for the first empty row.
    /// `None` means the column is full (or out of range).
    pub fn lowest_open_row(&self, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        (0..self.rows).rev().find(|&row| self.get(row, col) == Cell::Empty)
    }

    /// Checked cell write. Fails with `InvalidCell` if the target is occupied
    /// or outside the grid.
    pub fn place_at(&mut self, row: usize, col: usize, player: Player) -> Result<(), BoardError> {
        if row >= self.rows || col >= self.cols {
            return Err(BoardError::InvalidCell { row, col });
        }
        let idx = row * self.cols + col;
        if self.cells[idx] != Cell::Empty {
            return Err(BoardError::InvalidCell { row, col });
        }
        self.cells[idx] = player.to_cell();
        Ok(())
    }

    /// Drop a piece into `col`, filling the lowest empty cell.
    /// Returns the row where the piece landed.
    pub fn drop_piece(&mut self, col: usize, player: Player) -> Result<usize, BoardError> {
        if col >= self.cols {
            return Err(BoardError::OutOfRange {
                col,
                cols: self.cols,
            });
        }
        let row = self
            .lowest_open_row(col)
            .ok_or(BoardError::InvalidCell { row: 0, col })?;
        self.cells[row * self.cols + col] = player.to_cell();
        Ok(row)
    }

    /// Evaluate the position: first winning line found, else draw/ongoing.
    ///
    /// Every admissible start-cell/direction pair is checked exactly once:
    /// horizontal runs start where `col + 3 < cols`, vertical where
    /// `row + 3 < rows`, the down-right diagonal needs both, and the up-right
    /// diagonal needs `row >= 3` with `col + 3 < cols`. The draw check runs
    /// only after the full win scan comes up empty.
    pub fn outcome(&self) -> GameOutcome {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let fits_right = col + 3 < self.cols;
                let fits_down = row + 3 < self.rows;

                if fits_right {
                    if let Some(p) = self.line_winner(row, col, 0, 1) {
                        return GameOutcome::Winner(p);
                    }
                }
                if fits_down {
                    if let Some(p) = self.line_winner(row, col, 1, 0) {
                        return GameOutcome::Winner(p);
                    }
                }
                if fits_right && fits_down {
                    if let Some(p) = self.line_winner(row, col, 1, 1) {
                        return GameOutcome::Winner(p);
                    }
                }
                if fits_right && row >= 3 {
                    if let Some(p) = self.line_winner(row, col, -1, 1) {
                        return GameOutcome::Winner(p);
                    }
                }
            }
        }

        if (0..self.cols).all(|col| self.get(0, col) != Cell::Empty) {
            GameOutcome::Draw
        } else {
            GameOutcome::Ongoing
        }
    }

    /// The owner of the four-cell run starting at (row, col) in direction
    /// (dr, dc), if all four cells hold the same player's piece.
    /// The caller guarantees the run stays in bounds.
    fn line_winner(&self, row: usize, col: usize, dr: isize, dc: isize) -> Option<Player> {
        let first = self.get(row, col);
        let player = first.player()?;
        for step in 1..4isize {
            let r = (row as isize + step * dr) as usize;
            let c = (col as isize + step * dc) as usize;
            if self.get(r, c) != first {
                return None;
            }
        }
        Some(player)
    }
}
