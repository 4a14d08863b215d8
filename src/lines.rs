//! Winning lines of an NxN grid.
//!
//! A game is won by filling a whole row, column, or one of the two full
//! diagonals with the same mark. Lines are checked by comparing every cell
//! against the first one, never by summing cell values.

use std::fmt;

use crate::board::{Board, Cell};

/// One of the `2 * width + 2` lines of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Row(usize),
    Column(usize),
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Line {
    /// All lines of a board of the given width: rows, then columns, then the
    /// two diagonals.
    pub fn all(width: usize) -> impl Iterator<Item = Line> {
        (0..width)
            .map(Line::Row)
            .chain((0..width).map(Line::Column))
            .chain([Line::Diagonal, Line::AntiDiagonal])
    }

    /// Lines passing through `(row, col)`. Diagonals are included only when
    /// the cell lies on them; the centre of an odd board lies on both.
    pub fn through(row: usize, col: usize, width: usize) -> impl Iterator<Item = Line> {
        let diagonal = (row == col).then_some(Line::Diagonal);
        let anti = (row + col + 1 == width).then_some(Line::AntiDiagonal);
        [Some(Line::Row(row)), Some(Line::Column(col)), diagonal, anti]
            .into_iter()
            .flatten()
    }

    /// Coordinates of the cells on this line, in order.
    pub fn cells(self, width: usize) -> impl Iterator<Item = (usize, usize)> {
        (0..width).map(move |i| match self {
            Line::Row(r) => (r, i),
            Line::Column(c) => (i, c),
            Line::Diagonal => (i, i),
            Line::AntiDiagonal => (i, width - 1 - i),
        })
    }

    /// The mark filling every cell of this line, if there is one.
    pub fn owner(self, board: &Board) -> Option<Cell> {
        let mut cells = self.cells(board.width()).map(|(r, c)| board.get_cell(r, c));
        let first = cells.next()?;
        if first == Cell::Blank {
            return None;
        }
        cells.all(|cell| cell == first).then_some(first)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Row(r) => write!(f, "row {r}"),
            Line::Column(c) => write!(f, "column {c}"),
            Line::Diagonal => write!(f, "the top-left to bottom-right diagonal"),
            Line::AntiDiagonal => write!(f, "the top-right to bottom-left diagonal"),
        }
    }
}

/// Scan every line of the board and return the first completed one.
pub fn find_winner(board: &Board) -> Option<(Cell, Line)> {
    Line::all(board.width()).find_map(|line| line.owner(board).map(|mark| (mark, line)))
}
