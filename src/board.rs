//! Board state: the grid of marks, whose turn it is, and whether the game has
//! ended.
//!
//! Real moves go through [`Board::place`] (or [`Board::try_place`]), which
//! enforces legality, alternates turns, and detects the end of the game.
//! The search engine instead uses the raw [`Board::set_cell`] accessor to
//! simulate and undo hypothetical moves without touching turn state.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, trace};

use crate::constants::{BLANK_CHAR, CROSS_CHAR, N, NOUGHT_CHAR};
use crate::lines::{Line, find_winner};

/// The mark occupying a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    Cross,
    Nought,
    #[default]
    Blank,
}

impl Cell {
    /// The other player. `Blank` has no opponent.
    #[inline]
    pub fn opponent(self) -> Cell {
        match self {
            Cell::Cross => Cell::Nought,
            Cell::Nought => Cell::Cross,
            Cell::Blank => Cell::Blank,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Cross => CROSS_CHAR,
            Cell::Nought => NOUGHT_CHAR,
            Cell::Blank => BLANK_CHAR,
        }
    }

    /// Accepts `X`/`O` in either case, and `.`, `_`, `-` or a space for blank.
    pub fn from_char(c: char) -> Option<Cell> {
        match c.to_ascii_uppercase() {
            CROSS_CHAR => Some(Cell::Cross),
            NOUGHT_CHAR => Some(Cell::Nought),
            BLANK_CHAR | '_' | '-' | ' ' => Some(Cell::Blank),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A cell coordinate, zero-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.row, self.col)
    }
}

/// Why a placement was rejected. The board is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: ({row}, {col}) is off the {width}x{width} board")]
    OutOfBounds { row: i64, col: i64, width: usize },

    #[error("illegal move: ({row}, {col}) is already marked")]
    Occupied { row: usize, col: usize },

    #[error("illegal move: game is over")]
    GameOver,
}

/// Why a textual board layout could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBoardError {
    #[error("board has {got} cells, which is not a square of a positive width")]
    Length { got: usize },

    #[error("invalid character '{character}' at cell {position}")]
    Character { character: char, position: usize },

    #[error("invalid mark counts: X={crosses}, O={noughts} (X moves first)")]
    PieceCounts { crosses: usize, noughts: usize },
}

/// An NxN noughts and crosses board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    cells: Vec<Cell>,
    active_player: Cell,
    over: bool,
    winner: Cell,
    winning_line: Option<Line>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(N)
    }
}

impl Board {
    /// Create an empty board. Cross moves first.
    ///
    /// # Panics
    /// If `width` is zero.
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "board width must be positive");
        Self {
            width,
            cells: vec![Cell::Blank; width * width],
            active_player: Cell::Cross,
            over: false,
            winner: Cell::Blank,
            winning_line: None,
        }
    }

    /// Reset to the empty starting position, keeping the width.
    pub fn clear(&mut self) {
        *self = Self::new(self.width);
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The mark that moves next.
    #[inline]
    pub fn active_player(&self) -> Cell {
        self.active_player
    }

    /// True once a line has been completed or the grid has filled.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// The mark that completed a line, or `Blank` for a draw or a game in
    /// progress.
    #[inline]
    pub fn winner(&self) -> Cell {
        self.winner
    }

    /// The line that won the game, if any.
    #[inline]
    pub fn winning_line(&self) -> Option<Line> {
        self.winning_line
    }

    /// Read a cell.
    ///
    /// # Panics
    /// If the coordinate is off the board.
    #[inline]
    pub fn get_cell(&self, row: usize, col: usize) -> Cell {
        self.cells[self.idx(row, col)]
    }

    /// Overwrite a cell without checking legality, switching turns, or
    /// looking for a winner. Used by the search to try and undo moves.
    ///
    /// # Panics
    /// If the coordinate is off the board.
    #[inline]
    pub fn set_cell(&mut self, row: usize, col: usize, mark: Cell) {
        let i = self.idx(row, col);
        self.cells[i] = mark;
    }

    pub fn has_empty_cell(&self) -> bool {
        self.cells.contains(&Cell::Blank)
    }

    /// Blank cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Move> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Blank)
            .map(|(i, _)| Move::new(i / self.width, i % self.width))
    }

    /// Check every row, column and diagonal for a completed line.
    ///
    /// Unlike [`Board::winner`], this looks at the cells as they are now,
    /// including any hypothetical marks written by [`Board::set_cell`].
    pub fn scan_winner(&self) -> Option<(Cell, Line)> {
        find_winner(self)
    }

    /// Place the active player's mark at `(row, col)`.
    ///
    /// Returns `false`, leaving the board unchanged, if the coordinate is off
    /// the board, the cell is already marked, or the game is over.
    pub fn place(&mut self, row: i32, col: i32) -> bool {
        match self.try_place(row, col) {
            Ok(()) => true,
            Err(err) => {
                trace!(row, col, %err, "placement rejected");
                false
            }
        }
    }

    /// Like [`Board::place`], but says why a move was rejected.
    pub fn try_place(&mut self, row: i32, col: i32) -> Result<(), MoveError> {
        let (r, c) = self.check_bounds(row, col)?;
        if self.over {
            return Err(MoveError::GameOver);
        }
        if self.get_cell(r, c) != Cell::Blank {
            return Err(MoveError::Occupied { row: r, col: c });
        }

        let mark = self.active_player;
        self.set_cell(r, c, mark);
        self.active_player = mark.opponent();
        self.check_win(r, c);
        Ok(())
    }

    fn check_bounds(&self, row: i32, col: i32) -> Result<(usize, usize), MoveError> {
        let in_range = |v: i32| usize::try_from(v).ok().filter(|&v| v < self.width);
        match (in_range(row), in_range(col)) {
            (Some(r), Some(c)) => Ok((r, c)),
            _ => Err(MoveError::OutOfBounds {
                row: row.into(),
                col: col.into(),
                width: self.width,
            }),
        }
    }

    /// Look for a completed line through the cell just played, then for a
    /// full board.
    fn check_win(&mut self, row: usize, col: usize) {
        let completed = Line::through(row, col, self.width)
            .find_map(|line| line.owner(self).map(|mark| (mark, line)));

        if let Some((mark, line)) = completed {
            self.over = true;
            if self.winner == Cell::Blank {
                self.winner = mark;
                self.winning_line = Some(line);
                info!(winner = %mark, %line, "game won");
            }
            return;
        }

        if !self.has_empty_cell() {
            self.over = true;
            info!("game drawn");
        }
    }

    /// Number of crosses and noughts on the board.
    pub fn mark_counts(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(x, o), cell| match cell {
            Cell::Cross => (x + 1, o),
            Cell::Nought => (x, o + 1),
            Cell::Blank => (x, o),
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.width {
            for col in 0..self.width {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.get_cell(row, col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parse a board from its rows, e.g. `"XO.\n.X.\n..O"`.
///
/// Whitespace between cells is ignored, so the output of `Display` parses
/// back. The width is the square root of the cell count. The side to move is
/// inferred from the mark counts, and the terminal state from a full scan.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        let width = chars.len().isqrt();
        if width == 0 || width * width != chars.len() {
            return Err(ParseBoardError::Length { got: chars.len() });
        }

        let mut board = Board::new(width);
        for (i, &ch) in chars.iter().enumerate() {
            let cell = Cell::from_char(ch).ok_or(ParseBoardError::Character {
                character: ch,
                position: i,
            })?;
            board.cells[i] = cell;
        }

        let (crosses, noughts) = board.mark_counts();
        board.active_player = match crosses.checked_sub(noughts) {
            Some(0) => Cell::Cross,
            Some(1) => Cell::Nought,
            _ => return Err(ParseBoardError::PieceCounts { crosses, noughts }),
        };

        if let Some((mark, line)) = board.scan_winner() {
            board.over = true;
            board.winner = mark;
            board.winning_line = Some(line);
        } else if !board.has_empty_cell() {
            board.over = true;
        }
        Ok(board)
    }
}
