//! Constants for board geometry, search depth, and scoring.
//!
//! # Board Size Configuration
//!
//! The default board width is controlled by Cargo features:
//! - `board3x3` (default): classic 3x3 noughts and crosses
//! - `board4x4`: the 4x4 variant
//!
//! To compile for a specific board size:
//! ```sh
//! cargo build                                          # 3x3 (default)
//! cargo build --no-default-features --features board4x4  # 4x4
//! ```
//!
//! [`Board::new`](crate::board::Board::new) still accepts any width at run
//! time; the feature only picks what [`Board::default`] builds.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board width (NxN). A line of N identical marks wins.
#[cfg(feature = "board3x3")]
pub const N: usize = 3;

#[cfg(feature = "board4x4")]
pub const N: usize = 4;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(all(feature = "board3x3", feature = "board4x4"))]
compile_error!("Cannot enable both 'board3x3' and 'board4x4' features at the same time");

#[cfg(not(any(feature = "board3x3", feature = "board4x4")))]
compile_error!("Must enable exactly one board size feature: 'board3x3' or 'board4x4'");

/// Widths accepted by the text protocol's `boardsize` command.
pub const SUPPORTED_WIDTHS: [usize; 2] = [3, 4];

/// Widest board the command line accepts.
pub const MAX_WIDTH: usize = 16;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default search horizon in plies. 3x3 is searched to the end of the game.
#[cfg(feature = "board3x3")]
pub const DEFAULT_MAX_DEPTH: u32 = 9;

#[cfg(feature = "board4x4")]
pub const DEFAULT_MAX_DEPTH: u32 = 6;

/// Score of a win found at ply 0. A win `d` plies deep scores `WIN_SCORE - d`.
pub const WIN_SCORE: i32 = 10;

/// Win score base for a board of the given width.
///
/// Equals [`WIN_SCORE`] up to 3x3. Wider boards need `cells + 1` so that a
/// win on the last possible ply still scores above a draw. Saturates at
/// `i32::MAX` for widths whose cell count does not fit.
pub fn win_score_for(width: usize) -> i32 {
    let cells = width
        .checked_mul(width)
        .and_then(|cells| i32::try_from(cells).ok())
        .map_or(i32::MAX, |cells| cells.saturating_add(1));
    cells.max(WIN_SCORE)
}

// =============================================================================
// Cell Characters
// =============================================================================

/// Cross, always moves first.
pub const CROSS_CHAR: char = 'X';

/// Nought.
pub const NOUGHT_CHAR: char = 'O';

/// Blank cell.
pub const BLANK_CHAR: char = '.';
