//! Noughts: a minimax engine for noughts and crosses on an NxN board.
//!
//! This crate provides the board model and an alpha-beta game-tree search
//! that picks the optimal move for the side to move.
//!
//! ## Modules
//!
//! - [`constants`] - Board width, search defaults, scoring constants
//! - [`board`] - Board state, legal placement, end-of-game detection
//! - [`lines`] - Rows, columns and diagonals, and the winning-line test
//! - [`search`] - Minimax with alpha-beta pruning and depth-aware scoring
//! - [`playout`] - Random play, for sparring and tests
//! - [`protocol`] - Line-oriented text protocol around the engine
//!
//! ## Example
//!
//! ```
//! use noughts::board::{Board, Move};
//! use noughts::search::{SearchConfig, best_move};
//!
//! // Cross has two in the top row; the engine completes it.
//! let mut board: Board = "XX.\nOO.\n...".parse().unwrap();
//! let mv = best_move(&mut board, &SearchConfig::default());
//! assert_eq!(mv, Some(Move::new(0, 2)));
//!
//! // The search leaves the board as it found it; the caller plays the move.
//! assert!(board.place(0, 2));
//! assert!(board.is_over());
//! ```

pub mod board;
pub mod constants;
pub mod lines;
pub mod playout;
pub mod protocol;
pub mod search;

pub use board::{Board, Cell, Move, MoveError};
pub use search::{Scoring, SearchConfig, SearchResult, best_move};
