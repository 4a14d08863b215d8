//! Minimax search with alpha-beta pruning.
//!
//! The search explores the game tree by writing hypothetical marks straight
//! into the caller's board and removing them again on the way back up. Every
//! hypothetical mark is held by a `Trial` guard, so the board is restored on
//! every exit path, pruning cut-offs included.
//!
//! Scores are from Cross's point of view: Cross maximises, Nought minimises.
//! A win found `d` plies below the root scores `base - d` (see
//! [`crate::constants::win_score_for`]), so faster wins and slower losses are
//! preferred. Moves are tried in row-major order, and the first of several
//! equally good moves is kept.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::board::{Board, Cell, Move};
use crate::constants::{DEFAULT_MAX_DEPTH, win_score_for};

/// How a won position is scored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Scoring {
    /// `±(base - plies)`: prefer the shortest route to a win.
    #[default]
    DepthDiscounted,
    /// `±base` regardless of how deep the win is.
    Flat,
}

/// Search parameters, built with [`SearchConfig::new`] and the `with_*`
/// setters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    max_depth: u32,
    pruning: bool,
    scoring: Scoring,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            pruning: true,
            scoring: Scoring::default(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search horizon. A depth of zero is treated as one.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Deepest ply examined, counting the move being chosen as ply 1. Never 0.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Cut off siblings once `alpha >= beta`. Never changes the chosen move.
    pub fn pruning(&self) -> bool {
        self.pruning
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }
}

/// Outcome of a top-level search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Chosen move, or `None` if the game is already decided or the board is
    /// full.
    pub best: Option<Move>,
    /// Minimax value of the chosen move, from Cross's point of view.
    pub score: i32,
    /// Positions visited, the root excluded.
    pub nodes: u64,
}

/// Score a position from Cross's point of view.
///
/// `plies` is how far below the search root the position lies. Returns 0 for
/// a draw or a position with no completed line. A win is never scored 0:
/// the discounted magnitude bottoms out at 1 however deep the win lies.
pub fn evaluate(board: &Board, plies: u32, scoring: Scoring) -> i32 {
    let Some((winner, _)) = board.scan_winner() else {
        return 0;
    };
    let base = win_score_for(board.width());
    let magnitude = match scoring {
        Scoring::DepthDiscounted => {
            let plies = i32::try_from(plies).unwrap_or(i32::MAX);
            base.saturating_sub(plies).max(1)
        }
        Scoring::Flat => base,
    };
    match winner {
        Cell::Cross => magnitude,
        Cell::Nought => -magnitude,
        Cell::Blank => 0,
    }
}

/// A hypothetical mark on a borrowed board, undone on drop.
struct Trial<'a> {
    board: &'a mut Board,
    mv: Move,
    previous: Cell,
}

impl<'a> Trial<'a> {
    fn new(board: &'a mut Board, mv: Move, mark: Cell) -> Self {
        let previous = board.get_cell(mv.row, mv.col);
        board.set_cell(mv.row, mv.col, mark);
        Self { board, mv, previous }
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        self.board.set_cell(self.mv.row, self.mv.col, self.previous);
    }
}

impl Deref for Trial<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Trial<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

/// All coordinates of a `width`-wide board in row-major order.
fn row_major(width: usize) -> impl Iterator<Item = Move> {
    (0..width).flat_map(move |row| (0..width).map(move |col| Move::new(row, col)))
}

/// Per-search state: the configuration and a node counter.
struct Searcher<'c> {
    config: &'c SearchConfig,
    nodes: u64,
}

impl<'c> Searcher<'c> {
    fn new(config: &'c SearchConfig) -> Self {
        Self { config, nodes: 0 }
    }

    fn minimax(
        &mut self,
        board: &mut Board,
        plies: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;

        let score = evaluate(board, plies, self.config.scoring);
        if score != 0 {
            return score;
        }
        if plies >= self.config.max_depth || !board.has_empty_cell() {
            return 0;
        }

        let (mark, mut best) = if maximizing {
            (Cell::Cross, i32::MIN)
        } else {
            (Cell::Nought, i32::MAX)
        };

        for mv in row_major(board.width()) {
            if board.get_cell(mv.row, mv.col) != Cell::Blank {
                continue;
            }
            let value = {
                let mut trial = Trial::new(board, mv, mark);
                self.minimax(&mut trial, plies + 1, alpha, beta, !maximizing)
            };

            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if self.config.pruning && alpha >= beta {
                break;
            }
        }
        best
    }
}

/// Minimax value of `board` for the given side, searched with the window
/// `(alpha, beta)`.
///
/// `plies` is the depth of `board` below the search root; the search stops
/// at `config.max_depth()`. The board is left exactly as it was found.
pub fn minimax(
    board: &mut Board,
    plies: u32,
    alpha: i32,
    beta: i32,
    maximizing: bool,
    config: &SearchConfig,
) -> i32 {
    Searcher::new(config).minimax(board, plies, alpha, beta, maximizing)
}

/// Search for the best move of the side to move.
///
/// Each candidate is scored with a full `(i32::MIN, i32::MAX)` window, so
/// turning pruning off changes only [`SearchResult::nodes`].
pub fn search(board: &mut Board, config: &SearchConfig) -> SearchResult {
    if board.is_over() || !board.has_empty_cell() || board.scan_winner().is_some() {
        warn!("search requested on a finished game");
        return SearchResult {
            best: None,
            score: evaluate(board, 0, config.scoring),
            nodes: 0,
        };
    }

    let side = board.active_player();
    let maximizing = side == Cell::Cross;
    let mut searcher = Searcher::new(config);
    let mut best = None;
    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };

    for mv in row_major(board.width()) {
        if board.get_cell(mv.row, mv.col) != Cell::Blank {
            continue;
        }
        let score = {
            let mut trial = Trial::new(board, mv, side);
            searcher.minimax(&mut trial, 1, i32::MIN, i32::MAX, !maximizing)
        };

        let improves = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if improves || best.is_none() {
            best = Some(mv);
            best_score = score;
        }
    }

    debug!(
        side = %side,
        best = ?best,
        score = best_score,
        nodes = searcher.nodes,
        "search finished"
    );

    SearchResult {
        best,
        score: best_score,
        nodes: searcher.nodes,
    }
}

/// The move [`search`] would choose, or `None` on a finished board.
pub fn best_move(board: &mut Board, config: &SearchConfig) -> Option<Move> {
    search(board, config).best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(layout: &str) -> Board {
        layout.parse().unwrap()
    }

    #[test]
    fn test_evaluate_scores() {
        let won = board("XXX\nOO.\n...");
        assert_eq!(evaluate(&won, 0, Scoring::DepthDiscounted), 10);
        assert_eq!(evaluate(&won, 3, Scoring::DepthDiscounted), 7);
        assert_eq!(evaluate(&won, 3, Scoring::Flat), 10);

        let lost = board("OOO\nXX.\nX..");
        assert_eq!(evaluate(&lost, 2, Scoring::DepthDiscounted), -8);

        let open = board("X..\n.O.\n...");
        assert_eq!(evaluate(&open, 5, Scoring::DepthDiscounted), 0);

        let drawn = board("XOX\nXOO\nOXX");
        assert_eq!(evaluate(&drawn, 9, Scoring::DepthDiscounted), 0);
    }

    #[test]
    fn test_deep_wins_keep_their_sign() {
        let won = board("XXX\nOO.\n...");
        assert_eq!(evaluate(&won, 9, Scoring::DepthDiscounted), 1);
        assert_eq!(evaluate(&won, 10, Scoring::DepthDiscounted), 1);
        assert_eq!(evaluate(&won, 12, Scoring::DepthDiscounted), 1);
        assert_eq!(evaluate(&won, u32::MAX, Scoring::DepthDiscounted), 1);

        let lost = board("OOO\nXX.\nX..");
        assert_eq!(evaluate(&lost, 15, Scoring::DepthDiscounted), -1);
    }

    #[test]
    fn test_minimax_stops_at_deep_win() {
        let mut won = board("XXX\nOO.\n...");
        let before = won.clone();
        let config = SearchConfig::new().with_max_depth(20);
        let value = minimax(&mut won, 10, i32::MIN, i32::MAX, false, &config);
        assert_eq!(value, 1);
        assert_eq!(won, before);
    }

    #[test]
    fn test_trial_restores_on_drop() {
        let mut b = Board::new(3);
        {
            let mut trial = Trial::new(&mut b, Move::new(2, 1), Cell::Nought);
            assert_eq!(trial.get_cell(2, 1), Cell::Nought);
            trial.set_cell(0, 0, Cell::Cross);
            trial.set_cell(0, 0, Cell::Blank);
        }
        assert_eq!(b, Board::new(3));
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut b = board("..O\nO..\nXX.");
        assert_eq!(best_move(&mut b, &SearchConfig::default()), Some(Move::new(2, 2)));
    }

    #[test]
    fn test_blocks_opponent() {
        let mut b = board("OO.\n.X.\n..X");
        assert_eq!(best_move(&mut b, &SearchConfig::default()), Some(Move::new(0, 2)));
    }

    #[test]
    fn test_prefers_faster_win() {
        // (0,2) forks for a win on ply 3; (2,2) wins at once.
        let layout = "XO.\nOX.\n...";

        let mut b = board(layout);
        let result = search(&mut b, &SearchConfig::default());
        assert_eq!(result.best, Some(Move::new(2, 2)));
        assert_eq!(result.score, 9);

        let mut b = board(layout);
        let flat = SearchConfig::default().with_scoring(Scoring::Flat);
        let result = search(&mut b, &flat);
        assert_eq!(result.best, Some(Move::new(0, 2)));
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_nought_to_move_minimises() {
        let mut b = board("XX.\n.O.\n...");
        assert_eq!(b.active_player(), Cell::Nought);
        let result = search(&mut b, &SearchConfig::default());
        assert_eq!(result.best, Some(Move::new(0, 2)));
        assert!(result.score <= 0);
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let config = SearchConfig::default();
        let mut pruned_board = Board::new(3);
        let pruned = search(&mut pruned_board, &config);

        let mut full_board = Board::new(3);
        let full = search(&mut full_board, &config.with_pruning(false));

        assert_eq!(pruned.best, full.best);
        assert_eq!(pruned.score, full.score);
        assert_eq!(pruned.score, 0, "perfect play from the empty board draws");
        assert!(pruned.nodes < full.nodes);
        assert_eq!(pruned_board, Board::new(3));
    }

    #[test]
    fn test_depth_limit_hides_distant_wins() {
        // Blocking at (0,2) also forks; the win lands on ply 3.
        let layout = "X..\n.O.\nO.X";

        let mut b = board(layout);
        let full = search(&mut b, &SearchConfig::default());
        assert_eq!(full.best, Some(Move::new(0, 2)));
        assert_eq!(full.score, 7);

        let shallow = SearchConfig::default().with_max_depth(2);
        let result = search(&mut b, &shallow);
        assert_eq!(result.best, Some(Move::new(0, 2)));
        assert_eq!(result.score, 0);
        assert_eq!(b, board(layout));
    }

    #[test]
    fn test_minimax_leaves_board_untouched() {
        let mut b = board("X..\n.O.\n...");
        let before = b.clone();
        let value = minimax(&mut b, 0, i32::MIN, i32::MAX, true, &SearchConfig::default());
        assert_eq!(value, 0);
        assert_eq!(b, before);
    }

    #[test]
    fn test_finished_board_has_no_move() {
        let mut won = board("XXX\nOO.\n...");
        let result = search(&mut won, &SearchConfig::default());
        assert_eq!(result.best, None);
        assert_eq!(result.nodes, 0);

        let mut drawn = board("XOX\nXOO\nOXX");
        assert_eq!(best_move(&mut drawn, &SearchConfig::default()), None);
    }

    #[test]
    fn test_zero_depth_is_clamped() {
        assert_eq!(SearchConfig::new().with_max_depth(0).max_depth(), 1);
    }
}
