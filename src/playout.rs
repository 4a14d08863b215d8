//! Random playouts.
//!
//! A random player picks uniformly among the blank cells. It is the sparring
//! partner for the `duel` command and a source of arbitrary positions in tests.
//! Randomness comes from a caller-supplied [`fastrand::Rng`], so a seed
//! reproduces the same games.

use fastrand::Rng;

use crate::board::{Board, Cell, Move};

/// Pick a blank cell uniformly at random, or `None` if the game is over.
pub fn random_move(board: &Board, rng: &mut Rng) -> Option<Move> {
    if board.is_over() {
        return None;
    }
    let candidates: Vec<Move> = board.empty_cells().collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.usize(..candidates.len())])
}

/// Play random moves until the game ends.
///
/// Returns the winner (`Blank` for a draw) and the moves played, in order.
pub fn random_game(board: &mut Board, rng: &mut Rng) -> (Cell, Vec<Move>) {
    let mut moves = Vec::with_capacity(board.width() * board.width());
    while let Some(mv) = random_move(board, rng) {
        // Cells come from `empty_cells`, so the placement cannot fail.
        let placed = board.place(mv.row as i32, mv.col as i32);
        debug_assert!(placed);
        moves.push(mv);
    }
    (board.winner(), moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_game_ends() {
        let mut rng = Rng::with_seed(7);
        for _ in 0..50 {
            let mut board = Board::new(3);
            let (winner, moves) = random_game(&mut board, &mut rng);
            assert!(board.is_over());
            assert_eq!(winner, board.winner());
            assert!(moves.len() >= 5 && moves.len() <= 9);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = Board::new(4);
        let mut b = Board::new(4);
        let (_, first) = random_game(&mut a, &mut Rng::with_seed(42));
        let (_, second) = random_game(&mut b, &mut Rng::with_seed(42));
        assert_eq!(first, second);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_move_on_finished_board() {
        let board: Board = "XXX\nOO.\n...".parse().unwrap();
        assert_eq!(random_move(&board, &mut Rng::with_seed(1)), None);
    }
}
