//! Board invariants.
//!
//! Invariants are logical properties that must hold after every applied
//! move. They are checked in debug builds and tested independently.

use crate::board::{BOARD_SIZE, Board};
use crate::types::Owner;
use std::collections::HashSet;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Invariant: every `(owner, kind)` pair appears at most once.
pub struct UniquePieces;

impl Invariant<Board> for UniquePieces {
    fn holds(board: &Board) -> bool {
        let mut seen = HashSet::new();
        board.pieces().all(|(_, piece)| seen.insert(piece))
    }

    fn description() -> &'static str {
        "Each piece exists at most once on the board"
    }
}

/// Invariant: no side ever has more pieces than its starting rank.
pub struct PieceCountBound;

impl Invariant<Board> for PieceCountBound {
    fn holds(board: &Board) -> bool {
        [Owner::A, Owner::B]
            .into_iter()
            .all(|owner| board.count_pieces(owner) <= BOARD_SIZE)
    }

    fn description() -> &'static str {
        "Each side has at most five pieces"
    }
}

/// Checks every board invariant, returning the first violated description.
pub fn check_board(board: &Board) -> Result<(), &'static str> {
    if !UniquePieces::holds(board) {
        return Err(UniquePieces::description());
    }
    if !PieceCountBound::holds(board) {
        return Err(PieceCountBound::description());
    }
    Ok(())
}
