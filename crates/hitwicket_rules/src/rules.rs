//! Move legality and application.
//!
//! A move names a piece kind and a direction; the travelled distance is
//! fixed by the piece's class. Legality is two independent gates: the
//! destination must be on the board and not held by the mover, and the
//! direction must belong to the piece's class.

use crate::board::{Board, Coord};
use crate::types::{Direction, Owner, Piece, PieceKind};
use derive_more::{Display, Error};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// A relative move: which of the mover's pieces, and which way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{kind}:{direction}")]
pub struct Move {
    /// Kind of the moving piece.
    pub kind: PieceKind,
    /// Direction of travel.
    pub direction: Direction,
}

impl Move {
    /// Creates a new move.
    pub fn new(kind: PieceKind, direction: Direction) -> Self {
        Self { kind, direction }
    }
}

/// Error parsing a `"<kind>:<direction>"` token.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Malformed move token: {:?}", token)]
pub struct MoveParseError {
    /// The rejected token.
    pub token: String,
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MoveParseError {
            token: s.to_string(),
        };
        let (kind, direction) = s.split_once(':').ok_or_else(err)?;
        Ok(Move {
            kind: kind.parse().map_err(|_| err())?,
            direction: direction.parse().map_err(|_| err())?,
        })
    }
}

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveError {
    /// The mover has no piece of that kind on the board.
    #[display("Piece {} not found", _0)]
    PieceNotFound(Piece),

    /// The destination lies outside the 5x5 grid.
    #[display("Move {} leaves the board", _0)]
    OutOfBounds(Move),

    /// The destination holds one of the mover's own pieces.
    #[display("Move {} is blocked by own piece at {}", _0, _1)]
    BlockedByOwnPiece(Move, Coord),

    /// The piece's class cannot travel in that direction.
    #[display("Piece {} cannot move {}", _0, _1)]
    DirectionNotAllowed(PieceKind, Direction),
}

impl std::error::Error for MoveError {}

/// A validated move, resolved to board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The moving piece.
    pub piece: Piece,
    /// Cell the piece leaves.
    pub from: Coord,
    /// Cell the piece lands on.
    pub to: Coord,
    /// Opposing piece on the target cell, if any.
    pub capture: Option<Piece>,
}

/// Resolves origin and target for `mover`'s move without checking legality
/// beyond what is needed to produce coordinates.
fn resolve(board: &Board, mover: Owner, mv: Move) -> Result<(Piece, Coord, Coord), MoveError> {
    let piece = Piece::new(mover, mv.kind);
    let from = board
        .locate(mover, mv.kind)
        .ok_or(MoveError::PieceNotFound(piece))?;
    let to = from
        .step(mv.direction.delta(), mv.kind.class().distance())
        .ok_or(MoveError::OutOfBounds(mv))?;
    Ok((piece, from, to))
}

/// Validates `mover`'s move against the board.
///
/// Checks, in order: the piece exists, the target is on the board, the
/// target is not held by the mover, and the direction suits the piece's
/// class. An opposing piece on the target is a capture.
#[instrument(skip(board), fields(mover = %mover, mv = %mv))]
pub fn validate(board: &Board, mover: Owner, mv: Move) -> Result<Step, MoveError> {
    let (piece, from, to) = resolve(board, mover, mv)?;

    let occupant = board.get(to);
    if occupant.is_some_and(|p| p.owner == mover) {
        return Err(MoveError::BlockedByOwnPiece(mv, to));
    }

    if !mv.kind.class().allows(mv.direction) {
        return Err(MoveError::DirectionNotAllowed(mv.kind, mv.direction));
    }

    debug!(%from, %to, capture = ?occupant, "Move validated");
    Ok(Step {
        piece,
        from,
        to,
        capture: occupant,
    })
}

/// Returns whether `mover`'s move is legal.
pub fn is_legal(board: &Board, mover: Owner, mv: Move) -> bool {
    validate(board, mover, mv).is_ok()
}

/// Applies `mover`'s move, returning the captured piece if any.
///
/// Performs no legality checks; call [`validate`] first on the same board.
/// If the piece cannot be found or the target is off the board, the board
/// is left untouched.
#[instrument(skip(board), fields(mover = %mover, mv = %mv))]
pub fn apply(board: &mut Board, mover: Owner, mv: Move) -> Option<Piece> {
    let (piece, from, to) = match resolve(board, mover, mv) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(error = %e, "Apply called with unresolvable move, board unchanged");
            return None;
        }
    };

    board.place(from, None);
    let captured = board.place(to, Some(piece));
    debug_assert_eq!(crate::invariants::check_board(board), Ok(()));
    captured
}

/// Enumerates every legal move for `mover`.
pub fn legal_moves(board: &Board, mover: Owner) -> Vec<Move> {
    PieceKind::iter()
        .flat_map(|kind| Direction::iter().map(move |direction| Move::new(kind, direction)))
        .filter(|&mv| is_legal(board, mover, mv))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn mv(token: &str) -> Move {
        token.parse().unwrap()
    }

    #[test]
    fn test_parse_move_token() {
        assert_eq!(mv("H1:F"), Move::new(PieceKind::H1, Direction::Forward));
        assert_eq!(mv("P2:BL"), Move::new(PieceKind::P2, Direction::BackLeft));
        assert_eq!(Move::new(PieceKind::H2, Direction::ForwardRight).to_string(), "H2:FR");
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        for token in ["H1:F:F", "H1", "H1:", ":F", "H3:F", "P1:X", "", "p1:f"] {
            assert!(token.parse::<Move>().is_err(), "{token} should be rejected");
        }
    }

    #[test]
    fn test_home_rank_edges_leave_board() {
        // Forward decreases the row for both sides, so A's F and B's B fall off.
        let board = Board::new();
        assert_eq!(
            validate(&board, Owner::A, mv("P1:F")),
            Err(MoveError::OutOfBounds(mv("P1:F")))
        );
        assert_eq!(
            validate(&board, Owner::A, mv("H2:FR")),
            Err(MoveError::OutOfBounds(mv("H2:FR")))
        );
        assert_eq!(
            validate(&board, Owner::B, mv("P1:B")),
            Err(MoveError::OutOfBounds(mv("P1:B")))
        );
    }

    #[test]
    fn test_pawn_onto_empty_row() {
        let board = Board::new();
        let step = validate(&board, Owner::A, mv("P1:B")).unwrap();
        assert_eq!(step.from, at(0, 0));
        assert_eq!(step.to, at(1, 0));
        assert_eq!(step.capture, None);

        let step = validate(&board, Owner::A, mv("H2:BR")).unwrap();
        assert_eq!(step.from, at(0, 2));
        assert_eq!(step.to, at(2, 4));

        let step = validate(&board, Owner::B, mv("P1:F")).unwrap();
        assert_eq!(step.from, at(4, 0));
        assert_eq!(step.to, at(3, 0));
    }

    #[test]
    fn test_blocked_by_own_piece() {
        let board = Board::new();
        assert_eq!(
            validate(&board, Owner::A, mv("P1:R")),
            Err(MoveError::BlockedByOwnPiece(mv("P1:R"), at(0, 1)))
        );
    }

    #[test]
    fn test_hero_class_gating() {
        let mut board = Board::empty();
        board.place(at(2, 2), Some(Piece::new(Owner::A, PieceKind::H1)));
        board.place(at(2, 1), Some(Piece::new(Owner::A, PieceKind::H2)));

        assert!(is_legal(&board, Owner::A, mv("H1:F")));
        assert!(!is_legal(&board, Owner::A, mv("H1:FR")));
        assert_eq!(
            validate(&board, Owner::A, mv("H1:BL")),
            Err(MoveError::DirectionNotAllowed(PieceKind::H1, Direction::BackLeft))
        );

        assert!(is_legal(&board, Owner::A, mv("H2:BR")));
        assert!(!is_legal(&board, Owner::A, mv("H2:B")));
    }

    #[test]
    fn test_capture_and_apply() {
        let mut board = Board::empty();
        board.place(at(2, 2), Some(Piece::new(Owner::B, PieceKind::P1)));
        board.place(at(1, 1), Some(Piece::new(Owner::A, PieceKind::P2)));
        board.place(at(0, 0), Some(Piece::new(Owner::A, PieceKind::P1)));

        let step = validate(&board, Owner::B, mv("P1:FL")).unwrap();
        assert_eq!(step.from, at(2, 2));
        assert_eq!(step.to, at(1, 1));
        assert_eq!(step.capture, Some(Piece::new(Owner::A, PieceKind::P2)));

        let captured = apply(&mut board, Owner::B, mv("P1:FL"));
        assert_eq!(captured, Some(Piece::new(Owner::A, PieceKind::P2)));
        assert_eq!(board.get(at(2, 2)), None);
        assert_eq!(board.get(at(1, 1)), Some(Piece::new(Owner::B, PieceKind::P1)));
        assert_eq!(board.count_pieces(Owner::A), 1);
        assert_eq!(board.count_pieces(Owner::B), 1);
    }

    #[test]
    fn test_apply_missing_piece_is_noop() {
        let mut board = Board::empty();
        let before = board.clone();
        assert_eq!(apply(&mut board, Owner::A, mv("P1:B")), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_legal_moves_from_start() {
        let board = Board::new();
        let moves = legal_moves(&board, Owner::A);
        // Pawns: P1 has B, BR; P2 has BL, B, BR; P3 has BL, B.
        // H1 at (0,1) can go B to (2,1); H2 at (0,2) can go BL, BR.
        assert_eq!(moves.len(), 2 + 3 + 2 + 1 + 2);
        assert!(moves.iter().all(|m| m.direction.delta().0 == 1));
    }
}
