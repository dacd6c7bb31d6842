//! Hitwicket rules - board, moves and turns for a 5x5 two-player game.
//!
//! # Architecture
//!
//! - **Types**: owners, piece kinds, movement classes and directions
//! - **Board**: the fixed 5x5 grid with the canonical start layout
//! - **Rules**: move legality ([`validate`]) and application ([`apply`])
//! - **Game**: the turn state machine driving one match
//! - **Invariants**: board properties checked after every move
//!
//! # Example
//!
//! ```
//! use hitwicket_rules::{Game, Owner, PlayOutcome};
//!
//! let mut game = Game::new();
//! game.start().unwrap();
//! let outcome = game.play("P1:B".parse().unwrap()).unwrap();
//! assert!(matches!(outcome, PlayOutcome::Continue { next: Owner::B, .. }));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod game;
mod invariants;
mod rules;
mod types;

pub use board::{BOARD_SIZE, Board, Coord, HOME_RANK};
pub use game::{Game, Phase, PlayError, PlayOutcome};
pub use invariants::{Invariant, PieceCountBound, UniquePieces, check_board};
pub use rules::{Move, MoveError, MoveParseError, Step, apply, is_legal, legal_moves, validate};
pub use types::{Direction, Owner, Piece, PieceClass, PieceKind, PieceParseError};
