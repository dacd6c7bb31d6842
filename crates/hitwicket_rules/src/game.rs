//! Turn state machine.
//!
//! ```text
//! AwaitingOpponent --start--> Active(A) --play--> Active(B) --play--> ...
//!                                   \--play (last capture)--> Won(mover)
//! ```

use crate::board::Board;
use crate::rules::{self, Move, MoveError};
use crate::types::{Owner, Piece};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Created, waiting for the second participant.
    #[display("awaiting opponent")]
    AwaitingOpponent,
    /// Both participants present, moves are accepted.
    #[display("active")]
    Active,
    /// Terminal: the given side captured every opposing piece.
    #[display("won by {}", _0)]
    Won(Owner),
}

/// Result of an accepted play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Game continues; `next` is now to move.
    Continue {
        /// Side to move next.
        next: Owner,
        /// Piece removed by this move, if any.
        captured: Option<Piece>,
    },
    /// The mover captured the last opposing piece.
    Won {
        /// The winning side.
        winner: Owner,
        /// The final captured piece.
        captured: Option<Piece>,
    },
}

/// Error returned by [`Game::play`] and [`Game::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, derive_more::From)]
pub enum PlayError {
    /// The game is not accepting moves in this phase.
    #[display("Game is not active ({})", _0)]
    NotActive(Phase),

    /// The game has already been started.
    #[display("Game has already started")]
    AlreadyStarted,

    /// The move was rejected by the rules engine.
    #[display("Illegal move: {}", _0)]
    #[from]
    Illegal(MoveError),
}

impl std::error::Error for PlayError {}

/// Board plus turn state for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    current_player: Owner,
    phase: Phase,
}

impl Game {
    /// Creates a game on a fresh board, awaiting an opponent, A to move.
    #[instrument]
    pub fn new() -> Self {
        Self::with_board(Board::new())
    }

    /// Creates a game on a custom board, awaiting an opponent, A to move.
    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            current_player: Owner::A,
            phase: Phase::AwaitingOpponent,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move.
    pub fn current_player(&self) -> Owner {
        self.current_player
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the winner once the game is over.
    pub fn winner(&self) -> Option<Owner> {
        match self.phase {
            Phase::Won(winner) => Some(winner),
            _ => None,
        }
    }

    /// Transitions from awaiting to active with A to move.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn start(&mut self) -> Result<(), PlayError> {
        if self.phase != Phase::AwaitingOpponent {
            warn!("Start requested for a game that already started");
            return Err(PlayError::AlreadyStarted);
        }
        self.phase = Phase::Active;
        self.current_player = Owner::A;
        info!("Game started");
        Ok(())
    }

    /// Plays a move for the side currently to move.
    ///
    /// An illegal move leaves board, turn and phase unchanged. A legal move
    /// either flips the turn once or, if the opponent has no pieces left,
    /// ends the game with the mover as winner.
    #[instrument(skip(self), fields(mover = %self.current_player, mv = %mv))]
    pub fn play(&mut self, mv: Move) -> Result<PlayOutcome, PlayError> {
        if self.phase != Phase::Active {
            debug!(phase = %self.phase, "Rejecting play outside active phase");
            return Err(PlayError::NotActive(self.phase));
        }

        let mover = self.current_player;
        rules::validate(&self.board, mover, mv)?;
        let captured = rules::apply(&mut self.board, mover, mv);

        if self.board.count_pieces(mover.opponent()) == 0 {
            self.phase = Phase::Won(mover);
            info!(winner = %mover, "Game won");
            return Ok(PlayOutcome::Won {
                winner: mover,
                captured,
            });
        }

        self.current_player = mover.opponent();
        debug!(next = %self.current_player, ?captured, "Turn passed");
        Ok(PlayOutcome::Continue {
            next: self.current_player,
            captured,
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
