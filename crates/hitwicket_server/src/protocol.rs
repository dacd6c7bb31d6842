//! Wire protocol: JSON text envelopes tagged by `method`.
//!
//! Inbound and outbound messages are closed sets of variants. Anything
//! that does not decode into a known [`Request`] is rejected as a
//! malformed envelope.

use crate::error::ServerError;
use crate::ids::{ClientId, GameId};
use hitwicket_rules::{Board, Owner};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A client request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    /// Create a new game, reported back to `client_id` only.
    Create {
        /// Connection that receives the new game.
        client_id: ClientId,
    },
    /// Join an existing game as the next participant.
    Join {
        /// Connection joining the game.
        client_id: ClientId,
        /// Game to join.
        game_id: GameId,
    },
    /// Play a move for the side currently to move.
    Play {
        /// Game to play in.
        game_id: GameId,
        /// Move token, `"<kind>:<direction>"`.
        #[serde(rename = "move")]
        mv: String,
    },
}

impl Request {
    /// Decodes one inbound text frame.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn decode(text: &str) -> Result<Self, ServerError> {
        serde_json::from_str(text).map_err(|e| ServerError::MalformedEnvelope(e.to_string()))
    }
}

/// Public view of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Game identity.
    pub id: GameId,
    /// Participants in join order; index 0 plays A, index 1 plays B.
    pub clients: Vec<ClientId>,
    /// The 5x5 board.
    pub state: Board,
    /// Side to move.
    pub current_player: Owner,
}

/// A server message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    /// Sent once on a new connection.
    Connect {
        /// The identity minted for this connection.
        client_id: ClientId,
    },
    /// Sent to the creator of a game.
    Create {
        /// The new game.
        game: GameSnapshot,
    },
    /// Sent to every participant when someone joins.
    Join {
        /// The game after the join.
        game: GameSnapshot,
    },
    /// Announces whose move it is.
    Turn {
        /// Side to move.
        current_player: Owner,
    },
    /// Full game state after a change.
    Update {
        /// The game after the change.
        game: GameSnapshot,
    },
    /// The game is over.
    Win {
        /// The winning side.
        winner: Owner,
    },
    /// A play was rejected by the rules.
    InvalidMove,
    /// A request was rejected before reaching the rules.
    Error {
        /// Machine-readable code, see [`ServerError::code`].
        error: String,
        /// Human-readable description.
        message: String,
    },
}

impl Response {
    /// Builds the error envelope for a rejected request.
    pub fn from_error(err: &ServerError) -> Self {
        Response::Error {
            error: err.code().to_string(),
            message: err.to_string(),
        }
    }

    /// Encodes the envelope as a JSON text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
