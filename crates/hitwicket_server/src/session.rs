//! Game session: participants plus the turn state machine.

use crate::error::ServerError;
use crate::ids::{ClientId, GameId};
use crate::protocol::GameSnapshot;
use hitwicket_rules::{Game, Owner};
use tracing::{info, instrument, warn};

/// Maximum participants per session.
pub const MAX_PARTICIPANTS: usize = 2;

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Side assigned to the joining connection.
    pub seat: Owner,
    /// True when this join filled the session and started the game.
    pub started: bool,
}

/// One match: its id, its participants in join order, and its game.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    clients: Vec<ClientId>,
    game: Game,
}

impl GameSession {
    /// Creates an empty session awaiting participants.
    #[instrument]
    pub fn new(id: GameId) -> Self {
        info!(game_id = %id, "Creating new game session");
        Self {
            id,
            clients: Vec::with_capacity(MAX_PARTICIPANTS),
            game: Game::new(),
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// Returns participants in join order.
    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    /// Returns the first-joined participant (player A).
    pub fn first_participant(&self) -> Option<&ClientId> {
        self.clients.first()
    }

    /// Returns the game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Returns the game for mutation.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Appends a participant. The second join starts the game.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn join(&mut self, client_id: ClientId) -> Result<JoinOutcome, ServerError> {
        if self.clients.len() >= MAX_PARTICIPANTS {
            warn!(client_id = %client_id, "Session already has 2 participants");
            return Err(ServerError::GameFull(self.id.clone()));
        }

        let seat = if self.clients.is_empty() {
            Owner::A
        } else {
            Owner::B
        };
        let started = self.clients.len() + 1 == MAX_PARTICIPANTS;
        if started {
            if let Err(e) = self.game.start() {
                warn!(client_id = %client_id, error = %e, "Game could not start, join refused");
                return Err(ServerError::GameNotActive(self.id.clone()));
            }
        }

        info!(client_id = %client_id, seat = %seat, "Participant joined");
        self.clients.push(client_id);
        Ok(JoinOutcome { seat, started })
    }

    /// Builds the public snapshot sent to clients.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id.clone(),
            clients: self.clients.clone(),
            state: self.game.board().clone(),
            current_player: self.game.current_player(),
        }
    }
}
