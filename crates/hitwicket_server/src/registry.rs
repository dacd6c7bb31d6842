//! Session registry: live connections and game sessions.
//!
//! The registry is plain owned state. It is mutated only by the
//! dispatcher task, which handles one event at a time, so no locking is
//! needed.

use crate::error::ServerError;
use crate::ids::{ClientId, GameId};
use crate::protocol::Response;
use crate::session::{GameSession, JoinOutcome};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Outbound channel of one connection, carrying encoded text frames.
pub type Outbox = mpsc::Sender<String>;

/// Counts reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Live connections.
    pub clients: usize,
    /// Game sessions ever created and still held.
    pub games: usize,
}

/// Maps connection ids to outboxes and game ids to sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    clients: HashMap<ClientId, Outbox>,
    games: HashMap<GameId, GameSession>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a connection's outbox under a freshly minted id.
    #[instrument(skip_all)]
    pub fn register(&mut self, outbox: Outbox) -> ClientId {
        let id = ClientId::generate();
        self.clients.insert(id.clone(), outbox);
        info!(client_id = %id, "Client registered");
        id
    }

    /// Drops a connection. Games it joined are kept.
    #[instrument(skip(self))]
    pub fn unregister(&mut self, id: &ClientId) -> bool {
        let removed = self.clients.remove(id).is_some();
        if removed {
            info!("Client unregistered");
        }
        removed
    }

    /// Checks whether a connection is live.
    pub fn is_connected(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    /// Creates a new session awaiting participants.
    #[instrument(skip(self))]
    pub fn create_game(&mut self) -> GameId {
        let id = GameId::generate();
        self.games.insert(id.clone(), GameSession::new(id.clone()));
        id
    }

    /// Looks up a session.
    pub fn game(&self, id: &GameId) -> Option<&GameSession> {
        self.games.get(id)
    }

    /// Looks up a session for mutation.
    pub fn game_mut(&mut self, id: &GameId) -> Option<&mut GameSession> {
        self.games.get_mut(id)
    }

    /// Adds a live connection to a session as its next participant.
    #[instrument(skip(self))]
    pub fn join_game(
        &mut self,
        game_id: &GameId,
        client_id: ClientId,
    ) -> Result<JoinOutcome, ServerError> {
        if !self.games.contains_key(game_id) {
            warn!("Join for unknown game");
            return Err(ServerError::GameNotFound(game_id.clone()));
        }
        if !self.is_connected(&client_id) {
            warn!("Join for unknown client");
            return Err(ServerError::ClientNotFound(client_id));
        }
        let session = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServerError::GameNotFound(game_id.clone()))?;
        session.join(client_id)
    }

    /// Sends an envelope to one connection.
    ///
    /// Returns false if the connection is gone, its queue is full, or the
    /// envelope could not be encoded.
    #[instrument(skip(self, response))]
    pub fn unicast(&self, to: &ClientId, response: &Response) -> bool {
        let Some(outbox) = self.clients.get(to) else {
            debug!("Skipping delivery to departed client");
            return false;
        };
        let text = match response.encode() {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to encode envelope");
                return false;
            }
        };
        match outbox.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(text)) => {
                warn!(msg_len = text.len(), "Send queue full, dropping envelope");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Outbox closed");
                false
            }
        }
    }

    /// Sends an envelope to every participant of a game, in join order.
    ///
    /// Returns the number of successful deliveries.
    #[instrument(skip(self, response))]
    pub fn broadcast(&self, game_id: &GameId, response: &Response) -> usize {
        let Some(session) = self.games.get(game_id) else {
            warn!("Broadcast to unknown game");
            return 0;
        };
        session
            .clients()
            .iter()
            .filter(|client| self.unicast(client, response))
            .count()
    }

    /// Current connection and game counts.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            clients: self.clients.len(),
            games: self.games.len(),
        }
    }
}
