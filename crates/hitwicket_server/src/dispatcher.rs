//! Protocol dispatcher.
//!
//! All transport events funnel into one queue drained by a single task.
//! Each event is handled to completion (decode, validate, mutate, deliver)
//! before the next one is taken, so the registry is never shared.

use crate::error::ServerError;
use crate::ids::{ClientId, GameId};
use crate::protocol::{Request, Response};
use crate::registry::{Outbox, SessionRegistry};
use hitwicket_rules::{Move, Phase, PlayError, PlayOutcome};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Something that happened on a connection.
#[derive(Debug)]
pub enum Event {
    /// A connection opened. The minted id is sent back on `reply`.
    Connected {
        /// Outbound queue of the new connection.
        outbox: Outbox,
        /// Receives the id assigned to the connection.
        reply: oneshot::Sender<ClientId>,
    },
    /// A text frame arrived.
    Message {
        /// Connection the frame came from.
        from: ClientId,
        /// Raw frame contents.
        text: String,
    },
    /// A connection closed.
    Disconnected {
        /// Connection that closed.
        client: ClientId,
    },
}

/// Owns the session registry and applies events to it.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: SessionRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Write access to the registry.
    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    /// Starts the dispatcher on its own task.
    ///
    /// Returns the event sender for transports and the task handle. The
    /// task ends once every sender has been dropped.
    pub fn spawn(capacity: usize) -> (mpsc::Sender<Event>, JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(Self::new().run(events_rx));
        (events_tx, handle)
    }

    /// Drains the event queue.
    #[instrument(skip_all)]
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        info!("Dispatcher started");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("Event queue closed, dispatcher stopping");
    }

    /// Applies one event.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Connected { outbox, reply } => {
                let id = self.connect(outbox);
                if reply.send(id.clone()).is_err() {
                    debug!(client_id = %id, "Connection gone before id handoff");
                    self.disconnect(&id);
                }
            }
            Event::Message { from, text } => self.receive(&from, &text),
            Event::Disconnected { client } => self.disconnect(&client),
        }
    }

    /// Registers a connection and greets it with its id.
    #[instrument(skip_all)]
    pub fn connect(&mut self, outbox: Outbox) -> ClientId {
        let id = self.registry.register(outbox);
        self.registry.unicast(
            &id,
            &Response::Connect {
                client_id: id.clone(),
            },
        );
        let stats = self.registry.stats();
        info!(client_id = %id, clients = stats.clients, games = stats.games, "Client connected");
        id
    }

    /// Removes a connection.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, client: &ClientId) {
        if self.registry.unregister(client) {
            let stats = self.registry.stats();
            info!(clients = stats.clients, games = stats.games, "Client disconnected");
        }
    }

    /// Handles one inbound frame. Rejections go back to `from`.
    #[instrument(skip(self, from, text), fields(client_id = %from))]
    pub fn receive(&mut self, from: &ClientId, text: &str) {
        let result = Request::decode(text).and_then(|request| self.route(request));
        if let Err(err) = result {
            warn!(error = %err, code = err.code(), "Request rejected");
            self.registry.unicast(from, &Response::from_error(&err));
        }
    }

    fn route(&mut self, request: Request) -> Result<(), ServerError> {
        match request {
            Request::Create { client_id } => self.create(client_id),
            Request::Join { client_id, game_id } => self.join(&game_id, client_id),
            Request::Play { game_id, mv } => self.play(&game_id, &mv),
        }
    }

    #[instrument(skip(self))]
    fn create(&mut self, client_id: ClientId) -> Result<(), ServerError> {
        if !self.registry.is_connected(&client_id) {
            return Err(ServerError::ClientNotFound(client_id));
        }
        let game_id = self.registry.create_game();
        let game = self
            .registry
            .game(&game_id)
            .map(|session| session.snapshot())
            .ok_or_else(|| ServerError::GameNotFound(game_id.clone()))?;
        info!(game_id = %game_id, "Game created");
        self.registry.unicast(&client_id, &Response::Create { game });
        Ok(())
    }

    #[instrument(skip(self))]
    fn join(&mut self, game_id: &GameId, client_id: ClientId) -> Result<(), ServerError> {
        let outcome = self.registry.join_game(game_id, client_id)?;
        let game = self
            .registry
            .game(game_id)
            .map(|session| session.snapshot())
            .ok_or_else(|| ServerError::GameNotFound(game_id.clone()))?;
        let current_player = game.current_player;

        self.registry
            .broadcast(game_id, &Response::Join { game: game.clone() });
        if outcome.started {
            info!(game_id = %game_id, "Both seats filled, game started");
            self.registry
                .broadcast(game_id, &Response::Turn { current_player });
            self.registry.broadcast(game_id, &Response::Update { game });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn play(&mut self, game_id: &GameId, token: &str) -> Result<(), ServerError> {
        let session = self
            .registry
            .game_mut(game_id)
            .ok_or_else(|| ServerError::GameNotFound(game_id.clone()))?;
        if session.game().phase() != Phase::Active {
            return Err(ServerError::GameNotActive(game_id.clone()));
        }

        let outcome = match token.parse::<Move>() {
            Ok(mv) => match session.game_mut().play(mv) {
                Ok(outcome) => Some(outcome),
                Err(PlayError::Illegal(e)) => {
                    info!(error = %e, "Illegal move");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Play refused by game");
                    return Err(ServerError::GameNotActive(game_id.clone()));
                }
            },
            Err(e) => {
                info!(error = %e, "Unparseable move token");
                None
            }
        };
        let game = session.snapshot();
        let first = session.first_participant().cloned();

        match outcome {
            None => {
                if let Some(first) = first {
                    self.registry.unicast(&first, &Response::InvalidMove);
                }
            }
            Some(PlayOutcome::Continue { next, captured }) => {
                debug!(next = %next, captured = ?captured, "Move applied");
                self.registry.broadcast(
                    game_id,
                    &Response::Turn {
                        current_player: next,
                    },
                );
                self.registry.broadcast(game_id, &Response::Update { game });
            }
            Some(PlayOutcome::Won { winner, .. }) => {
                info!(winner = %winner, "Game won");
                self.registry.broadcast(game_id, &Response::Win { winner });
            }
        }
        Ok(())
    }
}
