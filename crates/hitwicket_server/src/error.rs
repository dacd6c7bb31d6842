//! Server error types.

use crate::ids::{ClientId, GameId};
use derive_more::{Display, Error};
use tracing::instrument;

/// A request the server rejected.
///
/// Each variant is reported to the sending connection as an `error`
/// envelope carrying [`ServerError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ServerError {
    /// The envelope could not be decoded into a known request.
    #[display("Malformed envelope: {}", _0)]
    MalformedEnvelope(String),

    /// No game with this id exists.
    #[display("Game {} not found", _0)]
    GameNotFound(GameId),

    /// No live connection with this id exists.
    #[display("Client {} not found", _0)]
    ClientNotFound(ClientId),

    /// The game already has two participants.
    #[display("Game {} already has two participants", _0)]
    GameFull(GameId),

    /// The game is not accepting moves.
    #[display("Game {} is not active", _0)]
    GameNotActive(GameId),
}

impl std::error::Error for ServerError {}

impl ServerError {
    /// Stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::MalformedEnvelope(_) => "malformedEnvelope",
            ServerError::GameNotFound(_) => "gameNotFound",
            ServerError::ClientNotFound(_) => "clientNotFound",
            ServerError::GameFull(_) => "gameFull",
            ServerError::GameNotActive(_) => "gameNotActive",
        }
    }
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_camel_case() {
        let game = GameId::from("g".to_string());
        assert_eq!(ServerError::GameFull(game.clone()).code(), "gameFull");
        assert_eq!(ServerError::GameNotFound(game).code(), "gameNotFound");
        assert_eq!(
            ServerError::MalformedEnvelope("x".into()).to_string(),
            "Malformed envelope: x"
        );
    }

    #[test]
    fn test_config_error_tracks_location() {
        let err = ConfigError::new("bad port");
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().starts_with("Config error: bad port at "));
    }
}
