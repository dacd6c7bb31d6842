//! Opaque identifiers for connections and games.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one live connection, minted on connect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Mints a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identity as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity of one game session, minted on create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Mints a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identity as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_unique() {
        assert_ne!(ClientId::generate(), ClientId::generate());
        assert_ne!(GameId::generate(), GameId::generate());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = GameId::from("abcd-1234".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abcd-1234\"");
        assert_eq!(id.to_string(), "abcd-1234");
    }
}
