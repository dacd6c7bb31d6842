//! Hitwicket server - real-time sessions for two-player Hitwicket matches.
//!
//! Clients connect over WebSocket, create or join a game, and exchange
//! JSON envelopes tagged by `method`. Game rules live in
//! [`hitwicket_rules`]; this crate owns connections, sessions and the wire.
//!
//! # Architecture
//!
//! - **Transport**: axum listeners for WebSocket traffic and the static page
//! - **Dispatcher**: one task that handles every event to completion
//! - **Registry**: connection outboxes and game sessions, owned by the dispatcher
//! - **Protocol**: closed sets of inbound and outbound envelopes
//!
//! # Example
//!
//! ```no_run
//! use hitwicket_server::{ServerConfig, start};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let mut handle = start(&config).await?;
//! handle.wait().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod dispatcher;
mod error;
mod ids;
mod protocol;
mod registry;
mod session;
mod transport;

// Crate-level exports - Configuration
pub use config::ServerConfig;

// Crate-level exports - Errors
pub use error::{ConfigError, ServerError};

// Crate-level exports - Identities
pub use ids::{ClientId, GameId};

// Crate-level exports - Wire protocol
pub use protocol::{GameSnapshot, Request, Response};

// Crate-level exports - Session state
pub use dispatcher::{Dispatcher, Event};
pub use registry::{Outbox, RegistryStats, SessionRegistry};
pub use session::{GameSession, JoinOutcome, MAX_PARTICIPANTS};

// Crate-level exports - Network
pub use transport::{ServerHandle, start};
