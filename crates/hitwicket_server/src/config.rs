//! Server configuration.

use crate::error::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Listener, transport and page settings.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// host = "0.0.0.0"
/// ws_port = 9090
/// http_port = 9091
/// static_page = "index.html"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address both listeners bind to.
    host: String,

    /// Port of the WebSocket listener.
    ws_port: u16,

    /// Port of the plain HTTP listener serving the static page.
    http_port: u16,

    /// HTML file served at `/` on the HTTP listener.
    static_page: PathBuf,

    /// Outbound envelopes buffered per connection before dropping.
    send_queue: usize,

    /// Seconds between keep-alive pings on idle connections.
    ping_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            ws_port: 9090,
            http_port: 9091,
            static_page: PathBuf::from("index.html"),
            send_queue: 256,
            ping_interval_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Cannot read server config: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Invalid server config: {}", e)))?;

        config.check()?;
        info!(ws_port = config.ws_port, http_port = config.http_port, "Config loaded");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies command-line overrides on top of file values.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        ws_port: Option<u16>,
        http_port: Option<u16>,
        static_page: Option<PathBuf>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = ws_port {
            self.ws_port = port;
        }
        if let Some(port) = http_port {
            self.http_port = port;
        }
        if let Some(page) = static_page {
            self.static_page = page;
        }
        self
    }

    /// Keep-alive ping period.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.send_queue == 0 {
            return Err(ConfigError::new("send_queue must be at least 1"));
        }
        if self.ping_interval_secs == 0 {
            return Err(ConfigError::new("ping_interval_secs must be at least 1"));
        }
        Ok(())
    }
}
