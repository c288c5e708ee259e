//! Client configuration
//!
//! Every field has a default matching the reference game server, so
//! `ClientConfig::default()` is enough to play on `localhost`. Configs can
//! also be deserialized from any serde format; missing fields fall back to
//! their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::FirstTurn;

/// Port the game server listens on for both HTTP and WebSocket
pub const DEFAULT_PORT: u16 = 10001;

/// Path prefix of the game socket; the player name is appended as a segment
pub const DEFAULT_GAME_PATH: &str = "/ws/othello";

/// Default capacity of the transport channels
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Configuration for a [`SessionController`](crate::SessionController)
///
/// # Example
///
/// ```
/// use othello_net_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_port(8080)
///     .with_preflight_timeout(Duration::from_secs(5))
///     .with_waiting_timeout(Duration::from_secs(300));
///
/// assert_eq!(config.http_base_url("localhost"), "http://localhost:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Port of the game server
    pub port: u16,

    /// Scheme of the game socket (`ws` or `wss`)
    pub ws_scheme: String,

    /// Scheme of the pre-flight endpoints (`http` or `https`)
    pub http_scheme: String,

    /// Path prefix of the game socket
    pub game_path: String,

    /// Overrides the pre-flight base URL derived from the network host
    pub http_base_url: Option<String>,

    /// Timeout of a single pre-flight request; `None` waits forever
    pub preflight_timeout: Option<Duration>,

    /// Extra attempts after a pre-flight request fails to reach the server
    pub preflight_retries: u32,

    /// How long a session may stay in Waiting; `None` waits forever
    pub waiting_timeout: Option<Duration>,

    /// Capacity of the transport event and command channels
    pub channel_capacity: usize,

    /// Starting color used when the server does not declare one
    pub first_turn: FirstTurn,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            ws_scheme: "ws".to_string(),
            http_scheme: "http".to_string(),
            game_path: DEFAULT_GAME_PATH.to_string(),
            http_base_url: None,
            preflight_timeout: None,
            preflight_retries: 0,
            waiting_timeout: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            first_turn: FirstTurn::Black,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_http_base_url(mut self, url: impl Into<String>) -> Self {
        self.http_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_preflight_timeout(mut self, timeout: Duration) -> Self {
        self.preflight_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_preflight_retries(mut self, retries: u32) -> Self {
        self.preflight_retries = retries;
        self
    }

    #[must_use]
    pub fn with_waiting_timeout(mut self, timeout: Duration) -> Self {
        self.waiting_timeout = Some(timeout);
        self
    }

    /// Values below 1 are clamped to 1
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_first_turn(mut self, first_turn: FirstTurn) -> Self {
        self.first_turn = first_turn;
        self
    }

    /// Base URL of the pre-flight endpoints for the given network host
    pub fn http_base_url(&self, network: &str) -> String {
        match &self.http_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}://{}:{}", self.http_scheme, network, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 10001);
        assert_eq!(config.game_path, "/ws/othello");
        assert_eq!(config.preflight_timeout, None);
        assert_eq!(config.waiting_timeout, None);
        assert_eq!(config.preflight_retries, 0);
        assert_eq!(config.first_turn, FirstTurn::Black);
    }

    #[test]
    fn test_http_base_url_override() {
        let config = ClientConfig::default().with_http_base_url("http://127.0.0.1:5000/");
        assert_eq!(config.http_base_url("ignored"), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_channel_capacity_clamped() {
        let config = ClientConfig::default().with_channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"port": 9000, "first_turn": "white"}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.first_turn, FirstTurn::White);
        assert_eq!(config.ws_scheme, "ws");
    }
}
