//! Client transports
//!
//! - [`websocket`]: tokio-tungstenite connection to the game server
//! - [`memory`]: channel-backed transport for tests and local play
//!
//! The connection manager builds one transport per connect through a
//! [`TransportFactory`].

pub mod memory;
pub mod websocket;

pub use othello_net_protocol::Transport;

/// Builds a transport for a connect URL
pub trait TransportFactory: Send + Sync + 'static {
    type Transport: Transport;

    fn create(&self, url: &str) -> Self::Transport;
}
