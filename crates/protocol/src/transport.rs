//! Transport layer abstraction for othello-net
//!
//! A transport owns one connection to the game server. It reports what
//! happens on the connection as [`TransportEvent`]s and carries out the
//! [`TransportCommand`]s it is given, so the session controller never
//! touches sockets directly.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Something that happened on the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established
    Opened,

    /// A text frame arrived
    Message(String),

    /// Send or receive failed; no further events follow
    Error(String),

    /// The connection closed with the given code; no further events follow
    Closed(u16),
}

/// Instruction for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Send a text frame
    Send(String),

    /// Close gracefully with an application code
    Close(u16),
}

/// Transport layer abstraction for network communication
///
/// # Example: Implementing a custom transport
///
/// ```no_run
/// use async_trait::async_trait;
/// use othello_net_protocol::transport::{Transport, TransportCommand, TransportEvent};
/// use tokio::sync::mpsc;
///
/// struct LoopbackTransport;
///
/// #[async_trait]
/// impl Transport for LoopbackTransport {
///     type Error = std::io::Error;
///
///     async fn run(
///         self,
///         events_tx: mpsc::Sender<TransportEvent>,
///         mut commands_rx: mpsc::Receiver<TransportCommand>,
///     ) -> Result<(), Self::Error> {
///         let _ = events_tx.send(TransportEvent::Opened).await;
///         while let Some(command) = commands_rx.recv().await {
///             match command {
///                 TransportCommand::Send(text) => {
///                     let _ = events_tx.send(TransportEvent::Message(text)).await;
///                 }
///                 TransportCommand::Close(code) => {
///                     let _ = events_tx.send(TransportEvent::Closed(code)).await;
///                     break;
///                 }
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + 'static {
    /// Error type for this transport
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs the connection until it closes
    ///
    /// Implementations emit [`TransportEvent::Opened`] once connected, one
    /// [`TransportEvent::Message`] per received text frame, and finish with
    /// [`TransportEvent::Closed`] when the peer closes. Returning `Err` means
    /// the connection failed; the caller reports that as a transport error.
    ///
    /// # Arguments
    /// * `events_tx` - Channel to report connection events
    /// * `commands_rx` - Channel to receive frames to send and close requests
    async fn run(
        self,
        events_tx: mpsc::Sender<TransportEvent>,
        commands_rx: mpsc::Receiver<TransportCommand>,
    ) -> Result<(), Self::Error>;
}
