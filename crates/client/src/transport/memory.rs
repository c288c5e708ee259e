//! In-memory transport for testing and local play
//!
//! Instead of a socket, the transport talks to a [`MemoryPeer`] that plays
//! the server side: it pushes frames and close codes to the client and
//! receives everything the client sends. This makes it perfect for:
//! - Unit testing the session controller without network overhead
//! - Scripting a server conversation step by step

use super::{Transport, TransportFactory};
use async_trait::async_trait;
use othello_net_protocol::{close_codes, TransportCommand, TransportEvent};
use serde::Serialize;
use tokio::sync::mpsc;

/// In-memory client transport that communicates via channels
pub struct MemoryTransport {
    /// Channel to forward client commands to the peer
    to_peer: mpsc::Sender<TransportCommand>,
    /// Channel to receive events from the peer
    from_peer: mpsc::Receiver<TransportEvent>,
}

/// Server side of a [`MemoryTransport`]
pub struct MemoryPeer {
    /// URL the client connected to
    pub url: String,
    events_tx: mpsc::Sender<TransportEvent>,
    commands_rx: mpsc::Receiver<TransportCommand>,
}

impl MemoryTransport {
    /// Creates a transport together with the peer that drives it
    ///
    /// # Example
    ///
    /// ```
    /// use othello_net_client::transport::memory::MemoryTransport;
    ///
    /// let (transport, peer) = MemoryTransport::create_pair("ws://localhost/ws/othello/Alice", 16);
    /// assert_eq!(peer.url, "ws://localhost/ws/othello/Alice");
    /// ```
    pub fn create_pair(url: impl Into<String>, buffer_size: usize) -> (Self, MemoryPeer) {
        let (events_tx, events_rx) = mpsc::channel(buffer_size);
        let (commands_tx, commands_rx) = mpsc::channel(buffer_size);

        let transport = Self {
            to_peer: commands_tx,
            from_peer: events_rx,
        };
        let peer = MemoryPeer {
            url: url.into(),
            events_tx,
            commands_rx,
        };

        (transport, peer)
    }
}

impl MemoryPeer {
    /// Sends a serialized frame to the client
    pub async fn send_frame<T: Serialize>(&self, frame: &T) -> Result<(), MemoryTransportError> {
        let text = serde_json::to_string(frame)
            .map_err(|e| MemoryTransportError::Encode(e.to_string()))?;
        self.send_text(text).await
    }

    /// Sends a raw text frame to the client
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), MemoryTransportError> {
        self.push(TransportEvent::Message(text.into())).await
    }

    /// Closes the connection from the server side
    pub async fn close(&self, code: u16) -> Result<(), MemoryTransportError> {
        self.push(TransportEvent::Closed(code)).await
    }

    /// Fails the connection with a transport error
    pub async fn fail(&self, error: impl Into<String>) -> Result<(), MemoryTransportError> {
        self.push(TransportEvent::Error(error.into())).await
    }

    /// Waits for the next command sent by the client
    ///
    /// Returns `None` once the client transport has stopped.
    pub async fn next_command(&mut self) -> Option<TransportCommand> {
        self.commands_rx.recv().await
    }

    async fn push(&self, event: TransportEvent) -> Result<(), MemoryTransportError> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| MemoryTransportError::ChannelClosed)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    type Error = MemoryTransportError;

    async fn run(
        mut self,
        events_tx: mpsc::Sender<TransportEvent>,
        mut commands_rx: mpsc::Receiver<TransportCommand>,
    ) -> Result<(), Self::Error> {
        if events_tx.send(TransportEvent::Opened).await.is_err() {
            return Ok(());
        }

        loop {
            tokio::select! {
                // Receive from peer, forward to the controller
                event = self.from_peer.recv() => {
                    match event {
                        Some(TransportEvent::Error(error)) => {
                            return Err(MemoryTransportError::Peer(error));
                        }
                        Some(event) => {
                            let closed = matches!(event, TransportEvent::Closed(_));
                            if events_tx.send(event).await.is_err() || closed {
                                return Ok(());
                            }
                        }
                        None => {
                            let _ = events_tx.send(TransportEvent::Closed(close_codes::ABNORMAL)).await;
                            return Ok(());
                        }
                    }
                }

                // Receive from the controller, send to peer
                command = commands_rx.recv() => {
                    match command {
                        Some(command) => {
                            let closing = matches!(command, TransportCommand::Close(_));
                            if self.to_peer.send(command).await.is_err() {
                                return Err(MemoryTransportError::ChannelClosed);
                            }
                            if closing {
                                return Ok(());
                            }
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}

/// Hands out [`MemoryTransport`]s and delivers their peers to the test
pub struct MemoryConnector {
    peers_tx: mpsc::UnboundedSender<MemoryPeer>,
    buffer_size: usize,
}

impl MemoryConnector {
    /// Creates a connector; every transport it creates yields its
    /// [`MemoryPeer`] on the returned receiver
    pub fn new(buffer_size: usize) -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        (
            Self {
                peers_tx,
                buffer_size: buffer_size.max(1),
            },
            peers_rx,
        )
    }
}

impl TransportFactory for MemoryConnector {
    type Transport = MemoryTransport;

    fn create(&self, url: &str) -> MemoryTransport {
        let (transport, peer) = MemoryTransport::create_pair(url, self.buffer_size);
        if self.peers_tx.send(peer).is_err() {
            tracing::debug!(url, "Memory peer receiver dropped");
        }
        transport
    }
}

/// Memory transport errors
#[derive(Debug, thiserror::Error)]
pub enum MemoryTransportError {
    #[error("Transport channel closed")]
    ChannelClosed,

    #[error("Peer failed the connection: {0}")]
    Peer(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}
