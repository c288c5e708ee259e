//! Connection manager: owns at most one live transport
//!
//! Every opened connection gets a fresh [`ConnectionId`]. Transport events
//! are tagged with it before they reach the controller, so events from a
//! connection that was already released can be recognised and dropped.

use othello_net_protocol::{
    close_codes, JsonCodec, OutboundFrame, Transport, TransportCommand, TransportEvent,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::session::Participant;
use crate::transport::TransportFactory;

/// Characters escaped in the player-name path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Identifies one opened connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transport event tagged with the connection it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub connection: ConnectionId,
    pub event: TransportEvent,
}

/// Everything needed to address the game socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointParams {
    /// Host name or address of the game server
    pub network: String,
    /// Player identity, sent as an escaped path segment
    pub name: String,
    pub participant: Participant,
    pub host: bool,
    pub room_id: Option<String>,
}

#[derive(Serialize)]
struct ConnectQuery<'a> {
    role: &'a str,
    host: bool,
    room: &'a str,
}

impl EndpointParams {
    /// Builds the connect URL
    ///
    /// # Example
    ///
    /// ```
    /// use othello_net_client::{ClientConfig, EndpointParams, Participant};
    ///
    /// let params = EndpointParams {
    ///     network: "localhost".to_string(),
    ///     name: "Bob Smith".to_string(),
    ///     participant: Participant::Player,
    ///     host: false,
    ///     room_id: Some("R1".to_string()),
    /// };
    ///
    /// assert_eq!(
    ///     params.url(&ClientConfig::default()).unwrap(),
    ///     "ws://localhost:10001/ws/othello/Bob%20Smith?role=player&host=false&room=R1"
    /// );
    /// ```
    pub fn url(&self, config: &ClientConfig) -> Result<String, serde_urlencoded::ser::Error> {
        let query = serde_urlencoded::to_string(ConnectQuery {
            role: self.participant.as_str(),
            host: self.host,
            room: self.room_id.as_deref().unwrap_or_default(),
        })?;

        Ok(format!(
            "{}://{}:{}{}/{}?{}",
            config.ws_scheme,
            self.network,
            config.port,
            config.game_path,
            utf8_percent_encode(&self.name, PATH_SEGMENT),
            query
        ))
    }
}

struct Connection {
    id: ConnectionId,
    commands_tx: mpsc::Sender<TransportCommand>,
}

/// Owns the single live transport connection
pub struct ConnectionManager<F: TransportFactory> {
    factory: F,
    events_tx: mpsc::Sender<ConnectionEvent>,
    capacity: usize,
    active: Option<Connection>,
    last_id: u64,
    codec: JsonCodec,
}

impl<F: TransportFactory> ConnectionManager<F> {
    /// Creates a manager that reports transport events on `events_tx`
    pub fn new(factory: F, events_tx: mpsc::Sender<ConnectionEvent>, capacity: usize) -> Self {
        Self {
            factory,
            events_tx,
            capacity: capacity.max(1),
            active: None,
            last_id: 0,
            codec: JsonCodec,
        }
    }

    /// Opens a connection to `url`, closing the current one first
    ///
    /// The transport runs on its own task; this returns as soon as it is
    /// spawned. Must be called from within a tokio runtime.
    pub fn open(&mut self, url: &str) -> ConnectionId {
        self.close(close_codes::NORMAL);

        self.last_id += 1;
        let id = ConnectionId(self.last_id);
        let (commands_tx, commands_rx) = mpsc::channel(self.capacity);
        let transport = self.factory.create(url);

        tracing::info!(connection = %id, url, "Opening connection");
        tokio::spawn(drive(
            id,
            transport,
            commands_rx,
            self.events_tx.clone(),
            self.capacity,
        ));

        self.active = Some(Connection { id, commands_tx });
        id
    }

    /// Serializes and sends a frame; does nothing without a connection
    pub async fn send(&self, frame: &OutboundFrame) {
        let Some(connection) = &self.active else {
            tracing::debug!(kind = ?frame, "No connection, frame dropped");
            return;
        };

        let text = match self.codec.encode(frame) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode frame");
                return;
            }
        };

        if connection
            .commands_tx
            .send(TransportCommand::Send(text))
            .await
            .is_err()
        {
            tracing::warn!(connection = %connection.id, "Transport stopped, frame dropped");
        }
    }

    /// Releases the connection and asks the transport to close with `code`
    ///
    /// Safe to call when nothing is open.
    pub fn close(&mut self, code: u16) {
        let Some(connection) = self.active.take() else {
            return;
        };

        tracing::info!(connection = %connection.id, code, "Closing connection");
        if connection
            .commands_tx
            .try_send(TransportCommand::Close(code))
            .is_err()
        {
            // Transport already stopped; dropping the sender is enough
            tracing::debug!(connection = %connection.id, "Transport already gone");
        }
    }

    /// Returns true if `id` is the live connection
    pub fn is_current(&self, id: ConnectionId) -> bool {
        self.active.as_ref().is_some_and(|c| c.id == id)
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<ConnectionId> {
        self.active.as_ref().map(|c| c.id)
    }
}

/// Runs one transport and forwards its events tagged with `id`
///
/// A transport that fails is reported as a single trailing
/// [`TransportEvent::Error`] after all events it produced.
async fn drive<T: Transport>(
    id: ConnectionId,
    transport: T,
    commands_rx: mpsc::Receiver<TransportCommand>,
    events_tx: mpsc::Sender<ConnectionEvent>,
    capacity: usize,
) {
    let (tx, mut rx) = mpsc::channel(capacity);
    let mut run = transport.run(tx, commands_rx);
    let mut finished = false;
    let mut failure = None;

    loop {
        tokio::select! {
            result = &mut run, if !finished => {
                finished = true;
                if let Err(e) = result {
                    tracing::warn!(connection = %id, error = %e, "Transport failed");
                    failure = Some(e.to_string());
                }
            }

            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let tagged = ConnectionEvent { connection: id, event };
                        if events_tx.send(tagged).await.is_err() {
                            return;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    if let Some(error) = failure {
        let _ = events_tx
            .send(ConnectionEvent {
                connection: id,
                event: TransportEvent::Error(error),
            })
            .await;
    }
    tracing::debug!(connection = %id, "Transport task finished");
}
