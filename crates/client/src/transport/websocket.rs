use super::{Transport, TransportFactory};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use othello_net_protocol::{close_codes, TransportCommand, TransportEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// WebSocket client that connects to the game server and bridges
/// text frames to transport events
pub struct WebSocketClient {
    url: String,
}

impl WebSocketClient {
    /// Creates a new WebSocket client for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WebSocketClient {
    type Error = WebSocketClientError;

    async fn run(
        self,
        events_tx: mpsc::Sender<TransportEvent>,
        mut commands_rx: mpsc::Receiver<TransportCommand>,
    ) -> Result<(), Self::Error> {
        tracing::info!(url = %self.url, "Connecting to game server");

        let (ws_stream, _) = connect_async(&self.url)
            .await
            .map_err(|e| WebSocketClientError::ConnectionError(e.to_string()))?;

        tracing::info!(url = %self.url, "WebSocket connection established");

        if events_tx.send(TransportEvent::Opened).await.is_err() {
            return Ok(());
        }

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if events_tx.send(TransportEvent::Message(text)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                            Ok(text) => {
                                if events_tx.send(TransportEvent::Message(text)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Dropping non UTF-8 binary frame");
                            }
                        },
                        Some(Ok(Message::Close(frame))) => {
                            let code = frame
                                .map(|f| u16::from(f.code))
                                .unwrap_or(close_codes::NO_STATUS);
                            tracing::info!(code, "Server closed connection");
                            let _ = events_tx.send(TransportEvent::Closed(code)).await;
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ping/pong is answered by tungstenite
                        }
                        Some(Err(e)) => {
                            return Err(WebSocketClientError::WebSocketError(e.to_string()));
                        }
                        None => {
                            tracing::info!("Connection dropped without close frame");
                            let _ = events_tx.send(TransportEvent::Closed(close_codes::ABNORMAL)).await;
                            break;
                        }
                    }
                }

                command = commands_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send(text)) => {
                            ws_sender
                                .send(Message::Text(text))
                                .await
                                .map_err(|e| WebSocketClientError::WebSocketError(e.to_string()))?;
                        }
                        Some(TransportCommand::Close(code)) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: "".into(),
                            };
                            if let Err(e) = ws_sender.send(Message::Close(Some(frame))).await {
                                tracing::debug!(error = %e, "Close frame not sent");
                            }
                            break;
                        }
                        None => {
                            // Connection released without an explicit close
                            let _ = ws_sender.close().await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Opens [`WebSocketClient`] transports
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl TransportFactory for WebSocketConnector {
    type Transport = WebSocketClient;

    fn create(&self, url: &str) -> WebSocketClient {
        WebSocketClient::new(url)
    }
}

/// WebSocket client errors
#[derive(Debug, thiserror::Error)]
pub enum WebSocketClientError {
    #[error("Failed to connect: {0}")]
    ConnectionError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),
}
