//! Session controller
//!
//! Ties the pre-flight validator, the connection manager and the protocol
//! state machine together. All mutation happens on `&mut self`: either a UI
//! intent (`connect`, `request_move`, ...) or one transport event applied by
//! [`SessionController::process_next`]. Because `connect` borrows the
//! controller mutably for its whole duration, a second connect cannot start
//! while pre-flight checks are pending, and a dropped connect future leaves
//! the session untouched.

use othello_net_protocol::{close_codes, CloseKind, Color, InboundFrame, JsonCodec, OutboundFrame, TransportEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::connection::{ConnectionEvent, ConnectionId, ConnectionManager, EndpointParams};
use crate::error::{ClientError, ConnectError};
use crate::events::{Notice, SessionEvent, View};
use crate::machine::Outcome;
use crate::session::{FirstTurn, Participant, Session, SessionRole};
use crate::transport::websocket::WebSocketConnector;
use crate::transport::TransportFactory;
use crate::validator::PreflightValidator;

/// Parameters of a connect intent
///
/// # Example
///
/// ```
/// use othello_net_client::{ConnectRequest, Participant};
///
/// let host = ConnectRequest::host("Alice", "localhost");
/// assert!(host.host);
///
/// let spectator = ConnectRequest::guest("Carol", "localhost", "R1").spectator();
/// assert_eq!(spectator.participant, Participant::Spectator);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub name: String,
    pub network: String,
    pub participant: Participant,
    pub host: bool,
    pub room_id: Option<String>,
}

impl ConnectRequest {
    /// Creates a new room as a player
    pub fn host(name: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            network: network.into(),
            participant: Participant::Player,
            host: true,
            room_id: None,
        }
    }

    /// Joins an existing room as a player
    pub fn guest(
        name: impl Into<String>,
        network: impl Into<String>,
        room_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            network: network.into(),
            participant: Participant::Player,
            host: false,
            room_id: Some(room_id.into()),
        }
    }

    #[must_use]
    pub fn spectator(mut self) -> Self {
        self.participant = Participant::Spectator;
        self
    }

    pub fn role(&self) -> SessionRole {
        SessionRole::from_host_flag(self.host)
    }

    fn endpoint(&self) -> EndpointParams {
        EndpointParams {
            network: self.network.clone(),
            name: self.name.clone(),
            participant: self.participant,
            host: self.host,
            room_id: self.room_id.clone(),
        }
    }
}

/// Owns the session, its connection and the event channel to the UI
pub struct SessionController<F: TransportFactory = WebSocketConnector> {
    config: ClientConfig,
    session: Session,
    connections: ConnectionManager<F>,
    /// Tagged transport events from every connection this controller opened
    events_rx: mpsc::Receiver<ConnectionEvent>,
    ui_tx: mpsc::UnboundedSender<SessionEvent>,
    http: reqwest::Client,
    codec: JsonCodec,
    waiting_deadline: Option<Instant>,
}

impl SessionController<WebSocketConnector> {
    /// Creates a controller that talks to the game server over WebSocket
    ///
    /// Returns the controller and the receiver of [`SessionEvent`]s.
    pub fn new(
        config: ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>), ClientError> {
        Self::with_factory(config, WebSocketConnector)
    }
}

impl<F: TransportFactory> SessionController<F> {
    /// Creates a controller using a custom transport factory
    pub fn with_factory(
        config: ClientConfig,
        factory: F,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>), ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.preflight_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let capacity = config.channel_capacity.max(1);
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        let controller = Self {
            session: Session::new(config.first_turn.resolve()),
            connections: ConnectionManager::new(factory, events_tx, capacity),
            config,
            events_rx,
            ui_tx,
            http,
            codec: JsonCodec,
            waiting_deadline: None,
        };

        Ok((controller, ui_rx))
    }

    /// Read-only view of the session
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Id of the live connection, if any
    pub fn connection(&self) -> Option<ConnectionId> {
        self.connections.current()
    }

    /// Chooses the starting color; `Random` is resolved immediately
    pub fn set_first_turn(&mut self, choice: FirstTurn) -> Color {
        let color = choice.resolve();
        self.session.first_turn = color;
        if !self.session.status.is_playing() {
            self.session.turn_holder = color;
        }
        color
    }

    /// Forgets the last applied move
    pub fn clear_last_move(&mut self) {
        self.session.last_move = None;
    }

    /// Validates the request and opens the game socket
    ///
    /// Hosts skip pre-flight checks since their room is being created.
    /// Guests must name an existing room and a name that is free in it.
    /// Nothing is opened and the session is left as it was if a check
    /// fails. An active session is released before the new one opens.
    pub async fn connect(&mut self, request: ConnectRequest) -> Result<ConnectionId, ConnectError> {
        let role = request.role();
        tracing::info!(
            name = %request.name,
            network = %request.network,
            role = ?role,
            participant = request.participant.as_str(),
            "Connect requested"
        );

        if role == SessionRole::Guest {
            self.preflight(&request).await?;
        }

        let url = request.endpoint().url(&self.config)?;

        if self.session.status.is_active() || self.connections.is_open() {
            tracing::info!("Replacing active session");
            self.reset(None);
        }

        let id = self.connections.open(&url);
        self.session.begin(
            &request.name,
            role,
            request.participant,
            request.room_id.as_deref(),
        );
        // A timeout too large to represent waits forever
        self.waiting_deadline = self
            .config
            .waiting_timeout
            .and_then(|t| Instant::now().checked_add(t));

        tracing::info!(connection = %id, status = %self.session.status, "Session waiting");
        Ok(id)
    }

    async fn preflight(&self, request: &ConnectRequest) -> Result<(), ConnectError> {
        let room_id = match request.room_id.as_deref() {
            Some(room) if !room.is_empty() => room,
            _ => return Err(ConnectError::MissingRoom),
        };

        let validator = PreflightValidator::new(
            self.http.clone(),
            self.config.http_base_url(&request.network),
            self.config.preflight_retries,
        );

        if !validator.check_room_exists(room_id).await? {
            tracing::info!(room = room_id, "Room rejected by server");
            return Err(ConnectError::InvalidRoom(room_id.to_string()));
        }

        if !validator.check_name_available(&request.name, Some(room_id)).await? {
            tracing::info!(name = %request.name, room = room_id, "Name rejected by server");
            return Err(ConnectError::DuplicateName(request.name.clone()));
        }

        Ok(())
    }

    /// Sends a move; legality is left to the server
    pub async fn request_move(&mut self, x: u8, y: u8) {
        self.connections.send(&OutboundFrame::Move { x, y }).await;
    }

    /// Tells the server this client leaves, then resets without waiting
    pub async fn request_leave(&mut self, code: u16) {
        self.connections.send(&OutboundFrame::Leave { code }).await;
        self.reset(None);
    }

    /// Asks the server to start the game with the chosen first color
    pub async fn request_start(&mut self) {
        let first = self.session.first_turn;
        self.connections.send(&OutboundFrame::StartRequest { first }).await;
    }

    pub async fn send_chat(&mut self, message: impl Into<String>) {
        let frame = OutboundFrame::Chat {
            message: message.into(),
        };
        self.connections.send(&frame).await;
    }

    /// Waits for the next transport event (or the waiting deadline) and
    /// applies it
    pub async fn process_next(&mut self) {
        let deadline = self.waiting_deadline;

        tokio::select! {
            event = self.events_rx.recv() => {
                if let Some(event) = event {
                    self.handle_event(event);
                }
            }

            _ = wait_until(deadline) => self.expire_waiting(),
        }
    }

    /// Applies one transport event
    ///
    /// Events from connections that were already released are dropped.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        if !self.connections.is_current(event.connection) {
            tracing::debug!(connection = %event.connection, event = ?event.event, "Dropping event from released connection");
            return;
        }

        match event.event {
            TransportEvent::Opened => {
                tracing::info!(connection = %event.connection, "Connection open");
            }
            TransportEvent::Message(text) => self.handle_message(&text),
            TransportEvent::Error(error) => {
                tracing::warn!(connection = %event.connection, error = %error, "Transport error");
                self.reset(Some(Notice::ConnectionLost { code: None }));
            }
            TransportEvent::Closed(code) => {
                tracing::info!(connection = %event.connection, code, "Connection closed");
                match CloseKind::from_code(code) {
                    CloseKind::Normal => self.reset(None),
                    CloseKind::PeerLeft => self.reset(Some(Notice::PeerLeft)),
                    CloseKind::Abnormal(code) => {
                        self.reset(Some(Notice::ConnectionLost { code: Some(code) }))
                    }
                }
            }
        }
    }

    fn handle_message(&mut self, text: &str) {
        match self.codec.decode_frame(text) {
            Ok(frame) => self.apply(frame),
            Err(e) if e.is_unknown_type() => {
                tracing::debug!(error = %e, "Ignoring frame");
            }
            Err(e) => {
                tracing::warn!(error = %e, frame = text, "Dropping malformed frame");
            }
        }
    }

    fn apply(&mut self, frame: InboundFrame) {
        tracing::debug!(kind = frame.kind(), status = %self.session.status, "Applying frame");

        match self.session.apply_frame(frame) {
            Outcome::Applied | Outcome::Ignored => {}
            Outcome::GameStarted => {
                self.waiting_deadline = None;
                self.emit(SessionEvent::Navigate(View::Game));
            }
            Outcome::PeerLeft => self.reset(Some(Notice::PeerLeft)),
            Outcome::Chat { from, message } => self.emit(SessionEvent::Chat { from, message }),
            Outcome::Rooms(rooms) => self.emit(SessionEvent::Rooms(rooms)),
            Outcome::ServerError(message) => {
                self.emit(SessionEvent::Notice(Notice::ServerError(message)))
            }
        }
    }

    fn expire_waiting(&mut self) {
        self.waiting_deadline = None;
        if self.session.status.is_waiting() {
            tracing::warn!("No opponent within the waiting timeout");
            self.reset(Some(Notice::WaitingTimedOut));
        }
    }

    /// Releases the connection and returns the session to Idle
    ///
    /// The connection handle is released before anything is reported, and
    /// an already idle session produces no events, so duplicate close
    /// events are harmless.
    fn reset(&mut self, notice: Option<Notice>) {
        self.connections.close(close_codes::NORMAL);
        self.waiting_deadline = None;

        if !self.session.reset() {
            return;
        }

        tracing::info!(notice = ?notice, "Session reset");
        if let Some(notice) = notice {
            self.emit(SessionEvent::Notice(notice));
        }
        self.emit(SessionEvent::Navigate(View::Home));
    }

    fn emit(&self, event: SessionEvent) {
        if self.ui_tx.send(event).is_err() {
            tracing::debug!("UI event receiver dropped");
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::{MemoryConnector, MemoryPeer};
    use othello_net_protocol::TransportCommand;
    use serde_json::json;
    use tokio::time::{timeout, Duration};

    type TestController = SessionController<MemoryConnector>;

    fn controller(
        config: ClientConfig,
    ) -> (
        TestController,
        mpsc::UnboundedReceiver<SessionEvent>,
        mpsc::UnboundedReceiver<MemoryPeer>,
    ) {
        let (connector, peers) = MemoryConnector::new(16);
        let (controller, ui) = SessionController::with_factory(config, connector).unwrap();
        (controller, ui, peers)
    }

    async fn hosted(
        name: &str,
    ) -> (
        TestController,
        mpsc::UnboundedReceiver<SessionEvent>,
        MemoryPeer,
    ) {
        let (mut controller, ui, mut peers) = controller(ClientConfig::default());
        controller.connect(ConnectRequest::host(name, "localhost")).await.unwrap();
        let peer = peers.recv().await.unwrap();
        (controller, ui, peer)
    }

    async fn pump(controller: &mut TestController) {
        timeout(Duration::from_secs(1), controller.process_next())
            .await
            .expect("no event arrived");
    }

    async fn start_game(controller: &mut TestController, peer: &MemoryPeer, black: &str, white: &str) {
        peer.send_frame(&json!({"type": "matched", "room": "r-1", "black": black, "white": white}))
            .await
            .unwrap();
        peer.send_frame(&json!({"type": "start", "black": black}))
            .await
            .unwrap();
        for _ in 0..3 {
            pump(controller).await; // opened, matched, start
        }
    }

    #[tokio::test]
    async fn test_host_connect_enters_waiting() {
        let (controller, _ui, peer) = hosted("Alice").await;

        assert!(controller.session().status().is_waiting());
        assert_eq!(controller.session().role(), Some(SessionRole::Host));
        assert!(controller.session().has_transport());
        assert_eq!(
            peer.url,
            "ws://localhost:10001/ws/othello/Alice?role=player&host=true&room="
        );
    }

    #[tokio::test]
    async fn test_guest_without_room_fails() {
        let (mut controller, _ui, mut peers) = controller(ClientConfig::default());
        let mut request = ConnectRequest::guest("Bob", "localhost", "");
        request.room_id = None;

        let err = controller.connect(request).await.unwrap_err();
        assert!(matches!(err, ConnectError::MissingRoom));
        assert!(controller.session().status().is_idle());
        assert!(peers.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_game_start_navigates_to_game() {
        let (mut controller, mut ui, peer) = hosted("Alice").await;
        start_game(&mut controller, &peer, "Alice", "Bob").await;

        let session = controller.session();
        assert!(session.status().is_playing());
        assert_eq!(session.opponent_identity(), "Bob");
        assert_eq!(session.room_id(), "r-1");
        assert_eq!(session.self_color(), Some(Color::Black));
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Navigate(View::Game));
    }

    #[tokio::test]
    async fn test_peer_close_resets_with_notice() {
        let (mut controller, mut ui, peer) = hosted("Alice").await;
        start_game(&mut controller, &peer, "Alice", "Bob").await;
        let _ = ui.try_recv();

        peer.close(close_codes::PEER_LEFT).await.unwrap();
        pump(&mut controller).await;

        let session = controller.session();
        assert!(session.status().is_idle());
        assert_eq!(session.opponent_identity(), "");
        assert!(!session.has_transport());
        assert_eq!(controller.connection(), None);
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Notice(Notice::PeerLeft));
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Navigate(View::Home));
    }

    #[tokio::test]
    async fn test_normal_close_has_no_notice() {
        let (mut controller, mut ui, peer) = hosted("Alice").await;
        pump(&mut controller).await; // opened

        peer.close(close_codes::NORMAL).await.unwrap();
        pump(&mut controller).await;

        assert!(controller.session().status().is_idle());
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Navigate(View::Home));
        assert!(ui.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_abnormal_close_is_connection_lost() {
        let (mut controller, mut ui, peer) = hosted("Alice").await;
        pump(&mut controller).await;

        peer.close(1011).await.unwrap();
        pump(&mut controller).await;

        assert_eq!(
            ui.try_recv().unwrap(),
            SessionEvent::Notice(Notice::ConnectionLost { code: Some(1011) })
        );
    }

    #[tokio::test]
    async fn test_transport_error_resets() {
        let (mut controller, mut ui, peer) = hosted("Alice").await;
        pump(&mut controller).await;

        peer.fail("connection reset").await.unwrap();
        pump(&mut controller).await;

        assert!(controller.session().status().is_idle());
        assert_eq!(
            ui.try_recv().unwrap(),
            SessionEvent::Notice(Notice::ConnectionLost { code: None })
        );
    }

    #[tokio::test]
    async fn test_duplicate_close_events_are_idempotent() {
        let (mut controller, mut ui, _peer) = hosted("Alice").await;
        let id = controller.connection().unwrap();

        let closed = ConnectionEvent {
            connection: id,
            event: TransportEvent::Closed(close_codes::PEER_LEFT),
        };
        controller.handle_event(closed.clone());
        controller.handle_event(closed);

        assert!(controller.session().status().is_idle());
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Notice(Notice::PeerLeft));
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Navigate(View::Home));
        assert!(ui.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_request_leave_sends_then_resets() {
        let (mut controller, mut ui, mut peer) = hosted("Alice").await;

        controller.request_leave(close_codes::NORMAL).await;

        assert!(controller.session().status().is_idle());
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Navigate(View::Home));
        assert_eq!(
            peer.next_command().await,
            Some(TransportCommand::Send(r#"{"type":"leave","code":1000}"#.to_string()))
        );
        assert_eq!(
            peer.next_command().await,
            Some(TransportCommand::Close(close_codes::NORMAL))
        );

        // The transport's own close arrives later and changes nothing
        let _ = peer.close(close_codes::NORMAL).await;
        let _ = timeout(Duration::from_millis(100), controller.process_next()).await;
        assert!(ui.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_move_roundtrip() {
        let (mut controller, _ui, mut peer) = hosted("Alice").await;
        start_game(&mut controller, &peer, "Alice", "Bob").await;

        controller.request_move(2, 3).await;
        assert_eq!(
            peer.next_command().await,
            Some(TransportCommand::Send(r#"{"type":"move","x":2,"y":3}"#.to_string()))
        );

        peer.send_frame(&json!({"type": "move", "turn": "Alice", "x": 2, "y": 3}))
            .await
            .unwrap();
        pump(&mut controller).await;

        assert_eq!(controller.session().turn_holder(), Color::White);
        assert_eq!(
            controller.session().last_move().map(|m| (m.x, m.y, m.color)),
            Some((2, 3, Color::Black))
        );

        controller.clear_last_move();
        assert_eq!(controller.session().last_move(), None);
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        let (mut controller, mut ui, peer) = hosted("Alice").await;
        pump(&mut controller).await;

        peer.send_text("not json").await.unwrap();
        peer.send_text(r#"{"type":"fireworks"}"#).await.unwrap();
        peer.send_text(r#"{"type":"matched","black":"Alice"}"#).await.unwrap();
        for _ in 0..3 {
            pump(&mut controller).await;
        }

        assert!(controller.session().status().is_waiting());
        assert_eq!(controller.session().opponent_identity(), "");
        assert!(ui.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_chat_and_server_error_forwarded() {
        let (mut controller, mut ui, mut peer) = hosted("Alice").await;
        pump(&mut controller).await;

        controller.send_chat("hello").await;
        assert_eq!(
            peer.next_command().await,
            Some(TransportCommand::Send(r#"{"type":"chat","message":"hello"}"#.to_string()))
        );

        peer.send_frame(&json!({"type": "chat", "from": "Bob", "message": "hi"}))
            .await
            .unwrap();
        peer.send_frame(&json!({"type": "error", "message": "not your turn"}))
            .await
            .unwrap();
        pump(&mut controller).await;
        pump(&mut controller).await;

        assert_eq!(
            ui.try_recv().unwrap(),
            SessionEvent::Chat {
                from: "Bob".to_string(),
                message: "hi".to_string(),
            }
        );
        assert_eq!(
            ui.try_recv().unwrap(),
            SessionEvent::Notice(Notice::ServerError("not your turn".to_string()))
        );
        assert!(controller.session().status().is_waiting());
    }

    #[tokio::test]
    async fn test_request_start_uses_first_turn() {
        let (mut controller, _ui, mut peer) = hosted("Alice").await;

        assert_eq!(controller.set_first_turn(FirstTurn::White), Color::White);
        controller.request_start().await;

        assert_eq!(
            peer.next_command().await,
            Some(TransportCommand::Send(r#"{"type":"start_request","first":"white"}"#.to_string()))
        );

        peer.send_frame(&json!({"type": "start", "black": "Bob"}))
            .await
            .unwrap();
        pump(&mut controller).await; // opened
        pump(&mut controller).await;
        assert_eq!(controller.session().turn_holder(), Color::White);
        assert_eq!(controller.session().self_color(), Some(Color::White));
        assert_eq!(controller.session().opponent_identity(), "Bob");
    }

    #[tokio::test]
    async fn test_reconnect_drops_stale_events() {
        let (mut controller, _ui, mut peers) = controller(ClientConfig::default());
        let first = controller.connect(ConnectRequest::host("Alice", "localhost")).await.unwrap();
        let first_peer = peers.recv().await.unwrap();

        let second = controller.connect(ConnectRequest::host("Alice", "localhost")).await.unwrap();
        assert_ne!(first, second);

        controller.handle_event(ConnectionEvent {
            connection: first,
            event: TransportEvent::Closed(close_codes::PEER_LEFT),
        });
        drop(first_peer);

        assert!(controller.session().status().is_waiting());
        assert_eq!(controller.connection(), Some(second));
    }

    #[tokio::test]
    async fn test_unbounded_waiting_timeout_never_expires() {
        let config = ClientConfig::default().with_waiting_timeout(Duration::MAX);
        let (mut controller, mut ui, mut peers) = controller(config);

        controller.connect(ConnectRequest::host("Alice", "localhost")).await.unwrap();
        let _peer = peers.recv().await.unwrap();
        assert!(controller.session().status().is_waiting());

        pump(&mut controller).await; // opened
        let expired = timeout(Duration::from_millis(100), controller.process_next()).await;
        assert!(expired.is_err());
        assert!(controller.session().status().is_waiting());
        assert!(ui.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_timeout() {
        let config = ClientConfig::default().with_waiting_timeout(Duration::from_secs(30));
        let (mut controller, mut ui, mut peers) = controller(config);
        controller.connect(ConnectRequest::host("Alice", "localhost")).await.unwrap();
        let _peer = peers.recv().await.unwrap();

        pump(&mut controller).await; // opened
        controller.process_next().await; // deadline

        assert!(controller.session().status().is_idle());
        assert_eq!(ui.try_recv().unwrap(), SessionEvent::Notice(Notice::WaitingTimedOut));
    }
}
