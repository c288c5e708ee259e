//! # othello-net client
//!
//! Client-side session controller for networked Othello.
//!
//! The [`SessionController`] validates a name and room against the game
//! server, opens the game socket, applies the server's frames to a
//! [`Session`] and reports navigation and notices to the UI over a channel.
//!
//! ## Example
//!
//! ```no_run
//! use othello_net_client::{ClientConfig, ConnectRequest, SessionController, SessionEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut controller, mut events) = SessionController::new(ClientConfig::default())?;
//!
//!     controller
//!         .connect(ConnectRequest::guest("Bob", "localhost", "r-1"))
//!         .await?;
//!
//!     loop {
//!         controller.process_next().await;
//!         while let Ok(event) = events.try_recv() {
//!             println!("{event:?}");
//!             if event == SessionEvent::Navigate(othello_net_client::View::Home) {
//!                 return Ok(());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod connection;
pub mod controller;
pub mod error;
pub mod events;
mod machine;
pub mod session;
pub mod transport;
pub mod validator;

pub use config::ClientConfig;
pub use connection::{ConnectionEvent, ConnectionId, ConnectionManager, EndpointParams};
pub use controller::{ConnectRequest, SessionController};
pub use error::{ClientError, ConnectError, PreflightError};
pub use events::{Notice, SessionEvent, View};
pub use session::{FirstTurn, LastMove, Participant, Session, SessionRole};
pub use transport::memory::{MemoryConnector, MemoryPeer, MemoryTransport};
pub use transport::websocket::{WebSocketClient, WebSocketConnector};
pub use transport::TransportFactory;
pub use validator::PreflightValidator;
