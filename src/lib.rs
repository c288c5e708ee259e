//! # othello-net
//!
//! Networked Othello session client:
//! - Name and room pre-flight checks over HTTP
//! - Matchmaking and live move synchronization over a WebSocket
//! - Disconnect handling with a single reset path
//!
//! ## Components
//!
//! - `othello-net-protocol`: frames, close codes, JSON codec and transport trait
//! - `othello-net-client`: session controller, validator and transports
//!
//! ## Example
//!
//! See `demos/console_client.rs` for a console session.

pub use othello_net_client as client;
pub use othello_net_protocol as protocol;
