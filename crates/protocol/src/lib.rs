//! # othello-net protocol
//!
//! Wire-level definitions shared by the othello-net client.
//!
//! This crate provides:
//! - `InboundFrame` / `OutboundFrame`: the JSON frames of the game socket
//! - `close_codes` / `CloseKind`: close codes and how to report them
//! - `JsonCodec`: text frame encoding with typed decode errors
//! - `SessionStatus`: session status state machine
//! - `Transport`: connection abstraction driven by events and commands
//! - Pre-flight request and response bodies
//!
//! ## Example
//!
//! ```
//! use othello_net_protocol::{InboundFrame, JsonCodec, SessionStatus};
//!
//! let frame = JsonCodec
//!     .decode_frame(r#"{"type":"wait","room":"r-1"}"#)
//!     .unwrap();
//! assert_eq!(frame.kind(), "wait");
//!
//! let mut status = SessionStatus::Idle;
//! status.transition_to(SessionStatus::Waiting).unwrap();
//! assert!(status.is_waiting());
//! ```

pub mod codec;
pub mod error;
pub mod frames;
pub mod preflight;
pub mod state;
pub mod transport;

pub use codec::JsonCodec;
pub use error::{FrameError, ProtocolError, Result};
pub use frames::{close_codes, CloseKind, Color, InboundFrame, OutboundFrame, RoomSummary};
pub use preflight::{CheckResponse, NameCheck, RoomCheck};
pub use state::SessionStatus;
pub use transport::{Transport, TransportCommand, TransportEvent};
