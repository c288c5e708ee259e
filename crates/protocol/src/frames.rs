//! Frames exchanged over the game socket
//!
//! Every frame is a JSON object carrying a `type` discriminator:
//! - Server → Client: `matched`, `wait`, `start`, `move`, `leave`,
//!   `spectator_join`, `spectator_leave`, `chat`, `rooms`, `error`
//! - Client → Server: `move`, `leave`, `chat`, `start_request`

use serde::{Deserialize, Serialize};

/// WebSocket close codes with meaning for a game session
pub mod close_codes {
    /// Intentional close, no notice is shown
    pub const NORMAL: u16 = 1000;

    /// Close frame carried no status code
    pub const NO_STATUS: u16 = 1005;

    /// Connection dropped without a close frame
    pub const ABNORMAL: u16 = 1006;

    /// The server closes every remaining socket of a room with this code
    /// when one of the players leaves
    pub const PEER_LEFT: u16 = 4000;
}

/// How a close code should be reported to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    /// `1000`: closed on purpose
    Normal,

    /// `4000`: the other player left
    PeerLeft,

    /// Anything else
    Abnormal(u16),
}

impl CloseKind {
    /// Classifies a close code
    pub fn from_code(code: u16) -> Self {
        match code {
            close_codes::NORMAL => CloseKind::Normal,
            close_codes::PEER_LEFT => CloseKind::PeerLeft,
            other => CloseKind::Abnormal(other),
        }
    }
}

/// Stone color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Returns the other color
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// One running room as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    pub black: String,
    pub white: String,

    /// Number of spectators currently watching
    #[serde(default)]
    pub spectators: usize,
}

/// Frame received from the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Two players were paired into a room
    Matched {
        black: String,
        white: String,
        room: Option<String>,
    },

    /// Still waiting for an opponent
    Wait {
        room: Option<String>,
        message: Option<String>,
    },

    /// The game begins
    ///
    /// `black` may be omitted when it was already announced by `matched`.
    Start {
        black: Option<String>,
        first: Option<Color>,
        room: Option<String>,
    },

    /// A move was applied
    ///
    /// The mover is given either by identity (`turn`) or by `color`.
    Move {
        x: u8,
        y: u8,
        turn: Option<String>,
        color: Option<Color>,
    },

    /// The other player left the room
    Leave { code: Option<u16> },

    SpectatorJoin { name: String },

    SpectatorLeave { name: String },

    Chat { from: String, message: String },

    /// Room listing, sent to spectators on connect
    Rooms { rooms: Vec<RoomSummary> },

    /// The server rejected the last request
    Error { message: String },
}

impl InboundFrame {
    /// Every `type` tag this client understands
    pub const KINDS: &'static [&'static str] = &[
        "matched",
        "wait",
        "start",
        "move",
        "leave",
        "spectator_join",
        "spectator_leave",
        "chat",
        "rooms",
        "error",
    ];

    /// Returns the `type` tag of this frame
    pub fn kind(&self) -> &'static str {
        match self {
            InboundFrame::Matched { .. } => "matched",
            InboundFrame::Wait { .. } => "wait",
            InboundFrame::Start { .. } => "start",
            InboundFrame::Move { .. } => "move",
            InboundFrame::Leave { .. } => "leave",
            InboundFrame::SpectatorJoin { .. } => "spectator_join",
            InboundFrame::SpectatorLeave { .. } => "spectator_leave",
            InboundFrame::Chat { .. } => "chat",
            InboundFrame::Rooms { .. } => "rooms",
            InboundFrame::Error { .. } => "error",
        }
    }
}

/// Frame sent to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Place a stone; legality is checked by the server
    Move { x: u8, y: u8 },

    /// Leave the room with an application code
    Leave { code: u16 },

    Chat { message: String },

    /// Ask the server to start the game with `first` to move
    StartRequest { first: Color },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_close_kind() {
        assert_eq!(CloseKind::from_code(1000), CloseKind::Normal);
        assert_eq!(CloseKind::from_code(4000), CloseKind::PeerLeft);
        assert_eq!(CloseKind::from_code(1006), CloseKind::Abnormal(1006));
        assert_eq!(CloseKind::from_code(4001), CloseKind::Abnormal(4001));
    }

    #[test]
    fn test_color_opposite() {
        assert_eq!(Color::Black.opposite(), Color::White);
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.to_string(), "black");
    }

    #[test]
    fn test_start_frame_optional_fields() {
        let frame: InboundFrame =
            serde_json::from_value(json!({"type": "start", "first": "white"})).unwrap();
        assert_eq!(
            frame,
            InboundFrame::Start {
                black: None,
                first: Some(Color::White),
                room: None,
            }
        );
    }

    #[test]
    fn test_move_frame_with_turn() {
        let frame: InboundFrame =
            serde_json::from_value(json!({"type": "move", "turn": "Bob", "x": 3, "y": 2})).unwrap();
        assert_eq!(
            frame,
            InboundFrame::Move {
                x: 3,
                y: 2,
                turn: Some("Bob".to_string()),
                color: None,
            }
        );
    }

    #[test]
    fn test_outbound_wire_shape() {
        let value = serde_json::to_value(OutboundFrame::Move { x: 4, y: 5 }).unwrap();
        assert_eq!(value, json!({"type": "move", "x": 4, "y": 5}));

        let value = serde_json::to_value(OutboundFrame::Leave { code: 1000 }).unwrap();
        assert_eq!(value, json!({"type": "leave", "code": 1000}));

        let value = serde_json::to_value(OutboundFrame::StartRequest { first: Color::White }).unwrap();
        assert_eq!(value, json!({"type": "start_request", "first": "white"}));
    }

    #[test]
    fn test_kinds_cover_every_variant() {
        let frames = [
            InboundFrame::Leave { code: None },
            InboundFrame::SpectatorJoin { name: "c".into() },
            InboundFrame::Error { message: "no".into() },
        ];
        for frame in frames {
            assert!(InboundFrame::KINDS.contains(&frame.kind()));
        }
    }
}
