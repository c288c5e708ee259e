//! JSON text codec for game frames
//!
//! Frames travel as WebSocket text messages. Decoding is two-staged so that
//! an unknown `type` can be told apart from a known `type` with missing or
//! mistyped fields: the former is dropped silently, the latter is logged.
//!
//! # Usage
//!
//! ```
//! use othello_net_protocol::codec::JsonCodec;
//! use othello_net_protocol::{InboundFrame, OutboundFrame};
//!
//! let codec = JsonCodec;
//!
//! let text = codec.encode(&OutboundFrame::Move { x: 2, y: 3 }).unwrap();
//! assert_eq!(text, r#"{"type":"move","x":2,"y":3}"#);
//!
//! let frame = codec.decode_frame(r#"{"type":"spectator_join","name":"Carol"}"#).unwrap();
//! assert_eq!(frame, InboundFrame::SpectatorJoin { name: "Carol".into() });
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::{FrameError, ProtocolError, Result};
use crate::frames::InboundFrame;

/// JSON codec (serde_json)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Returns a human-readable name for this codec
    pub fn name(&self) -> &'static str {
        "JSON"
    }

    /// Encodes a serializable message into a text frame
    pub fn encode<T: Serialize>(&self, message: &T) -> Result<String> {
        serde_json::to_string(message)
            .map_err(|e| ProtocolError::CodecError(format!("JSON encode failed: {}", e)))
    }

    /// Decodes a text frame into an [`InboundFrame`]
    pub fn decode_frame(&self, text: &str) -> std::result::Result<InboundFrame, FrameError> {
        let value: Value = serde_json::from_str(text).map_err(FrameError::Malformed)?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(FrameError::MissingType)?
            .to_owned();

        if !InboundFrame::KINDS.contains(&kind.as_str()) {
            return Err(FrameError::UnknownType(kind));
        }

        serde_json::from_value(value).map_err(|source| FrameError::InvalidFields { kind, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::{Color, OutboundFrame};

    #[test]
    fn test_decode_matched() {
        let frame = JsonCodec
            .decode_frame(r#"{"type":"matched","room":"r-1","black":"Alice","white":"Bob"}"#)
            .unwrap();

        assert_eq!(
            frame,
            InboundFrame::Matched {
                black: "Alice".to_string(),
                white: "Bob".to_string(),
                room: Some("r-1".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_server_move_with_color() {
        let frame = JsonCodec
            .decode_frame(r#"{"type":"move","x":7,"y":0,"color":"white"}"#)
            .unwrap();

        assert_eq!(
            frame,
            InboundFrame::Move {
                x: 7,
                y: 0,
                turn: None,
                color: Some(Color::White),
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = JsonCodec.decode_frame(r#"{"type":"joined","room":"r-1"}"#).unwrap_err();
        assert!(err.is_unknown_type());
        assert_eq!(err.to_string(), "Unknown frame type: joined");
    }

    #[test]
    fn test_missing_fields() {
        let err = JsonCodec.decode_frame(r#"{"type":"move","x":1}"#).unwrap_err();
        assert!(matches!(err, FrameError::InvalidFields { ref kind, .. } if kind == "move"));
        assert!(!err.is_unknown_type());
    }

    #[test]
    fn test_missing_type() {
        let err = JsonCodec.decode_frame(r#"{"x":1,"y":2}"#).unwrap_err();
        assert!(matches!(err, FrameError::MissingType));

        let err = JsonCodec.decode_frame(r#"{"type":5}"#).unwrap_err();
        assert!(matches!(err, FrameError::MissingType));
    }

    #[test]
    fn test_not_json() {
        let err = JsonCodec.decode_frame("hello vue").unwrap_err();
        assert!(matches!(err, FrameError::Malformed(_)));
    }

    #[test]
    fn test_encode_chat() {
        let text = JsonCodec
            .encode(&OutboundFrame::Chat {
                message: "gg".to_string(),
            })
            .unwrap();
        assert_eq!(text, r#"{"type":"chat","message":"gg"}"#);
    }

    #[test]
    fn test_codec_name() {
        assert_eq!(JsonCodec.name(), "JSON");
    }
}
