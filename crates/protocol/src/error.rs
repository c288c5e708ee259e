use thiserror::Error;

use crate::state::SessionStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStateTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Codec error: {0}")]
    CodecError(String),
}

/// Reasons an inbound text frame could not be turned into an [`InboundFrame`]
///
/// [`InboundFrame`]: crate::InboundFrame
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Frame has no `type` field")]
    MissingType,

    #[error("Unknown frame type: {0}")]
    UnknownType(String),

    #[error("Frame `{kind}` is missing required fields: {source}")]
    InvalidFields {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FrameError {
    /// Unknown frame types are expected from newer servers and are dropped quietly
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, FrameError::UnknownType(_))
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
