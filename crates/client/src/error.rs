//! Client error types
//!
//! Only pre-flight validation and connection setup report errors to the
//! caller. Once a transport is open, every failure is absorbed into the
//! session reset and reported as a [`Notice`](crate::Notice).

use thiserror::Error;

/// Pre-flight request failed; the server state is unknown
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("Pre-flight request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Pre-flight {path} returned HTTP {status}")]
    Status { path: &'static str, status: u16 },
}

/// Reasons `connect` did not open a transport
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Name already in use: {0}")]
    DuplicateName(String),

    #[error("Room does not exist: {0}")]
    InvalidRoom(String),

    #[error("Joining a room requires a room id")]
    MissingRoom,

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error("Failed to build connect URL: {0}")]
    Endpoint(#[from] serde_urlencoded::ser::Error),
}

impl ConnectError {
    /// True when the server definitely refused the name or room
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ConnectError::DuplicateName(_) | ConnectError::InvalidRoom(_) | ConnectError::MissingRoom
        )
    }
}

/// Controller setup errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_display() {
        assert_eq!(
            ConnectError::DuplicateName("Bob".to_string()).to_string(),
            "Name already in use: Bob"
        );
        assert_eq!(
            ConnectError::InvalidRoom("R1".to_string()).to_string(),
            "Room does not exist: R1"
        );
    }

    #[test]
    fn test_rejection_classification() {
        assert!(ConnectError::DuplicateName("a".into()).is_rejection());
        assert!(ConnectError::MissingRoom.is_rejection());
        let status = ConnectError::Preflight(PreflightError::Status {
            path: "/room_check",
            status: 500,
        });
        assert!(!status.is_rejection());
        assert_eq!(status.to_string(), "Pre-flight /room_check returned HTTP 500");
    }
}
