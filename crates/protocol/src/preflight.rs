//! Request and response bodies of the pre-flight HTTP endpoints
//!
//! - `POST /name_check {name, room_id} -> {ok}`
//! - `POST /room_check {room_id} -> {ok}`

use serde::{Deserialize, Serialize};

/// Path of the name availability check
pub const NAME_CHECK_PATH: &str = "/name_check";

/// Path of the room existence check
pub const ROOM_CHECK_PATH: &str = "/room_check";

/// Body of `POST /name_check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCheck {
    pub name: String,

    /// Room the name must be unique in; `None` checks the lobby
    pub room_id: Option<String>,
}

/// Body of `POST /room_check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCheck {
    pub room_id: String,
}

/// Answer of both checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_check_body() {
        let body = NameCheck {
            name: "Bob".to_string(),
            room_id: Some("R1".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"name": "Bob", "room_id": "R1"})
        );
    }

    #[test]
    fn test_check_response() {
        let response: CheckResponse = serde_json::from_value(json!({"ok": false})).unwrap();
        assert!(!response.ok);
    }
}
