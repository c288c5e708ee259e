//! Events delivered to the UI
//!
//! The controller never calls into view code. Everything the UI has to
//! react to (navigation, notices, chat lines, room listings) is sent on the
//! event channel returned by [`SessionController::new`].
//!
//! [`SessionController::new`]: crate::SessionController::new

use othello_net_protocol::RoomSummary;

/// View the UI should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Connect screen; shown whenever the session returns to Idle
    Home,

    /// Board; shown when the game starts
    Game,
}

/// User-facing notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The opponent left (close code 4000 or a `leave` frame)
    PeerLeft,

    /// Transport error or abnormal close
    ConnectionLost {
        /// Close code, absent for transport errors
        code: Option<u16>,
    },

    /// No opponent arrived within the configured waiting timeout
    WaitingTimedOut,

    /// The server rejected a request
    ServerError(String),
}

impl Notice {
    /// Text to show to the player
    pub fn message(&self) -> String {
        match self {
            Notice::PeerLeft => "Your opponent left the room".to_string(),
            Notice::ConnectionLost { .. } => "Connection lost".to_string(),
            Notice::WaitingTimedOut => "No opponent joined in time".to_string(),
            Notice::ServerError(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Event emitted by the session controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Navigate(View),
    Notice(Notice),
    Chat { from: String, message: String },
    Rooms(Vec<RoomSummary>),
}
