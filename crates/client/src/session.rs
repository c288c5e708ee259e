//! The client-held record of one active or pending game
//!
//! A [`Session`] is created empty together with its controller and is only
//! ever reset in place. UI code reads it through the accessors; all
//! mutation goes through the controller.

use std::collections::BTreeSet;

use othello_net_protocol::{Color, SessionStatus};
use serde::{Deserialize, Serialize};

/// Whether this client creates the room or joins an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Creates a room; pre-flight checks are skipped
    Host,

    /// Joins an existing room by id
    Guest,
}

impl SessionRole {
    pub fn from_host_flag(host: bool) -> Self {
        if host {
            SessionRole::Host
        } else {
            SessionRole::Guest
        }
    }

    #[inline]
    pub fn is_host(&self) -> bool {
        matches!(self, SessionRole::Host)
    }
}

/// How this client takes part in a room, sent as the `role` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    #[default]
    Player,
    Spectator,
}

impl Participant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Participant::Player => "player",
            Participant::Spectator => "spectator",
        }
    }
}

/// Starting color choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstTurn {
    #[default]
    Black,
    White,
    /// Coin flip, resolved when chosen
    Random,
}

impl FirstTurn {
    /// Turns the choice into a concrete color
    pub fn resolve(self) -> Color {
        match self {
            FirstTurn::Black => Color::Black,
            FirstTurn::White => Color::White,
            FirstTurn::Random => {
                if rand::random::<bool>() {
                    Color::Black
                } else {
                    Color::White
                }
            }
        }
    }
}

/// Most recent applied move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub x: u8,
    pub y: u8,
    /// Color of the player who moved
    pub color: Color,
}

/// Session state observed by the UI
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) status: SessionStatus,
    pub(crate) role: Option<SessionRole>,
    pub(crate) participant: Participant,
    pub(crate) self_identity: String,
    pub(crate) opponent_identity: String,
    pub(crate) room_id: String,
    pub(crate) self_color: Option<Color>,
    pub(crate) opponent_color: Option<Color>,
    pub(crate) turn_holder: Color,
    pub(crate) first_turn: Color,
    /// Black identity announced by `matched`, used if `start` omits it
    pub(crate) declared_black: Option<String>,
    pub(crate) last_move: Option<LastMove>,
    pub(crate) spectators: BTreeSet<String>,
    pub(crate) has_transport: bool,
}

impl Session {
    pub(crate) fn new(first_turn: Color) -> Self {
        Self {
            status: SessionStatus::Idle,
            role: None,
            participant: Participant::Player,
            self_identity: String::new(),
            opponent_identity: String::new(),
            room_id: String::new(),
            self_color: None,
            opponent_color: None,
            turn_holder: first_turn,
            first_turn,
            declared_black: None,
            last_move: None,
            spectators: BTreeSet::new(),
            has_transport: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Host or Guest; `None` before the first connect
    pub fn role(&self) -> Option<SessionRole> {
        self.role
    }

    pub fn participant(&self) -> Participant {
        self.participant
    }

    pub fn self_identity(&self) -> &str {
        &self.self_identity
    }

    /// Empty until the opponent is known
    pub fn opponent_identity(&self) -> &str {
        &self.opponent_identity
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn self_color(&self) -> Option<Color> {
        self.self_color
    }

    pub fn opponent_color(&self) -> Option<Color> {
        self.opponent_color
    }

    pub fn turn_holder(&self) -> Color {
        self.turn_holder
    }

    /// Starting color used when `start` does not declare one
    pub fn first_turn(&self) -> Color {
        self.first_turn
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn spectators(&self) -> &BTreeSet<String> {
        &self.spectators
    }

    pub fn has_transport(&self) -> bool {
        self.has_transport
    }

    /// True while playing and the turn holder is this client's color
    ///
    /// Always false for spectators.
    pub fn is_my_turn(&self) -> bool {
        self.participant == Participant::Player
            && self.status.is_playing()
            && self.self_color == Some(self.turn_holder)
    }

    /// Records the identity and role of a new session and enters Waiting
    pub(crate) fn begin(
        &mut self,
        name: &str,
        role: SessionRole,
        participant: Participant,
        room_id: Option<&str>,
    ) {
        self.self_identity = name.to_string();
        self.role = Some(role);
        self.participant = participant;
        self.room_id = room_id.unwrap_or_default().to_string();
        self.opponent_identity.clear();
        self.declared_black = None;
        self.self_color = None;
        self.opponent_color = None;
        self.turn_holder = self.first_turn;
        self.spectators.clear();
        self.has_transport = true;
        self.status = SessionStatus::Waiting;
    }

    /// Returns the session to Idle
    ///
    /// Returns true if the session was active. Calling it on an idle
    /// session leaves everything as it is.
    pub(crate) fn reset(&mut self) -> bool {
        self.has_transport = false;
        if self.status.is_idle() {
            return false;
        }

        self.status = SessionStatus::Idle;
        self.opponent_identity.clear();
        self.declared_black = None;
        self.self_color = None;
        self.opponent_color = None;
        self.turn_holder = self.first_turn;
        self.spectators.clear();
        true
    }
}
