//! Protocol state machine: applies inbound frames to the [`Session`]
//!
//! Frames that are not valid for the current status are ignored rather
//! than treated as fatal, so a late frame from a connection that is about to
//! close cannot corrupt the session.
//!
//! Color rule: the server is authoritative for who is black. This client is
//! black exactly when its own identity equals the declared black identity;
//! the opponent gets the other color.

use othello_net_protocol::{Color, InboundFrame, RoomSummary, SessionStatus};

use crate::session::{LastMove, Session};

/// What the controller has to do after a frame was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Session updated (or left as is), nothing else to do
    Applied,

    /// Frame not valid in the current status, or missing data
    Ignored,

    /// Waiting → Playing
    GameStarted,

    /// The opponent left; the session must be reset
    PeerLeft,

    Chat { from: String, message: String },

    Rooms(Vec<RoomSummary>),

    ServerError(String),
}

impl Session {
    /// Applies one inbound frame
    pub(crate) fn apply_frame(&mut self, frame: InboundFrame) -> Outcome {
        let kind = frame.kind();

        match frame {
            InboundFrame::Matched { black, white, room } => {
                if !self.status.is_waiting() {
                    return self.ignore(kind);
                }
                self.on_matched(black, white, room)
            }

            InboundFrame::Wait { room, .. } => {
                if let Some(room) = room {
                    self.room_id = room;
                }
                Outcome::Applied
            }

            InboundFrame::Start { black, first, room } => {
                if !self.status.is_waiting() {
                    return self.ignore(kind);
                }
                self.on_start(black, first, room)
            }

            InboundFrame::Move { x, y, turn, color } => {
                if !self.status.is_playing() {
                    return self.ignore(kind);
                }
                self.on_move(x, y, turn, color)
            }

            InboundFrame::Leave { code } => {
                if !self.status.is_active() {
                    return self.ignore(kind);
                }
                tracing::info!(?code, "Opponent left the room");
                Outcome::PeerLeft
            }

            InboundFrame::SpectatorJoin { name } => {
                if name == self.self_identity {
                    tracing::debug!(name = %name, "Ignoring own spectator join");
                    return Outcome::Ignored;
                }
                if self.spectators.insert(name.clone()) {
                    tracing::debug!(name = %name, "Spectator joined");
                }
                Outcome::Applied
            }

            InboundFrame::SpectatorLeave { name } => {
                if self.spectators.remove(&name) {
                    tracing::debug!(name = %name, "Spectator left");
                }
                Outcome::Applied
            }

            InboundFrame::Chat { from, message } => Outcome::Chat { from, message },

            InboundFrame::Rooms { rooms } => Outcome::Rooms(rooms),

            InboundFrame::Error { message } => {
                tracing::warn!(message = %message, "Server rejected request");
                Outcome::ServerError(message)
            }
        }
    }

    fn on_matched(&mut self, black: String, white: String, room: Option<String>) -> Outcome {
        let opponent = if black == self.self_identity && white != self.self_identity {
            white
        } else if white == self.self_identity && black != self.self_identity {
            black.clone()
        } else {
            tracing::warn!(
                black = %black,
                white = %white,
                player = %self.self_identity,
                "matched frame does not name this player exactly once"
            );
            return Outcome::Ignored;
        };

        tracing::info!(opponent = %opponent, "Matched with opponent");
        self.opponent_identity = opponent;
        self.declared_black = Some(black);
        if let Some(room) = room {
            self.room_id = room;
        }
        Outcome::Applied
    }

    fn on_start(
        &mut self,
        black: Option<String>,
        first: Option<Color>,
        room: Option<String>,
    ) -> Outcome {
        let Some(black) = black.or_else(|| self.declared_black.clone()) else {
            tracing::warn!("start frame without a black player and no prior match");
            return Outcome::Ignored;
        };

        let self_color = if self.self_identity == black {
            Color::Black
        } else {
            Color::White
        };

        if self.opponent_identity.is_empty() && self_color == Color::White {
            self.opponent_identity = black.clone();
        }
        if let Some(room) = room {
            self.room_id = room;
        }

        self.declared_black = Some(black);
        self.self_color = Some(self_color);
        self.opponent_color = Some(self_color.opposite());
        self.turn_holder = first.unwrap_or(self.first_turn);

        if let Err(e) = self.status.transition_to(SessionStatus::Playing) {
            tracing::error!(error = %e, "Cannot start game");
            return Outcome::Ignored;
        }

        tracing::info!(
            color = %self_color,
            opponent = %self.opponent_identity,
            first = %self.turn_holder,
            "Game started"
        );
        Outcome::GameStarted
    }

    fn on_move(&mut self, x: u8, y: u8, turn: Option<String>, color: Option<Color>) -> Outcome {
        let mover = match (turn, color) {
            (Some(turn), _) if turn == self.self_identity => self.self_color,
            (Some(turn), _)
                if self.opponent_identity.is_empty() || turn == self.opponent_identity =>
            {
                self.opponent_color
            }
            (Some(turn), _) => {
                tracing::warn!(
                    turn = %turn,
                    opponent = %self.opponent_identity,
                    "move frame names a player outside this game"
                );
                return Outcome::Ignored;
            }
            (None, Some(color)) => Some(color),
            (None, None) => None,
        };

        let Some(mover) = mover else {
            tracing::warn!(x, y, "move frame names neither mover nor color");
            return Outcome::Ignored;
        };

        self.last_move = Some(LastMove { x, y, color: mover });
        self.turn_holder = mover.opposite();
        tracing::debug!(x, y, color = %mover, "Move applied");
        Outcome::Applied
    }

    fn ignore(&self, kind: &str) -> Outcome {
        tracing::debug!(kind, status = %self.status, "Ignoring frame in current status");
        Outcome::Ignored
    }
}
