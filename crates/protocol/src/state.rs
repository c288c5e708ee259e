//! Session status state machine
//!
//! Status transitions:
//! ```text
//! IDLE → WAITING → PLAYING
//!   ↑       ↓         ↓
//!   └───────┴─────────┘
//!  (leave, peer leave, abnormal close, error)
//! ```

use crate::error::{ProtocolError, Result};

/// Status of the client's game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No active session
    #[default]
    Idle,

    /// Transport open, waiting for an opponent and the `start` frame
    Waiting,

    /// Opponent and colors assigned, moves may flow
    Playing,
}

impl SessionStatus {
    /// Validates a status transition
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;

        match (self, next) {
            (Idle, Waiting) => true, // connect intent accepted

            (Waiting, Playing) => true, // start frame
            (Waiting, Idle) => true,    // leave or lost connection before start

            (Playing, Idle) => true, // leave, peer leave or lost connection

            // Any status can stay the same
            (a, b) if a == &b => true,

            _ => false,
        }
    }

    /// Attempts to transition to a new status
    ///
    /// Returns Ok(()) if the transition is valid, Err otherwise
    pub fn transition_to(&mut self, next: SessionStatus) -> Result<()> {
        if self.can_transition_to(next) {
            *self = next;
            Ok(())
        } else {
            Err(ProtocolError::InvalidStateTransition {
                from: *self,
                to: next,
            })
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionStatus::Idle)
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        matches!(self, SessionStatus::Waiting)
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, SessionStatus::Playing)
    }

    /// Returns true while a transport is expected to be open
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Idle"),
            SessionStatus::Waiting => write!(f, "Waiting"),
            SessionStatus::Playing => write!(f, "Playing"),
        }
    }
}
