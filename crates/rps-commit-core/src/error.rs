use crate::protocol::{GameId, ParticipantId, SessionState};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// Errors returned by session operations.
///
/// A call that fails with any of these leaves the session exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Operation not allowed in state {0}")]
    WrongState(SessionState),

    #[error("Participant {0} is not registered in this session")]
    Unauthorized(ParticipantId),

    #[error("Participant {0} has already committed")]
    AlreadyCommitted(ParticipantId),

    #[error("Participant {0} has already revealed")]
    AlreadyRevealed(ParticipantId),

    #[error("Revealed move and nonce do not match the commitment of {0}")]
    RevealMismatch(ParticipantId),

    #[error("Reveal deadline not reached: forfeit possible at {deadline}")]
    TooEarly { deadline: DateTime<Utc> },

    #[error("Participant {0} must reveal before claiming a forfeit")]
    RevealRequired(ParticipantId),

    #[error("Invalid move code: {0}")]
    InvalidMove(u8),

    #[error("Participant {0} cannot play against themselves")]
    DuplicateParticipant(ParticipantId),

    #[error("Game not found: {0}")]
    NotFound(GameId),
}
