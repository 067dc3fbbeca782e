//! Notifications emitted as a session moves through its phases.

use crate::protocol::{GameId, Outcome, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something observable happened to a session.
///
/// Submissions that do not complete a pair (the first commitment, the first
/// reveal) produce no event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A session was opened between two participants
    GameStarted {
        participant_a: ParticipantId,
        participant_b: ParticipantId,
    },
    /// Both commitments are in; reveals are accepted until the deadline
    CommitmentsReceived { reveal_deadline: DateTime<Utc> },
    /// The session resolved, by two reveals or by forfeit
    Resolved(Outcome),
    /// A participant abandoned the session before both commitments arrived
    Withdrawn { by: ParticipantId },
}

/// A [`GameEvent`] tagged with the session it belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub game_id: GameId,
    pub event: GameEvent,
}
