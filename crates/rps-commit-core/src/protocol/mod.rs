//! Protocol types and session notifications.

mod events;
mod types;

pub use events::{GameEvent, SessionEvent};
pub use types::{GameId, GameResult, Outcome, ParticipantId, Player, SessionState};
