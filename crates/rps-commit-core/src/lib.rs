//! RPS Commit Core Library
//!
//! Two-party rock-paper-scissors without a trusted referee. Each participant
//! first commits to a hidden move, and moves are only revealed once both
//! commitments are recorded. A participant whose opponent never reveals can
//! claim the match after a grace period.
//!
//! - [`GameSession`]: the state machine for a single match
//! - [`SessionStore`]: owns many sessions, locks each independently and
//!   broadcasts their events
//! - [`Commitment`] / [`SealedMove`]: the participant-bound hash commitment

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod games;
pub mod protocol;
pub mod session;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use crypto::{Commitment, Nonce, SealedMove};
pub use error::{GameError, Result};
pub use games::{judge, Move};
pub use protocol::{
    GameEvent, GameId, GameResult, Outcome, ParticipantId, Player, SessionEvent, SessionState,
};
pub use session::GameSession;
pub use store::SessionStore;
