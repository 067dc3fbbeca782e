//! Protocol types.

use crate::games::Move;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique game identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Create a new random game ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameId({})", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a participant, bound into every commitment they make
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Create a new random participant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get bytes representation for hashing
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seat of a participant within a session. A is always the creator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// Get the opponent
    pub fn opponent(&self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => write!(f, "A"),
            Player::B => write!(f, "B"),
        }
    }
}

/// Game result, seat-relative
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    AWins,
    BWins,
    Draw,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::AWins => "A wins",
            GameResult::BWins => "B wins",
            GameResult::Draw => "Draw",
        }
    }

    /// The winning seat, if any
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameResult::AWins => Some(Player::A),
            GameResult::BWins => Some(Player::B),
            GameResult::Draw => None,
        }
    }

    /// The same result seen from the other seat
    pub fn swapped(&self) -> GameResult {
        match self {
            GameResult::AWins => GameResult::BWins,
            GameResult::BWins => GameResult::AWins,
            GameResult::Draw => GameResult::Draw,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a session.
///
/// ```text
/// AwaitingCommitments ──► AwaitingReveals ──► Resolved
///          │
///          └────────────► Abandoned
/// ```
///
/// Resolved is reached either by both reveals or by a forfeit after the
/// reveal deadline. Resolved and Abandoned are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    AwaitingCommitments,
    AwaitingReveals,
    Resolved,
    Abandoned,
}

impl SessionState {
    /// Returns `true` once no further mutation is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Abandoned)
    }

    /// Returns `true` if moving from `self` to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::AwaitingCommitments, Self::AwaitingReveals)
                | (Self::AwaitingCommitments, Self::Abandoned)
                | (Self::AwaitingReveals, Self::Resolved)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingCommitments => write!(f, "AwaitingCommitments"),
            Self::AwaitingReveals => write!(f, "AwaitingReveals"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// Final result of a resolved session: both moves and the winner.
///
/// `winner` is `None` for a draw. A forfeit always names the participant who
/// revealed, and the forfeiting side's move is [`Move::NoMove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub move_a: Move,
    pub move_b: Move,
    pub winner: Option<ParticipantId>,
}

impl Outcome {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// `true` when one side never revealed
    pub fn is_forfeit(&self) -> bool {
        self.move_a.is_none() != self.move_b.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_generation() {
        let id1 = GameId::new();
        let id2 = GameId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_game_id_parse_roundtrip() {
        let id = GameId::new();
        let parsed: GameId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::A.opponent(), Player::B);
        assert_eq!(Player::B.opponent(), Player::A);
    }

    #[test]
    fn test_game_result_str() {
        assert_eq!(GameResult::AWins.as_str(), "A wins");
        assert_eq!(GameResult::BWins.as_str(), "B wins");
        assert_eq!(GameResult::Draw.as_str(), "Draw");
    }

    #[test]
    fn test_game_result_swapped() {
        assert_eq!(GameResult::AWins.swapped(), GameResult::BWins);
        assert_eq!(GameResult::BWins.swapped(), GameResult::AWins);
        assert_eq!(GameResult::Draw.swapped(), GameResult::Draw);
    }

    #[test]
    fn test_session_state_transitions() {
        use SessionState::*;

        assert!(AwaitingCommitments.can_transition_to(AwaitingReveals));
        assert!(AwaitingCommitments.can_transition_to(Abandoned));
        assert!(AwaitingReveals.can_transition_to(Resolved));

        assert!(!AwaitingCommitments.can_transition_to(Resolved));
        assert!(!AwaitingReveals.can_transition_to(Abandoned));
        assert!(!AwaitingReveals.can_transition_to(AwaitingCommitments));
        assert!(!Resolved.can_transition_to(AwaitingCommitments));
        assert!(!Abandoned.can_transition_to(AwaitingCommitments));
    }

    #[test]
    fn test_session_state_terminal() {
        assert!(!SessionState::AwaitingCommitments.is_terminal());
        assert!(!SessionState::AwaitingReveals.is_terminal());
        assert!(SessionState::Resolved.is_terminal());
        assert!(SessionState::Abandoned.is_terminal());
    }

    #[test]
    fn test_outcome_draw_and_forfeit_are_distinct() {
        let draw = Outcome {
            move_a: Move::Paper,
            move_b: Move::Paper,
            winner: None,
        };
        assert!(draw.is_draw());
        assert!(!draw.is_forfeit());

        let forfeit = Outcome {
            move_a: Move::Rock,
            move_b: Move::NoMove,
            winner: Some(ParticipantId::new()),
        };
        assert!(!forfeit.is_draw());
        assert!(forfeit.is_forfeit());
    }
}
