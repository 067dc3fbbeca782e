//! Rock-Paper-Scissors moves and judging.

use crate::error::GameError;
use crate::protocol::GameResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A move, with the single-byte code that is hashed into commitments.
///
/// `NoMove` marks a reveal that has not happened yet, or one that was
/// forfeited. It is never a playable move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Move {
    #[default]
    NoMove = 0,
    Rock = 1,
    Scissors = 2,
    Paper = 3,
}

impl Move {
    /// Every playable move
    pub const PLAYABLE: [Move; 3] = [Move::Rock, Move::Scissors, Move::Paper];

    /// Wire code of this move
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// `true` for the no-move sentinel
    pub fn is_none(&self) -> bool {
        matches!(self, Move::NoMove)
    }

    /// Check if this move beats the other
    pub fn beats(&self, other: &Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Rock)
        )
    }
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Move::NoMove),
            1 => Ok(Move::Rock),
            2 => Ok(Move::Scissors),
            3 => Ok(Move::Paper),
            other => Err(GameError::InvalidMove(other)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::NoMove => write!(f, "None"),
            Move::Rock => write!(f, "Rock"),
            Move::Scissors => write!(f, "Scissors"),
            Move::Paper => write!(f, "Paper"),
        }
    }
}

/// Decide a match from both seats' moves.
///
/// Total over all sixteen combinations. A lone `NoMove` loses to whatever the
/// other side played; equal moves (including two `NoMove`s) draw.
pub fn judge(move_a: Move, move_b: Move) -> GameResult {
    match (move_a.is_none(), move_b.is_none()) {
        (false, true) => GameResult::AWins,
        (true, false) => GameResult::BWins,
        _ if move_a == move_b => GameResult::Draw,
        _ if move_a.beats(&move_b) => GameResult::AWins,
        _ => GameResult::BWins,
    }
}
