//! Commitment and Nonce for the commit-reveal scheme.

use crate::games::Move;
use crate::protocol::ParticipantId;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Random nonce hiding a committed move
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce([u8; 32]);

impl Nonce {
    /// Create a new random nonce
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Commitment = H(move_code || nonce || participant)
///
/// Binding the participant means a digest copied from the opponent can never
/// be opened by the copier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Commit `participant` to `mv` under `nonce`
    pub fn new(mv: Move, nonce: &Nonce, participant: &ParticipantId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([mv.code()]);
        hasher.update(nonce.as_bytes());
        hasher.update(participant.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify that `participant` revealing `mv` and `nonce` opens this commitment
    pub fn verify(&self, mv: Move, nonce: &Nonce, participant: &ParticipantId) -> bool {
        *self == Self::new(mv, nonce, participant)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A participant's private half of a commitment: the move and its nonce.
///
/// Kept by the participant between committing and revealing.
#[derive(Clone, Debug)]
pub struct SealedMove {
    mv: Move,
    nonce: Nonce,
}

impl SealedMove {
    /// Seal `mv` under a fresh random nonce
    pub fn new(mv: Move) -> Self {
        Self {
            mv,
            nonce: Nonce::random(),
        }
    }

    pub fn commitment(&self, participant: &ParticipantId) -> Commitment {
        Commitment::new(self.mv, &self.nonce, participant)
    }

    pub fn mv(&self) -> Move {
        self.mv
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }
}
