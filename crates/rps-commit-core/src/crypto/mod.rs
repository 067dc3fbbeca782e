//! Cryptographic primitives for the commit-reveal protocol.
//!
//! This module provides:
//! - Nonce and Commitment for binding a move to a participant
//! - SealedMove, the participant-side half kept until reveal

mod commitment;

pub use commitment::{Commitment, Nonce, SealedMove};
