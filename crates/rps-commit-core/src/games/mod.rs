//! Move definitions and winner computation.

mod rps;

pub use rps::{judge, Move};
