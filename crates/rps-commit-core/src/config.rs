//! Session configuration.

use serde::{Deserialize, Serialize};

/// Grace window between both commitments landing and forfeits opening up.
pub const DEFAULT_REVEAL_GRACE_SECS: u32 = 300;

/// Default capacity of the session event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Settings shared by every session in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds participants have to reveal once both commitments are in.
    pub reveal_grace_secs: u32,

    /// Events buffered per subscriber before slow receivers start lagging.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reveal_grace_secs: DEFAULT_REVEAL_GRACE_SECS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Read `RPS_REVEAL_GRACE_SECS` and `RPS_EVENT_CAPACITY`, falling back to
    /// the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let reveal_grace_secs = lookup("RPS_REVEAL_GRACE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.reveal_grace_secs);
        let event_capacity = lookup("RPS_EVENT_CAPACITY")
            .and_then(|s| s.parse().ok())
            .filter(|capacity| *capacity > 0)
            .unwrap_or(defaults.event_capacity);

        Self {
            reveal_grace_secs,
            event_capacity,
        }
    }
}
