//! Session configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::constants::{
    DEFAULT_COMPARE_DELAY_MS, DEFAULT_INBOX_CAPACITY, DEFAULT_RESET_DELAY_MS,
};

/// Session configuration
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionConfig {
    /// Session name, used for log correlation
    pub name: String,

    /// Delay before a held pair is compared, in milliseconds
    pub compare_delay_ms: u64,

    /// Delay before a completed board reshuffles, in milliseconds
    pub reset_delay_ms: u64,

    /// Capacity of the actor's message inbox
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "game".to_string(),
            compare_delay_ms: DEFAULT_COMPARE_DELAY_MS,
            reset_delay_ms: DEFAULT_RESET_DELAY_MS,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn compare_delay(&self) -> Duration {
        Duration::from_millis(self.compare_delay_ms)
    }

    #[must_use]
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}
