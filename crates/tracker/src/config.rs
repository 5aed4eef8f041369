use std::time::Duration;

use studio_client::config::{parse_var, ConfigError};

/// Default delay between two polls of the same job.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Polling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Delay between the end of one poll and the start of the next.
    /// Must be non-zero.
    pub interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl TrackerConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Load from `STUDIO_POLL_INTERVAL_MS` (default `3000`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let interval_ms = parse_var(&lookup, "STUDIO_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        Ok(Self::with_interval(Duration::from_millis(interval_ms)))
    }
}
