// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll timings, with environment overrides.

use std::time::Duration;

/// Timings and buffer sizes for one poll session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between log fetch cycles.
    pub log_interval: Duration,
    /// Pause between invocation status polls.
    pub status_interval: Duration,
    /// How long to keep tailing after every live instance finished.
    pub drain_grace: Duration,
    /// Delay between an instance completing and its streams leaving the
    /// watermark computation.
    pub ignore_grace: Duration,
    /// Wait after submitting a command before its targets are listed.
    pub settle: Duration,
    pub channel_capacity: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            log_interval: Duration::from_secs(1),
            status_interval: Duration::from_secs(3),
            drain_grace: Duration::from_secs(5),
            ignore_grace: Duration::from_secs(5),
            settle: Duration::from_secs(3),
            channel_capacity: 256,
        }
    }
}

impl PollConfig {
    /// Defaults overridden by `FR_LOG_POLL_MS`, `FR_STATUS_POLL_MS`,
    /// `FR_DRAIN_GRACE_MS`, `FR_IGNORE_GRACE_MS` and `FR_SETTLE_MS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_interval: env_ms("FR_LOG_POLL_MS").unwrap_or(defaults.log_interval),
            status_interval: env_ms("FR_STATUS_POLL_MS").unwrap_or(defaults.status_interval),
            drain_grace: env_ms("FR_DRAIN_GRACE_MS").unwrap_or(defaults.drain_grace),
            ignore_grace: env_ms("FR_IGNORE_GRACE_MS").unwrap_or(defaults.ignore_grace),
            settle: env_ms("FR_SETTLE_MS").unwrap_or(defaults.settle),
            channel_capacity: defaults.channel_capacity,
        }
    }
}

fn env_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
